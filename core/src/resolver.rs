//! Column resolution: maps loosely named source headers onto the
//! canonical semantic fields.
//!
//! Each canonical field has one `FieldRule`:
//!   1. exact candidates, in priority order
//!   2. fallback tiers, each scanned in file column order
//!
//! The first header matched wins. Headers hit by an `exclude` test are
//! skipped by the fallback tiers only. Resolution is a pure function
//! of the header list.

use crate::error::{FpdError, FpdResult};
use serde::Serialize;
use std::{collections::BTreeMap, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Cohort,
    DefaultFlag,
    NonpaymentFlag,
    Amount,
    Branch,
    Region,
    Product,
    OriginChannel,
    ClientType,
    CreditId,
    ProductId,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 11] = [
        CanonicalField::Cohort,
        CanonicalField::DefaultFlag,
        CanonicalField::NonpaymentFlag,
        CanonicalField::Amount,
        CanonicalField::Branch,
        CanonicalField::Region,
        CanonicalField::Product,
        CanonicalField::OriginChannel,
        CanonicalField::ClientType,
        CanonicalField::CreditId,
        CanonicalField::ProductId,
    ];

    /// Loading aborts when a required field does not resolve.
    pub fn is_required(self) -> bool {
        matches!(self, CanonicalField::Cohort | CanonicalField::DefaultFlag)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalField::Cohort         => "cohort",
            CanonicalField::DefaultFlag    => "default_flag",
            CanonicalField::NonpaymentFlag => "nonpayment_flag",
            CanonicalField::Amount         => "amount",
            CanonicalField::Branch         => "branch",
            CanonicalField::Region         => "region",
            CanonicalField::Product        => "product",
            CanonicalField::OriginChannel  => "origin_channel",
            CanonicalField::ClientType     => "client_type",
            CanonicalField::CreditId       => "credit_id",
            CanonicalField::ProductId      => "product_id",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fallback test applied to one normalized header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMatch {
    Contains(&'static str),
    ContainsAll(&'static [&'static str]),
    /// Equal to one `_`-separated token of the header.
    Token(&'static str),
    /// Some `_`-separated token starts with the prefix.
    TokenPrefix(&'static str),
}

impl HeaderMatch {
    pub fn matches(&self, header: &str) -> bool {
        match self {
            HeaderMatch::Contains(s) => header.contains(s),
            HeaderMatch::ContainsAll(all) => all.iter().all(|s| header.contains(s)),
            HeaderMatch::Token(t) => header.split('_').any(|part| part == *t),
            HeaderMatch::TokenPrefix(p) => header.split('_').any(|part| part.starts_with(*p)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: CanonicalField,
    pub candidates: &'static [&'static str],
    pub fallbacks: &'static [HeaderMatch],
    pub exclude: &'static [HeaderMatch],
}

/// Identifier columns (`id_sucursal`, `idproducto`); `unidad` stays eligible.
const ID_GUARD: &[HeaderMatch] = &[HeaderMatch::TokenPrefix("id")];

pub const FIELD_RULES: [FieldRule; 11] = [
    FieldRule {
        field: CanonicalField::Cohort,
        candidates: &[],
        fallbacks: &[HeaderMatch::Contains("cosecha")],
        exclude: &[],
    },
    FieldRule {
        field: CanonicalField::DefaultFlag,
        candidates: &[],
        fallbacks: &[HeaderMatch::Contains("fpd2"), HeaderMatch::Contains("fpd")],
        exclude: &[],
    },
    FieldRule {
        field: CanonicalField::NonpaymentFlag,
        candidates: &[],
        fallbacks: &[HeaderMatch::Token("np")],
        exclude: &[],
    },
    FieldRule {
        field: CanonicalField::Amount,
        candidates: &[],
        fallbacks: &[
            HeaderMatch::ContainsAll(&["monto", "otorgado"]),
            HeaderMatch::Contains("monto"),
        ],
        exclude: &[],
    },
    FieldRule {
        field: CanonicalField::Branch,
        candidates: &["sucursal", "nombre_sucursal"],
        fallbacks: &[HeaderMatch::Contains("sucursal")],
        exclude: ID_GUARD,
    },
    FieldRule {
        field: CanonicalField::Region,
        candidates: &["unidad_regional", "regional", "region", "unidad"],
        fallbacks: &[HeaderMatch::Contains("regional"), HeaderMatch::Contains("unidad")],
        exclude: ID_GUARD,
    },
    FieldRule {
        field: CanonicalField::Product,
        candidates: &["producto_agrupado", "nombre_producto", "producto"],
        fallbacks: &[HeaderMatch::Contains("producto")],
        exclude: ID_GUARD,
    },
    FieldRule {
        field: CanonicalField::OriginChannel,
        candidates: &["origen2", "origen"],
        fallbacks: &[HeaderMatch::Contains("origen")],
        exclude: ID_GUARD,
    },
    FieldRule {
        field: CanonicalField::ClientType,
        candidates: &["tipo_cliente", "tipo"],
        fallbacks: &[HeaderMatch::Contains("cliente")],
        exclude: ID_GUARD,
    },
    FieldRule {
        field: CanonicalField::CreditId,
        candidates: &["id_credito", "credito_id"],
        fallbacks: &[HeaderMatch::ContainsAll(&["id", "credito"])],
        exclude: &[],
    },
    FieldRule {
        field: CanonicalField::ProductId,
        candidates: &["id_producto", "producto_id"],
        fallbacks: &[HeaderMatch::ContainsAll(&["id", "producto"])],
        exclude: &[],
    },
];

impl FieldRule {
    /// Column index of the header this rule selects, if any.
    pub fn resolve(&self, headers: &[String]) -> Option<usize> {
        for cand in self.candidates {
            if let Some(idx) = headers.iter().position(|h| h == cand) {
                return Some(idx);
            }
        }
        self.fallbacks.iter().find_map(|tier| {
            headers.iter().position(|h| {
                tier.matches(h) && !self.exclude.iter().any(|x| x.matches(h))
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedColumn {
    pub header: String,
    pub index: usize,
}

/// Canonical field → resolved source column, built once per load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldMap {
    columns: BTreeMap<CanonicalField, ResolvedColumn>,
}

impl FieldMap {
    pub fn get(&self, field: CanonicalField) -> Option<&ResolvedColumn> {
        self.columns.get(&field)
    }

    pub fn index(&self, field: CanonicalField) -> Option<usize> {
        self.get(field).map(|c| c.index)
    }

    /// Optional fields that fell back to the sentinel.
    pub fn degraded(&self) -> Vec<CanonicalField> {
        CanonicalField::ALL
            .into_iter()
            .filter(|f| !self.columns.contains_key(f))
            .collect()
    }
}

/// Resolve every canonical field against a normalized header list.
/// Fails only when the cohort or default-flag column is missing.
pub fn resolve_columns(headers: &[String]) -> FpdResult<FieldMap> {
    let mut columns = BTreeMap::new();
    for rule in &FIELD_RULES {
        match rule.resolve(headers) {
            Some(index) => {
                log::debug!("Field '{}' -> column '{}'", rule.field, headers[index]);
                columns.insert(rule.field, ResolvedColumn { header: headers[index].clone(), index });
            }
            None if rule.field.is_required() => {
                return Err(FpdError::MissingColumn {
                    field: rule.field,
                    headers: headers.to_vec(),
                });
            }
            None => log::warn!("Field '{}' not found; using sentinel values", rule.field),
        }
    }
    Ok(FieldMap { columns })
}
