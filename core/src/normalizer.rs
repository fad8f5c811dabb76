//! Record normalization: RawRow + FieldMap → Record.
//!
//! Every per-field problem degrades to a sentinel; nothing here fails.
//! The two fatal fields were already guaranteed by `resolve_columns`.

use crate::{
    config::MonitorConfig,
    record::{ExportIdentity, Record},
    resolver::{CanonicalField, FieldMap},
    source::{RawRow, RawTable},
    types::{CohortKey, NO_DATA, SENTINEL_COHORT},
};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%d-%m-%Y"];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];

pub struct RecordNormalizer<'a> {
    field_map: &'a FieldMap,
    default_marker: String,
    nonpayment_marker: String,
}

impl<'a> RecordNormalizer<'a> {
    pub fn new(field_map: &'a FieldMap, config: &MonitorConfig) -> Self {
        Self {
            field_map,
            default_marker: config.default_marker.to_uppercase(),
            nonpayment_marker: config.nonpayment_marker.to_uppercase(),
        }
    }

    fn cell<'r>(&self, row: &'r RawRow, field: CanonicalField) -> Option<&'r str> {
        self.field_map
            .index(field)
            .and_then(|idx| row.get(idx))
            .and_then(|c| c.as_deref())
    }

    fn dimension(&self, row: &RawRow, field: CanonicalField) -> String {
        self.cell(row, field)
            .map(str::to_string)
            .unwrap_or_else(|| NO_DATA.to_string())
    }

    pub fn normalize(&self, row: &RawRow) -> Record {
        let default_raw = self.cell(row, CanonicalField::DefaultFlag);
        let origin_raw = self.cell(row, CanonicalField::OriginChannel);
        Record {
            cohort_key: parse_cohort(self.cell(row, CanonicalField::Cohort)),
            is_default: flag_contains(default_raw, &self.default_marker),
            is_nonpayment: flag_contains(
                self.cell(row, CanonicalField::NonpaymentFlag),
                &self.nonpayment_marker,
            ),
            amount: parse_amount(self.cell(row, CanonicalField::Amount)),
            branch: self.dimension(row, CanonicalField::Branch),
            region: self.dimension(row, CanonicalField::Region),
            product: self.dimension(row, CanonicalField::Product),
            origin_channel: origin_raw.map(title_case).unwrap_or_else(|| NO_DATA.to_string()),
            client_type: self.dimension(row, CanonicalField::ClientType),
            identity: ExportIdentity {
                credit_id: self.cell(row, CanonicalField::CreditId).map(str::to_string),
                product_id: self.cell(row, CanonicalField::ProductId).map(str::to_string),
                origin_channel_code: origin_raw.map(str::to_string),
                default_flag_raw: default_raw.map(str::to_string),
            },
        }
    }
}

pub fn normalize_rows(table: &RawTable, field_map: &FieldMap, config: &MonitorConfig) -> Vec<Record> {
    let normalizer = RecordNormalizer::new(field_map, config);
    let records: Vec<Record> = table.rows.iter().map(|row| normalizer.normalize(row)).collect();
    let unparsed = records.iter().filter(|r| !r.has_valid_cohort()).count();
    if unparsed > 0 {
        log::warn!("{unparsed} rows have an unparseable cohort; assigned sentinel '{SENTINEL_COHORT}'");
    }
    records
}

/// Upper-cased substring test. Null never matches.
pub fn flag_contains(raw: Option<&str>, marker_upper: &str) -> bool {
    raw.is_some_and(|v| v.to_uppercase().contains(marker_upper))
}

/// Numeric coercion; anything unparseable or non-finite is 0.
/// Negative amounts pass through unchanged.
pub fn parse_amount(raw: Option<&str>) -> f64 {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Canonicalize a date-like value to `YYYYMM`, or the sentinel.
pub fn parse_cohort(raw: Option<&str>) -> CohortKey {
    let Some(raw) = raw else {
        return SENTINEL_COHORT.to_string();
    };
    let text = raw.trim();
    let text = text.strip_suffix(".0").unwrap_or(text);
    year_month_token(text)
        .or_else(|| generic_date(text))
        .filter(|(year, month)| (1000..=9999).contains(year) && (1..=12).contains(month))
        .map(|(year, month)| format!("{year:04}{month:02}"))
        .unwrap_or_else(|| SENTINEL_COHORT.to_string())
}

fn year_month_token(text: &str) -> Option<(i32, u32)> {
    if text.len() != 6 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((text[..4].parse().ok()?, text[4..].parse().ok()?))
}

fn generic_date(text: &str) -> Option<(i32, u32)> {
    let as_pair = |d: NaiveDate| (d.year(), d.month());
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(as_pair(dt.date_naive()));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(as_pair(dt.date()));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
            return Some(as_pair(d));
        }
    }
    year_month_pair(text)
}

/// `2025-01`, `2025/1`, `01/2025`.
fn year_month_pair(text: &str) -> Option<(i32, u32)> {
    let mut parts = text.split(['-', '/']);
    let (a, b) = (parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let numeric = |s: &str| !s.is_empty() && s.bytes().all(|c| c.is_ascii_digit());
    if !numeric(a) || !numeric(b) {
        return None;
    }
    match (a.len(), b.len()) {
        (4, 1..=2) => Some((a.parse().ok()?, b.parse().ok()?)),
        (1..=2, 4) => Some((b.parse().ok()?, a.parse().ok()?)),
        _ => None,
    }
}

/// First letter of every alphabetic run upper-cased, the rest lower-cased.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
