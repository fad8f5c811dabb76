//! Canonical record set and its load-once cache.
//!
//! RULE: A `Dataset` is never mutated after `load`.
//! Views, aggregations and rankings borrow from it.
//! The cache is an explicit value owned by the caller, keyed by the
//! source path, its modification signature and the config values that
//! change normalization (markers, fallback encoding).

use crate::{
    config::{MonitorConfig, TextEncoding},
    error::FpdResult,
    normalizer::normalize_rows,
    record::Record,
    resolver::{resolve_columns, CanonicalField, FieldMap},
    source::{read_table, RawTable, SourceIdentity},
    types::CohortKey,
};
use std::{
    collections::{BTreeSet, HashMap},
    path::Path,
    sync::Arc,
};

#[derive(Debug, Clone)]
pub struct Dataset {
    pub identity: Option<SourceIdentity>,
    pub headers: Vec<String>,
    pub field_map: FieldMap,
    pub records: Vec<Record>,
}

impl Dataset {
    /// Read, resolve and normalize one extract file.
    pub fn load(path: &Path, config: &MonitorConfig) -> FpdResult<Self> {
        let identity = SourceIdentity::probe(path)?;
        let table = read_table(path, config.fallback_encoding)?;
        let mut dataset = Self::from_table(table, config)?;
        dataset.identity = Some(identity);
        Ok(dataset)
    }

    /// Build from an already-read table. Used by `load` and by tests.
    pub fn from_table(table: RawTable, config: &MonitorConfig) -> FpdResult<Self> {
        let field_map = resolve_columns(&table.headers)?;
        let records = normalize_rows(&table, &field_map, config);
        log::info!(
            "Normalized {} records; degraded fields: {:?}",
            records.len(),
            field_map.degraded()
        );
        Ok(Self {
            identity: None,
            headers: table.headers,
            field_map,
            records,
        })
    }

    /// Wrap records that were normalized elsewhere; no source identity.
    pub fn from_records(records: Vec<Record>) -> Self {
        Self { identity: None, headers: Vec::new(), field_map: FieldMap::default(), records }
    }

    /// Distinct cohort keys, sorted (sentinel included).
    pub fn cohorts(&self) -> Vec<CohortKey> {
        let set: BTreeSet<&str> = self.records.iter().map(|r| r.cohort_key.as_str()).collect();
        set.into_iter().map(str::to_string).collect()
    }

    /// Sorted distinct values of a dimension, as offered by a filter UI.
    pub fn distinct_values(&self, field: CanonicalField) -> Vec<String> {
        let pick = |r: &Record| -> Option<String> {
            match field {
                CanonicalField::Branch        => Some(r.branch.clone()),
                CanonicalField::Region        => Some(r.region.clone()),
                CanonicalField::Product       => Some(r.product.clone()),
                CanonicalField::ClientType    => Some(r.client_type.clone()),
                CanonicalField::OriginChannel => Some(r.origin_channel.clone()),
                _ => None,
            }
        };
        let set: BTreeSet<String> = self.records.iter().filter_map(pick).collect();
        set.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    source: SourceIdentity,
    default_marker: String,
    nonpayment_marker: String,
    fallback_encoding: TextEncoding,
}

impl CacheKey {
    fn new(source: SourceIdentity, config: &MonitorConfig) -> Self {
        Self {
            source,
            default_marker: config.default_marker.clone(),
            nonpayment_marker: config.nonpayment_marker.clone(),
            fallback_encoding: config.fallback_encoding,
        }
    }
}

/// Explicit memo table: one `Dataset` per source identity and
/// normalization settings.
#[derive(Debug, Default)]
pub struct ExtractCache {
    entries: HashMap<CacheKey, Arc<Dataset>>,
}

impl ExtractCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `path`, loading it when the file is
    /// new, its modification signature changed, or `config` normalizes
    /// differently from every cached load of it.
    pub fn load(&mut self, path: &Path, config: &MonitorConfig) -> FpdResult<Arc<Dataset>> {
        let identity = SourceIdentity::probe(path)?;
        let key = CacheKey::new(identity.clone(), config);
        if let Some(hit) = self.entries.get(&key) {
            log::debug!("Extract cache hit for {}", path.display());
            return Ok(Arc::clone(hit));
        }
        log::debug!("Extract cache miss for {}", path.display());
        let dataset = Arc::new(Dataset::load(path, config)?);
        // A changed file supersedes every older entry for the same path.
        self.entries
            .retain(|k, _| k.source.path != identity.path || k.source == identity);
        self.entries.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
