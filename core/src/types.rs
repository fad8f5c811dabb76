//! Shared primitive types used across the entire monitor.

/// A reporting period token, `YYYYMM`. Lexicographic order is chronological.
pub type CohortKey = String;

/// Placeholder for any unresolved or null dimension value.
pub const NO_DATA: &str = "Sin Dato";

/// Cohort assigned to rows whose cohort value cannot be parsed.
/// Sorts before every real cohort and never takes part in maturity logic.
pub const SENTINEL_COHORT: &str = "0";

/// True for a well-formed `YYYYMM` key (never the sentinel).
pub fn is_valid_cohort(key: &str) -> bool {
    key.len() == 6 && key.bytes().all(|b| b.is_ascii_digit())
}
