//! Early-warning export: defaulted loans of the target cohort.

use crate::{
    clock::CohortClock,
    config::ExportTarget,
    error::FpdResult,
    filter::in_cohort,
    record::Record,
    types::CohortKey,
};
use serde::{Deserialize, Serialize};
use std::io::Write;

pub const EXPORT_COLUMNS: [&str; 7] = [
    "credit_id",
    "product_id",
    "product_agrupado",
    "origin_channel_code",
    "cohort",
    "branch",
    "default_flag_raw",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    pub credit_id: Option<String>,
    pub product_id: Option<String>,
    pub product_agrupado: String,
    pub origin_channel_code: Option<String>,
    pub cohort: CohortKey,
    pub branch: String,
    pub default_flag_raw: Option<String>,
}

impl ExportRow {
    pub fn from_record(record: &Record) -> Self {
        Self {
            credit_id: record.identity.credit_id.clone(),
            product_id: record.identity.product_id.clone(),
            product_agrupado: record.product.clone(),
            origin_channel_code: record.identity.origin_channel_code.clone(),
            cohort: record.cohort_key.clone(),
            branch: record.branch.clone(),
            default_flag_raw: record.identity.default_flag_raw.clone(),
        }
    }

    fn fields(&self) -> [&str; 7] {
        [
            self.credit_id.as_deref().unwrap_or_default(),
            self.product_id.as_deref().unwrap_or_default(),
            &self.product_agrupado,
            self.origin_channel_code.as_deref().unwrap_or_default(),
            &self.cohort,
            &self.branch,
            self.default_flag_raw.as_deref().unwrap_or_default(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub target: ExportTarget,
    pub cohort: Option<CohortKey>,
    pub exported: usize,
    /// Default / non-default split of the whole target cohort.
    pub cohort_defaults: u64,
    pub cohort_non_defaults: u64,
    pub file_name: Option<String>,
}

pub fn target_cohort(clock: &CohortClock, target: ExportTarget) -> Option<&str> {
    match target {
        ExportTarget::Next    => clock.next_cohort(),
        ExportTarget::Current => clock.current_cohort(),
    }
}

/// Defaulted records of `cohort`, in view order.
pub fn export_rows(view: &[&Record], cohort: &str) -> Vec<ExportRow> {
    in_cohort(view, cohort)
        .into_iter()
        .filter(|r| r.is_default)
        .map(ExportRow::from_record)
        .collect()
}

pub fn export_file_name(cohort: &str) -> String {
    format!("FPD2_{cohort}_export.csv")
}

pub fn export_summary(view: &[&Record], clock: &CohortClock, target: ExportTarget) -> (ExportSummary, Vec<ExportRow>) {
    let Some(cohort) = target_cohort(clock, target) else {
        log::warn!("No {target:?} cohort available; export is empty");
        let summary = ExportSummary {
            target,
            cohort: None,
            exported: 0,
            cohort_defaults: 0,
            cohort_non_defaults: 0,
            file_name: None,
        };
        return (summary, Vec::new());
    };
    let members = in_cohort(view, cohort);
    let defaults = members.iter().filter(|r| r.is_default).count() as u64;
    let rows = export_rows(view, cohort);
    let summary = ExportSummary {
        target,
        cohort: Some(cohort.to_string()),
        exported: rows.len(),
        cohort_defaults: defaults,
        cohort_non_defaults: members.len() as u64 - defaults,
        file_name: Some(export_file_name(cohort)),
    };
    (summary, rows)
}

/// Write rows as delimited text with the fixed export header.
pub fn write_export_csv<W: Write>(writer: W, rows: &[ExportRow]) -> FpdResult<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(EXPORT_COLUMNS)?;
    for row in rows {
        out.write_record(row.fields())?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(())
}
