//! Monitor configuration: constants that shape every derived view.
//!
//! All fields carry serde defaults, so a JSON file only needs the values
//! that differ from production. Use `MonitorConfig::default()` in tests.

use crate::error::{FpdError, FpdResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    /// Most recent cohorts treated as pending.
    pub maturity_lag: usize,
    /// Mature cohorts shown in trend views.
    pub window_size: usize,
    /// Minimum group size for any ranking.
    pub min_sample: u64,
    pub top_n: usize,
    /// Cumulative share (0..=1) the Pareto cutoff must reach.
    pub pareto_threshold: f64,
    /// Lower edges of the amount bins; the last bin is open-ended.
    pub amount_bin_edges: Vec<f64>,
    pub branch_exclusions: BranchExclusions,
    pub region_exclusions: Vec<String>,
    pub client_type_exclusions: Vec<String>,
    pub channel_split: Vec<String>,
    pub default_marker: String,
    pub nonpayment_marker: String,
    pub heatmap_cohorts: usize,
    pub yoy_years: usize,
    pub export_target: ExportTarget,
    pub fallback_encoding: TextEncoding,
    pub source_candidates: Vec<String>,
}

/// Administrative buckets that are not real branches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BranchExclusions {
    /// Substrings matched as-is (e.g. reserved code "999").
    pub code_markers: Vec<String>,
    /// Substrings matched case-insensitively.
    pub name_markers: Vec<String>,
}

impl Default for BranchExclusions {
    fn default() -> Self {
        Self {
            code_markers: vec!["999".into()],
            name_markers: vec!["nomina colaboradores".into()],
        }
    }
}

impl BranchExclusions {
    pub fn is_excluded(&self, branch: &str) -> bool {
        if self.code_markers.iter().any(|m| branch.contains(m.as_str())) {
            return true;
        }
        let lower = branch.to_lowercase();
        self.name_markers
            .iter()
            .any(|m| lower.contains(&m.to_lowercase()))
    }
}

/// Which cohort the early-warning export targets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExportTarget {
    /// First pending cohort.
    Next,
    /// Last mature cohort.
    Current,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    Utf8,
    Latin1,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            maturity_lag: 1,
            window_size: 24,
            min_sample: 5,
            top_n: 10,
            pareto_threshold: 0.80,
            amount_bin_edges: vec![0.0, 3_000.0, 5_000.0, 8_000.0, 12_000.0, 20_000.0],
            branch_exclusions: BranchExclusions::default(),
            region_exclusions: vec!["pr nominas".into()],
            client_type_exclusions: vec!["former".into()],
            channel_split: vec!["fisico".into(), "digital".into()],
            default_marker: "FPD".into(),
            nonpayment_marker: "NP".into(),
            heatmap_cohorts: 6,
            yoy_years: 3,
            export_target: ExportTarget::Next,
            fallback_encoding: TextEncoding::Latin1,
            source_candidates: vec!["fpd gemini.xlsx".into(), "fpd gemini.csv".into()],
        }
    }
}

impl MonitorConfig {
    /// Load from a JSON file. Missing keys take the production defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: MonitorConfig = serde_json::from_str(&content)?;
        config.validate()?;
        log::info!("Loaded monitor config from {path}");
        Ok(config)
    }

    pub fn validate(&self) -> FpdResult<()> {
        let edges = &self.amount_bin_edges;
        if edges.is_empty() {
            return Err(FpdError::InvalidConfig("amount_bin_edges is empty".into()));
        }
        if edges.iter().any(|e| !e.is_finite()) {
            return Err(FpdError::InvalidConfig(
                "amount_bin_edges must be finite; the last bin is open-ended".into(),
            ));
        }
        if edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(FpdError::InvalidConfig(format!(
                "amount_bin_edges must be strictly increasing: {edges:?}"
            )));
        }
        if !(self.pareto_threshold > 0.0 && self.pareto_threshold <= 1.0) {
            return Err(FpdError::InvalidConfig(format!(
                "pareto_threshold must be in (0, 1], got {}",
                self.pareto_threshold
            )));
        }
        if self.default_marker.is_empty() {
            return Err(FpdError::InvalidConfig("default_marker is empty".into()));
        }
        Ok(())
    }
}
