//! Pareto concentration of default incidents across branches.

use crate::{
    aggregate::aggregate,
    config::BranchExclusions,
    filter::in_cohort,
    ranking::without_excluded,
    record::{Dimension, Record},
    types::CohortKey,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParetoEntry {
    pub rank: usize,
    pub branch: String,
    pub defaults: u64,
    pub cumulative: u64,
    /// 0..=100
    pub cumulative_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParetoReport {
    pub cohort: CohortKey,
    pub threshold: f64,
    /// Branches with at least one default, most defaults first.
    pub entries: Vec<ParetoEntry>,
    pub total_defaults: u64,
    /// Size of the minimal prefix reaching the threshold.
    pub cutoff_branches: usize,
    /// `cutoff_branches / entries.len()`, 0 when there are no entries.
    pub cutoff_ratio: f64,
}

impl ParetoReport {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cutoff(&self) -> &[ParetoEntry] {
        &self.entries[..self.cutoff_branches]
    }
}

const PCT_TOLERANCE: f64 = 1e-9;

pub fn pareto(
    view: &[&Record],
    cohort: &str,
    threshold: f64,
    exclusions: &BranchExclusions,
) -> ParetoReport {
    let cohort_view = without_excluded(&in_cohort(view, cohort), exclusions);
    let mut groups: Vec<(String, u64)> = aggregate(cohort_view, &[Dimension::Branch])
        .into_iter()
        .filter(|g| g.sum > 0)
        .map(|g| (g.label().to_string(), g.sum))
        .collect();
    // Stable: equal counts stay in branch-name order.
    groups.sort_by(|a, b| b.1.cmp(&a.1));

    let total_defaults: u64 = groups.iter().map(|(_, n)| n).sum();
    let mut cumulative = 0;
    let entries: Vec<ParetoEntry> = groups
        .into_iter()
        .enumerate()
        .map(|(i, (branch, defaults))| {
            cumulative += defaults;
            ParetoEntry {
                rank: i + 1,
                branch,
                defaults,
                cumulative,
                cumulative_pct: cumulative as f64 * 100.0 / total_defaults as f64,
            }
        })
        .collect();

    let target = threshold * 100.0 - PCT_TOLERANCE;
    let cutoff_branches = entries
        .iter()
        .position(|e| e.cumulative_pct >= target)
        .map_or(entries.len(), |i| i + 1);
    let cutoff_ratio = if entries.is_empty() {
        0.0
    } else {
        cutoff_branches as f64 / entries.len() as f64
    };

    ParetoReport {
        cohort: cohort.to_string(),
        threshold,
        entries,
        total_defaults,
        cutoff_branches,
        cutoff_ratio,
    }
}
