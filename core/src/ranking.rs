//! Branch ranking for a single cohort.
//!
//! Order of operations:
//!   1. keep the cohort's records
//!   2. drop administrative branches (reserved code / name markers)
//!   3. aggregate by branch
//!   4. keep branches with `count >= min_sample`
//!   5. stable sort by rate; groups enter the sort in branch-name order
//!
//! Ties therefore resolve by branch name ascending.

use crate::{
    aggregate::{aggregate, GroupStat},
    config::BranchExclusions,
    filter::in_cohort,
    record::{Dimension, Record},
    types::CohortKey,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy)]
pub struct RankingParams<'a> {
    pub min_sample: u64,
    pub top_n: usize,
    pub exclusions: &'a BranchExclusions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchRanking {
    pub cohort: CohortKey,
    /// Every branch that passed the sample guard, in branch order.
    pub eligible: Vec<GroupStat>,
    /// Highest rates first.
    pub worst: Vec<GroupStat>,
    /// Lowest rates first.
    pub best: Vec<GroupStat>,
}

impl BranchRanking {
    pub fn is_empty(&self) -> bool {
        self.eligible.is_empty()
    }

    pub fn worst_branches(&self) -> Vec<String> {
        self.worst.iter().map(|g| g.label().to_string()).collect()
    }
}

/// Records of `view` that belong to real branches.
pub fn without_excluded<'a>(view: &[&'a Record], exclusions: &BranchExclusions) -> Vec<&'a Record> {
    view.iter()
        .copied()
        .filter(|r| !exclusions.is_excluded(&r.branch))
        .collect()
}

/// Branch aggregates of one cohort after exclusion, sample guard applied.
pub fn eligible_branches(view: &[&Record], cohort: &str, params: &RankingParams) -> Vec<GroupStat> {
    let cohort_view = without_excluded(&in_cohort(view, cohort), params.exclusions);
    aggregate(cohort_view, &[Dimension::Branch])
        .into_iter()
        .filter(|g| g.count >= params.min_sample)
        .collect()
}

pub fn rank_branches(view: &[&Record], cohort: &str, params: &RankingParams) -> BranchRanking {
    let eligible = eligible_branches(view, cohort, params);

    let mut worst = eligible.clone();
    worst.sort_by(|a, b| b.mean.total_cmp(&a.mean));
    worst.truncate(params.top_n);

    let mut best = eligible.clone();
    best.sort_by(|a, b| a.mean.total_cmp(&b.mean));
    best.truncate(params.top_n);

    log::debug!(
        "Ranked {} eligible branches for cohort {cohort} (min_sample {})",
        eligible.len(),
        params.min_sample
    );
    BranchRanking { cohort: cohort.to_string(), eligible, worst, best }
}

// ── Cross-tabulation ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MatrixCell {
    Data { default_count: u64, total_count: u64, rate: f64 },
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixRow {
    pub branch: String,
    /// Aligned with `RiskMatrix::products`.
    pub cells: Vec<MatrixCell>,
}

/// Branch × product breakdown of the worst-ranked branches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMatrix {
    pub cohort: CohortKey,
    pub products: Vec<String>,
    /// In ranking order.
    pub rows: Vec<MatrixRow>,
}

impl RiskMatrix {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, branch: &str, product: &str) -> Option<&MatrixCell> {
        let col = self.products.iter().position(|p| p == product)?;
        self.rows.iter().find(|r| r.branch == branch)?.cells.get(col)
    }
}

pub fn risk_matrix(
    view: &[&Record],
    cohort: &str,
    branches: &[String],
    exclusions: &BranchExclusions,
) -> RiskMatrix {
    let wanted: BTreeSet<&str> = branches.iter().map(String::as_str).collect();
    let subset: Vec<&Record> = without_excluded(&in_cohort(view, cohort), exclusions)
        .into_iter()
        .filter(|r| wanted.contains(r.branch.as_str()))
        .collect();

    let stats = aggregate(subset, &[Dimension::Branch, Dimension::Product]);
    let products: Vec<String> = stats
        .iter()
        .map(|g| g.key[1].clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let by_cell: HashMap<(&str, &str), &GroupStat> = stats
        .iter()
        .map(|g| ((g.key[0].as_str(), g.key[1].as_str()), g))
        .collect();

    let rows = branches
        .iter()
        .filter(|b| stats.iter().any(|g| &g.key[0] == *b))
        .map(|branch| MatrixRow {
            branch: branch.clone(),
            cells: products
                .iter()
                .map(|product| match by_cell.get(&(branch.as_str(), product.as_str())) {
                    Some(g) => MatrixCell::Data {
                        default_count: g.sum,
                        total_count: g.count,
                        rate: g.mean,
                    },
                    None => MatrixCell::NoData,
                })
                .collect(),
        })
        .collect();

    RiskMatrix { cohort: cohort.to_string(), products, rows }
}
