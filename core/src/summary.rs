//! Executive summary: period-over-period highlights on the full record set.
//!
//! This module:
//!   1. Picks the best and worst region of the previous cohort
//!   2. Picks the best and worst product, with a sample guard
//!   3. Compares branches between the previous and current cohorts
//!   4. Builds the region × cohort heatmap of recent mature cohorts
//!
//! Regions matching `region_exclusions` are payroll buckets and never
//! appear in regional outputs.

use crate::{
    aggregate::{aggregate, find, overall, GroupStat},
    config::BranchExclusions,
    filter::{in_cohort, in_cohorts},
    ranking::without_excluded,
    record::{Dimension, Record},
    types::CohortKey,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

fn matches_any(value: &str, tokens: &[String]) -> bool {
    let value = value.to_lowercase();
    tokens.iter().any(|t| value.contains(&t.to_lowercase()))
}

fn without_regions<'a>(view: &[&'a Record], exclusions: &[String]) -> Vec<&'a Record> {
    view.iter().copied().filter(|r| !matches_any(&r.region, exclusions)).collect()
}

// ── Regions ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extremes {
    pub cohort: CohortKey,
    pub best: GroupStat,
    pub worst: GroupStat,
}

/// Lowest and highest rate region. Ties go to the first region by name.
pub fn regional_extremes(view: &[&Record], cohort: &str, exclusions: &[String]) -> Option<Extremes> {
    let stats = aggregate(without_regions(&in_cohort(view, cohort), exclusions), &[Dimension::Region]);
    let best = stats.iter().reduce(|acc, g| if g.mean < acc.mean { g } else { acc })?;
    let worst = stats.iter().reduce(|acc, g| if g.mean > acc.mean { g } else { acc })?;
    Some(Extremes { cohort: cohort.to_string(), best: best.clone(), worst: worst.clone() })
}

// ── Products ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRow {
    pub product: String,
    pub total: u64,
    pub defaults: u64,
    pub rate: f64,
    pub above_average: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub cohort: CohortKey,
    /// Rate of the whole cohort, all products included.
    pub average_rate: f64,
    pub best: ProductRow,
    pub worst: ProductRow,
    /// Eligible products, highest rate first.
    pub table: Vec<ProductRow>,
}

pub fn product_summary(view: &[&Record], cohort: &str, min_sample: u64) -> Option<ProductSummary> {
    let cohort_view = in_cohort(view, cohort);
    let average_rate = overall(cohort_view.iter().copied())?.mean;
    let rows: Vec<ProductRow> = aggregate(cohort_view, &[Dimension::Product])
        .into_iter()
        .filter(|g| g.count >= min_sample)
        .map(|g| ProductRow {
            product: g.label().to_string(),
            total: g.count,
            defaults: g.sum,
            rate: g.mean,
            above_average: g.mean > average_rate,
        })
        .collect();

    // Lower rate wins; equal rates favour the larger product.
    let best = rows
        .iter()
        .min_by(|a, b| a.rate.total_cmp(&b.rate).then(b.total.cmp(&a.total)))?
        .clone();
    let worst = rows
        .iter()
        .min_by(|a, b| b.rate.total_cmp(&a.rate).then(b.total.cmp(&a.total)))?
        .clone();

    let mut table = rows;
    table.sort_by(|a, b| b.rate.total_cmp(&a.rate));
    Some(ProductSummary { cohort: cohort.to_string(), average_rate, best, worst, table })
}

// ── Branch comparison ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchMovement {
    pub branch: String,
    pub previous_rate: f64,
    pub current_rate: f64,
    pub current_count: u64,
}

impl BranchMovement {
    pub fn delta(&self) -> f64 {
        self.current_rate - self.previous_rate
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchComparison {
    pub previous_cohort: CohortKey,
    pub current_cohort: CohortKey,
    /// Lowest current rate.
    pub best: BranchMovement,
    /// Highest current rate.
    pub worst: BranchMovement,
}

/// Branches with `min_sample` records in the current cohort and at least
/// one in the previous.
pub fn branch_comparison(
    view: &[&Record],
    previous: &str,
    current: &str,
    min_sample: u64,
    exclusions: &BranchExclusions,
) -> Option<BranchComparison> {
    let pair = [previous.to_string(), current.to_string()];
    let stats = aggregate(
        without_excluded(&in_cohorts(view, &pair), exclusions),
        &[Dimension::Branch, Dimension::Cohort],
    );
    let branches: BTreeSet<&str> = stats.iter().map(|g| g.key[0].as_str()).collect();

    let movements: Vec<BranchMovement> = branches
        .into_iter()
        .filter_map(|branch| {
            let cur = find(&stats, &[branch, current])?;
            let prev = find(&stats, &[branch, previous])?;
            (cur.count >= min_sample && prev.count > 0).then(|| BranchMovement {
                branch: branch.to_string(),
                previous_rate: prev.mean,
                current_rate: cur.mean,
                current_count: cur.count,
            })
        })
        .collect();

    let best = movements.iter().reduce(|acc, m| if m.current_rate < acc.current_rate { m } else { acc })?;
    let worst = movements.iter().reduce(|acc, m| if m.current_rate > acc.current_rate { m } else { acc })?;
    Some(BranchComparison {
        previous_cohort: previous.to_string(),
        current_cohort: current.to_string(),
        best: best.clone(),
        worst: worst.clone(),
    })
}

// ── Heatmap ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapRow {
    pub region: String,
    /// Aligned with `RegionalHeatmap::cohorts`; `None` where the region had no loans.
    pub rates: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalHeatmap {
    pub cohorts: Vec<CohortKey>,
    pub rows: Vec<HeatmapRow>,
}

/// Region × cohort grid over the last `span` mature cohorts. `None`
/// when fewer than `span` mature cohorts exist.
pub fn regional_heatmap(
    view: &[&Record],
    mature: &[CohortKey],
    span: usize,
    exclusions: &[String],
) -> Option<RegionalHeatmap> {
    if span == 0 || mature.len() < span {
        return None;
    }
    let cohorts = mature[mature.len() - span..].to_vec();
    let stats = aggregate(
        without_regions(&in_cohorts(view, &cohorts), exclusions),
        &[Dimension::Region, Dimension::Cohort],
    );
    let regions: BTreeSet<&str> = stats.iter().map(|g| g.key[0].as_str()).collect();
    let rows = regions
        .into_iter()
        .map(|region| HeatmapRow {
            region: region.to_string(),
            rates: cohorts
                .iter()
                .map(|c| find(&stats, &[region, c.as_str()]).map(|g| g.mean))
                .collect(),
        })
        .collect();
    Some(RegionalHeatmap { cohorts, rows })
}
