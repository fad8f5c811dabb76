//! Monitor-panel series over a (usually filtered) view.

use crate::{
    aggregate::{aggregate, GroupStat},
    filter::in_cohorts,
    record::{Dimension, Record},
    types::CohortKey,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Display labels for calendar months; index 0 is the sentinel.
pub const MONTH_LABELS: [&str; 13] = [
    "SinDato", "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub cohort: CohortKey,
    /// Series name; empty for single-series trends.
    pub series: String,
    pub count: u64,
    pub rate: f64,
}

impl TrendPoint {
    fn from_stat(g: &GroupStat) -> Self {
        Self {
            cohort: g.key[0].clone(),
            series: g.key.get(1).cloned().unwrap_or_default(),
            count: g.count,
            rate: g.mean,
        }
    }
}

/// Default rate per cohort of `window`.
pub fn global_trend(view: &[&Record], window: &[CohortKey]) -> Vec<TrendPoint> {
    aggregate(in_cohorts(view, window), &[Dimension::Cohort])
        .iter()
        .map(TrendPoint::from_stat)
        .collect()
}

/// Rate per (cohort, channel) for channels containing one of `channels`.
pub fn channel_trend(view: &[&Record], window: &[CohortKey], channels: &[String]) -> Vec<TrendPoint> {
    let tokens: Vec<String> = channels.iter().map(|c| c.to_lowercase()).collect();
    let subset: Vec<&Record> = in_cohorts(view, window)
        .into_iter()
        .filter(|r| {
            let ch = r.origin_channel.to_lowercase();
            tokens.iter().any(|t| ch.contains(t.as_str()))
        })
        .collect();
    aggregate(subset, &[Dimension::Cohort, Dimension::OriginChannel])
        .iter()
        .map(TrendPoint::from_stat)
        .collect()
}

/// Rate per (cohort, client type), client types matching an exclusion dropped.
pub fn client_type_evolution(
    view: &[&Record],
    window: &[CohortKey],
    exclusions: &[String],
) -> Vec<TrendPoint> {
    let tokens: Vec<String> = exclusions.iter().map(|c| c.to_lowercase()).collect();
    let subset: Vec<&Record> = in_cohorts(view, window)
        .into_iter()
        .filter(|r| {
            let ct = r.client_type.to_lowercase();
            !tokens.iter().any(|t| ct.contains(t.as_str()))
        })
        .collect();
    aggregate(subset, &[Dimension::Cohort, Dimension::ClientType])
        .iter()
        .map(TrendPoint::from_stat)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub cohort: CohortKey,
    pub count: u64,
    pub default_rate: f64,
    pub nonpayment_rate: f64,
}

/// Default and non-payment rates side by side per cohort of `window`.
pub fn indicator_history(view: &[&Record], window: &[CohortKey]) -> Vec<IndicatorPoint> {
    aggregate(in_cohorts(view, window), &[Dimension::Cohort])
        .into_iter()
        .map(|g| IndicatorPoint {
            nonpayment_rate: g.nonpayment_rate(),
            cohort: g.key[0].clone(),
            count: g.count,
            default_rate: g.mean,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearOverYearPoint {
    pub year: String,
    pub month: u32,
    pub month_label: String,
    pub count: u64,
    pub rate: f64,
}

/// Month-by-month comparison of the last `years` calendar years present
/// among `mature` cohorts. Ordered by month, then year.
pub fn year_over_year(view: &[&Record], mature: &[CohortKey], years: usize) -> Vec<YearOverYearPoint> {
    let present: BTreeSet<&str> = mature.iter().map(|c| &c[..4.min(c.len())]).collect();
    let keep: BTreeSet<&str> = present.iter().rev().take(years).copied().collect();
    let subset: Vec<&Record> = in_cohorts(view, mature)
        .into_iter()
        .filter(|r| keep.contains(r.cohort_year()))
        .collect();

    aggregate(subset, &[Dimension::CohortMonth, Dimension::CohortYear])
        .into_iter()
        .map(|g| {
            let month: u32 = g.key[0].parse().unwrap_or(0);
            YearOverYearPoint {
                year: g.key[1].clone(),
                month,
                month_label: MONTH_LABELS.get(month as usize).copied().unwrap_or("SinDato").to_string(),
                count: g.count,
                rate: g.mean,
            }
        })
        .collect()
}
