//! Amount-range risk profile.
//!
//! Bins are `[edge_i, edge_i+1)`; the last one is open-ended. Empty bins
//! report `count = 0` and `rate = 0.0`.

use crate::{aggregate::ratio, filter::in_cohort, record::Record, types::CohortKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountBin {
    pub label: String,
    pub lower: f64,
    /// `None` for the open-ended last bin.
    pub upper: Option<f64>,
    pub count: u64,
    pub defaults: u64,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountProfile {
    pub cohort: CohortKey,
    pub bins: Vec<AmountBin>,
    /// Records below the first edge (negative amounts with the default edges).
    pub out_of_range: u64,
}

impl AmountProfile {
    pub fn total_binned(&self) -> u64 {
        self.bins.iter().map(|b| b.count).sum()
    }
}

/// Index of the bin holding `amount`, `None` below the first edge.
pub fn bin_index(edges: &[f64], amount: f64) -> Option<usize> {
    match edges.first() {
        Some(&lo) if amount >= lo => {}
        _ => return None,
    }
    Some(edges.iter().rposition(|&e| amount >= e).unwrap_or(0))
}

pub fn amount_profile(view: &[&Record], cohort: &str, edges: &[f64]) -> AmountProfile {
    let mut counts = vec![(0u64, 0u64); edges.len()];
    let mut out_of_range = 0;
    for record in in_cohort(view, cohort) {
        match bin_index(edges, record.amount) {
            Some(i) => {
                counts[i].0 += 1;
                counts[i].1 += u64::from(record.is_default);
            }
            None => out_of_range += 1,
        }
    }
    if out_of_range > 0 {
        log::warn!("{out_of_range} records in cohort {cohort} fall below the first amount edge");
    }

    let bins = edges
        .iter()
        .enumerate()
        .map(|(i, &lower)| {
            let upper = edges.get(i + 1).copied();
            let (count, defaults) = counts[i];
            AmountBin {
                label: bin_label(lower, upper),
                lower,
                upper,
                count,
                defaults,
                rate: ratio(defaults, count),
            }
        })
        .collect();

    AmountProfile { cohort: cohort.to_string(), bins, out_of_range }
}

/// `0-3k`, `12k-20k`, `>20k`.
pub fn bin_label(lower: f64, upper: Option<f64>) -> String {
    match upper {
        Some(hi) => format!("{}-{}", short_amount(lower), short_amount(hi)),
        None => format!(">{}", short_amount(lower)),
    }
}

fn short_amount(v: f64) -> String {
    if v != 0.0 && v % 1000.0 == 0.0 {
        format!("{}k", v / 1000.0)
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert_eq!(bin_label(0.0, Some(3_000.0)), "0-3k");
        assert_eq!(bin_label(12_000.0, Some(20_000.0)), "12k-20k");
        assert_eq!(bin_label(20_000.0, None), ">20k");
        assert_eq!(bin_label(500.0, Some(1_500.0)), "500-1500");
    }

    #[test]
    fn edges_are_left_closed() {
        let edges = [0.0, 5_000.0, 10_000.0];
        assert_eq!(bin_index(&edges, 0.0), Some(0));
        assert_eq!(bin_index(&edges, 4_999.99), Some(0));
        assert_eq!(bin_index(&edges, 5_000.0), Some(1));
        assert_eq!(bin_index(&edges, 1e9), Some(2));
        assert_eq!(bin_index(&edges, -1.0), None);
    }
}
