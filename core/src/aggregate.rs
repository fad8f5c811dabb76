//! Risk aggregation: grouped count / sum / mean of the default flag.
//!
//! Groups come out in ascending key order. A group exists only when it
//! has at least one record, so `mean` is always `sum / count`.

use crate::record::{Dimension, Record};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStat {
    /// One value per grouping dimension, in the order requested.
    pub key: Vec<String>,
    pub count: u64,
    /// Default records in the group.
    pub sum: u64,
    /// Default rate.
    pub mean: f64,
    pub nonpayment_sum: u64,
}

impl GroupStat {
    pub fn nonpayment_rate(&self) -> f64 {
        ratio(self.nonpayment_sum, self.count)
    }

    /// First key component; convenient for single-dimension groupings.
    pub fn label(&self) -> &str {
        self.key.first().map(String::as_str).unwrap_or_default()
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    count: u64,
    defaults: u64,
    nonpayments: u64,
}

impl Tally {
    fn add(&mut self, record: &Record) {
        self.count += 1;
        self.defaults += u64::from(record.is_default);
        self.nonpayments += u64::from(record.is_nonpayment);
    }
}

pub(crate) fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// Group `records` by `dims` and tally the default flag.
pub fn aggregate<'a, I>(records: I, dims: &[Dimension]) -> Vec<GroupStat>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut groups: BTreeMap<Vec<String>, Tally> = BTreeMap::new();
    for record in records {
        let key = dims.iter().map(|d| record.dimension(*d)).collect();
        groups.entry(key).or_default().add(record);
    }
    groups
        .into_iter()
        .map(|(key, t)| GroupStat {
            key,
            count: t.count,
            sum: t.defaults,
            mean: ratio(t.defaults, t.count),
            nonpayment_sum: t.nonpayments,
        })
        .collect()
}

/// Whole-set tally, `None` for an empty input.
pub fn overall<'a, I>(records: I) -> Option<GroupStat>
where
    I: IntoIterator<Item = &'a Record>,
{
    aggregate(records, &[]).into_iter().next()
}

/// Look up one group by its full key.
pub fn find<'s>(stats: &'s [GroupStat], key: &[&str]) -> Option<&'s GroupStat> {
    stats
        .iter()
        .find(|s| s.key.len() == key.len() && s.key.iter().zip(key).all(|(a, b)| a == b))
}
