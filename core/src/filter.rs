//! Filter context: externally supplied set-membership predicates.
//!
//! An empty set leaves its dimension unfiltered. Dimensions compose by
//! conjunction. An empty view is a normal outcome.

use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSelection {
    pub branches: BTreeSet<String>,
    pub regions: BTreeSet<String>,
    pub products: BTreeSet<String>,
    pub client_types: BTreeSet<String>,
}

impl FilterSelection {
    pub fn is_unfiltered(&self) -> bool {
        self.branches.is_empty()
            && self.regions.is_empty()
            && self.products.is_empty()
            && self.client_types.is_empty()
    }

    pub fn with_branches<I: IntoIterator<Item = S>, S: Into<String>>(mut self, values: I) -> Self {
        self.branches = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_regions<I: IntoIterator<Item = S>, S: Into<String>>(mut self, values: I) -> Self {
        self.regions = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_products<I: IntoIterator<Item = S>, S: Into<String>>(mut self, values: I) -> Self {
        self.products = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_client_types<I: IntoIterator<Item = S>, S: Into<String>>(mut self, values: I) -> Self {
        self.client_types = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn accepts(&self, record: &Record) -> bool {
        allows(&self.branches, &record.branch)
            && allows(&self.regions, &record.region)
            && allows(&self.products, &record.product)
            && allows(&self.client_types, &record.client_type)
    }

    /// The records that pass every active predicate, in source order.
    pub fn apply<'a>(&self, records: &'a [Record]) -> Vec<&'a Record> {
        let view: Vec<&Record> = records.iter().filter(|r| self.accepts(r)).collect();
        if view.is_empty() && !records.is_empty() {
            log::warn!("Filter selection matched no records");
        }
        view
    }
}

fn allows(set: &BTreeSet<String>, value: &str) -> bool {
    set.is_empty() || set.contains(value)
}

/// Records of one cohort, keeping view order.
pub fn in_cohort<'a>(view: &[&'a Record], cohort: &str) -> Vec<&'a Record> {
    view.iter().copied().filter(|r| r.cohort_key == cohort).collect()
}

/// Records whose cohort is one of `cohorts`.
pub fn in_cohorts<'a>(view: &[&'a Record], cohorts: &[String]) -> Vec<&'a Record> {
    let set: BTreeSet<&str> = cohorts.iter().map(String::as_str).collect();
    view.iter().copied().filter(|r| set.contains(r.cohort_key.as_str())).collect()
}
