//! Canonical loan record: typed, cleaned, immutable after load.

use crate::types::{is_valid_cohort, CohortKey, SENTINEL_COHORT};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub cohort_key: CohortKey,
    pub is_default: bool,
    pub is_nonpayment: bool,
    pub amount: f64,
    pub branch: String,
    pub region: String,
    pub product: String,
    pub origin_channel: String,
    pub client_type: String,
    pub identity: ExportIdentity,
}

/// Raw passthrough values, used only by the export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportIdentity {
    pub credit_id: Option<String>,
    pub product_id: Option<String>,
    pub origin_channel_code: Option<String>,
    pub default_flag_raw: Option<String>,
}

impl Record {
    pub fn has_valid_cohort(&self) -> bool {
        is_valid_cohort(&self.cohort_key)
    }

    /// `YYYY` of the cohort, or the sentinel.
    pub fn cohort_year(&self) -> &str {
        if self.has_valid_cohort() { &self.cohort_key[..4] } else { SENTINEL_COHORT }
    }

    /// Month number 1..=12, or 0 for the sentinel cohort.
    pub fn cohort_month(&self) -> u32 {
        if self.has_valid_cohort() {
            self.cohort_key[4..6].parse().unwrap_or(0)
        } else {
            0
        }
    }

    pub fn dimension(&self, dim: Dimension) -> String {
        match dim {
            Dimension::Cohort        => self.cohort_key.clone(),
            Dimension::CohortYear    => self.cohort_year().to_string(),
            Dimension::CohortMonth   => format!("{:02}", self.cohort_month()),
            Dimension::Branch        => self.branch.clone(),
            Dimension::Region        => self.region.clone(),
            Dimension::Product       => self.product.clone(),
            Dimension::OriginChannel => self.origin_channel.clone(),
            Dimension::ClientType    => self.client_type.clone(),
        }
    }
}

/// A grouping axis over records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Cohort,
    CohortYear,
    /// Zero-padded month, so keys sort in calendar order.
    CohortMonth,
    Branch,
    Region,
    Product,
    OriginChannel,
    ClientType,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Dimension::Cohort        => "cohort",
            Dimension::CohortYear    => "cohort_year",
            Dimension::CohortMonth   => "cohort_month",
            Dimension::Branch        => "branch",
            Dimension::Region        => "region",
            Dimension::Product       => "product",
            Dimension::OriginChannel => "origin_channel",
            Dimension::ClientType    => "client_type",
        };
        f.write_str(s)
    }
}
