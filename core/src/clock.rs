//! Cohort clock: owns the ordered reporting periods and their
//! mature/pending split.
//!
//! Every quantity here is a pure function of the cohort list and the
//! two integer parameters. The sentinel cohort never takes part.

use crate::types::{is_valid_cohort, CohortKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CohortClock {
    pub all_cohorts: Vec<CohortKey>,
    pub maturity_lag: usize,
    pub window_size: usize,
}

impl CohortClock {
    /// Accepts any cohort list; it is de-duplicated, sorted and stripped
    /// of the sentinel.
    pub fn new<I, S>(cohorts: I, maturity_lag: usize, window_size: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CohortKey>,
    {
        let mut all_cohorts: Vec<CohortKey> = cohorts
            .into_iter()
            .map(Into::into)
            .filter(|c| is_valid_cohort(c))
            .collect();
        all_cohorts.sort();
        all_cohorts.dedup();
        Self { all_cohorts, maturity_lag, window_size }
    }

    /// All but the most recent `maturity_lag` cohorts. When there are not
    /// enough cohorts to hold any back, everything counts as mature.
    pub fn mature_cohorts(&self) -> &[CohortKey] {
        let n = self.all_cohorts.len();
        if self.maturity_lag == 0 || n <= self.maturity_lag {
            &self.all_cohorts
        } else {
            &self.all_cohorts[..n - self.maturity_lag]
        }
    }

    pub fn pending_cohorts(&self) -> &[CohortKey] {
        &self.all_cohorts[self.mature_cohorts().len()..]
    }

    pub fn is_mature(&self, cohort: &str) -> bool {
        self.mature_cohorts().iter().any(|c| c == cohort)
    }

    /// The most recent `window_size` mature cohorts.
    pub fn visualization_window(&self) -> &[CohortKey] {
        let mature = self.mature_cohorts();
        &mature[mature.len().saturating_sub(self.window_size)..]
    }

    /// The last `n` mature cohorts.
    pub fn last_mature(&self, n: usize) -> &[CohortKey] {
        let mature = self.mature_cohorts();
        &mature[mature.len().saturating_sub(n)..]
    }

    pub fn current_cohort(&self) -> Option<&str> {
        self.mature_cohorts().last().map(String::as_str)
    }

    pub fn previous_cohort(&self) -> Option<&str> {
        let mature = self.mature_cohorts();
        mature.len().checked_sub(2).map(|i| mature[i].as_str())
    }

    /// The cohort right after `current_cohort`, i.e. the first pending one.
    pub fn next_cohort(&self) -> Option<&str> {
        let current = self.current_cohort()?;
        let pos = self.all_cohorts.iter().position(|c| c == current)?;
        self.all_cohorts.get(pos + 1).map(String::as_str)
    }

    /// `(previous, current)` when both exist.
    pub fn adjacent_pair(&self) -> Option<(&str, &str)> {
        Some((self.previous_cohort()?, self.current_cohort()?))
    }

    pub fn snapshot(&self) -> ClockSnapshot {
        ClockSnapshot {
            all_cohorts: self.all_cohorts.clone(),
            mature_cohorts: self.mature_cohorts().to_vec(),
            pending_cohorts: self.pending_cohorts().to_vec(),
            visualization_window: self.visualization_window().to_vec(),
            current_cohort: self.current_cohort().map(str::to_string),
            previous_cohort: self.previous_cohort().map(str::to_string),
            next_cohort: self.next_cohort().map(str::to_string),
        }
    }
}

/// Owned, serializable view of every derived clock quantity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClockSnapshot {
    pub all_cohorts: Vec<CohortKey>,
    pub mature_cohorts: Vec<CohortKey>,
    pub pending_cohorts: Vec<CohortKey>,
    pub visualization_window: Vec<CohortKey>,
    pub current_cohort: Option<CohortKey>,
    pub previous_cohort: Option<CohortKey>,
    pub next_cohort: Option<CohortKey>,
}
