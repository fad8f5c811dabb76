//! Cohort clock: maturity split, window, adjacent periods.

mod common;

use common::cohort_range;
use fpd_core::{clock::CohortClock, types::SENTINEL_COHORT};

#[test]
fn ten_cohorts_with_lag_two() {
    let clock = CohortClock::new(cohort_range(2025, 1, 10), 2, 24);

    assert_eq!(clock.mature_cohorts(), cohort_range(2025, 1, 8).as_slice());
    assert_eq!(clock.pending_cohorts(), &["202509".to_string(), "202510".to_string()]);
    assert_eq!(clock.current_cohort(), Some("202508"));
    assert_eq!(clock.previous_cohort(), Some("202507"));
    assert_eq!(clock.next_cohort(), Some("202509"));
    assert_eq!(clock.adjacent_pair(), Some(("202507", "202508")));
}

#[test]
fn window_keeps_most_recent_mature_cohorts() {
    let clock = CohortClock::new(cohort_range(2022, 1, 40), 1, 24);
    let window = clock.visualization_window();
    assert_eq!(window.len(), 24);
    assert_eq!(window.last().map(String::as_str), clock.current_cohort());
    assert_eq!(window.first().map(String::as_str), Some("202304"));
}

#[test]
fn too_few_cohorts_are_all_mature() {
    let clock = CohortClock::new(vec!["202501", "202502"], 2, 24);
    assert_eq!(clock.mature_cohorts().len(), 2);
    assert_eq!(clock.current_cohort(), Some("202502"));
    assert_eq!(clock.next_cohort(), None);

    let single = CohortClock::new(vec!["202501"], 1, 24);
    assert_eq!(single.current_cohort(), Some("202501"));
    assert_eq!(single.previous_cohort(), None);
    assert_eq!(single.adjacent_pair(), None);
}

#[test]
fn empty_clock_has_no_current() {
    let clock = CohortClock::new(Vec::<String>::new(), 1, 24);
    assert!(clock.mature_cohorts().is_empty());
    assert!(clock.visualization_window().is_empty());
    assert_eq!(clock.current_cohort(), None);
    assert_eq!(clock.next_cohort(), None);
}

#[test]
fn zero_lag_makes_everything_mature() {
    let clock = CohortClock::new(cohort_range(2025, 1, 4), 0, 24);
    assert_eq!(clock.mature_cohorts().len(), 4);
    assert!(clock.pending_cohorts().is_empty());
    assert_eq!(clock.next_cohort(), None);
}

#[test]
fn sentinel_and_duplicates_are_ignored() {
    let clock = CohortClock::new(
        vec![SENTINEL_COHORT, "202503", "202501", "202503", "202502"],
        1,
        24,
    );
    assert_eq!(clock.all_cohorts, vec!["202501", "202502", "202503"]);
    assert_eq!(clock.current_cohort(), Some("202502"));
}

#[test]
fn lexicographic_order_is_chronological() {
    let keys = cohort_range(2019, 7, 90);
    let mut shuffled = keys.clone();
    shuffled.reverse();
    shuffled.sort();
    assert_eq!(shuffled, keys);
    assert!("202501" < "202510" && "202510" < "202512");
}

#[test]
fn snapshot_matches_accessors() {
    let clock = CohortClock::new(cohort_range(2024, 6, 12), 2, 6);
    let snap = clock.snapshot();
    assert_eq!(snap.mature_cohorts, clock.mature_cohorts());
    assert_eq!(snap.visualization_window.len(), 6);
    assert_eq!(snap.current_cohort.as_deref(), clock.current_cohort());
    assert_eq!(snap.next_cohort.as_deref(), clock.next_cohort());
}
