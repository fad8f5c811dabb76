//! Filter composition and grouped default rates.

mod common;

use common::{cohort_range, loan, synthetic_records, view};
use fpd_core::{
    aggregate::{aggregate, find, overall},
    filter::FilterSelection,
    record::{Dimension, Record},
};

fn sample() -> Vec<Record> {
    vec![
        loan("202501", "Centro").region("Norte").product("Auto").defaulted().build(),
        loan("202501", "Centro").region("Norte").product("Personal").build(),
        loan("202501", "Sur").region("Sur").product("Auto").client_type("Nuevo").build(),
        loan("202502", "Sur").region("Sur").product("Auto").defaulted().build(),
        loan("202502", "Valle").region("Norte").product("Nomina").build(),
    ]
}

#[test]
fn empty_selection_is_unfiltered() {
    let records = sample();
    let selection = FilterSelection::default();
    assert!(selection.is_unfiltered());
    assert_eq!(selection.apply(&records).len(), records.len());
}

#[test]
fn dimensions_compose_by_conjunction() {
    let records = sample();
    let selection = FilterSelection::default()
        .with_regions(["Norte"])
        .with_products(["Auto", "Nomina"]);
    let out = selection.apply(&records);
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|r| r.region == "Norte"));
    assert!(out.iter().all(|r| r.product == "Auto" || r.product == "Nomina"));
}

#[test]
fn no_match_is_an_empty_view() {
    let records = sample();
    let selection = FilterSelection::default()
        .with_branches(["Centro"])
        .with_client_types(["Nuevo"]);
    assert!(selection.apply(&records).is_empty());
}

#[test]
fn grouped_rates() {
    let records = sample();
    let stats = aggregate(view(&records), &[Dimension::Branch]);
    let labels: Vec<&str> = stats.iter().map(|g| g.label()).collect();
    assert_eq!(labels, vec!["Centro", "Sur", "Valle"]);

    let centro = find(&stats, &["Centro"]).unwrap();
    assert_eq!((centro.count, centro.sum), (2, 1));
    assert!((centro.mean - 0.5).abs() < 1e-12);

    let by_pair = aggregate(view(&records), &[Dimension::Region, Dimension::Cohort]);
    let sur_feb = find(&by_pair, &["Sur", "202502"]).unwrap();
    assert_eq!((sur_feb.count, sur_feb.sum), (1, 1));
}

#[test]
fn empty_input_yields_no_groups() {
    let none: Vec<&Record> = Vec::new();
    assert!(aggregate(none.iter().copied(), &[Dimension::Branch]).is_empty());
    assert!(overall(none.iter().copied()).is_none());
}

#[test]
fn rates_are_well_formed_for_random_inputs() {
    let cohorts = cohort_range(2024, 1, 12);
    for seed in 0..25u64 {
        let records = synthetic_records(seed, 400, &cohorts);
        for dims in [
            vec![Dimension::Branch],
            vec![Dimension::Branch, Dimension::Product],
            vec![Dimension::Region, Dimension::Cohort],
            vec![Dimension::CohortMonth, Dimension::CohortYear],
        ] {
            let stats = aggregate(&records, &dims);
            let total: u64 = stats.iter().map(|g| g.count).sum();
            assert_eq!(total, records.len() as u64, "seed {seed}: groups must partition input");
            for g in &stats {
                assert!(g.count > 0, "seed {seed}: empty group emitted");
                assert!((0.0..=1.0).contains(&g.mean), "seed {seed}: rate out of range");
                assert!((g.mean - g.sum as f64 / g.count as f64).abs() < 1e-12);
                assert_eq!(g.key.len(), dims.len());
            }
        }
    }
}
