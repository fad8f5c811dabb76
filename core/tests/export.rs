//! Early-warning export of defaulted loans.

mod common;

use common::{cohort_range, loan, synthetic_records, view};
use fpd_core::{
    clock::CohortClock,
    config::ExportTarget,
    export::{export_rows, export_summary, write_export_csv, EXPORT_COLUMNS},
    filter::FilterSelection,
    record::Record,
};

fn two_cohorts() -> Vec<Record> {
    let mut records = Vec::new();
    records.extend(loan("202507", "Centro").product("Auto").defaulted().credit_id("A1").times(1));
    records.extend(loan("202507", "Centro").product("Auto").times(3));
    records.extend(loan("202508", "Centro").product("Personal").defaulted().credit_id("B1").times(1));
    records.extend(loan("202508", "Sur").product("Auto").defaulted().credit_id("B2").times(1));
    records.extend(loan("202508", "Sur").product("Auto").times(2));
    records
}

#[test]
fn next_target_exports_the_first_pending_cohort() {
    let records = two_cohorts();
    let clock = CohortClock::new(["202507", "202508"], 1, 24);
    let (summary, rows) = export_summary(&view(&records), &clock, ExportTarget::Next);

    assert_eq!(summary.cohort.as_deref(), Some("202508"));
    assert_eq!(summary.exported, 2);
    assert_eq!((summary.cohort_defaults, summary.cohort_non_defaults), (2, 2));
    assert_eq!(summary.file_name.as_deref(), Some("FPD2_202508_export.csv"));
    let ids: Vec<&str> = rows.iter().filter_map(|r| r.credit_id.as_deref()).collect();
    assert_eq!(ids, vec!["B1", "B2"]);
}

#[test]
fn current_target_exports_the_last_mature_cohort() {
    let records = two_cohorts();
    let clock = CohortClock::new(["202507", "202508"], 1, 24);
    let (summary, rows) = export_summary(&view(&records), &clock, ExportTarget::Current);
    assert_eq!(summary.cohort.as_deref(), Some("202507"));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].product_agrupado, "Auto");
    assert_eq!(rows[0].default_flag_raw.as_deref(), Some("FPD2"));
}

#[test]
fn missing_target_gives_an_empty_export() {
    let records = two_cohorts();
    let clock = CohortClock::new(["202507", "202508"], 0, 24);
    let (summary, rows) = export_summary(&view(&records), &clock, ExportTarget::Next);
    assert_eq!(summary.cohort, None);
    assert_eq!(summary.file_name, None);
    assert!(rows.is_empty());
}

#[test]
fn exported_rows_respect_cohort_default_and_filters() {
    let cohorts = cohort_range(2024, 1, 8);
    for seed in 0..15u64 {
        let records = synthetic_records(seed, 500, &cohorts);
        let selection = FilterSelection::default().with_products(["Auto", "Nomina"]);
        let filtered = selection.apply(&records);
        let target = &cohorts[7];
        let rows = export_rows(&filtered, target);

        let expected = filtered
            .iter()
            .filter(|r| r.is_default && &r.cohort_key == target)
            .count();
        assert_eq!(rows.len(), expected, "seed {seed}");
        for row in &rows {
            assert_eq!(&row.cohort, target);
            assert!(row.default_flag_raw.is_some());
            assert!(row.product_agrupado == "Auto" || row.product_agrupado == "Nomina");
        }
    }
}

#[test]
fn csv_output_has_fixed_header() {
    let records = two_cohorts();
    let rows = export_rows(&view(&records), "202508");
    let mut buf = Vec::new();
    write_export_csv(&mut buf, &rows).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some(EXPORT_COLUMNS.join(",").as_str()));
    assert_eq!(lines.next(), Some("B1,,Personal,,202508,Centro,FPD2"));
    assert_eq!(lines.count(), 1);
}
