//! Record normalization from raw tables.

mod common;

use common::table;
use fpd_core::{
    config::MonitorConfig,
    store::Dataset,
    types::{NO_DATA, SENTINEL_COHORT},
};

fn dataset(headers: &[&str], rows: &[&[&str]]) -> Dataset {
    Dataset::from_table(table(headers, rows), &MonitorConfig::default()).unwrap()
}

#[test]
fn full_row_normalizes_every_field() {
    let ds = dataset(
        &["Cosecha", "ID_CREDITO", "Sucursal", "Unidad_Regional", "Producto_Agrupado",
          "ORIGEN2", "Tipo_Cliente", "Monto_Otorgado", "FPD2", "NP"],
        &[&["202503.0", "C-1", "Centro", "Norte", "Personal", "FISICO", "Nuevo", "5500.5", "fpd2", "np"]],
    );
    let r = &ds.records[0];
    assert_eq!(r.cohort_key, "202503");
    assert!(r.is_default);
    assert!(r.is_nonpayment);
    assert_eq!(r.amount, 5500.5);
    assert_eq!(r.branch, "Centro");
    assert_eq!(r.region, "Norte");
    assert_eq!(r.product, "Personal");
    assert_eq!(r.origin_channel, "Fisico");
    assert_eq!(r.client_type, "Nuevo");
    assert_eq!(r.identity.credit_id.as_deref(), Some("C-1"));
    assert_eq!(r.identity.origin_channel_code.as_deref(), Some("FISICO"));
    assert_eq!(r.identity.default_flag_raw.as_deref(), Some("fpd2"));
}

#[test]
fn missing_columns_and_nulls_use_sentinel() {
    let ds = dataset(
        &["cosecha", "fpd", "sucursal"],
        &[&["202501", "", ""], &["bad-date", "FPD", "Sur"]],
    );
    let first = &ds.records[0];
    assert_eq!(first.branch, NO_DATA);
    assert_eq!(first.region, NO_DATA);
    assert_eq!(first.origin_channel, NO_DATA);
    assert!(!first.is_default);
    assert!(!first.is_nonpayment);
    assert_eq!(first.amount, 0.0);

    let second = &ds.records[1];
    assert_eq!(second.cohort_key, SENTINEL_COHORT);
    assert!(second.is_default);
    assert_eq!(second.branch, "Sur");
}

#[test]
fn digit_one_is_not_a_default_marker() {
    let ds = dataset(&["cosecha", "fpd"], &[&["202501", "1"], &["202501", "Con FPD"]]);
    assert!(!ds.records[0].is_default);
    assert!(ds.records[1].is_default);
}

#[test]
fn negative_amounts_pass_through() {
    let ds = dataset(
        &["cosecha", "fpd", "monto"],
        &[&["202501", "", "-250"], &["202501", "", "abc"]],
    );
    assert_eq!(ds.records[0].amount, -250.0);
    assert_eq!(ds.records[1].amount, 0.0);
}

#[test]
fn free_text_dates_reduce_to_year_month() {
    let ds = dataset(
        &["cosecha", "fpd"],
        &[&["2024-11-30", ""], &["15/03/2025", ""], &["2025-07", ""]],
    );
    let keys: Vec<&str> = ds.records.iter().map(|r| r.cohort_key.as_str()).collect();
    assert_eq!(keys, vec!["202411", "202503", "202507"]);
}

#[test]
fn normalization_is_deterministic() {
    let headers = ["cosecha", "fpd2", "sucursal", "monto_otorgado", "origen"];
    let rows: Vec<Vec<String>> = (0..50)
        .map(|i| {
            vec![
                format!("2025{:02}", i % 12 + 1),
                if i % 3 == 0 { "FPD2".into() } else { String::new() },
                format!("Sucursal {}", i % 7),
                format!("{}", i * 250),
                "digital".into(),
            ]
        })
        .collect();
    let row_refs: Vec<Vec<&str>> = rows.iter().map(|r| r.iter().map(String::as_str).collect()).collect();
    let slices: Vec<&[&str]> = row_refs.iter().map(Vec::as_slice).collect();

    let a = dataset(&headers, &slices);
    let b = dataset(&headers, &slices);
    assert_eq!(a.records, b.records);
    assert!(a.records.iter().all(|r| r.origin_channel == "Digital"));
}

#[test]
fn cohort_listing_is_sorted_with_sentinel_first() {
    let ds = dataset(
        &["cosecha", "fpd"],
        &[&["202512", ""], &["xx", ""], &["202501", ""], &["202510", ""]],
    );
    assert_eq!(ds.cohorts(), vec![SENTINEL_COHORT, "202501", "202510", "202512"]);
}
