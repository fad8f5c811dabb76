//! Shared fixtures for the integration tests.
//!
//! RULE: Synthetic data is always seeded. Same seed, same extract.

#![allow(dead_code)]

use fpd_core::{
    record::{ExportIdentity, Record},
    source::RawTable,
    types::NO_DATA,
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use std::path::{Path, PathBuf};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Build a table from literal cells; `""` is a null cell.
pub fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
    RawTable::from_raw(
        headers.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|row| {
                row.iter()
                    .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
                    .collect()
            })
            .collect(),
    )
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write fixture");
    path
}

/// Fluent builder for one canonical record.
#[derive(Clone)]
pub struct RecordBuilder(Record);

pub fn loan(cohort: &str, branch: &str) -> RecordBuilder {
    RecordBuilder(Record {
        cohort_key: cohort.to_string(),
        is_default: false,
        is_nonpayment: false,
        amount: 1_000.0,
        branch: branch.to_string(),
        region: NO_DATA.to_string(),
        product: NO_DATA.to_string(),
        origin_channel: NO_DATA.to_string(),
        client_type: NO_DATA.to_string(),
        identity: ExportIdentity::default(),
    })
}

impl RecordBuilder {
    pub fn defaulted(mut self) -> Self {
        self.0.is_default = true;
        self.0.identity.default_flag_raw = Some("FPD2".into());
        self
    }
    pub fn defaulted_if(self, yes: bool) -> Self {
        if yes { self.defaulted() } else { self }
    }
    pub fn nonpayment(mut self) -> Self {
        self.0.is_nonpayment = true;
        self
    }
    pub fn amount(mut self, amount: f64) -> Self {
        self.0.amount = amount;
        self
    }
    pub fn region(mut self, v: &str) -> Self {
        self.0.region = v.into();
        self
    }
    pub fn product(mut self, v: &str) -> Self {
        self.0.product = v.into();
        self
    }
    pub fn channel(mut self, v: &str) -> Self {
        self.0.origin_channel = v.into();
        self
    }
    pub fn client_type(mut self, v: &str) -> Self {
        self.0.client_type = v.into();
        self
    }
    pub fn credit_id(mut self, v: &str) -> Self {
        self.0.identity.credit_id = Some(v.into());
        self
    }
    pub fn build(self) -> Record {
        self.0
    }
    /// `n` copies of this record.
    pub fn times(self, n: usize) -> Vec<Record> {
        vec![self.0; n]
    }
}

pub fn view(records: &[Record]) -> Vec<&Record> {
    records.iter().collect()
}

/// Consecutive `YYYYMM` keys starting at `(year, month)`.
pub fn cohort_range(year: i32, month: u32, n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let m0 = (month - 1) as usize + i;
            format!("{:04}{:02}", year + (m0 / 12) as i32, m0 % 12 + 1)
        })
        .collect()
}

pub const BRANCHES: [&str; 9] = [
    "Centro", "Norte", "Sur", "Oriente", "Poniente", "Puerto",
    "SUC 999 ADMIN", "Nomina Colaboradores", "Valle",
];
pub const REGIONS: [&str; 4] = ["Norte", "Sur", "Centro", "PR Nominas"];
pub const PRODUCTS: [&str; 3] = ["Nomina", "Personal", "Auto"];
pub const CHANNELS: [&str; 3] = ["Fisico", "Digital", "Telefono"];
pub const CLIENT_TYPES: [&str; 3] = ["Nuevo", "Recurrente", "Former"];

/// Seeded synthetic record set spread over `cohorts`.
pub fn synthetic_records(seed: u64, n: usize, cohorts: &[String]) -> Vec<Record> {
    let mut rng = Pcg64Mcg::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let branch = BRANCHES[rng.gen_range(0..BRANCHES.len())];
            // Skew default probability per branch so rankings are non-trivial.
            let p = 0.03 + 0.04 * (branch.len() % 5) as f64;
            let mut record = loan(&cohorts[rng.gen_range(0..cohorts.len())], branch)
                .defaulted_if(rng.gen_bool(p))
                .amount(rng.gen_range(-500.0..30_000.0))
                .region(REGIONS[rng.gen_range(0..REGIONS.len())])
                .product(PRODUCTS[rng.gen_range(0..PRODUCTS.len())])
                .channel(CHANNELS[rng.gen_range(0..CHANNELS.len())])
                .client_type(CLIENT_TYPES[rng.gen_range(0..CLIENT_TYPES.len())])
                .credit_id(&format!("CR-{i:06}"))
                .build();
            record.is_nonpayment = rng.gen_bool(0.1);
            record
        })
        .collect()
}

/// Render records as a delimited extract with source-style headers.
pub fn to_csv(records: &[Record]) -> String {
    let mut out = String::from("Cosecha,Id_Credito,Sucursal,Unidad_Regional,Producto_Agrupado,Origen2,Tipo_Cliente,Monto_Otorgado,FPD2,NP\n");
    for r in records {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            r.cohort_key,
            r.identity.credit_id.as_deref().unwrap_or(""),
            r.branch,
            r.region,
            r.product,
            r.origin_channel,
            r.client_type,
            r.amount,
            if r.is_default { "FPD2" } else { "" },
            if r.is_nonpayment { "NP" } else { "" },
        ));
    }
    out
}
