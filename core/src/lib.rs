//! fpd-core: first-payment-default risk monitor over a loan-origination extract.
//!
//! Pipeline: source → resolver → normalizer → store (cached) → clock →
//! filter → aggregate / ranking / pareto / binning → report.

pub mod aggregate;
pub mod binning;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod filter;
pub mod normalizer;
pub mod pareto;
pub mod ranking;
pub mod record;
pub mod resolver;
pub mod source;
pub mod store;
pub mod summary;
pub mod trends;
pub mod types;
