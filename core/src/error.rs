use crate::resolver::CanonicalField;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FpdError {
    #[error("No source extract found; looked for: {candidates:?}")]
    SourceNotFound { candidates: Vec<PathBuf> },

    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Delimited text error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Source {path} has no header row")]
    EmptySource { path: PathBuf },

    #[error("Missing key column '{field}'. Found: {headers:?}")]
    MissingColumn {
        field: CanonicalField,
        headers: Vec<String>,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FpdError {
    /// Constructor for I/O failures tied to a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FpdError::Io { path: path.into(), source }
    }
}

pub type FpdResult<T> = Result<T, FpdError>;
