//! Source extract reading.
//!
//! RULE: Only source.rs touches the extract file.
//! Everything downstream sees a `RawTable`: normalized, de-duplicated
//! headers plus one row of optional cell text per source record.

use crate::{
    config::TextEncoding,
    error::{FpdError, FpdResult},
};
use calamine::{open_workbook_auto, Data, DataType, Reader};
use serde::Serialize;
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    time::SystemTime,
};

/// One source record. Cells align with `RawTable::headers`; `None` is null.
pub type RawRow = Vec<Option<String>>;

#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Lower-cased, trimmed, first-occurrence-wins header names.
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Build a table from raw header text and rows, normalizing headers and
    /// dropping the columns of later duplicates.
    pub fn from_raw(raw_headers: Vec<String>, raw_rows: Vec<RawRow>) -> Self {
        let (headers, keep) = normalize_headers(&raw_headers);
        let rows = raw_rows
            .into_iter()
            .map(|row| {
                keep.iter()
                    .map(|&idx| row.get(idx).cloned().flatten())
                    .collect()
            })
            .collect();
        Self { headers, rows }
    }

    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }
}

/// Returns the normalized headers and the source column indices kept.
pub fn normalize_headers(raw: &[String]) -> (Vec<String>, Vec<usize>) {
    let mut seen = HashSet::new();
    let mut headers = Vec::new();
    let mut keep = Vec::new();
    for (idx, header) in raw.iter().enumerate() {
        let normalized = header.trim().to_lowercase();
        if seen.insert(normalized.clone()) {
            headers.push(normalized);
            keep.push(idx);
        } else {
            log::debug!("Dropping duplicate column '{normalized}' at position {idx}");
        }
    }
    (headers, keep)
}

/// Identity of a source file: path plus modification signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourceIdentity {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl SourceIdentity {
    pub fn probe(path: &Path) -> FpdResult<Self> {
        let meta = std::fs::metadata(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FpdError::SourceNotFound { candidates: vec![path.to_path_buf()] }
            } else {
                FpdError::io(path, e)
            }
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

/// First candidate under `dir` that exists, in list order.
pub fn locate_source(dir: &Path, candidates: &[String]) -> FpdResult<PathBuf> {
    let paths: Vec<PathBuf> = candidates.iter().map(|c| dir.join(c)).collect();
    paths
        .iter()
        .find(|p| p.is_file())
        .cloned()
        .ok_or(FpdError::SourceNotFound { candidates: paths })
}

/// A reader for one tabular file format.
pub trait TableReader {
    fn name(&self) -> &'static str;

    fn read_table(&self, path: &Path) -> FpdResult<RawTable>;
}

/// Pick the reader for `path` by extension.
pub fn reader_for(path: &Path, fallback: TextEncoding) -> Box<dyn TableReader> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => Box::new(SpreadsheetReader),
        _ => Box::new(DelimitedReader { fallback }),
    }
}

pub fn read_table(path: &Path, fallback: TextEncoding) -> FpdResult<RawTable> {
    let reader = reader_for(path, fallback);
    let table = reader.read_table(path)?;
    log::info!(
        "Read {} rows x {} columns from {} ({})",
        table.rows.len(),
        table.headers.len(),
        path.display(),
        reader.name()
    );
    Ok(table)
}

// ── Delimited text ─────────────────────────────────────────────

pub struct DelimitedReader {
    pub fallback: TextEncoding,
}

impl DelimitedReader {
    pub fn parse_str(text: &str) -> FpdResult<(Vec<String>, Vec<RawRow>)> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(cell_text).collect());
        }
        Ok((headers, rows))
    }
}

impl TableReader for DelimitedReader {
    fn name(&self) -> &'static str { "delimited" }

    fn read_table(&self, path: &Path) -> FpdResult<RawTable> {
        let bytes = std::fs::read(path).map_err(|e| FpdError::io(path, e))?;
        let text = decode_text(bytes, self.fallback);
        let (headers, rows) = Self::parse_str(&text)?;
        if headers.is_empty() {
            return Err(FpdError::EmptySource { path: path.to_path_buf() });
        }
        Ok(RawTable::from_raw(headers, rows))
    }
}

/// UTF-8 first, then the configured fallback encoding.
pub fn decode_text(bytes: Vec<u8>, fallback: TextEncoding) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text.trim_start_matches('\u{feff}').to_string(),
        Err(err) => {
            let bytes = err.into_bytes();
            match fallback {
                TextEncoding::Latin1 => {
                    log::warn!("Extract is not valid UTF-8; decoding as Latin-1");
                    bytes.iter().map(|&b| b as char).collect()
                }
                TextEncoding::Utf8 => {
                    log::warn!("Extract is not valid UTF-8; replacing invalid sequences");
                    String::from_utf8_lossy(&bytes).into_owned()
                }
            }
        }
    }
}

fn cell_text(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

// ── Spreadsheet ────────────────────────────────────────────────

pub struct SpreadsheetReader;

impl TableReader for SpreadsheetReader {
    fn name(&self) -> &'static str { "spreadsheet" }

    fn read_table(&self, path: &Path) -> FpdResult<RawTable> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| FpdError::EmptySource { path: path.to_path_buf() })??;

        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| FpdError::EmptySource { path: path.to_path_buf() })?;
        let headers = header_row
            .iter()
            .map(|c| spreadsheet_cell(c).unwrap_or_default())
            .collect();
        let body = rows
            .map(|row| row.iter().map(spreadsheet_cell).collect())
            .collect();
        Ok(RawTable::from_raw(headers, body))
    }
}

fn spreadsheet_cell(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => cell_text(s),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) if f.is_finite() => Some(f.to_string()),
        Data::Float(_) => None,
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(_) => cell.as_date().map(|d| d.format("%Y-%m-%d").to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => cell_text(s),
    }
}
