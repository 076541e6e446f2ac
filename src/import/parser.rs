//! CSV row parsing

use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Errors that abort an import before any row is attempted
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("file is not valid UTF-8: {0}")]
    Encoding(String),

    #[error("no header row found")]
    MissingHeader,

    #[error("{0}")]
    Csv(String),
}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        ParseError::Csv(err.to_string())
    }
}

/// One data row, keyed by header name in header order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    /// 1-based position among the data rows
    row_number: usize,
    cells: Vec<(String, String)>,
    /// Non-blank cells beyond the header width
    extra: Vec<String>,
}

impl ImportRow {
    pub fn new(row_number: usize, cells: Vec<(String, String)>) -> Self {
        Self {
            row_number,
            cells,
            extra: Vec::new(),
        }
    }

    /// Build a row from `(column, value)` pairs
    pub fn from_pairs<K, V>(row_number: usize, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(
            row_number,
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn with_extra(mut self, extra: Vec<String>) -> Self {
        self.extra = extra;
        self
    }

    pub fn row_number(&self) -> usize {
        self.row_number
    }

    pub fn cells(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .rev()
            .find(|(k, _)| k == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn extra_cells(&self) -> &[String] {
        &self.extra
    }
}

/// Read a CSV file from disk; a read failure aborts like a parse failure
pub fn read_file(path: &Path) -> Result<Vec<u8>, ParseError> {
    std::fs::read(path).map_err(|e| ParseError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Parse comma-delimited UTF-8 text whose first row is the header
///
/// A leading byte-order mark is ignored. Empty lines are skipped; a line of
/// only delimiters is still a row and keeps its place in the numbering.
pub fn parse_csv(bytes: &[u8]) -> Result<Vec<ImportRow>, ParseError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(bytes).map_err(|e| ParseError::Encoding(e.to_string()))?;

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(text.as_bytes());

    let headers = rdr.headers()?.clone();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(ParseError::MissingHeader);
    }
    for (idx, _) in headers.iter().enumerate().filter(|(_, h)| h.is_empty()) {
        warn!(column = idx + 1, "header cell is empty, column ignored");
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(build_row(&headers, &record, rows.len() + 1));
    }

    Ok(rows)
}

fn build_row(headers: &StringRecord, record: &StringRecord, row_number: usize) -> ImportRow {
    let cells = headers
        .iter()
        .zip(record.iter())
        .filter(|(h, _)| !h.is_empty())
        .map(|(h, v)| (h.to_string(), v.to_string()))
        .collect();

    let extra = record
        .iter()
        .skip(headers.len())
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
        .collect();

    ImportRow::new(row_number, cells).with_extra(extra)
}
