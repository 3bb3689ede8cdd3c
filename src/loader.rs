//! Transaction log loader
//!
//! Reads a CSV export with at least `Transaction` and `Item` columns. The
//! optional `date_time`, `period_day` and `weekday_weekend` columns feed the
//! transaction filters.

use std::{
    fs::File,
    io::{self, Read},
    path::{Path, PathBuf},
};

use jiff::civil::DateTime;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::transactions::{DayType, PeriodOfDay, TransactionLog, TransactionRecord};

/// Formats accepted in the `date_time` column, tried in order before falling
/// back to ISO 8601.
const DATE_TIME_FORMATS: [&str; 3] = ["%d-%m-%Y %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Errors loading a transaction log.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The data file does not exist.
    #[error("data file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// IO error opening or reading the data file.
    #[error("failed to read data file: {0}")]
    Io(#[from] io::Error),

    /// Malformed CSV.
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A required value is missing or blank (line number, column).
    #[error("line {line}: missing value for required column `{field}`")]
    MissingField {
        /// Line in the file where the record starts, counting the header as line 1
        line: u64,

        /// Column name
        field: &'static str,
    },
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Transaction", default)]
    transaction: Option<String>,

    #[serde(rename = "Item", default)]
    item: Option<String>,

    #[serde(default)]
    date_time: Option<String>,

    #[serde(default)]
    period_day: Option<String>,

    #[serde(default)]
    weekday_weekend: Option<String>,
}

/// Load the transaction log at `path`.
///
/// # Errors
///
/// Returns [`LoadError::NotFound`] if the file does not exist, or another
/// [`LoadError`] if it cannot be read or a row is invalid.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_transactions(path: impl AsRef<Path>) -> Result<TransactionLog, LoadError> {
    let path = path.as_ref();

    let file = File::open(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io(err),
    })?;

    let log = read_transactions(file)?;

    info!(records = log.len(), "transaction log loaded");

    Ok(log)
}

/// Read a transaction log from CSV.
///
/// Unparseable optional columns leave the attribute unset on that record;
/// only the required columns can fail a row.
///
/// # Errors
///
/// Returns a [`LoadError`] if the CSV is malformed or a required value is
/// missing.
pub fn read_transactions(reader: impl Read) -> Result<TransactionLog, LoadError> {
    let mut csv = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv.headers()?.clone();
    let mut row = csv::StringRecord::new();
    let mut records = Vec::new();

    while csv.read_record(&mut row)? {
        // quoted fields may span lines, so use where the record starts
        let line = row.position().map_or(0, csv::Position::line);
        let parsed: CsvRow = row.deserialize(Some(&headers))?;

        records.push(parse_row(parsed, line)?);
    }

    Ok(TransactionLog::new(records))
}

fn parse_row(row: CsvRow, line: u64) -> Result<TransactionRecord, LoadError> {
    let transaction = required(row.transaction, line, "Transaction")?;
    let item = required(row.item, line, "Item")?;

    let mut record = TransactionRecord::new(transaction.as_str(), &item);

    if let Some(value) = optional(row.date_time) {
        match parse_timestamp(&value) {
            Some(timestamp) => record = record.with_timestamp(timestamp),
            None => unparseable(line, "date_time", &value),
        }
    }

    if let Some(value) = optional(row.period_day) {
        match value.parse::<PeriodOfDay>() {
            Ok(period) => record = record.with_period(period),
            Err(_) => unparseable(line, "period_day", &value),
        }
    }

    if let Some(value) = optional(row.weekday_weekend) {
        match value.parse::<DayType>() {
            Ok(day_type) => record = record.with_day_type(day_type),
            Err(_) => unparseable(line, "weekday_weekend", &value),
        }
    }

    Ok(record)
}

fn unparseable(line: u64, column: &str, value: &str) {
    warn!(line, column, value, "unparseable value, attribute left unset");
}

fn required(value: Option<String>, line: u64, field: &'static str) -> Result<String, LoadError> {
    optional(value).ok_or(LoadError::MissingField { line, field })
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parse a `date_time` cell.
pub fn parse_timestamp(value: &str) -> Option<DateTime> {
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| DateTime::strptime(format, value).ok())
        .or_else(|| value.parse::<DateTime>().ok())
}
