//! CSV loader for transaction tables.
//!
//! `datetime` is the authoritative timestamp. The stored calendar columns
//! (`date`, `time`, `month`, `month_name`, `day_of_week`, `hour`) are optional:
//! when present they must parse, and a value that disagrees with `datetime`
//! is counted in the validation report and replaced by the derived one.

use crate::error::{AnalysisError, Result};
use crate::types::transaction::{MonthName, Status, Transaction, TransactionTable};
use crate::validation::{self, ValidationReport};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Columns every input must provide.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "transaction_id",
    "datetime",
    "category",
    "merchant",
    "amount",
    "payment_mode",
    "sender_bank",
    "receiver_bank",
    "state",
    "status",
    "is_fraud",
];

/// Calendar columns recomputed from `datetime`.
pub const DERIVED_COLUMNS: [&str; 6] = ["date", "time", "month", "month_name", "day_of_week", "hour"];

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const TIME_FORMATS: [&str; 3] = ["%H:%M:%S", "%H:%M:%S%.f", "%H:%M"];

/// Load a transaction table from a CSV file, logging validation findings.
pub fn load_transactions<P: AsRef<Path>>(path: P) -> Result<TransactionTable> {
    let (table, report) = load_with_report(path)?;
    report.log_findings();
    Ok(table)
}

/// Load a transaction table from a CSV file along with its validation report.
pub fn load_with_report<P: AsRef<Path>>(path: P) -> Result<(TransactionTable, ValidationReport)> {
    let path = path.as_ref();
    info!(path = %path.display(), "Loading transactions");
    let file = File::open(path)?;
    read_transactions(file)
}

/// Parse transactions from any CSV source with a header row.
pub fn read_transactions<R: Read>(reader: R) -> Result<(TransactionTable, ValidationReport)> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let columns = ColumnIndex::new(rdr.headers()?)?;

    let mut rows = Vec::new();
    let mut mismatched_rows = 0;
    for (idx, record) in rdr.records().enumerate() {
        let row = idx + 1;
        let record = record.map_err(|err| ragged_row(err, row))?;
        let (tx, consistent) = columns.parse_row(&record, row)?;
        if !consistent {
            debug!(row, transaction_id = %tx.transaction_id, "Calendar columns disagree with datetime");
            mismatched_rows += 1;
        }
        rows.push(tx);
    }

    let report = validation::validate(&rows, mismatched_rows);
    info!(rows = rows.len(), clean = report.is_clean(), "Transactions loaded");

    Ok((TransactionTable::new(rows), report))
}

/// A row with a different field count than the header is malformed input;
/// anything else stays a CSV error.
fn ragged_row(err: csv::Error, row: usize) -> AnalysisError {
    if let csv::ErrorKind::UnequalLengths { expected_len, len, .. } = err.kind() {
        return AnalysisError::MalformedInput(format!(
            "row {row}: expected {expected_len} fields, found {len}"
        ));
    }
    AnalysisError::from(err)
}

/// Header name -> position, checked for the required columns.
struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    fn new(headers: &StringRecord) -> Result<Self> {
        let positions: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), i))
            .collect();

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| !positions.contains_key(*c))
            .collect();
        if !missing.is_empty() {
            return Err(AnalysisError::MalformedInput(format!(
                "missing required column(s): {}",
                missing.join(", ")
            )));
        }

        let stored: Vec<&str> = DERIVED_COLUMNS
            .iter()
            .copied()
            .filter(|c| positions.contains_key(*c))
            .collect();
        debug!(stored_calendar_columns = ?stored, "Header validated");

        Ok(Self { positions })
    }

    /// Cell of a required column. Present in every record once the header
    /// check has passed, since the reader rejects ragged rows.
    fn required<'r>(&self, record: &'r StringRecord, column: &str) -> &'r str {
        self.positions
            .get(column)
            .and_then(|&i| record.get(i))
            .unwrap_or("")
    }

    /// Cell of an optional column, `None` when the column is absent or blank.
    fn optional<'r>(&self, record: &'r StringRecord, column: &str) -> Option<&'r str> {
        self.positions
            .get(column)
            .and_then(|&i| record.get(i))
            .filter(|v| !v.is_empty())
    }

    /// Build a transaction from one record. The flag is false when a stored
    /// calendar column disagreed with `datetime`.
    fn parse_row(&self, record: &StringRecord, row: usize) -> Result<(Transaction, bool)> {
        let raw_datetime = self.required(record, "datetime");
        let datetime = parse_datetime(raw_datetime)
            .ok_or_else(|| AnalysisError::bad_field(row, "datetime", raw_datetime, "not a timestamp"))?;

        let transaction_id = self.required(record, "transaction_id");
        if transaction_id.is_empty() {
            return Err(AnalysisError::bad_field(row, "transaction_id", "", "empty identifier"));
        }

        let raw_amount = self.required(record, "amount");
        let amount = raw_amount
            .parse::<f64>()
            .ok()
            .filter(|a| a.is_finite())
            .ok_or_else(|| AnalysisError::bad_field(row, "amount", raw_amount, "not a number"))?;

        let raw_flag = self.required(record, "is_fraud");
        let is_fraud = parse_flag(raw_flag)
            .ok_or_else(|| AnalysisError::bad_field(row, "is_fraud", raw_flag, "expected 0 or 1"))?;

        let raw_status = self.required(record, "status");
        let status: Status = raw_status
            .parse()
            .map_err(|e: String| AnalysisError::bad_field(row, "status", raw_status, e))?;

        let consistent = self.check_calendar_columns(record, row, &datetime)?;

        let tx = Transaction::new(
            transaction_id,
            datetime,
            self.required(record, "category"),
            self.required(record, "merchant"),
            amount,
            is_fraud,
        )
        .with_payment_mode(self.required(record, "payment_mode"))
        .with_banks(
            self.required(record, "sender_bank"),
            self.required(record, "receiver_bank"),
        )
        .with_state(self.required(record, "state"))
        .with_status(status);

        Ok((tx, consistent))
    }

    /// Parse every stored calendar column that is present and compare it with
    /// the value derived from `datetime`.
    fn check_calendar_columns(&self, record: &StringRecord, row: usize, datetime: &NaiveDateTime) -> Result<bool> {
        let mut consistent = true;

        if let Some(raw) = self.optional(record, "date") {
            let date = parse_date(raw).ok_or_else(|| AnalysisError::bad_field(row, "date", raw, "not a date"))?;
            consistent &= date == datetime.date();
        }
        if let Some(raw) = self.optional(record, "time") {
            let time = parse_time(raw).ok_or_else(|| AnalysisError::bad_field(row, "time", raw, "not a time"))?;
            // stored times may carry fewer fractional digits than `datetime`
            consistent &= time.num_seconds_from_midnight() == datetime.num_seconds_from_midnight();
        }
        if let Some(raw) = self.optional(record, "month") {
            let month = raw
                .parse::<u32>()
                .ok()
                .filter(|m| (1..=12).contains(m))
                .ok_or_else(|| AnalysisError::bad_field(row, "month", raw, "expected 1-12"))?;
            consistent &= month == datetime.month();
        }
        if let Some(raw) = self.optional(record, "month_name") {
            let month_name: MonthName = raw
                .parse()
                .map_err(|e: String| AnalysisError::bad_field(row, "month_name", raw, e))?;
            consistent &= month_name.number() == datetime.month();
        }
        if let Some(raw) = self.optional(record, "day_of_week") {
            let day: Weekday = raw
                .parse()
                .map_err(|_| AnalysisError::bad_field(row, "day_of_week", raw, "not a weekday"))?;
            consistent &= day == datetime.weekday();
        }
        if let Some(raw) = self.optional(record, "hour") {
            let hour = raw
                .parse::<u32>()
                .ok()
                .filter(|h| *h < 24)
                .ok_or_else(|| AnalysisError::bad_field(row, "hour", raw, "expected 0-23"))?;
            consistent &= hour == datetime.hour();
        }

        Ok(consistent)
    }
}

/// Parse a naive timestamp, or an RFC 3339 one keeping its local wall clock.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_local()))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(raw).map(|dt| dt.date()))
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" => Some(true),
        "0" | "0.0" | "false" => Some(false),
        _ => None,
    }
}
