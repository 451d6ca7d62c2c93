//! Parsers for usage-session exports.
//!
//! Front-desk exports arrive either as CSV with the columns
//! `pcId,userId,duration,hour,day,timestamp` or as a JSON array of objects
//! carrying the same fields. Both parsers produce typed [`UsageRecord`]s.
//!
//! Only structural problems (unreadable input, missing mandatory columns,
//! a JSON document that is not an array) are errors. A row that cannot be
//! turned into a record is dropped and listed in [`ParsedBatch::rejected`].
//!
//! # Parsers
//!
//! - [`csv_parser`]: Parse CSV exports
//! - [`json_parser`]: Parse JSON exports
//!
//! # Example
//!
//! ```no_run
//! use cybercafe::parsing::parse_usage_file;
//! use std::path::Path;
//!
//! let batch = parse_usage_file(Path::new("sessions.csv"))
//!     .expect("Failed to parse sessions");
//! println!("{} records, {} rejected", batch.records.len(), batch.rejected.len());
//! ```

pub mod csv_parser;
pub mod json_parser;

#[cfg(test)]
mod json_parser_tests;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{HourOfDay, UsageRecord, UNKNOWN_USER};

pub use csv_parser::{parse_usage_csv, parse_usage_csv_str};
pub use json_parser::{parse_usage_json, parse_usage_json_str};

/// A row dropped during ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRow {
    /// 1-based data row (the CSV header is not counted)
    pub row: usize,
    pub reason: String,
}

/// Records parsed from one upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedBatch {
    pub records: Vec<UsageRecord>,
    pub rejected: Vec<RejectedRow>,
}

impl ParsedBatch {
    fn push(&mut self, row: usize, parsed: std::result::Result<UsageRecord, String>) {
        match parsed {
            Ok(record) => self.records.push(record),
            Err(reason) => {
                log::warn!("Rejected usage row {}: {}", row, reason);
                self.rejected.push(RejectedRow { row, reason });
            }
        }
    }
}

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadFormat {
    Csv,
    Json,
}

impl UploadFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UploadFormat::Csv => "csv",
            UploadFormat::Json => "json",
        }
    }
}

impl fmt::Display for UploadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("Unsupported upload format: {}", other)),
        }
    }
}

/// Parse an upload held in memory.
pub fn parse_usage_str(content: &str, format: UploadFormat) -> Result<ParsedBatch> {
    match format {
        UploadFormat::Csv => parse_usage_csv_str(content),
        UploadFormat::Json => parse_usage_json_str(content),
    }
}

/// Parse an upload from disk, choosing the parser by file extension.
pub fn parse_usage_file(path: &Path) -> Result<ParsedBatch> {
    let format = UploadFormat::from_path(path)
        .with_context(|| format!("Cannot infer upload format of {}", path.display()))?;

    match format {
        UploadFormat::Csv => parse_usage_csv(path),
        UploadFormat::Json => parse_usage_json(path),
    }
}

/// Field values of one row before normalization, as text.
#[derive(Debug, Default)]
pub(crate) struct RawUsageRow {
    pub pc_id: Option<String>,
    pub user_id: Option<String>,
    pub duration: Option<String>,
    pub hour: Option<String>,
    pub day: Option<String>,
    pub timestamp: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Turn a raw row into a record.
///
/// Missing owners become [`UNKNOWN_USER`], a missing workstation becomes an
/// empty string and a missing hour is taken from the timestamp; the validity
/// filter decides later whether such records count.
pub(crate) fn normalize_row(raw: RawUsageRow) -> std::result::Result<UsageRecord, String> {
    let timestamp_text = non_empty(raw.timestamp).ok_or("missing timestamp")?;
    let timestamp = parse_timestamp(&timestamp_text)?;

    let duration_text = non_empty(raw.duration).ok_or("missing duration")?;
    let duration_minutes = parse_duration(&duration_text)?;

    let hour = match non_empty(raw.hour) {
        Some(text) => parse_hour(&text)?,
        None => HourOfDay::of_timestamp(&timestamp),
    };

    Ok(UsageRecord {
        id: None,
        pc_id: non_empty(raw.pc_id).unwrap_or_default(),
        user_id: non_empty(raw.user_id).unwrap_or_else(|| UNKNOWN_USER.to_string()),
        duration_minutes,
        hour,
        day: non_empty(raw.day),
        timestamp,
    })
}

/// Parse RFC 3339, or a naive `YYYY-MM-DD HH:MM:SS` interpreted as UTC.
pub(crate) fn parse_timestamp(text: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid timestamp: {}", text))
}

fn parse_duration(text: &str) -> std::result::Result<i64, String> {
    if let Ok(minutes) = text.parse::<i64>() {
        return Ok(minutes);
    }
    match text.parse::<f64>() {
        Ok(minutes) if minutes.is_finite() => Ok(minutes.round() as i64),
        _ => Err(format!("invalid duration: {}", text)),
    }
}

fn parse_hour(text: &str) -> std::result::Result<HourOfDay, String> {
    text.parse::<u8>()
        .ok()
        .and_then(HourOfDay::new)
        .ok_or_else(|| format!("invalid hour: {}", text))
}
