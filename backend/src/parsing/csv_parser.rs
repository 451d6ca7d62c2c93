use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs;
use std::path::Path;

use super::{normalize_row, ParsedBatch, RawUsageRow};

/// Column positions resolved from the header row.
struct ColumnIndex {
    pc_id: usize,
    user_id: Option<usize>,
    duration: usize,
    hour: Option<usize>,
    day: Option<usize>,
    timestamp: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
        };

        let required = |names: &[&str]| {
            find(names).with_context(|| format!("Missing required column '{}'", names[0]))
        };

        Ok(Self {
            pc_id: required(&["pcId", "pc_id"])?,
            user_id: find(&["userId", "user_id"]),
            duration: required(&["duration", "durationMinutes"])?,
            hour: find(&["hour", "hourOfDay"]),
            day: find(&["day"]),
            timestamp: required(&["timestamp", "startTime"])?,
        })
    }

    fn extract(&self, row: &StringRecord) -> RawUsageRow {
        let field = |idx: usize| row.get(idx).map(str::to_string);
        RawUsageRow {
            pc_id: field(self.pc_id),
            user_id: self.user_id.and_then(field),
            duration: field(self.duration),
            hour: self.hour.and_then(field),
            day: self.day.and_then(field),
            timestamp: field(self.timestamp),
        }
    }
}

/// Parse a CSV usage export held in memory.
pub fn parse_usage_csv_str(content: &str) -> Result<ParsedBatch> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers().context("Failed to read CSV header")?.clone();
    if headers.is_empty() || headers.iter().all(str::is_empty) {
        bail!("CSV input has no header row");
    }
    let columns = ColumnIndex::from_headers(&headers)?;

    let mut batch = ParsedBatch::default();
    for (i, row) in reader.records().enumerate() {
        let row_number = i + 1;
        let parsed = row
            .map_err(|e| format!("malformed CSV row: {}", e))
            .and_then(|row| normalize_row(columns.extract(&row)));
        batch.push(row_number, parsed);
    }

    Ok(batch)
}

/// Parse a CSV usage export from a file.
pub fn parse_usage_csv(csv_path: &Path) -> Result<ParsedBatch> {
    let content = fs::read_to_string(csv_path)
        .with_context(|| format!("Failed to read CSV file: {}", csv_path.display()))?;
    parse_usage_csv_str(&content)
}
