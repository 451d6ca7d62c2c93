use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::{normalize_row, ParsedBatch, RawUsageRow};

/// Scalar that exports write either as a JSON number or as a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => s,
        }
    }
}

fn scalar_text(value: Option<Scalar>) -> Option<String> {
    value.map(Scalar::into_text)
}

/// Raw JSON structure of one exported session
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawJsonRecord {
    #[serde(default, alias = "pc_id")]
    pc_id: Option<Scalar>,
    #[serde(default, alias = "user_id")]
    user_id: Option<Scalar>,
    #[serde(default, alias = "durationMinutes")]
    duration: Option<Scalar>,
    #[serde(default, alias = "hourOfDay")]
    hour: Option<Scalar>,
    #[serde(default)]
    day: Option<String>,
    #[serde(default, alias = "startTime")]
    timestamp: Option<String>,
}

impl From<RawJsonRecord> for RawUsageRow {
    fn from(raw: RawJsonRecord) -> Self {
        RawUsageRow {
            pc_id: scalar_text(raw.pc_id),
            user_id: scalar_text(raw.user_id),
            duration: scalar_text(raw.duration),
            hour: scalar_text(raw.hour),
            day: raw.day,
            timestamp: raw.timestamp,
        }
    }
}

/// Parse a JSON usage export held in memory.
///
/// The document must be an array; each element is decoded independently so a
/// single malformed object only rejects its own row.
pub fn parse_usage_json_str(content: &str) -> Result<ParsedBatch> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(content).context("Usage JSON must be an array of objects")?;

    let mut batch = ParsedBatch::default();
    for (i, value) in values.into_iter().enumerate() {
        let parsed = serde_json::from_value::<RawJsonRecord>(value)
            .map_err(|e| format!("malformed JSON object: {}", e))
            .and_then(|raw| normalize_row(raw.into()));
        batch.push(i + 1, parsed);
    }

    Ok(batch)
}

/// Parse a JSON usage export from a file.
pub fn parse_usage_json(json_path: &Path) -> Result<ParsedBatch> {
    let content = fs::read_to_string(json_path)
        .with_context(|| format!("Failed to read JSON file: {}", json_path.display()))?;
    parse_usage_json_str(&content)
}
