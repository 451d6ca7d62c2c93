//! Demand analysis pipeline.
//!
//! Runs the four analysis stages in order, each consuming the previous
//! stage's output:
//!
//! ```text
//! load ──► clean ──► train ──► visualize
//! (records) (valid records, report) (TrainingResult) (DemandChart)
//! ```

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::models::{HourOfDay, TrainingResult, UsageRecord};
use crate::parsing::{self, ParsedBatch, RejectedRow};
use crate::services::demand;

/// Demand level thresholds on the percentage of the busiest hour.
const MEDIUM_DEMAND_PERCENT: f64 = 40.0;
const HIGH_DEMAND_PERCENT: f64 = 70.0;

const PEAK_RECOMMENDATION: &str =
    "Consider scheduling extra staff or resources during these hours";

/// Outcome of the cleaning stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningReport {
    pub loaded: usize,
    pub kept: usize,
    pub removed: usize,
    /// Removed because the duration was outside `[15, 240]` minutes
    pub duration_out_of_range: usize,
    /// Removed because no workstation was recorded
    pub missing_pc: usize,
    /// Removed because the session owner is unknown
    pub unknown_user: usize,
}

/// Relative demand of one hour compared to the busiest hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandLevel {
    Low,
    Medium,
    High,
}

impl DemandLevel {
    pub fn from_percent(percent: f64) -> Self {
        if percent > HIGH_DEMAND_PERCENT {
            DemandLevel::High
        } else if percent >= MEDIUM_DEMAND_PERCENT {
            DemandLevel::Medium
        } else {
            DemandLevel::Low
        }
    }
}

/// One bar of the hourly demand chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyBar {
    pub hour: u8,
    /// `"HH:00"`
    pub label: String,
    pub average_duration_minutes: i64,
    pub percent_of_max: f64,
    pub is_peak: bool,
    pub level: DemandLevel,
}

/// Chart-ready view of a [`TrainingResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandChart {
    pub bars: Vec<HourlyBar>,
    pub peak_hour_labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

/// Full result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandAnalysis {
    pub cleaning: CleaningReport,
    pub training: TrainingResult,
    pub chart: DemandChart,
    /// Rows dropped during ingestion (empty when records were supplied directly)
    #[serde(default)]
    pub rejected_rows: Vec<RejectedRow>,
}

/// Sequential load → clean → train → visualize runner.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemandPipeline;

impl DemandPipeline {
    pub fn new() -> Self {
        Self
    }

    /// Stage 1: take the parsed rows, keeping rejections for the report.
    pub fn load(&self, batch: ParsedBatch) -> (Vec<UsageRecord>, Vec<RejectedRow>) {
        debug!(
            "Loaded {} usage records ({} rows rejected by ingestion)",
            batch.records.len(),
            batch.rejected.len()
        );
        (batch.records, batch.rejected)
    }

    /// Stage 2: drop records failing the validity invariant.
    ///
    /// A record failing several checks is counted once, under the first
    /// failing check in the order duration, workstation, user.
    pub fn clean(&self, records: Vec<UsageRecord>) -> (Vec<UsageRecord>, CleaningReport) {
        let mut report = CleaningReport {
            loaded: records.len(),
            ..Default::default()
        };

        for record in &records {
            if !record.has_valid_duration() {
                report.duration_out_of_range += 1;
            } else if !record.has_pc() {
                report.missing_pc += 1;
            } else if !record.has_known_user() {
                report.unknown_user += 1;
            }
        }

        let cleaned = demand::filter_valid(&records);
        report.kept = cleaned.len();
        report.removed = report.loaded - report.kept;
        debug!(
            "Cleaning kept {} of {} records",
            report.kept, report.loaded
        );

        (cleaned, report)
    }

    /// Stage 3: aggregate the cleaned records.
    pub fn train(&self, cleaned: &[UsageRecord]) -> TrainingResult {
        demand::summarize(cleaned)
    }

    /// Stage 4: shape the result for a bar chart.
    pub fn visualize(&self, training: &TrainingResult) -> DemandChart {
        let max = training
            .predictions
            .iter()
            .map(|p| p.average_duration_minutes)
            .max()
            .unwrap_or(0);

        let bars = training
            .predictions
            .iter()
            .map(|p| {
                let percent_of_max = if max > 0 {
                    p.average_duration_minutes as f64 / max as f64 * 100.0
                } else {
                    0.0
                };
                HourlyBar {
                    hour: p.hour,
                    label: hour_label(p.hour),
                    average_duration_minutes: p.average_duration_minutes,
                    percent_of_max,
                    is_peak: training.peak_hours.contains(&p.hour),
                    level: DemandLevel::from_percent(percent_of_max),
                }
            })
            .collect();

        let peak_hour_labels: Vec<String> =
            training.peak_hours.iter().map(|h| hour_label(*h)).collect();
        let recommendation =
            (!peak_hour_labels.is_empty()).then(|| PEAK_RECOMMENDATION.to_string());

        DemandChart {
            bars,
            peak_hour_labels,
            recommendation,
        }
    }

    /// Run clean, train and visualize over records already in memory.
    pub fn run(&self, records: Vec<UsageRecord>) -> DemandAnalysis {
        self.run_stages(records, Vec::new())
    }

    /// Run the whole pipeline over a parsed upload.
    pub fn run_batch(&self, batch: ParsedBatch) -> DemandAnalysis {
        let (records, rejected) = self.load(batch);
        self.run_stages(records, rejected)
    }

    /// Parse a CSV export and run the pipeline on it.
    pub fn run_csv_str(&self, content: &str) -> Result<DemandAnalysis> {
        let batch = parsing::csv_parser::parse_usage_csv_str(content)
            .context("Failed to parse usage CSV")?;
        Ok(self.run_batch(batch))
    }

    /// Parse a JSON export and run the pipeline on it.
    pub fn run_json_str(&self, content: &str) -> Result<DemandAnalysis> {
        let batch = parsing::json_parser::parse_usage_json_str(content)
            .context("Failed to parse usage JSON")?;
        Ok(self.run_batch(batch))
    }

    fn run_stages(&self, records: Vec<UsageRecord>, rejected_rows: Vec<RejectedRow>) -> DemandAnalysis {
        let (cleaned, cleaning) = self.clean(records);
        let training = self.train(&cleaned);
        let chart = self.visualize(&training);

        DemandAnalysis {
            cleaning,
            training,
            chart,
            rejected_rows,
        }
    }
}

fn hour_label(hour: u8) -> String {
    match HourOfDay::new(hour) {
        Some(h) => h.to_string(),
        None => format!("{:02}:00", hour),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNKNOWN_USER;
    use chrono::{TimeZone, Utc};

    fn record(pc: &str, user: &str, duration: i64, hour: u8) -> UsageRecord {
        UsageRecord::new(
            pc,
            user,
            duration,
            HourOfDay::new(hour).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 6, hour as u32, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_clean_counts_first_failing_check() {
        let pipeline = DemandPipeline::new();
        let records = vec![
            record("PC-1", "user-1", 60, 10),
            record("", UNKNOWN_USER, 5, 10),
            record("", "user-2", 60, 10),
            record("PC-3", UNKNOWN_USER, 60, 10),
            record("PC-4", "user-4", 300, 10),
        ];

        let (cleaned, report) = pipeline.clean(records);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(report.loaded, 5);
        assert_eq!(report.kept, 1);
        assert_eq!(report.removed, 4);
        assert_eq!(report.duration_out_of_range, 2);
        assert_eq!(report.missing_pc, 1);
        assert_eq!(report.unknown_user, 1);
    }

    #[test]
    fn test_visualize_percentages_and_levels() {
        let pipeline = DemandPipeline::new();
        let records = vec![
            record("PC-1", "user-1", 200, 20),
            record("PC-2", "user-2", 100, 12),
            record("PC-3", "user-3", 60, 9),
        ];
        let training = pipeline.train(&records);
        let chart = pipeline.visualize(&training);

        assert_eq!(chart.bars.len(), 24);
        let bar20 = &chart.bars[20];
        assert_eq!(bar20.label, "20:00");
        assert_eq!(bar20.percent_of_max, 100.0);
        assert_eq!(bar20.level, DemandLevel::High);
        assert_eq!(chart.bars[12].percent_of_max, 50.0);
        assert_eq!(chart.bars[12].level, DemandLevel::Medium);
        assert_eq!(chart.bars[9].level, DemandLevel::Low);
        assert_eq!(chart.bars[0].percent_of_max, 0.0);
    }

    #[test]
    fn test_visualize_peak_labels_and_recommendation() {
        let pipeline = DemandPipeline::new();
        let records = vec![record("PC-1", "user-1", 120, 18)];
        let chart = pipeline.visualize(&pipeline.train(&records));

        assert_eq!(chart.peak_hour_labels, vec!["18:00".to_string()]);
        assert!(chart.bars[18].is_peak);
        assert!(chart.recommendation.is_some());
    }

    #[test]
    fn test_visualize_empty_has_no_recommendation() {
        let pipeline = DemandPipeline::new();
        let analysis = pipeline.run(Vec::new());

        assert!(analysis.chart.peak_hour_labels.is_empty());
        assert!(analysis.chart.recommendation.is_none());
        assert!(analysis.chart.bars.iter().all(|b| b.percent_of_max == 0.0));
        assert_eq!(analysis.cleaning, CleaningReport::default());
    }

    #[test]
    fn test_demand_level_thresholds() {
        assert_eq!(DemandLevel::from_percent(39.9), DemandLevel::Low);
        assert_eq!(DemandLevel::from_percent(40.0), DemandLevel::Medium);
        assert_eq!(DemandLevel::from_percent(70.0), DemandLevel::Medium);
        assert_eq!(DemandLevel::from_percent(70.1), DemandLevel::High);
    }

    #[test]
    fn test_run_csv_str_reports_rejected_rows() {
        let csv = "pcId,userId,duration,hour,day,timestamp\n\
                   PC-1,user-1,60,10,3/14/2025,2025-03-14T10:00:00Z\n\
                   PC-2,user-2,abc,11,3/14/2025,2025-03-14T11:00:00Z\n\
                   PC-3,user-3,5,12,3/14/2025,2025-03-14T12:00:00Z\n";

        let analysis = DemandPipeline::new().run_csv_str(csv).unwrap();
        assert_eq!(analysis.rejected_rows.len(), 1);
        assert_eq!(analysis.cleaning.loaded, 2);
        assert_eq!(analysis.cleaning.kept, 1);
        assert_eq!(analysis.training.predictions[10].average_duration_minutes, 60);
    }
}
