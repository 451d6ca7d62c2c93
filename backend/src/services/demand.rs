//! Hourly demand aggregation over usage sessions.
//!
//! Every function here is pure and total: malformed sessions are filtered out
//! rather than reported, and an empty batch yields an all-zero table.

use std::collections::BTreeSet;

use crate::models::{HourlyPrediction, TrainingResult, UsageRecord, HOURS_PER_DAY};

/// An hour is a peak when its average exceeds `PEAK_NUMERATOR / PEAK_DENOMINATOR`
/// times the mean of all 24 hourly averages.
const PEAK_NUMERATOR: i64 = 3;
const PEAK_DENOMINATOR: i64 = 2;

/// Integer mean rounded half-up (towards positive infinity on ties).
///
/// Returns 0 when `count` is 0.
pub(crate) fn round_half_up_mean(sum: i64, count: i64) -> i64 {
    if count == 0 {
        return 0;
    }
    (2 * sum + count).div_euclid(2 * count)
}

/// Keep only records satisfying the validity invariant, in input order.
pub fn filter_valid(records: &[UsageRecord]) -> Vec<UsageRecord> {
    records.iter().filter(|r| r.is_valid()).cloned().collect()
}

/// Mean duration per hour of day.
///
/// Always returns 24 entries ordered by hour; hours without sessions get 0.
pub fn aggregate_by_hour(records: &[UsageRecord]) -> Vec<HourlyPrediction> {
    let mut totals = [0i64; HOURS_PER_DAY];
    let mut counts = [0i64; HOURS_PER_DAY];

    for record in records {
        let bucket = record.hour.index();
        totals[bucket] += record.duration_minutes;
        counts[bucket] += 1;
    }

    (0..HOURS_PER_DAY)
        .map(|hour| HourlyPrediction {
            hour: hour as u8,
            average_duration_minutes: round_half_up_mean(totals[hour], counts[hour]),
        })
        .collect()
}

/// Hours whose average strictly exceeds 1.5 times the mean of the 24 averages.
///
/// The mean always divides by 24, so empty hours pull it down. Compared in
/// integers: `v > 1.5 * sum / 24` is `24 * 2 * v > 3 * sum`.
pub fn detect_peak_hours(predictions: &[HourlyPrediction]) -> BTreeSet<u8> {
    let sum: i64 = predictions.iter().map(|p| p.average_duration_minutes).sum();
    let hours = HOURS_PER_DAY as i64;

    predictions
        .iter()
        .filter(|p| hours * PEAK_DENOMINATOR * p.average_duration_minutes > PEAK_NUMERATOR * sum)
        .map(|p| p.hour)
        .collect()
}

/// Coefficient of determination of the "hourly mean" model.
///
/// Each record is predicted by the exact (unrounded) mean of its hour. Returns
/// 0.0 for an empty batch and 1.0 when every duration is identical.
///
/// Computed from per-hour sums and sums of squares, so the score depends only
/// on which durations fall in which hour and never on record order.
pub fn hourly_fit_score(records: &[UsageRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }

    let mut totals = [0i128; HOURS_PER_DAY];
    let mut counts = [0i128; HOURS_PER_DAY];
    let mut sum_sq: i128 = 0;
    for record in records {
        let value = record.duration_minutes as i128;
        totals[record.hour.index()] += value;
        counts[record.hour.index()] += 1;
        sum_sq += value * value;
    }

    let n = records.len() as i128;
    let total: i128 = totals.iter().sum();

    // n * SS_tot = n * sum(x^2) - (sum x)^2, exact in integers
    let scaled_ss_tot = n * sum_sq - total * total;
    if scaled_ss_tot == 0 {
        return 1.0;
    }
    let ss_tot = scaled_ss_tot as f64 / n as f64;

    // SS_res = sum(x^2) - sum_h(S_h^2 / c_h)
    let explained: f64 = totals
        .iter()
        .zip(counts.iter())
        .filter(|(_, count)| **count > 0)
        .map(|(&sum, &count)| (sum * sum) as f64 / count as f64)
        .sum();
    let ss_res = sum_sq as f64 - explained;

    (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
}

/// Filter, aggregate and classify a batch of sessions.
pub fn summarize(records: &[UsageRecord]) -> TrainingResult {
    let valid = filter_valid(records);
    let predictions = aggregate_by_hour(&valid);
    let peak_hours = detect_peak_hours(&predictions);

    let total: i64 = valid.iter().map(|r| r.duration_minutes).sum();
    let average_duration_overall = round_half_up_mean(total, valid.len() as i64);

    TrainingResult {
        accuracy_score: hourly_fit_score(&valid),
        predictions,
        peak_hours,
        average_duration_overall,
    }
}
