//! Property-based tests for the demand aggregator.
//!
//! - The summary depends only on the valid records
//! - Record order never matters
//! - The table always covers 24 hours and peaks are real hours
//! - Rerunning gives an identical result

use chrono::{TimeZone, Utc};
use cybercafe::models::{HourOfDay, UsageRecord, UNKNOWN_USER};
use cybercafe::services::{aggregate_by_hour, filter_valid, summarize};
use proptest::prelude::*;

/// Durations straddling both ends of the valid range.
fn arb_duration() -> impl Strategy<Value = i64> {
    prop_oneof![0i64..15, 15i64..=240, 241i64..400]
}

fn arb_user() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "user-[0-9]{1,3}",
        1 => Just(UNKNOWN_USER.to_string()),
        1 => Just(String::new()),
    ]
}

fn arb_pc() -> impl Strategy<Value = String> {
    prop_oneof![5 => "PC-[0-9]{2}", 1 => Just(String::new())]
}

fn arb_record() -> impl Strategy<Value = UsageRecord> {
    (arb_pc(), arb_user(), arb_duration(), 0u8..24).prop_map(|(pc, user, duration, hour)| {
        UsageRecord::new(
            pc,
            user,
            duration,
            HourOfDay::new(hour).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 14, hour as u32, 0, 0).unwrap(),
        )
    })
}

fn arb_records() -> impl Strategy<Value = Vec<UsageRecord>> {
    prop::collection::vec(arb_record(), 0..80)
}

/// Records paired with a permutation of themselves.
fn arb_shuffled_records() -> impl Strategy<Value = (Vec<UsageRecord>, Vec<UsageRecord>)> {
    arb_records().prop_flat_map(|records| (Just(records.clone()), Just(records).prop_shuffle()))
}

proptest! {
    #[test]
    fn prop_summary_ignores_invalid_records(records in arb_records()) {
        let valid = filter_valid(&records);
        prop_assert!(valid.iter().all(|r| r.is_valid()));
        prop_assert_eq!(summarize(&records), summarize(&valid));
    }

    #[test]
    fn prop_order_independent((records, shuffled) in arb_shuffled_records()) {
        prop_assert_eq!(summarize(&records), summarize(&shuffled));
    }

    #[test]
    fn prop_table_has_every_hour(records in arb_records()) {
        let table = aggregate_by_hour(&filter_valid(&records));
        prop_assert_eq!(table.len(), 24);
        for (i, prediction) in table.iter().enumerate() {
            prop_assert_eq!(prediction.hour as usize, i);
            prop_assert!(prediction.average_duration_minutes >= 0);
            prop_assert!(prediction.average_duration_minutes <= 240);
        }
    }

    #[test]
    fn prop_peaks_have_sessions_and_score_is_bounded(records in arb_records()) {
        let result = summarize(&records);
        for hour in &result.peak_hours {
            prop_assert!(*hour < 24);
            prop_assert!(result.predictions[*hour as usize].average_duration_minutes > 0);
        }
        prop_assert!((0.0..=1.0).contains(&result.accuracy_score));
    }

    #[test]
    fn prop_idempotent(records in arb_records()) {
        prop_assert_eq!(summarize(&records), summarize(&records));
    }
}
