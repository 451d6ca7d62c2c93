#[cfg(test)]
mod tests {
    use crate::models::{HourOfDay, HourlyPrediction, UsageRecord, UNKNOWN_USER};
    use crate::services::demand::{
        aggregate_by_hour, detect_peak_hours, filter_valid, hourly_fit_score,
        round_half_up_mean, summarize,
    };
    use chrono::{TimeZone, Utc};

    fn create_test_record(pc: &str, user: &str, duration: i64, hour: u8) -> UsageRecord {
        UsageRecord::new(
            pc,
            user,
            duration,
            HourOfDay::new(hour).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 14, hour as u32, 5, 0).unwrap(),
        )
    }

    fn flat_predictions(value: i64) -> Vec<HourlyPrediction> {
        (0..24)
            .map(|hour| HourlyPrediction {
                hour,
                average_duration_minutes: value,
            })
            .collect()
    }

    #[test]
    fn test_round_half_up_mean() {
        assert_eq!(round_half_up_mean(0, 0), 0);
        assert_eq!(round_half_up_mean(61, 2), 31);
        assert_eq!(round_half_up_mean(91, 3), 30);
        assert_eq!(round_half_up_mean(92, 3), 31);
        assert_eq!(round_half_up_mean(-3, 2), -1);
    }

    #[test]
    fn test_filter_valid_drops_each_kind_of_invalid_record() {
        let records = vec![
            create_test_record("PC-1", "user-1", 60, 10),
            create_test_record("PC-2", "user-2", 14, 10),
            create_test_record("PC-3", "user-3", 241, 10),
            create_test_record("", "user-4", 60, 10),
            create_test_record("PC-5", UNKNOWN_USER, 60, 10),
            create_test_record("PC-6", "", 60, 10),
            create_test_record("PC-7", "user-7", 15, 11),
            create_test_record("PC-8", "user-8", 240, 12),
        ];

        let valid = filter_valid(&records);
        let pcs: Vec<&str> = valid.iter().map(|r| r.pc_id.as_str()).collect();
        assert_eq!(pcs, vec!["PC-1", "PC-7", "PC-8"]);
    }

    #[test]
    fn test_filter_valid_empty() {
        assert!(filter_valid(&[]).is_empty());
    }

    #[test]
    fn test_aggregate_by_hour_always_24_entries() {
        let predictions = aggregate_by_hour(&[]);
        assert_eq!(predictions.len(), 24);
        for (i, prediction) in predictions.iter().enumerate() {
            assert_eq!(prediction.hour as usize, i);
            assert_eq!(prediction.average_duration_minutes, 0);
        }
    }

    #[test]
    fn test_aggregate_by_hour_mean() {
        let records = vec![
            create_test_record("PC-1", "user-1", 30, 10),
            create_test_record("PC-2", "user-2", 60, 10),
            create_test_record("PC-3", "user-3", 90, 10),
        ];
        let predictions = aggregate_by_hour(&records);
        assert_eq!(predictions[10].average_duration_minutes, 60);
        assert_eq!(predictions[9].average_duration_minutes, 0);
        assert_eq!(predictions[11].average_duration_minutes, 0);
    }

    #[test]
    fn test_aggregate_by_hour_rounds_half_up() {
        let records = vec![
            create_test_record("PC-1", "user-1", 30, 8),
            create_test_record("PC-2", "user-2", 31, 8),
            create_test_record("PC-1", "user-1", 30, 9),
            create_test_record("PC-2", "user-2", 30, 9),
            create_test_record("PC-3", "user-3", 31, 9),
        ];
        let predictions = aggregate_by_hour(&records);
        assert_eq!(predictions[8].average_duration_minutes, 31);
        assert_eq!(predictions[9].average_duration_minutes, 30);
    }

    #[test]
    fn test_detect_peak_hours_boundary() {
        let mut predictions = flat_predictions(10);
        predictions[18].average_duration_minutes = 16;

        let peaks = detect_peak_hours(&predictions);
        assert_eq!(peaks.len(), 1);
        assert!(peaks.contains(&18));
    }

    #[test]
    fn test_detect_peak_hours_just_below_threshold() {
        // 23 * 10 + 15 = 245; threshold = 1.5 * 245 / 24 = 15.3125
        let mut predictions = flat_predictions(10);
        predictions[18].average_duration_minutes = 15;
        assert!(detect_peak_hours(&predictions).is_empty());
    }

    #[test]
    fn test_detect_peak_hours_all_zero() {
        assert!(detect_peak_hours(&flat_predictions(0)).is_empty());
    }

    #[test]
    fn test_detect_peak_hours_uniform_has_no_peak() {
        assert!(detect_peak_hours(&flat_predictions(90)).is_empty());
    }

    #[test]
    fn test_summarize_empty_input() {
        let result = summarize(&[]);
        assert_eq!(result.average_duration_overall, 0);
        assert!(result.peak_hours.is_empty());
        assert_eq!(result.predictions.len(), 24);
        assert!(result
            .predictions
            .iter()
            .all(|p| p.average_duration_minutes == 0));
        assert_eq!(result.accuracy_score, 0.0);
    }

    #[test]
    fn test_summarize_only_invalid_records() {
        let records = vec![
            create_test_record("PC-1", UNKNOWN_USER, 60, 10),
            create_test_record("PC-2", "user-2", 5, 10),
        ];
        let result = summarize(&records);
        assert_eq!(result.average_duration_overall, 0);
        assert!(result.peak_hours.is_empty());
    }

    #[test]
    fn test_summarize_overall_average_uses_valid_subset() {
        let records = vec![
            create_test_record("PC-1", "user-1", 60, 14),
            create_test_record("PC-2", "user-2", 91, 20),
            create_test_record("PC-3", "user-3", 500, 20),
        ];
        let result = summarize(&records);
        // (60 + 91) / 2 = 75.5 -> 76
        assert_eq!(result.average_duration_overall, 76);
        assert_eq!(result.predictions[20].average_duration_minutes, 91);
        assert_eq!(
            result.peak_hours.iter().copied().collect::<Vec<_>>(),
            vec![14, 20]
        );
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let records = vec![
            create_test_record("PC-1", "user-1", 45, 9),
            create_test_record("PC-2", "user-2", 120, 18),
            create_test_record("PC-3", "user-3", 180, 18),
            create_test_record("PC-4", "user-4", 30, 23),
        ];
        let first = summarize(&records);
        let second = summarize(&records);
        assert_eq!(first, second);
    }

    #[test]
    fn test_summarize_ignores_record_order() {
        let mut records = vec![
            create_test_record("PC-1", "user-1", 45, 9),
            create_test_record("PC-2", "user-2", 120, 18),
            create_test_record("PC-3", "user-3", 181, 18),
            create_test_record("PC-4", "user-4", 30, 23),
            create_test_record("PC-5", "user-5", 77, 9),
        ];
        let forward = summarize(&records);
        records.reverse();
        let backward = summarize(&records);
        assert_eq!(forward.predictions, backward.predictions);
        assert_eq!(forward.peak_hours, backward.peak_hours);
    }

    #[test]
    fn test_hourly_fit_score_perfect_when_hours_explain_everything() {
        let records = vec![
            create_test_record("PC-1", "user-1", 30, 9),
            create_test_record("PC-2", "user-2", 30, 9),
            create_test_record("PC-3", "user-3", 120, 20),
            create_test_record("PC-4", "user-4", 120, 20),
        ];
        assert!((hourly_fit_score(&records) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_hourly_fit_score_zero_when_hours_explain_nothing() {
        let records = vec![
            create_test_record("PC-1", "user-1", 30, 9),
            create_test_record("PC-2", "user-2", 90, 9),
            create_test_record("PC-3", "user-3", 30, 20),
            create_test_record("PC-4", "user-4", 90, 20),
        ];
        assert!(hourly_fit_score(&records).abs() < 1e-12);
    }

    #[test]
    fn test_hourly_fit_score_constant_durations() {
        let records = vec![
            create_test_record("PC-1", "user-1", 60, 9),
            create_test_record("PC-2", "user-2", 60, 15),
        ];
        assert_eq!(hourly_fit_score(&records), 1.0);
    }
}
