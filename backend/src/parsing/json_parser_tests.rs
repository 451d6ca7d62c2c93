#[cfg(test)]
mod tests {
    use crate::models::UNKNOWN_USER;
    use crate::parsing::json_parser::{parse_usage_json, parse_usage_json_str};
    use crate::parsing::{parse_usage_str, UploadFormat};
    use std::io::Write;

    #[test]
    fn test_parse_usage_json_basic() {
        let json = r#"[
            {"pcId": "PC-2", "userId": "user-7", "duration": 75, "hour": 16,
             "day": "3/14/2025", "timestamp": "2025-03-14T16:10:00Z"},
            {"pcId": "PC-5", "userId": "user-1", "duration": 30, "hour": 9,
             "timestamp": "2025-03-15T09:00:00+02:00"}
        ]"#;

        let batch = parse_usage_json_str(json).unwrap();
        assert_eq!(batch.records.len(), 2);
        assert!(batch.rejected.is_empty());
        assert_eq!(batch.records[0].duration_minutes, 75);
        assert_eq!(batch.records[0].hour.value(), 16);
        // Offset timestamps are normalized to UTC; the explicit hour is kept
        assert_eq!(batch.records[1].timestamp.to_rfc3339(), "2025-03-15T07:00:00+00:00");
        assert_eq!(batch.records[1].hour.value(), 9);
    }

    #[test]
    fn test_numbers_as_strings_are_accepted() {
        let json = r#"[{"pcId": 3, "userId": "user-1", "duration": "120", "hour": "20",
                        "timestamp": "2025-03-14T20:00:00Z"}]"#;

        let batch = parse_usage_json_str(json).unwrap();
        assert_eq!(batch.records[0].pc_id, "3");
        assert_eq!(batch.records[0].duration_minutes, 120);
        assert_eq!(batch.records[0].hour.value(), 20);
    }

    #[test]
    fn test_start_time_alias_and_missing_hour() {
        let json = r#"[{"pcId": "PC-1", "userId": "user-1", "duration": 45.0,
                        "startTime": "2025-03-14T13:30:00Z"}]"#;

        let batch = parse_usage_json_str(json).unwrap();
        assert_eq!(batch.records[0].hour.value(), 13);
        assert_eq!(batch.records[0].duration_minutes, 45);
    }

    #[test]
    fn test_null_user_becomes_unknown_sentinel() {
        let json = r#"[{"pcId": "PC-1", "userId": null, "duration": 60,
                        "timestamp": "2025-03-14T10:00:00Z"}]"#;

        let batch = parse_usage_json_str(json).unwrap();
        assert_eq!(batch.records[0].user_id, UNKNOWN_USER);
    }

    #[test]
    fn test_malformed_objects_are_rejected_individually() {
        let json = r#"[
            {"pcId": "PC-1", "userId": "user-1", "duration": 60, "timestamp": "2025-03-14T10:00:00Z"},
            "not an object",
            {"pcId": "PC-3", "userId": "user-3", "duration": [1, 2], "timestamp": "2025-03-14T10:00:00Z"},
            {"pcId": "PC-4", "userId": "user-4", "duration": 60}
        ]"#;

        let batch = parse_usage_json_str(json).unwrap();
        assert_eq!(batch.records.len(), 1);
        let rows: Vec<usize> = batch.rejected.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![2, 3, 4]);
        assert!(batch.rejected[2].reason.contains("timestamp"));
    }

    #[test]
    fn test_non_array_document_is_an_error() {
        assert!(parse_usage_json_str(r#"{"pcId": "PC-1"}"#).is_err());
        assert!(parse_usage_json_str("not json").is_err());
    }

    #[test]
    fn test_empty_array() {
        let batch = parse_usage_json_str("[]").unwrap();
        assert!(batch.records.is_empty());
    }

    #[test]
    fn test_parse_usage_json_from_file() {
        let mut temp_file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            temp_file,
            r#"[{{"pcId": "PC-1", "userId": "user-1", "duration": 60, "timestamp": "2025-03-14T10:00:00Z"}}]"#
        )
        .unwrap();

        let batch = parse_usage_json(temp_file.path()).unwrap();
        assert_eq!(batch.records.len(), 1);
    }

    #[test]
    fn test_parse_usage_str_dispatches_on_format() {
        let json = r#"[{"pcId": "PC-1", "userId": "user-1", "duration": 60, "timestamp": "2025-03-14T10:00:00Z"}]"#;
        assert_eq!(parse_usage_str(json, UploadFormat::Json).unwrap().records.len(), 1);
        assert!(parse_usage_str(json, UploadFormat::Csv).is_err());
    }
}
