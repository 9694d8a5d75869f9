//! CLI output formatting tests.
//!
//! These tests verify the stall report for both text and JSON output modes.

#[cfg(test)]
mod text_formatter_tests {
    use super::super::text::TextFormatter;
    use stallmap_core::{StallMap, StallRecord, StallSummary};

    fn sample() -> StallMap {
        StallMap::from_records(vec![
            StallRecord::new("A1", "Ground", "Food").reserved_by("Ana", "Ana's Tacos", "PAID"),
            StallRecord::new("A2", "Ground", "Retail"),
        ])
        .unwrap()
    }

    #[test]
    fn test_available_line_layout() {
        let formatter = TextFormatter::new(false);
        let line = formatter.format_record(&StallRecord::new("A2", "Ground", "Retail"));
        assert_eq!(
            line,
            "  [AVAILABLE]  A2          Floor: Ground           Type: Retail"
        );
    }

    #[test]
    fn test_reserved_line_has_vendor_detail() {
        let formatter = TextFormatter::new(false);
        let record =
            StallRecord::new("A1", "Ground", "Food").reserved_by("Ana", "Ana's Tacos", "PAID");

        let output = formatter.format_record(&record);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  [RESERVED ]  A1"));
        assert_eq!(
            lines[1],
            "              Vendor: Ana  (Ana's Tacos)  Payment: PAID"
        );
    }

    #[test]
    fn test_missing_fields_use_placeholders() {
        let formatter = TextFormatter::new(false);
        let record = StallRecord {
            reserved: true,
            ..StallRecord::default()
        };

        let output = formatter.format_record(&record);

        assert!(output.contains("?           Floor: ?"));
        assert!(output.contains("Type: ?"));
        assert!(output.contains("Vendor: N/A  (N/A)  Payment: N/A"));
    }

    #[test]
    fn test_summary_line() {
        let formatter = TextFormatter::new(false);
        let summary = StallSummary {
            total: 2,
            reserved: 1,
            available: 1,
        };
        assert_eq!(
            formatter.format_summary(&summary),
            "  Total: 2  |  Reserved: 1  |  Available: 1"
        );
    }

    #[test]
    fn test_report_is_framed() {
        let formatter = TextFormatter::new(false);
        let report = formatter.format_report(&sample());

        let rule = "═".repeat(60);
        assert_eq!(report.matches(&rule).count(), 4);
        assert!(report.contains("STALL MAP DATA"));
        assert!(report.contains("Total: 2  |  Reserved: 1  |  Available: 1"));

        // Server order is kept.
        let a1 = report.find("A1").unwrap();
        let a2 = report.find("A2").unwrap();
        assert!(a1 < a2);
    }

    #[test]
    fn test_empty_report() {
        let formatter = TextFormatter::new(false);
        let report = formatter.format_report(&StallMap::default());

        assert!(report.contains("(no stalls returned)"));
        assert!(report.contains("Total: 0  |  Reserved: 0  |  Available: 0"));
    }

    #[test]
    fn test_colored_report_marks_status() {
        let formatter = TextFormatter::new(true);
        let report = formatter.format_report(&sample());

        assert!(report.contains("\x1b[33mRESERVED \x1b[0m"));
        assert!(report.contains("\x1b[32mAVAILABLE\x1b[0m"));
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use super::super::json::JsonFormatter;
    use serde_json::{json, Value};
    use stallmap_core::StallMap;

    fn sample() -> StallMap {
        StallMap::from_value(json!([
            {"stallCode": "A1", "reserved": true, "vendorName": "Ana", "zone": "north"},
            {"stallCode": "A2", "reserved": false}
        ]))
        .unwrap()
    }

    #[test]
    fn test_format_stalls_is_raw_array() {
        let formatter = JsonFormatter::new(false);
        let output = formatter.format_stalls(&sample()).unwrap();

        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, json!([
            {"stallCode": "A1", "reserved": true, "vendorName": "Ana", "zone": "north"},
            {"stallCode": "A2", "reserved": false}
        ]));
    }

    #[test]
    fn test_compact_vs_pretty() {
        let compact = JsonFormatter::new(false).format_stalls(&sample()).unwrap();
        let pretty = JsonFormatter::new(true).format_stalls(&sample()).unwrap();

        assert!(!compact.contains('\n'));
        assert!(pretty.contains('\n'));
        assert_eq!(
            serde_json::from_str::<Value>(&compact).unwrap(),
            serde_json::from_str::<Value>(&pretty).unwrap()
        );
    }

    #[test]
    fn test_empty_stalls() {
        let output = JsonFormatter::new(true)
            .format_stalls(&StallMap::default())
            .unwrap();
        assert_eq!(output, "[]");
    }
}
