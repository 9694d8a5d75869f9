//! Integration tests for the stall map model.

use stallmap_core::{StallMap, StallRecord};

#[test]
fn test_summary_from_server_body() {
    let body = r#"[
        {"stallCode":"A1","floorName":"Ground","stallType":"Food","reserved":true,
         "vendorName":"Ana","businessName":"Ana's Tacos","paymentStatus":"PAID"},
        {"stallCode":"A2","floorName":"Ground","stallType":"Food","reserved":false,
         "vendorName":null,"businessName":null,"paymentStatus":null}
    ]"#;

    let map = StallMap::from_json(body).unwrap();
    let summary = map.summary();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.reserved, 1);
    assert_eq!(summary.available, 1);
}

#[test]
fn test_server_order_is_preserved() {
    let body = r#"[{"stallCode":"Z9"},{"stallCode":"A1"},{"stallCode":"M5"}]"#;
    let map = StallMap::from_json(body).unwrap();

    let codes: Vec<&str> = map.records().iter().map(|r| r.stall_code.as_str()).collect();
    assert_eq!(codes, vec!["Z9", "A1", "M5"]);
}

#[test]
fn test_all_reserved() {
    let map = StallMap::from_records(vec![
        StallRecord::new("A1", "Ground", "Food").reserved_by("Ana", "Tacos", "PAID"),
        StallRecord::new("A2", "Ground", "Food").reserved_by("Ben", "Books", "PENDING"),
    ])
    .unwrap();

    let summary = map.summary();
    assert_eq!(summary.reserved, 2);
    assert_eq!(summary.available, 0);
}
