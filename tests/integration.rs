//! Integration tests for LtvForge

use ltvforge::weekly::WeekKey;
use ltvforge::{data, top_ltv_customers, LtvConfig, LtvError, LtvRun, MAX_TOP_N};
use serde_json::Value;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

/// Create a test JSON file with a mix of event types
fn create_test_events() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[").unwrap();

    // Customer 96f55c7d8f42 - signs up, visits and orders twice
    writeln!(file, r#"{{"type": "CUSTOMER", "verb": "NEW", "key": "96f55c7d8f42", "event_time": "2017-01-06T12:46:46.384Z", "last_name": "Smith", "adr_city": "Middletown", "adr_state": "AK"}},"#).unwrap();
    writeln!(file, r#"{{"type": "SITE_VISIT", "verb": "NEW", "key": "ac05e815502f", "event_time": "2017-01-06T12:45:52.041Z", "customer_id": "96f55c7d8f42", "tags": [{{"some key": "some value"}}]}},"#).unwrap();
    writeln!(file, r#"{{"type": "IMAGE", "verb": "UPLOAD", "key": "d8ede43b1d9f", "event_time": "2017-01-06T12:47:12.344Z", "customer_id": "96f55c7d8f42", "camera_make": "Canon", "camera_model": "EOS 80D"}},"#).unwrap();
    writeln!(file, r#"{{"type": "ORDER", "verb": "NEW", "key": "68d84e5d1a43", "event_time": "2017-01-06T12:55:55.555Z", "customer_id": "96f55c7d8f42", "total_amount": "12.34 USD"}},"#).unwrap();
    writeln!(file, r#"{{"type": "ORDER", "verb": "UPDATE", "key": "68d84e5d1a44", "event_time": "2017-01-20T12:55:55.555Z", "customer_id": "96f55c7d8f42", "total_amount": "20.00 USD"}},"#).unwrap();

    // Customer 96f55c7d8f44 - one large order late in the window
    writeln!(file, r#"{{"type": "SITE_VISIT", "verb": "NEW", "key": "ac05e815502g", "event_time": "2017-01-19T08:00:00.000Z", "customer_id": "96f55c7d8f44"}},"#).unwrap();
    writeln!(file, r#"{{"type": "ORDER", "verb": "NEW", "key": "68d84e5d1a45", "event_time": "2017-01-19T08:05:00.000Z", "customer_id": "96f55c7d8f44", "total_amount": "64.50 USD"}},"#).unwrap();

    // Customer 96f55c7d8f45 - browses only
    writeln!(file, r#"{{"type": "SITE_VISIT", "verb": "NEW", "key": "ac05e815502h", "event_time": "2017-01-10T09:00:00.000Z", "customer_id": "96f55c7d8f45"}},"#).unwrap();

    // No timestamp: dropped
    writeln!(file, r#"{{"type": "ORDER", "verb": "NEW", "key": "68d84e5d1a46", "customer_id": "96f55c7d8f46", "total_amount": "999.00 USD"}}"#).unwrap();

    writeln!(file, "]").unwrap();
    file
}

#[test]
fn test_end_to_end_pipeline() {
    let test_file = create_test_events();
    let records = data::read_records(test_file.path()).unwrap();
    assert_eq!(records.len(), 9);

    let mut run = LtvRun::new(LtvConfig::default());
    for record in &records {
        run.ingest_value(record).unwrap();
    }

    // 2017-01-06 is week 1, 2017-01-20 is week 3
    let range = run.tracker().get(2017).unwrap();
    assert_eq!((range.min_week, range.max_week), (1, 3));

    let report = run.finish();
    assert_eq!(report.stats.records, 9);
    assert_eq!(report.stats.skipped_no_time, 1);
    assert_eq!(report.stats.customers, 3);
    assert_eq!(report.stats.buckets, 3 * 3);
    assert!(!report.customers.contains_key("96f55c7d8f46"));

    let first = &report.customers["96f55c7d8f42"];
    assert_eq!(first.total_site_visits, 1);
    assert_eq!(first.total_orders, 2);
    assert_eq!(first.total_weeks, 3);
    assert!((first.total_order_amount - 32.34).abs() < 1e-9);
    assert!((first.ltv - 32.34 / 3.0 * 520.0).abs() < 1e-9);

    let week_one = report
        .buckets
        .get(&WeekKey {
            customer_id: "96f55c7d8f42".to_string(),
            year: 2017,
            week: 1,
        })
        .unwrap();
    assert_eq!(week_one.site_visits, 1);
    assert_eq!(week_one.orders, 1);
    assert!((week_one.spend_per_visit - 12.34).abs() < 1e-9);

    let ranked = report.top_n(2);
    let ids: Vec<&str> = ranked.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec!["96f55c7d8f44", "96f55c7d8f42"]);
}

#[test]
fn test_output_csv() {
    let test_file = create_test_events();
    let records = data::read_records(test_file.path()).unwrap();

    let mut run = LtvRun::new(LtvConfig::default());
    for record in &records {
        run.ingest_value(record).unwrap();
    }
    let report = run.finish();
    let ranked = report.top_n(4);
    assert_eq!(ranked.len(), 3);

    let out_dir = tempdir().unwrap();
    let out_path = out_dir.path().join("output").join("top_ltvs.csv");
    data::write_csv(&out_path, &ranked, false).unwrap();

    let content = std::fs::read_to_string(&out_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "customer,ltv");
    assert_eq!(lines[1], "96f55c7d8f44,11180.00");
    assert_eq!(lines[2], "96f55c7d8f42,5605.60");
    assert_eq!(lines[3], "96f55c7d8f45,0.00");
}

#[test]
fn test_json_lines_input() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, r#"{{"type": "SITE_VISIT", "key": "v1", "event_time": "2017-01-03T10:00:00.000Z", "customer_id": "cust"}}"#).unwrap();
    writeln!(file, r#"{{"type": "ORDER", "key": "o1", "event_time": "2017-01-05T10:00:00.000Z", "customer_id": "cust", "total_amount": "10 USD"}}"#).unwrap();

    let records = data::read_records(file.path()).unwrap();
    let ranked = top_ltv_customers(5, &records, LtvConfig::default()).unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].0, "cust");
    assert!((ranked[0].1.ltv - 5200.0).abs() < 1e-9);
    assert_eq!(ranked[0].1.total_weeks, 1);
}

#[test]
fn test_idempotent_runs() {
    let test_file = create_test_events();
    let records = data::read_records(test_file.path()).unwrap();

    let first = top_ltv_customers(10, &records, LtvConfig::default()).unwrap();
    let second = top_ltv_customers(10, &records, LtvConfig::default()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_top_n_bounds() {
    let records: Vec<Value> = (0..(MAX_TOP_N + 20))
        .map(|i| {
            serde_json::json!({
                "type": "ORDER",
                "key": format!("o{i}"),
                "event_time": "2017-06-01T00:00:00.000Z",
                "customer_id": format!("c{i:04}"),
                "total_amount": format!("{}.00 USD", i + 1),
            })
        })
        .collect();

    let config = LtvConfig::default();
    assert!(top_ltv_customers(0, &records, config).unwrap().is_empty());
    assert!(top_ltv_customers(-7, &records, config).unwrap().is_empty());

    let ranked = top_ltv_customers(10_000, &records, config).unwrap();
    assert_eq!(ranked.len(), MAX_TOP_N);
    assert_eq!(ranked[0].0, format!("c{:04}", MAX_TOP_N + 19));
    assert!(ranked.windows(2).all(|w| w[0].1.ltv >= w[1].1.ltv));
}

#[test]
fn test_error_handling_malformed_records() {
    let bad_amount = vec![serde_json::json!({
        "type": "ORDER", "key": "o1", "event_time": "2017-06-01T00:00:00.000Z",
        "customer_id": "c", "total_amount": "USD 12.00"
    })];
    let err = top_ltv_customers(1, &bad_amount, LtvConfig::default()).unwrap_err();
    assert!(matches!(err, LtvError::MalformedAmount { .. }));
    assert!(err.to_string().contains("key o1"));

    let bad_time = vec![serde_json::json!({
        "type": "SITE_VISIT", "key": "v1", "event_time": "2017-06-01", "customer_id": "c"
    })];
    let err = top_ltv_customers(1, &bad_time, LtvConfig::default()).unwrap_err();
    assert!(matches!(err, LtvError::MalformedEventTime { .. }));

    let not_object = vec![serde_json::json!("ORDER")];
    let err = top_ltv_customers(1, &not_object, LtvConfig::default()).unwrap_err();
    assert!(matches!(err, LtvError::NotAnObject { index: 0 }));
}

#[test]
fn test_custom_horizon() {
    let records = vec![serde_json::json!({
        "type": "ORDER", "key": "o1", "event_time": "2017-06-01T00:00:00.000Z",
        "customer_id": "c", "total_amount": "10.00 USD"
    })];
    let config = LtvConfig {
        weeks_per_year: 52,
        years_horizon: 2,
    };
    let ranked = top_ltv_customers(1, &records, config).unwrap();
    assert!((ranked[0].1.ltv - 1040.0).abs() < 1e-9);
}
