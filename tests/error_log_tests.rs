//! Error Log Integration Tests
//!
//! Tests for the complete flow including:
//! - Classification, redaction and persistence
//! - Append/read round trips and rotation
//! - Retention cleanup
//! - Statistics over stored events

use std::collections::BTreeMap;
use std::fs;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use chrono::{NaiveDate, NaiveDateTime};
use faultlog::sanitize::{MAX_DETAIL_CHARS, REDACTED, TRUNCATION_MARKER};
use faultlog::{
    sanitize, summarize, AppendOutcome, Category, ErrorHandler, Event, EventKind, LogConfig,
    LogStore, RequestContext, Severity, StatsAggregator,
};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn test_log_dir() -> std::path::PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    std::path::PathBuf::from(format!(
        "target/test_error_log_{}_{}",
        std::process::id(),
        id
    ))
}

fn cleanup_dir(path: &std::path::Path) {
    let _ = fs::remove_dir_all(path);
}

fn at(day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, day)
        .unwrap()
        .and_hms_opt(hour, minute, second)
        .unwrap()
}

fn warning(ts: NaiveDateTime, message: &str) -> Event {
    Event::new(EventKind::Database, Category::Query, Severity::Warning, message).with_timestamp(ts)
}

#[test]
fn test_append_read_round_trip() {
    let log_dir = test_log_dir();
    let store = LogStore::open(LogConfig::new(&log_dir)).expect("Failed to open store");

    let events: Vec<Event> = (0..20)
        .map(|i| warning(at(14, 10, i / 60, i % 60), &format!("event {i}")))
        .collect();
    for event in &events {
        store.append(event).expect("Failed to append");
    }

    let loaded = store.read(events[0].date(), None);
    assert_eq!(loaded, events);

    cleanup_dir(&log_dir);
}

#[test]
fn test_rotation_produces_exactly_one_archive() {
    let log_dir = test_log_dir();
    let config = LogConfig::new(&log_dir).with_rotation_bytes(4 * 1024);
    let store = LogStore::open(config).expect("Failed to open store");

    let mut trigger = None;
    for i in 0..500u32 {
        let event = warning(at(14, 12, i / 60, i % 60), &format!("{:0>120}", i));
        if let AppendOutcome::Rotated { .. } = store.append(&event).expect("Failed to append") {
            trigger = Some(event);
            break;
        }
    }

    let trigger = trigger.expect("Rotation never happened");
    let archives = store.list_archives().expect("Failed to list archives");
    assert_eq!(archives.len(), 1);
    assert!(archives[0].event_count > 1);
    assert!(archives[0].size <= 4 * 1024);

    assert_eq!(store.read(trigger.date(), None), vec![trigger]);

    cleanup_dir(&log_dir);
}

#[test]
fn test_retention_cleanup() {
    let log_dir = test_log_dir();
    let store = LogStore::open(LogConfig::new(&log_dir)).expect("Failed to open store");

    store.append(&warning(at(1, 8, 0, 0), "old")).unwrap();
    store.append(&warning(at(14, 8, 0, 0), "recent")).unwrap();

    let old_path = store.config().partition_path(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
    fs::File::options()
        .write(true)
        .open(&old_path)
        .unwrap()
        .set_modified(SystemTime::now() - Duration::from_secs(10 * 24 * 3600))
        .unwrap();

    assert_eq!(store.cleanup(7), 1);
    assert!(!old_path.exists());
    assert_eq!(store.list_dates(), vec![NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()]);

    cleanup_dir(&log_dir);
}

#[test]
fn test_sanitizer_properties() {
    let secret = sanitize("password='secret123'");
    assert!(secret.contains(REDACTED));
    assert!(!secret.contains("secret123"));

    assert!(!sanitize("contact: a@b.com").contains("a@b.com"));

    let long = sanitize(&"q".repeat(1000));
    assert!(long.chars().count() <= MAX_DETAIL_CHARS + TRUNCATION_MARKER.chars().count());
    assert!(long.ends_with(TRUNCATION_MARKER));
    assert_eq!(sanitize("0123456789"), "0123456789");

    let long_input = "w".repeat(777);
    for input in [
        "token: abc; pwd=\"x\"; mail a@b.com",
        "nothing to hide",
        long_input.as_str(),
    ] {
        let once = sanitize(input);
        assert_eq!(sanitize(&once), once);
    }
}

#[test]
fn test_ranking_is_deterministic() {
    let mut events = Vec::new();
    for (i, message) in ["A", "B", "A", "C", "B", "A", "B"].iter().enumerate() {
        events.push(warning(at(14, 9, 0, i as u32), message));
    }

    let summary = summarize(&events);
    assert_eq!(summary.top_messages[0].message, "A");
    assert_eq!(summary.top_messages[1].message, "B");
    assert_eq!(summary.top_messages[2].message, "C");
    assert_eq!(summary.top_messages[0].count, 3);
    assert_eq!(summary.top_messages[1].count, 3);
}

#[test]
fn test_handler_to_statistics_flow() {
    let log_dir = test_log_dir();
    let handler = Arc::new(ErrorHandler::from_config(LogConfig::new(&log_dir)));
    let ctx = RequestContext::new()
        .with_user("bob", "sess-9")
        .with_remote_addr("203.0.113.5")
        .with_request("GET", "/reports?api_key=abcdef")
        .with_user_agent("Mozilla/5.0");

    let connection = handler.classify_connection_failure("db1", "app", "refused", &ctx);
    assert!(connection.fatal);

    let query = handler.classify_query_failure("SELECT 1", "lock wait timeout", 1205, false, &ctx);
    assert!(!query.fatal);

    let mut context = BTreeMap::new();
    context.insert("report".to_string(), "monthly".to_string());
    handler.classify_application_fault("Report failed", &context, "missing column", false, &ctx);

    let aggregator = StatsAggregator::new(Arc::clone(handler.store()));
    let dates = handler.store().list_dates();
    let summary = aggregator.summarize_range(dates[0], *dates.last().unwrap());

    assert_eq!(summary.total, 3);
    assert_eq!(summary.fatal, 1);
    assert_eq!(summary.warning, 2);
    assert_eq!(summary.kind_count(EventKind::Database), 2);
    assert_eq!(summary.kind_count(EventKind::Application), 1);
    assert_eq!(summary.category_count(Category::Connection), 1);

    let stored = handler.store().read_range(dates[0], *dates.last().unwrap(), None);
    assert!(stored.iter().all(|e| e.actor.user == "bob"));
    assert!(stored.iter().all(|e| !e.origin.request_path.contains("abcdef")));

    cleanup_dir(&log_dir);
}
