#![allow(clippy::unwrap_used, clippy::expect_used)]

use reclink_core::errors::{ErrorKind, QueryError, StoreError};
use reclink_core::logging_facility::test_capture::init_test_capture;
use reclink_core::request_log::{LogLimits, RequestLog};
use reclink_core::{log_op_end, log_op_error, log_op_start};
use reclink_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_REQUEST_LOG, EVENT_START};
use reclink_core_types::{RequestContext, RequestId};
use tracing::Level;

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name);

    let start_events = capture.count_events(|e| {
        e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_START)
    });
    assert_eq!(start_events, 1);
}

#[test]
fn test_log_op_end_macro_records_duration() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let events = capture.events();
    let end_event = events
        .iter()
        .find(|e| e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_END))
        .expect("Should have end event");
    assert_eq!(end_event.field("duration_ms"), Some("42"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = StoreError::SearchFailed {
        reason: "timeout".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 10);

    let events = capture.events();
    let error_event = events
        .iter()
        .find(|e| e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_END_ERROR))
        .expect("Should have error event");
    assert_eq!(error_event.level, Level::ERROR);
    assert_eq!(error_event.field("err_code"), Some("ERR_SEARCH_FAILED"));
}

#[test]
fn test_log_op_error_accepts_query_error() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_4";

    let err = QueryError::new(ErrorKind::NotFound).with_op(op_name);
    log_op_error!(op_name, err.clone(), duration_ms = 1, record_type = "customer");

    capture.assert_event_exists(op_name, EVENT_END_ERROR);
    let events = capture.events();
    let error_event = events
        .iter()
        .find(|e| e.op.as_deref() == Some(op_name))
        .expect("Should have error event");
    assert_eq!(error_event.field("err_code"), Some("ERR_NOT_FOUND"));
    assert_eq!(error_event.field("record_type"), Some("customer"));
}

#[test]
fn test_request_log_entries_are_mirrored() {
    let capture = init_test_capture();
    let id = RequestId::from_string("req-mirror-unique-5".to_string());
    let mut log = RequestLog::with_context(RequestContext::with_request_id(id), LogLimits::default());

    log.audit("Record resolved", "customer 42");
    log.warn("Ambiguous identifier", "email matched 2 records");

    let events = capture.request_events("req-mirror-unique-5");
    assert_eq!(events.len(), 2);
    assert!(events
        .iter()
        .all(|e| e.event.as_deref() == Some(EVENT_REQUEST_LOG)));
    assert_eq!(events[0].level, Level::INFO);
    assert_eq!(events[0].field("severity"), Some("AUDIT"));
    assert_eq!(events[1].level, Level::WARN);
    assert_eq!(events[1].field("title"), Some("Ambiguous identifier"));
}

#[test]
fn test_dropped_entries_are_not_mirrored() {
    let capture = init_test_capture();
    let id = RequestId::from_string("req-cap-unique-6".to_string());
    let mut log = RequestLog::with_context(RequestContext::with_request_id(id), LogLimits::uniform(2));

    for _ in 0..10 {
        log.error("Field skipped", "injected");
    }

    assert_eq!(capture.request_events("req-cap-unique-6").len(), 2);
    assert_eq!(log.count(reclink_core::LogSeverity::Error), 10);
}

#[test]
fn test_boundary_ownership_single_start_end() {
    let capture = init_test_capture();
    let op_name = "test_boundary_ownership_unique_7";

    log_op_start!(op_name, record_type = "invoice");
    log_op_end!(op_name, duration_ms = 3);

    let starts = capture.count_events(|e| {
        e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_START)
    });
    let ends = capture.count_events(|e| {
        e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_END)
    });
    assert_eq!(starts, 1, "Should have exactly one start event");
    assert_eq!(ends, 1, "Should have exactly one end event");
}

#[test]
#[should_panic(expected = "Expected event")]
fn test_test_capture_assert_event_exists_fails() {
    let capture = init_test_capture();

    capture.assert_event_exists("nonexistent_op_truly_unique_999", EVENT_START);
}
