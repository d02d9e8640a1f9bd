//! Canonical schema constants for structured logging and events
//!
//! These constants keep tracing output and captured test events consistent.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Record identifiers
pub const FIELD_RECORD_TYPE: &str = "record_type";
pub const FIELD_RECORD_KEY: &str = "record_key";

// Request log mirroring
pub const FIELD_SEVERITY: &str = "severity";
pub const FIELD_TITLE: &str = "title";
pub const FIELD_DETAIL: &str = "detail";

// Collection sizes
pub const FIELD_CANDIDATE_COUNT: &str = "candidate_count";
pub const FIELD_CHILD_COUNT: &str = "child_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
pub const EVENT_REQUEST_LOG: &str = "request_log";
