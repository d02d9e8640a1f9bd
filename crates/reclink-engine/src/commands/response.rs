//! Response envelope assembly
//!
//! Every envelope carries the request's accumulated log. When a severity
//! went over its cap, one AUDIT entry with the true totals is added first.

use serde_json::Value;

use reclink_core::errors::QueryError;
use reclink_core::model::response::{STATUS_BAD_REQUEST, STATUS_NOT_FOUND, STATUS_OK};
use reclink_core::model::{RecordSnapshot, ResponseEnvelope};
use reclink_core::request_log::RequestLog;

pub const MESSAGE_OK: &str = "Success";
pub const MESSAGE_BAD_REQUEST: &str = "Invalid request";
pub const MESSAGE_NOT_FOUND: &str = "Record not found";

/// 200 with results and no `error`
pub fn success(log: RequestLog, results: Vec<RecordSnapshot>) -> ResponseEnvelope {
    envelope(STATUS_OK, MESSAGE_OK, None, log, results, Vec::new())
}

/// 404 with empty results
pub fn not_found(log: RequestLog, err: &QueryError) -> ResponseEnvelope {
    envelope(
        STATUS_NOT_FOUND,
        MESSAGE_NOT_FOUND,
        Some(err.to_envelope_error()),
        log,
        Vec::new(),
        Vec::new(),
    )
}

/// 400 echoing the offending request in `rejects`
pub fn invalid_request(log: RequestLog, err: &QueryError, original: &Value) -> ResponseEnvelope {
    envelope(
        STATUS_BAD_REQUEST,
        MESSAGE_BAD_REQUEST,
        Some(err.to_envelope_error()),
        log,
        Vec::new(),
        vec![original.clone()],
    )
}

fn envelope(
    status: u16,
    message: &str,
    error: Option<String>,
    mut log: RequestLog,
    results: Vec<RecordSnapshot>,
    rejects: Vec<Value>,
) -> ResponseEnvelope {
    log.note_dropped();
    ResponseEnvelope {
        status,
        message: message.to_string(),
        error,
        logs: log.into_entries(),
        results,
        rejects,
    }
}
