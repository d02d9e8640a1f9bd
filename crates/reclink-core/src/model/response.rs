use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::snapshot::RecordSnapshot;
use crate::request_log::LogEntry;

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;

/// Uniform response shape for every query, whatever succeeded or failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub logs: Vec<LogEntry>,
    pub results: Vec<RecordSnapshot>,

    #[serde(default)]
    pub rejects: Vec<Value>,
}

impl ResponseEnvelope {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }
}
