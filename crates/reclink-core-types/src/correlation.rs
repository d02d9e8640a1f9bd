//! Correlation types for request tracking and tracing
//!
//! Every query runs inside one request. These types let the request log,
//! the tracing mirror and the transport agree on which request an entry
//! belongs to.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new random RequestId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (e.g. an id assigned by the transport)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trace identifier propagated from the caller, if it supplied one
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceId(String);

impl TraceId {
    /// Generate a new random TraceId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context carried through a single request for correlation
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub trace_id: Option<TraceId>,
}

impl RequestContext {
    /// Create a new context with a fresh RequestId
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            trace_id: None,
        }
    }

    /// Create a context with an existing RequestId
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            trace_id: None,
        }
    }

    /// Add a TraceId to the context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// The trace id as a string, or empty when the caller supplied none
    pub fn trace_str(&self) -> &str {
        self.trace_id.as_ref().map(TraceId::as_str).unwrap_or("")
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_generation() {
        let id1 = RequestId::new();
        let id2 = RequestId::new();

        assert_ne!(id1, id2);
        assert!(!id1.as_str().is_empty());
    }

    #[test]
    fn test_request_id_display() {
        let id = RequestId::from_string("req-1".to_string());
        assert_eq!(format!("{}", id), "req-1");
    }

    #[test]
    fn test_request_context_without_trace() {
        let ctx = RequestContext::new();
        assert!(!ctx.request_id.as_str().is_empty());
        assert!(ctx.trace_id.is_none());
        assert_eq!(ctx.trace_str(), "");
    }

    #[test]
    fn test_request_context_with_trace_id() {
        let trace_id = TraceId::from_string("trace-9".to_string());
        let ctx = RequestContext::new().with_trace_id(trace_id.clone());

        assert_eq!(ctx.trace_id, Some(trace_id));
        assert_eq!(ctx.trace_str(), "trace-9");
    }

    #[test]
    fn test_serialization() {
        let id = RequestId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: RequestId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
