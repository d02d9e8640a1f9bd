//! Reclink Core - record resolution, projection and relationship traversal
//!
//! This crate holds everything below the request surface:
//! - Record locators and identifier resolution against a record store
//! - Field, sublist and subrecord projection into flat snapshots
//! - Paged parent-to-child traversal with per-type deduplication
//! - The bounded per-request log returned to callers
//! - The `RecordStore` seam and an in-memory implementation
//!
//! Every stage is best-effort: a failure in one field, line, sublist,
//! candidate or relation is logged and skipped.

pub mod config;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod request_log;
pub mod store;
pub mod traversal;

// Re-export commonly used types
pub use config::EngineConfig;
pub use errors::{ErrorKind, QueryError, Result, SkipReason, StoreError};
pub use model::{
    ChildRelationSpec, ProjectionSpec, RecordKey, RecordLocator, RecordSnapshot, RecordType,
    ResponseEnvelope, TraversalResult,
};
pub use ops::{load_and_project, project, resolve, Resolution};
pub use request_log::{LogEntry, LogLimits, LogSeverity, RequestLog};
pub use store::{MemoryRecordStore, RecordStore};
pub use traversal::traverse;
