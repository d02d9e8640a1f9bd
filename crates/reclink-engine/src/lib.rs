//! Reclink Engine - request surface
//!
//! Parses and validates wire requests, runs them against a record store
//! through `reclink-core`, and assembles the response envelope.

pub mod commands;

pub use commands::record_query::{apply_record_query, apply_related_query, apply_request};
pub use commands::request::{parse_request, RecordQuery};
