//! Command orchestration layer.
//!
//! `request` turns a raw JSON body into a typed query, `record_query` runs
//! it, and `response` builds the envelope returned to the caller.

pub mod record_query;
pub mod request;
pub mod response;
