//! Core types shared across reclink crates
//!
//! This crate provides foundational types used by the request log,
//! the tracing facility and the engine surface:
//!
//! - **Correlation types**: RequestId, TraceId, RequestContext
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{RequestContext, RequestId, TraceId};
