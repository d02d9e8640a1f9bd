//! Record queries: the single-record and related-record entry points.
//!
//! # Logging Ownership
//!
//! `apply_request` owns the process-level lifecycle events:
//! - `log_op_start!` at entry
//! - `log_op_end!` on a 200 or 404 envelope
//! - `log_op_error!` on a 400 envelope
//!
//! Everything a caller should see goes into the request's `RequestLog`.

use serde_json::Value;

use reclink_core::config::EngineConfig;
use reclink_core::errors::{ErrorKind, QueryError, Result};
use reclink_core::model::{
    ChildRelationSpec, ProjectionSpec, RecordKey, RecordLocator, RecordSnapshot, ResponseEnvelope,
};
use reclink_core::ops::{load_and_project, resolve};
use reclink_core::request_log::RequestLog;
use reclink_core::store::RecordStore;
use reclink_core::traversal::traverse;
use reclink_core::{log_op_end, log_op_error, log_op_start};
use reclink_core_types::RequestContext;

use crate::commands::request::{parse_request, RecordQuery};
use crate::commands::response;

/// Validate and run one raw request, always producing an envelope.
///
/// ## Returns
///
/// - 400 when the body is structurally invalid; `rejects` holds the body
/// - 404 when the locator matched nothing
/// - 200 otherwise, with `results` populated
pub fn apply_request(
    store: &dyn RecordStore,
    raw: &Value,
    config: &EngineConfig,
    context: RequestContext,
) -> ResponseEnvelope {
    let mut log = RequestLog::with_context(context, config.log_limits);
    let request_id = log.request_id().as_str().to_string();
    log_op_start!("apply_request", request_id = request_id.as_str());
    let start = std::time::Instant::now();

    let query = match parse_request(raw) {
        Ok(query) => query,
        Err(e) => {
            let err = QueryError::from(e).with_op("apply_request");
            log.error("Invalid request", err.message().to_string());
            log_op_error!(
                "apply_request",
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = request_id.as_str()
            );
            return response::invalid_request(log, &err, raw);
        }
    };

    let outcome = match &query {
        RecordQuery::Record {
            locator,
            projection,
        } => apply_record_query(store, locator, projection, config, &mut log),
        RecordQuery::Related { parent, children } => {
            apply_related_query(store, parent, children, config, &mut log)
        }
    };

    let envelope = match outcome {
        Ok(results) => response::success(log, results),
        Err(err) => response::not_found(log, &err),
    };
    log_op_end!(
        "apply_request",
        duration_ms = start.elapsed().as_millis() as u64,
        request_id = request_id.as_str(),
        status = envelope.status
    );
    envelope
}

/// Resolve `locator` and project the record it names.
///
/// ## Errors
///
/// - `NotFound`: no candidate matched
pub fn apply_record_query(
    store: &dyn RecordStore,
    locator: &RecordLocator,
    projection: &ProjectionSpec,
    config: &EngineConfig,
    log: &mut RequestLog,
) -> Result<Vec<RecordSnapshot>> {
    let key = resolve_required(store, locator, config, log, "record_query")?;
    Ok(vec![load_and_project(
        store,
        locator.record_type,
        key,
        projection,
        log,
    )])
}

/// Resolve the parent and collect its children for every relation.
///
/// The parent itself is not part of the results.
///
/// ## Errors
///
/// - `NotFound`: no candidate matched the parent
pub fn apply_related_query(
    store: &dyn RecordStore,
    parent: &RecordLocator,
    children: &[ChildRelationSpec],
    config: &EngineConfig,
    log: &mut RequestLog,
) -> Result<Vec<RecordSnapshot>> {
    let parent_key = resolve_required(store, parent, config, log, "related_query")?;
    let result = traverse(store, parent_key, children, config, log);
    Ok(result.into_snapshots())
}

fn resolve_required(
    store: &dyn RecordStore,
    locator: &RecordLocator,
    config: &EngineConfig,
    log: &mut RequestLog,
    op: &str,
) -> Result<RecordKey> {
    resolve(store, locator, config, log).key().ok_or_else(|| {
        log.debug(
            "Identifier options exhausted",
            format!(
                "{} candidate(s) tried for {}",
                locator.candidates.len(),
                locator.record_type
            ),
        );
        QueryError::new(ErrorKind::NotFound)
            .with_op(op)
            .with_record_type(locator.record_type.as_str())
            .with_message(format!(
                "no identifier option matched a {} record",
                locator.record_type
            ))
    })
}
