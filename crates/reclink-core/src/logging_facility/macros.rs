//! Canonical logging macros
//!
//! The request entry point brackets each request with these, so the host
//! sees one start and one end (or end_error) event per request id. Core
//! operations below it log through the request's `RequestLog` instead.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use reclink_core::log_op_start;
/// # use reclink_core::request_log::{LogLimits, RequestLog};
/// let log = RequestLog::new(LogLimits::default());
/// log_op_start!("apply_request", request_id = log.request_id().as_str());
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = reclink_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = reclink_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use reclink_core::log_op_end;
/// let status: u16 = 404;
/// log_op_end!("apply_request", duration_ms = 3, status = status);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = reclink_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = reclink_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// # Example
///
/// ```
/// # use reclink_core::log_op_error;
/// # use reclink_core::errors::ValidationError;
/// let err = ValidationError::EmptyList {
///     path: "idOptions".to_string(),
/// };
/// log_op_error!("apply_request", err, duration_ms = 1);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        use $crate::errors::QueryError;
        let q_err: QueryError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = reclink_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?q_err.kind(),
            err_code = q_err.code(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        use $crate::errors::QueryError;
        let q_err: QueryError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = reclink_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?q_err.kind(),
            err_code = q_err.code(),
            $($field)*
        );
    }};
}
