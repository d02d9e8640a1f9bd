use thiserror::Error;

use crate::model::RecordKey;

/// Result type alias using QueryError
pub type Result<T> = std::result::Result<T, QueryError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code. The codes surface in the
/// `error` field of a response envelope and in `err_code` on tracing events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    // Structural/Validation
    InvalidRequest,
    InvalidRecordType,
    InvalidOperator,
    InvalidConfig,

    // Resolution
    NotFound,

    // Collaborator
    RecordMissing,
    UnknownSublist,
    LineOutOfRange,
    FieldRead,
    SearchFailed,
    StoreUnavailable,
}

impl ErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "ERR_INVALID_REQUEST",
            ErrorKind::InvalidRecordType => "ERR_INVALID_RECORD_TYPE",
            ErrorKind::InvalidOperator => "ERR_INVALID_OPERATOR",
            ErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ErrorKind::NotFound => "ERR_NOT_FOUND",
            ErrorKind::RecordMissing => "ERR_RECORD_MISSING",
            ErrorKind::UnknownSublist => "ERR_UNKNOWN_SUBLIST",
            ErrorKind::LineOutOfRange => "ERR_LINE_OUT_OF_RANGE",
            ErrorKind::FieldRead => "ERR_FIELD_READ",
            ErrorKind::SearchFailed => "ERR_SEARCH_FAILED",
            ErrorKind::StoreUnavailable => "ERR_STORE_UNAVAILABLE",
        }
    }

    /// Whether this kind is a structural failure of the incoming request
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidRequest | ErrorKind::InvalidRecordType | ErrorKind::InvalidOperator
        )
    }
}

/// Canonical structured error type
#[derive(Debug, Clone)]
pub struct QueryError {
    kind: ErrorKind,
    op: Option<String>,
    record_type: Option<String>,
    record_key: Option<RecordKey>,
    message: String,
}

impl QueryError {
    /// Create a new error with the specified kind
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            op: None,
            record_type: None,
            record_key: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add record type context
    pub fn with_record_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = Some(record_type.into());
        self
    }

    /// Add record key context
    pub fn with_record_key(mut self, key: RecordKey) -> Self {
        self.record_key = Some(key);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn record_type(&self) -> Option<&str> {
        self.record_type.as_deref()
    }

    pub fn record_key(&self) -> Option<RecordKey> {
        self.record_key
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Render as the `error` string of a response envelope
    pub fn to_envelope_error(&self) -> String {
        if self.message.is_empty() {
            self.code().to_string()
        } else {
            format!("{}: {}", self.code(), self.message)
        }
    }
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(record_type) = &self.record_type {
            write!(f, " (record_type: {})", record_type)?;
        }
        if let Some(key) = self.record_key {
            write!(f, " (record_key: {})", key)?;
        }
        Ok(())
    }
}

impl std::error::Error for QueryError {}

// ========== End Error Facility ==========

/// Failures reported by a record store collaborator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Record not found: {record_type} {key}")]
    RecordMissing { record_type: String, key: RecordKey },

    #[error("Sublist not found on record: {sublist_id}")]
    UnknownSublist { sublist_id: String },

    #[error("Line {line} is out of range for sublist {sublist_id}")]
    LineOutOfRange { sublist_id: String, line: usize },

    #[error("Failed to read field {field_id}: {reason}")]
    FieldRead { field_id: String, reason: String },

    #[error("Search failed: {reason}")]
    SearchFailed { reason: String },

    #[error("Record store unavailable: {reason}")]
    Unavailable { reason: String },
}

impl From<StoreError> for QueryError {
    fn from(err: StoreError) -> Self {
        let message = err.to_string();
        match err {
            StoreError::RecordMissing { record_type, key } => {
                QueryError::new(ErrorKind::RecordMissing)
                    .with_record_type(record_type)
                    .with_record_key(key)
                    .with_message(message)
            }
            StoreError::UnknownSublist { .. } => {
                QueryError::new(ErrorKind::UnknownSublist).with_message(message)
            }
            StoreError::LineOutOfRange { .. } => {
                QueryError::new(ErrorKind::LineOutOfRange).with_message(message)
            }
            StoreError::FieldRead { .. } => {
                QueryError::new(ErrorKind::FieldRead).with_message(message)
            }
            StoreError::SearchFailed { .. } => {
                QueryError::new(ErrorKind::SearchFailed).with_message(message)
            }
            StoreError::Unavailable { .. } => {
                QueryError::new(ErrorKind::StoreUnavailable).with_message(message)
            }
        }
    }
}

/// Structural failures of an incoming request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Missing required property: {path}")]
    MissingProperty { path: String },

    #[error("Invalid record type '{value}' at {path}")]
    InvalidRecordType { path: String, value: String },

    #[error("Invalid search operator '{value}' at {path}")]
    InvalidOperator { path: String, value: String },

    #[error("{path} must be a non-empty list")]
    EmptyList { path: String },

    #[error("{path} must be a non-empty string")]
    EmptyString { path: String },

    #[error("{path} must hold a non-empty value")]
    EmptyValue { path: String },

    #[error("{path} has the wrong shape: {reason}")]
    WrongShape { path: String, reason: String },
}

impl From<ValidationError> for QueryError {
    fn from(err: ValidationError) -> Self {
        let kind = match &err {
            ValidationError::InvalidRecordType { .. } => ErrorKind::InvalidRecordType,
            ValidationError::InvalidOperator { .. } => ErrorKind::InvalidOperator,
            _ => ErrorKind::InvalidRequest,
        };
        QueryError::new(kind).with_message(err.to_string())
    }
}

/// Invalid engine configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("page_size {value} is outside {min}..={max}")]
    PageSizeOutOfRange { value: usize, min: usize, max: usize },

    #[error("probe_size {value} is outside {min}..={max}")]
    ProbeSizeOutOfRange { value: usize, min: usize, max: usize },

    #[error("Malformed configuration: {reason}")]
    Malformed { reason: String },
}

impl From<ConfigError> for QueryError {
    fn from(err: ConfigError) -> Self {
        QueryError::new(ErrorKind::InvalidConfig).with_message(err.to_string())
    }
}

/// Why one unit of work (a candidate, a field, a line, a relation) was skipped
///
/// Returned by per-unit boundaries and consumed by loops that log the
/// reason and move on to the next unit.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{unit}: {cause}")]
pub struct SkipReason {
    pub unit: String,
    #[source]
    pub cause: StoreError,
}

impl SkipReason {
    pub fn new(unit: impl Into<String>, cause: StoreError) -> Self {
        Self {
            unit: unit.into(),
            cause,
        }
    }

    /// The stable error code of the underlying cause
    pub fn code(&self) -> &'static str {
        QueryError::from(self.cause.clone()).code()
    }
}
