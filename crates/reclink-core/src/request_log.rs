//! Request-scoped bounded log
//!
//! A `RequestLog` is created per request and passed by `&mut` through every
//! step of a query. It keeps a `{count, limit}` counter per severity: an
//! entry is kept only while `count < limit`, but `count` always advances so
//! the true total survives the cap. Kept entries are mirrored to `tracing`;
//! dropped ones are not, so a pathological fan-out cannot flood the host's
//! log sink.

use chrono::{DateTime, Utc};
use reclink_core_types::{RequestContext, RequestId};
use serde::{Deserialize, Serialize};

/// Severity of a request log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogSeverity {
    Debug,
    Audit,
    Warn,
    Error,
}

impl LogSeverity {
    pub const ALL: [LogSeverity; 4] = [
        LogSeverity::Debug,
        LogSeverity::Audit,
        LogSeverity::Warn,
        LogSeverity::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Audit => "AUDIT",
            LogSeverity::Warn => "WARN",
            LogSeverity::Error => "ERROR",
        }
    }

    fn index(self) -> usize {
        match self {
            LogSeverity::Debug => 0,
            LogSeverity::Audit => 1,
            LogSeverity::Warn => 2,
            LogSeverity::Error => 3,
        }
    }
}

impl std::fmt::Display for LogSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One visible entry of the request log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub severity: LogSeverity,
    pub title: String,
    pub detail: String,
}

/// Per-severity caps on visible entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogLimits {
    pub debug: usize,
    pub audit: usize,
    pub warn: usize,
    pub error: usize,
}

impl LogLimits {
    pub const DEFAULT_LIMIT: usize = 100;

    /// The same cap for every severity
    pub fn uniform(limit: usize) -> Self {
        Self {
            debug: limit,
            audit: limit,
            warn: limit,
            error: limit,
        }
    }

    pub fn limit_for(&self, severity: LogSeverity) -> usize {
        match severity {
            LogSeverity::Debug => self.debug,
            LogSeverity::Audit => self.audit,
            LogSeverity::Warn => self.warn,
            LogSeverity::Error => self.error,
        }
    }
}

impl Default for LogLimits {
    fn default() -> Self {
        Self::uniform(Self::DEFAULT_LIMIT)
    }
}

/// Count of log calls at one severity against its cap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounter {
    pub count: usize,
    pub limit: usize,
}

impl SeverityCounter {
    pub fn dropped(&self) -> usize {
        self.count.saturating_sub(self.limit)
    }
}

/// Bounded, severity-tagged log owned by a single request
#[derive(Debug, Clone)]
pub struct RequestLog {
    context: RequestContext,
    counters: [SeverityCounter; 4],
    entries: Vec<LogEntry>,
}

impl RequestLog {
    /// New log for a fresh request
    pub fn new(limits: LogLimits) -> Self {
        Self::with_context(RequestContext::new(), limits)
    }

    /// New log for a request whose context the transport already created
    pub fn with_context(context: RequestContext, limits: LogLimits) -> Self {
        let counters = LogSeverity::ALL.map(|severity| SeverityCounter {
            count: 0,
            limit: limits.limit_for(severity),
        });
        Self {
            context,
            counters,
            entries: Vec::new(),
        }
    }

    pub fn request_id(&self) -> &RequestId {
        &self.context.request_id
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Record a log call; returns whether the entry was kept
    pub fn log(
        &mut self,
        severity: LogSeverity,
        title: impl Into<String>,
        detail: impl Into<String>,
    ) -> bool {
        let counter = &mut self.counters[severity.index()];
        counter.count += 1;
        if counter.count > counter.limit {
            return false;
        }

        let entry = LogEntry {
            timestamp: Utc::now(),
            severity,
            title: title.into(),
            detail: detail.into(),
        };
        self.mirror(&entry);
        self.entries.push(entry);
        true
    }

    pub fn debug(&mut self, title: impl Into<String>, detail: impl Into<String>) -> bool {
        self.log(LogSeverity::Debug, title, detail)
    }

    pub fn audit(&mut self, title: impl Into<String>, detail: impl Into<String>) -> bool {
        self.log(LogSeverity::Audit, title, detail)
    }

    pub fn warn(&mut self, title: impl Into<String>, detail: impl Into<String>) -> bool {
        self.log(LogSeverity::Warn, title, detail)
    }

    pub fn error(&mut self, title: impl Into<String>, detail: impl Into<String>) -> bool {
        self.log(LogSeverity::Error, title, detail)
    }

    /// Every log call made at `severity`, kept or not
    pub fn count(&self, severity: LogSeverity) -> usize {
        self.counters[severity.index()].count
    }

    pub fn counter(&self, severity: LogSeverity) -> SeverityCounter {
        self.counters[severity.index()]
    }

    /// Whether any severity went over its cap
    pub fn any_dropped(&self) -> bool {
        self.counters.iter().any(|c| c.dropped() > 0)
    }

    /// Log one AUDIT entry with true totals when a cap was hit
    pub fn note_dropped(&mut self) {
        if !self.any_dropped() {
            return;
        }
        let totals: Vec<String> = LogSeverity::ALL
            .iter()
            .map(|s| {
                let c = self.counter(*s);
                format!("{}={} (dropped {})", s, c.count, c.dropped())
            })
            .collect();
        self.audit("Log entries dropped", totals.join(", "));
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }

    fn mirror(&self, entry: &LogEntry) {
        let request_id = self.context.request_id.as_str();
        let trace_id = self.context.trace_str();
        match entry.severity {
            LogSeverity::Debug => tracing::debug!(
                component = module_path!(),
                event = reclink_core_types::schema::EVENT_REQUEST_LOG,
                request_id,
                trace_id,
                severity = entry.severity.as_str(),
                title = entry.title.as_str(),
                detail = entry.detail.as_str(),
            ),
            LogSeverity::Audit => tracing::info!(
                component = module_path!(),
                event = reclink_core_types::schema::EVENT_REQUEST_LOG,
                request_id,
                trace_id,
                severity = entry.severity.as_str(),
                title = entry.title.as_str(),
                detail = entry.detail.as_str(),
            ),
            LogSeverity::Warn => tracing::warn!(
                component = module_path!(),
                event = reclink_core_types::schema::EVENT_REQUEST_LOG,
                request_id,
                trace_id,
                severity = entry.severity.as_str(),
                title = entry.title.as_str(),
                detail = entry.detail.as_str(),
            ),
            LogSeverity::Error => tracing::error!(
                component = module_path!(),
                event = reclink_core_types::schema::EVENT_REQUEST_LOG,
                request_id,
                trace_id,
                severity = entry.severity.as_str(),
                title = entry.title.as_str(),
                detail = entry.detail.as_str(),
            ),
        }
    }
}
