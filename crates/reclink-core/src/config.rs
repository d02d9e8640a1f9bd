//! Engine configuration
//!
//! Page and probe sizes for store searches plus the request log caps.
//! Values are validated on every construction path; a config that exists
//! is in range.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::request_log::LogLimits;

pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const MIN_PAGE_SIZE: usize = 5;
pub const MAX_PAGE_SIZE: usize = 1000;

pub const DEFAULT_PROBE_SIZE: usize = 10;
pub const MIN_PROBE_SIZE: usize = 1;
pub const MAX_PROBE_SIZE: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Page size for paged relation searches
    pub page_size: usize,

    /// Matches requested when probing one identifier candidate
    pub probe_size: usize,

    pub log_limits: LogLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            probe_size: DEFAULT_PROBE_SIZE,
            log_limits: LogLimits::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON document; missing keys take their defaults
    ///
    /// # Errors
    ///
    /// Returns `Malformed` for invalid JSON or an out-of-range error from
    /// [`EngineConfig::validate`].
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed {
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `PageSizeOutOfRange` or `ProbeSizeOutOfRange`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(ConfigError::PageSizeOutOfRange {
                value: self.page_size,
                min: MIN_PAGE_SIZE,
                max: MAX_PAGE_SIZE,
            });
        }
        if !(MIN_PROBE_SIZE..=MAX_PROBE_SIZE).contains(&self.probe_size) {
            return Err(ConfigError::ProbeSizeOutOfRange {
                value: self.probe_size,
                min: MIN_PROBE_SIZE,
                max: MAX_PROBE_SIZE,
            });
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `PageSizeOutOfRange` outside 5..=1000.
    pub fn with_page_size(mut self, page_size: usize) -> Result<Self, ConfigError> {
        self.page_size = page_size;
        self.validate()?;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `ProbeSizeOutOfRange` outside 1..=1000.
    pub fn with_probe_size(mut self, probe_size: usize) -> Result<Self, ConfigError> {
        self.probe_size = probe_size;
        self.validate()?;
        Ok(self)
    }

    pub fn with_log_limits(mut self, log_limits: LogLimits) -> Self {
        self.log_limits = log_limits;
        self
    }
}
