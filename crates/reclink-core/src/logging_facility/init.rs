//! Logging initialization module

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output for development
    Development,
    /// JSON structured output for production
    Production,
    /// Bare registry; tests install their own capture layer
    Test,
}

impl Profile {
    fn default_directive(&self) -> &'static str {
        match self {
            Profile::Development => "reclink=debug",
            Profile::Production | Profile::Test => "reclink=info",
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// Only the first call has any effect. `RUST_LOG` overrides the profile's
/// default filter.
///
/// # Example
///
/// ```
/// use reclink_core::logging_facility::{init, Profile};
///
/// init(Profile::Production);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(profile.default_directive()));
        match profile {
            Profile::Development => {
                tracing_subscriber::fmt().with_env_filter(filter).init();
            }
            Profile::Production => {
                tracing_subscriber::fmt().json().with_env_filter(filter).init();
            }
            Profile::Test => {
                tracing_subscriber::registry().init();
            }
        }
    });
}
