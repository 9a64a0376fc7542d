//! API client configuration.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration:
//!
//! ```toml
//! base_url = "https://www.google.com/m8/feeds/"
//! protocol_version = "3"
//! default_max_results = 100000
//! batch_retry_delay_secs = 30
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ContactsError, ContactsResult};

/// Feed root all request paths are relative to.
pub const DEFAULT_BASE_URL: &str = "https://www.google.com/m8/feeds/";

/// Protocol version sent as the `v` query parameter.
pub const DEFAULT_PROTOCOL_VERSION: &str = "3";

/// `max-results` used by listing calls that do not set one.
pub const DEFAULT_MAX_RESULTS: u32 = 100_000;

/// Delay before the single retry of a batch that failed with a server error.
pub const RETRY_BATCH_DELAY_AFTER_ERROR: Duration = Duration::from_secs(30);

/// Settings for [`Api`](crate::Api).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Feed root; request paths are appended to it verbatim.
    pub base_url: String,

    /// Default value of the `v` query parameter.
    pub protocol_version: String,

    /// Default `max-results` for listing calls.
    pub default_max_results: u32,

    /// Seconds to wait before retrying a failed batch.
    pub batch_retry_delay_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            protocol_version: DEFAULT_PROTOCOL_VERSION.to_string(),
            default_max_results: DEFAULT_MAX_RESULTS,
            batch_retry_delay_secs: RETRY_BATCH_DELAY_AFTER_ERROR.as_secs(),
        }
    }
}

impl ApiConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(content: &str) -> ContactsResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            ContactsError::configuration(format!("failed to parse config: {}", e)).with_source(e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates configuration from a TOML file.
    pub fn load_from(path: impl AsRef<Path>) -> ContactsResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ContactsError::configuration(format!(
                "failed to read config {}: {}",
                path.as_ref().display(),
                e
            ))
            .with_source(e)
        })?;
        Self::from_toml_str(&content)
    }

    /// Sets the feed root. Must end with `/`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the default `v` query parameter.
    pub fn with_protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol_version = version.into();
        self
    }

    /// Sets the `max-results` used when a listing does not give one.
    pub fn with_default_max_results(mut self, max_results: u32) -> Self {
        self.default_max_results = max_results;
        self
    }

    /// Sets how long a failed batch waits before its retry.
    pub fn with_batch_retry_delay(mut self, delay: Duration) -> Self {
        self.batch_retry_delay_secs = delay.as_secs();
        self
    }

    /// Delay before retrying a failed batch.
    pub fn batch_retry_delay(&self) -> Duration {
        Duration::from_secs(self.batch_retry_delay_secs)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ContactsResult<()> {
        let url = url::Url::parse(&self.base_url).map_err(|e| {
            ContactsError::configuration(format!("invalid base_url {:?}: {}", self.base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ContactsError::configuration(format!(
                "base_url must be http or https, got {}",
                url.scheme()
            )));
        }
        if !self.base_url.ends_with('/') {
            return Err(ContactsError::configuration("base_url must end with '/'"));
        }
        if self.protocol_version.trim().is_empty() {
            return Err(ContactsError::configuration(
                "protocol_version cannot be empty",
            ));
        }
        Ok(())
    }
}
