//! Configuration schema for the shared HTTP session.
//!
//! Settings are fixed for the lifetime of a session; a new session picks up
//! whatever is current when it is created.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Validation failures for [`ClientConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A numeric setting was out of range.
    #[error("{field} must be greater than 0")]
    NotPositive { field: &'static str },

    /// The user agent was empty.
    #[error("userAgent must not be empty")]
    EmptyUserAgent,

    /// A default header name or value could not be sent on the wire.
    #[error("invalid default header: {0}")]
    InvalidHeader(String),
}

/// Transport settings for the shared session.
///
/// Read from a JSON settings object under the `"networkable"` key. Missing
/// fields fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Request timeout in milliseconds.
    ///
    /// Covers connect, headers and body download. Must be greater than 0.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Whether to automatically follow HTTP redirects.
    #[serde(default = "default_follow_redirects")]
    pub follow_redirects: bool,

    /// Maximum number of redirects to follow.
    ///
    /// Only used when `follow_redirects` is true.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,

    /// Whether to validate SSL/TLS certificates.
    ///
    /// **Warning:** Disabling SSL validation can expose you to security risks.
    #[serde(default = "default_validate_ssl")]
    pub validate_ssl: bool,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Headers added to every request unless the request sets them itself.
    #[serde(default)]
    pub default_headers: HashMap<String, String>,

    /// Idle connections kept per host. `None` keeps the transport default.
    #[serde(default)]
    pub pool_max_idle_per_host: Option<usize>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            follow_redirects: default_follow_redirects(),
            max_redirects: default_max_redirects(),
            validate_ssl: default_validate_ssl(),
            user_agent: default_user_agent(),
            default_headers: HashMap::new(),
            pool_max_idle_per_host: None,
        }
    }
}

fn default_timeout() -> u64 {
    60_000
}

fn default_follow_redirects() -> bool {
    true
}

fn default_max_redirects() -> u32 {
    10
}

fn default_validate_ssl() -> bool {
    true
}

fn default_user_agent() -> String {
    format!("networkable/{}", env!("CARGO_PKG_VERSION"))
}

impl ClientConfig {
    /// Checks every setting, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout == 0 {
            return Err(ConfigError::NotPositive { field: "timeout" });
        }

        if self.follow_redirects && self.max_redirects == 0 {
            return Err(ConfigError::NotPositive {
                field: "maxRedirects",
            });
        }

        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::EmptyUserAgent);
        }

        for (name, value) in &self.default_headers {
            reqwest::header::HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ConfigError::InvalidHeader(name.clone()))?;
            reqwest::header::HeaderValue::from_str(value)
                .map_err(|_| ConfigError::InvalidHeader(name.clone()))?;
        }

        Ok(())
    }

    /// Request timeout as a `Duration`.
    pub fn timeout_duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout)
    }
}
