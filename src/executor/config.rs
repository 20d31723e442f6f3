//! HTTP request execution configuration.
//!
//! An `ExecutionConfig` is a snapshot of the global [`ClientConfig`] taken
//! when a session is created.

use crate::config::{get_config, ClientConfig};
use crate::executor::error::RequestError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use std::collections::HashMap;
use std::time::Duration;

/// Settings used to build one session's HTTP client.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionConfig {
    /// Total request timeout.
    pub timeout: Duration,

    /// Redirect limit; `None` disables redirects.
    pub max_redirects: Option<u32>,

    /// Whether invalid certificates are rejected.
    pub validate_ssl: bool,

    /// User-Agent header.
    pub user_agent: String,

    /// Headers sent with every request.
    pub default_headers: HashMap<String, String>,

    /// Idle connections kept per host.
    pub pool_max_idle_per_host: Option<usize>,
}

impl ExecutionConfig {
    /// Creates an ExecutionConfig with the given timeout and defaults elsewhere.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::from(&ClientConfig::default())
        }
    }

    /// Creates an ExecutionConfig from the global configuration.
    pub fn from_global_config() -> Self {
        Self::from(&get_config())
    }

    /// Builds the reqwest client for a session.
    pub fn build_client(&self) -> Result<reqwest::Client, RequestError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.default_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| RequestError::Session(format!("invalid header name {:?}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| RequestError::Session(format!("invalid header value: {}", e)))?;
            headers.insert(name, value);
        }

        let redirect = match self.max_redirects {
            Some(limit) => Policy::limited(limit as usize),
            None => Policy::none(),
        };

        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .default_headers(headers)
            .redirect(redirect)
            .danger_accept_invalid_certs(!self.validate_ssl)
            .gzip(true)
            .brotli(true)
            .deflate(true);

        if let Some(idle) = self.pool_max_idle_per_host {
            builder = builder.pool_max_idle_per_host(idle);
        }

        builder
            .build()
            .map_err(|e| RequestError::Session(e.to_string()))
    }
}

impl Default for ExecutionConfig {
    /// Reads the global configuration.
    fn default() -> Self {
        Self::from_global_config()
    }
}

impl From<&ClientConfig> for ExecutionConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            timeout: config.timeout_duration(),
            max_redirects: config.follow_redirects.then_some(config.max_redirects),
            validate_ssl: config.validate_ssl,
            user_agent: config.user_agent.clone(),
            default_headers: config.default_headers.clone(),
            pool_max_idle_per_host: config.pool_max_idle_per_host,
        }
    }
}
