//! Native HTTP transport using reqwest.
//!
//! One [`ReqwestSession`] wraps one `reqwest::Client`, so connections are
//! pooled for the lifetime of the session and configuration is fixed when
//! it is built.

use crate::executor::cancellation::RequestTracker;
use crate::executor::config::ExecutionConfig;
use crate::executor::error::RequestError;
use crate::executor::session::{SessionFactory, Transport};
use crate::models::{HttpResponse, PreparedRequest};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, SET_COOKIE};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::Instant;

/// A reqwest-backed session.
#[derive(Debug, Clone)]
pub struct ReqwestSession {
    client: reqwest::Client,
    tracker: RequestTracker,
}

impl ReqwestSession {
    /// Creates a session from an execution config.
    pub fn new(config: &ExecutionConfig) -> Result<Self, RequestError> {
        Ok(Self::with_client(config.build_client()?))
    }

    /// Creates a session around an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            tracker: RequestTracker::new(),
        }
    }

    /// In-flight request bookkeeping for this session.
    pub fn tracker(&self) -> &RequestTracker {
        &self.tracker
    }

    async fn send(&self, request: PreparedRequest) -> Result<HttpResponse, RequestError> {
        let start_time = Instant::now();

        let mut req_builder = self
            .client
            .request(request.method.into(), request.url.as_str());

        for (name, value) in &request.headers {
            req_builder = req_builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        let response = req_builder.send().await?;

        let status_code = response.status().as_u16();
        let status_text = response
            .status()
            .canonical_reason()
            .unwrap_or("Unknown")
            .to_string();

        let headers = collect_headers(response.headers());
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status_code,
            status_text,
            headers,
            body,
            duration: start_time.elapsed(),
        })
    }
}

/// Flattens a header map into one string per lowercase name.
///
/// Repeated headers are joined with `", "`; `set-cookie` values, which may
/// contain commas, are joined with `'\n'`. Values that are not valid UTF-8
/// are decoded lossily.
pub(crate) fn collect_headers(map: &HeaderMap) -> HashMap<String, String> {
    let mut headers: HashMap<String, String> = HashMap::new();
    for (name, value) in map {
        let value = String::from_utf8_lossy(value.as_bytes());
        match headers.entry(name.as_str().to_string()) {
            Entry::Occupied(mut joined) => {
                let joined = joined.get_mut();
                joined.push_str(if *name == SET_COOKIE { "\n" } else { ", " });
                joined.push_str(&value);
            }
            Entry::Vacant(slot) => {
                slot.insert(value.into_owned());
            }
        }
    }
    headers
}

#[async_trait]
impl Transport for ReqwestSession {
    async fn execute(&self, request: PreparedRequest) -> Result<HttpResponse, RequestError> {
        if self.tracker.is_cancelled() {
            return Err(RequestError::Cancelled);
        }

        let guard = self.tracker.register();
        log::debug!(
            "[{}] {} {}",
            guard.request_id(),
            request.method,
            request.url
        );

        tokio::select! {
            _ = self.tracker.token().cancelled() => {
                log::debug!("[{}] cancelled", guard.request_id());
                Err(RequestError::Cancelled)
            }
            result = self.send(request) => result,
        }
    }

    fn cancel_all(&self) {
        let count = self.tracker.cancel_all();
        log::debug!("cancelled {} in-flight request(s)", count);
    }

    fn active_request_count(&self) -> usize {
        self.tracker.active_count()
    }
}

/// Builds [`ReqwestSession`]s.
///
/// With no fixed config, every new session snapshots the global
/// configuration, so settings changed after `cancel_requests()` apply to
/// the next session.
#[derive(Debug, Clone, Default)]
pub struct ReqwestSessionFactory {
    config: Option<ExecutionConfig>,
}

impl ReqwestSessionFactory {
    /// Factory reading the global configuration at each session creation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory that always uses `config`.
    pub fn with_config(config: ExecutionConfig) -> Self {
        Self {
            config: Some(config),
        }
    }
}

impl SessionFactory for ReqwestSessionFactory {
    type Session = ReqwestSession;

    fn create_session(&self) -> Result<ReqwestSession, RequestError> {
        match &self.config {
            Some(config) => ReqwestSession::new(config),
            None => ReqwestSession::new(&ExecutionConfig::from_global_config()),
        }
    }
}
