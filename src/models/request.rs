//! HTTP request data models.
//!
//! This module defines the method enumeration, the query mapping and the
//! fully composed request handed to a transport.

use std::collections::HashMap;
use std::str::FromStr;
use url::Url;

/// Query parameters appended to a request URL.
///
/// Ordering is not part of the contract: items are appended in map
/// iteration order.
pub type Query = HashMap<String, String>;

/// HTTP request method.
///
/// The string form of each case is its uppercase name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    GET,
    PUT,
    POST,
    PATCH,
    DELETE,
    TRACE,
    HEAD,
    OPTIONS,
    CONNECT,
}

impl HttpMethod {
    /// Every method, in declaration order.
    pub const ALL: [HttpMethod; 9] = [
        HttpMethod::GET,
        HttpMethod::PUT,
        HttpMethod::POST,
        HttpMethod::PATCH,
        HttpMethod::DELETE,
        HttpMethod::TRACE,
        HttpMethod::HEAD,
        HttpMethod::OPTIONS,
        HttpMethod::CONNECT,
    ];

    /// Returns the uppercase wire name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::PUT => "PUT",
            HttpMethod::POST => "POST",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::TRACE => "TRACE",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
            HttpMethod::CONNECT => "CONNECT",
        }
    }

    /// Whether a request body is meaningful for this method.
    ///
    /// Bodies passed with other methods are still forwarded; this is only a
    /// hint for callers building requests.
    pub fn allows_body(&self) -> bool {
        matches!(
            self,
            HttpMethod::PUT | HttpMethod::POST | HttpMethod::PATCH | HttpMethod::DELETE
        )
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    /// Parses a method name case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .iter()
            .copied()
            .find(|method| method.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown HTTP method: {}", s))
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::GET => reqwest::Method::GET,
            HttpMethod::PUT => reqwest::Method::PUT,
            HttpMethod::POST => reqwest::Method::POST,
            HttpMethod::PATCH => reqwest::Method::PATCH,
            HttpMethod::DELETE => reqwest::Method::DELETE,
            HttpMethod::TRACE => reqwest::Method::TRACE,
            HttpMethod::HEAD => reqwest::Method::HEAD,
            HttpMethod::OPTIONS => reqwest::Method::OPTIONS,
            HttpMethod::CONNECT => reqwest::Method::CONNECT,
        }
    }
}

/// A request ready for dispatch.
///
/// The query has already been merged into `url`; `body` is raw,
/// pre-serialized bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    /// Method sent on the wire.
    pub method: HttpMethod,

    /// Final URL including query items.
    pub url: Url,

    /// Extra headers for this request only.
    pub headers: HashMap<String, String>,

    /// Optional payload.
    pub body: Option<Vec<u8>>,
}

impl PreparedRequest {
    /// Creates a request without headers or body.
    pub fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    /// Sets the request body.
    pub fn set_body(&mut self, body: Vec<u8>) {
        self.body = Some(body);
    }

    /// Checks if the request has a non-empty body.
    pub fn has_body(&self) -> bool {
        self.body.as_ref().map_or(false, |b| !b.is_empty())
    }

    /// Content-Type set on this request, matched case-insensitively.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find_map(|(k, v)| k.eq_ignore_ascii_case("content-type").then_some(v.as_str()))
    }
}
