//! Raw transport responses.
//!
//! The response is whatever the transport produced. Status codes are carried
//! for inspection but are never turned into errors here.

use std::collections::HashMap;
use std::time::Duration;

/// Status, headers and body bytes of one completed exchange.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,

    /// Canonical reason phrase, or "Unknown".
    pub status_text: String,

    /// Headers keyed by lowercase name. Repeated headers are folded into
    /// one value and non-UTF-8 bytes are replaced, so this is a lossy view
    /// of the wire headers.
    pub headers: HashMap<String, String>,

    /// Body bytes, untouched. JSON and images alike pass through as-is.
    pub body: Vec<u8>,

    /// Time from dispatch to the last body byte.
    pub duration: Duration,
}

impl HttpResponse {
    /// An empty response with the given status line.
    pub fn new(status_code: u16, status_text: String) -> Self {
        Self {
            status_code,
            status_text,
            headers: HashMap::new(),
            body: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    fn status_class(&self) -> u16 {
        self.status_code / 100
    }

    /// 2xx.
    pub fn is_success(&self) -> bool {
        self.status_class() == 2
    }

    /// 4xx.
    pub fn is_client_error(&self) -> bool {
        self.status_class() == 4
    }

    /// 5xx.
    pub fn is_server_error(&self) -> bool {
        self.status_class() == 5
    }

    /// Looks up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find_map(|(key, value)| key.eq_ignore_ascii_case(name).then_some(value.as_str()))
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    pub fn set_body(&mut self, body: Vec<u8>) {
        self.body = body;
    }

    /// Consumes the response, keeping only the body bytes.
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}
