//! In-flight request tracking and session-wide cancellation.
//!
//! Cancellation is all-or-nothing: a session owns one token, every request
//! races against it, and there is no handle for cancelling a single request.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Registration for one in-flight request.
///
/// Dropping the guard removes the request from its tracker, so a request
/// that finishes, fails or is cancelled is always unregistered.
#[derive(Debug)]
pub struct RequestGuard {
    request_id: String,
    requests: Arc<DashMap<String, Instant>>,
}

impl RequestGuard {
    /// Identifier assigned at registration.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        self.requests.remove(&self.request_id);
    }
}

/// Tracks active HTTP requests of one session and cancels them together.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    /// Map of request IDs to the instant they were dispatched.
    requests: Arc<DashMap<String, Instant>>,

    /// Fired once when the owning session is invalidated.
    token: CancellationToken,
}

impl RequestTracker {
    /// Creates a new empty request tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a request and returns its guard.
    pub fn register(&self) -> RequestGuard {
        let request_id = Uuid::new_v4().to_string();
        self.requests.insert(request_id.clone(), Instant::now());
        RequestGuard {
            request_id,
            requests: Arc::clone(&self.requests),
        }
    }

    /// Cancels every request currently tracked and every request issued later.
    ///
    /// Returns how many requests were in flight.
    pub fn cancel_all(&self) -> usize {
        for entry in self.requests.iter() {
            log::debug!("[{}] cancelling after {:?}", entry.key(), entry.value().elapsed());
        }
        let count = self.requests.len();
        self.token.cancel();
        count
    }

    /// Whether `cancel_all` has been called.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Token that resolves when `cancel_all` is called.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Gets the number of active requests currently being tracked.
    pub fn active_count(&self) -> usize {
        self.requests.len()
    }
}
