//! Transport seam and the shared session lifecycle.
//!
//! A [`Transport`] is anything that can execute a prepared request
//! asynchronously and cancel everything it has in flight. The
//! [`SessionManager`] owns at most one transport at a time, creating it on
//! first use and dropping it on invalidation.

use crate::executor::error::RequestError;
use crate::models::{HttpResponse, PreparedRequest};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Minimal async HTTP transport.
///
/// Implementations must be safe for concurrent use by many in-flight
/// requests. Errors are handed to callers unchanged, and HTTP status codes
/// are not errors.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Executes one request and returns whatever the transport produced.
    async fn execute(&self, request: PreparedRequest) -> Result<HttpResponse, RequestError>;

    /// Cancels every request in flight on this transport.
    fn cancel_all(&self);

    /// Number of requests currently in flight, if the transport tracks them.
    fn active_request_count(&self) -> usize {
        0
    }
}

/// Creates fresh sessions for a [`SessionManager`].
pub trait SessionFactory: Send + Sync + 'static {
    /// The transport produced by this factory.
    type Session: Transport;

    /// Builds a new session.
    fn create_session(&self) -> Result<Self::Session, RequestError>;
}

/// Blanket impl so closures can act as factories.
impl<S, F> SessionFactory for F
where
    S: Transport,
    F: Fn() -> Result<S, RequestError> + Send + Sync + 'static,
{
    type Session = S;

    fn create_session(&self) -> Result<S, RequestError> {
        self()
    }
}

/// Owns the current session and recreates it after invalidation.
///
/// There is no persistent "cancelled" state: after [`invalidate`] the next
/// call to [`current`] builds a new session.
///
/// [`invalidate`]: SessionManager::invalidate
/// [`current`]: SessionManager::current
pub struct SessionManager<F: SessionFactory> {
    factory: F,
    current: Mutex<Option<Arc<F::Session>>>,
}

impl<F: SessionFactory> SessionManager<F> {
    /// Creates a manager. No session is built until first use.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            current: Mutex::new(None),
        }
    }

    /// Returns the current session, creating one if needed.
    pub fn current(&self) -> Result<Arc<F::Session>, RequestError> {
        let mut slot = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(session) = slot.as_ref() {
            return Ok(Arc::clone(session));
        }

        log::debug!("creating HTTP session");
        let session = Arc::new(self.factory.create_session()?);
        *slot = Some(Arc::clone(&session));
        Ok(session)
    }

    /// Cancels all outstanding requests and drops the current session.
    ///
    /// Returns `false` if there was no session to invalidate.
    pub fn invalidate(&self) -> bool {
        let session = self
            .current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();

        match session {
            Some(session) => {
                log::debug!("invalidating HTTP session");
                session.cancel_all();
                true
            }
            None => false,
        }
    }

    /// Returns the current session without creating one.
    pub fn peek(&self) -> Option<Arc<F::Session>> {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(Arc::clone)
    }

    /// Whether a session currently exists.
    pub fn is_active(&self) -> bool {
        self.current
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }
}

/// Object-safe view of a [`SessionManager`], independent of its factory.
pub trait SessionSource: Send + Sync {
    /// The current transport, created on demand.
    fn transport(&self) -> Result<Arc<dyn Transport>, RequestError>;

    /// Cancels and drops the current transport.
    fn invalidate_session(&self) -> bool;

    /// In-flight requests on the current transport, without creating one.
    fn active_request_count(&self) -> usize;
}

impl<F: SessionFactory> SessionSource for SessionManager<F> {
    fn transport(&self) -> Result<Arc<dyn Transport>, RequestError> {
        let session: Arc<dyn Transport> = self.current()?;
        Ok(session)
    }

    fn invalidate_session(&self) -> bool {
        self.invalidate()
    }

    fn active_request_count(&self) -> usize {
        self.peek()
            .map(|session| session.active_request_count())
            .unwrap_or(0)
    }
}

impl<F: SessionFactory + std::fmt::Debug> std::fmt::Debug for SessionManager<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("factory", &self.factory)
            .field("active", &self.is_active())
            .finish()
    }
}
