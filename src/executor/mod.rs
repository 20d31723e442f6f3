//! HTTP request executor.
//!
//! [`NetworkClient`] composes the final URL, dispatches the request on the
//! current session and hands back exactly what the transport produced. A
//! URL that cannot be composed is a silent no-op: no completion happens.
//!
//! Cancellation is global. [`NetworkClient::cancel_requests`] invalidates
//! the session and cancels everything in flight; the next request
//! transparently gets a new session.

pub mod cancellation;
pub mod config;
pub mod error;
pub mod native;
pub mod session;

pub use cancellation::{RequestGuard, RequestTracker};
pub use config::ExecutionConfig;
pub use error::RequestError;
pub use native::{ReqwestSession, ReqwestSessionFactory};
pub use session::{SessionFactory, SessionManager, SessionSource, Transport};

use crate::models::{HttpMethod, HttpResponse, PreparedRequest, Query};
use crate::query::append_query;
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Process-wide client used by controllers that do not supply their own.
static SHARED_CLIENT: Lazy<NetworkClient> = Lazy::new(NetworkClient::new);

/// Gets the process-wide client.
///
/// Its session is created lazily on the first request and recreated after
/// every [`cancel_requests`].
pub fn shared_client() -> &'static NetworkClient {
    &SHARED_CLIENT
}

/// Cancels all requests on the process-wide client.
///
/// # Examples
///
/// ```no_run
/// use networkable::executor::cancel_requests;
///
/// cancel_requests();
/// ```
pub fn cancel_requests() -> bool {
    shared_client().cancel_requests()
}

/// Gets the number of requests in flight on the process-wide client.
pub fn get_active_request_count() -> usize {
    shared_client().active_request_count()
}

/// Builds a [`PreparedRequest`], or `None` if the URL cannot be composed.
pub fn prepare_request(
    method: HttpMethod,
    url: &str,
    query: &Query,
    body: Option<Vec<u8>>,
) -> Option<PreparedRequest> {
    let url = append_query(url, query)?;
    let mut request = PreparedRequest::new(method, url);
    request.body = body;
    Some(request)
}

/// Request executor over a replaceable session.
///
/// Cloning is cheap; clones share the same session.
#[derive(Clone)]
pub struct NetworkClient {
    sessions: Arc<dyn SessionSource>,
}

impl NetworkClient {
    /// Creates a client whose sessions are built from the global configuration.
    pub fn new() -> Self {
        Self::with_factory(ReqwestSessionFactory::new())
    }

    /// Creates a client whose sessions all use `config`.
    pub fn with_config(config: ExecutionConfig) -> Self {
        Self::with_factory(ReqwestSessionFactory::with_config(config))
    }

    /// Creates a client over any session factory.
    pub fn with_factory<F: SessionFactory>(factory: F) -> Self {
        Self {
            sessions: Arc::new(SessionManager::new(factory)),
        }
    }

    /// Composes the URL and executes the request.
    ///
    /// Returns `None` without touching the network when `url` cannot be
    /// composed with `query`. Otherwise returns the transport's outcome
    /// unchanged; HTTP error statuses arrive as ordinary responses.
    pub async fn perform(
        &self,
        method: HttpMethod,
        url: &str,
        query: &Query,
        body: Option<Vec<u8>>,
    ) -> Option<Result<HttpResponse, RequestError>> {
        let request = prepare_request(method, url, query, body)?;
        Some(self.execute(request).await)
    }

    /// Executes an already prepared request on the current session.
    pub async fn execute(&self, request: PreparedRequest) -> Result<HttpResponse, RequestError> {
        let session = self.sessions.transport()?;
        let method = request.method;
        let url = request.url.clone();

        let result = session.execute(request).await;

        if cfg!(debug_assertions) {
            match &result {
                Ok(response) => log::debug!(
                    "{} {} -> {} {} ({} bytes, {:?}) headers={:?}",
                    method,
                    url,
                    response.status_code,
                    response.status_text,
                    response.body.len(),
                    response.duration,
                    response.headers
                ),
                Err(e) => log::debug!("{} {} failed: {}", method, url, e),
            }
        }

        result
    }

    /// Callback form of [`perform`](Self::perform).
    ///
    /// The request runs on the current Tokio runtime and `completion` is
    /// invoked exactly once with the body bytes or the error, or never if
    /// the URL cannot be composed. Completions of concurrent calls arrive in
    /// no particular order.
    ///
    /// Transport errors reach `completion` unchanged, with one exception:
    /// called outside a Tokio runtime, nothing can be dispatched and the
    /// completion receives a [`RequestError::Session`] created here,
    /// immediately and on the calling thread.
    pub fn perform_with_completion<C>(
        &self,
        method: HttpMethod,
        url: &str,
        query: &Query,
        body: Option<Vec<u8>>,
        completion: C,
    ) where
        C: FnOnce(Option<Vec<u8>>, Option<RequestError>) + Send + 'static,
    {
        let Some(request) = prepare_request(method, url, query, body) else {
            return;
        };

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                completion(None, Some(RequestError::Session(e.to_string())));
                return;
            }
        };

        let client = self.clone();
        runtime.spawn(async move {
            match client.execute(request).await {
                Ok(response) => completion(Some(response.into_body()), None),
                Err(e) => completion(None, Some(e)),
            }
        });
    }

    /// Invalidates the session, cancelling every outstanding request.
    ///
    /// Returns `false` if no session existed yet.
    pub fn cancel_requests(&self) -> bool {
        self.sessions.invalidate_session()
    }

    /// Requests in flight on the current session.
    pub fn active_request_count(&self) -> usize {
        self.sessions.active_request_count()
    }
}

impl Default for NetworkClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NetworkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkClient")
            .field("active_requests", &self.active_request_count())
            .finish()
    }
}
