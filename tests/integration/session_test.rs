//! Session lifecycle and completion delivery over a scripted transport.

use super::init_test_env;
use async_trait::async_trait;
use networkable::executor::{NetworkClient, RequestError, Transport};
use networkable::models::{HttpMethod, HttpResponse, PreparedRequest, Query};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// Answers `/hold` only when cancelled and echoes the path otherwise.
struct ScriptedTransport {
    token: CancellationToken,
    executed: Arc<AtomicUsize>,
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: PreparedRequest) -> Result<HttpResponse, RequestError> {
        self.executed.fetch_add(1, Ordering::SeqCst);
        if request.url.path() == "/hold" {
            self.token.cancelled().await;
            return Err(RequestError::Cancelled);
        }

        let mut response = HttpResponse::new(200, "OK".to_string());
        response.set_body(request.url.path().as_bytes().to_vec());
        Ok(response)
    }

    fn cancel_all(&self) {
        self.token.cancel();
    }
}

struct Harness {
    client: NetworkClient,
    sessions: Arc<AtomicUsize>,
    executed: Arc<AtomicUsize>,
}

fn harness() -> Harness {
    let sessions = Arc::new(AtomicUsize::new(0));
    let executed = Arc::new(AtomicUsize::new(0));
    let (session_count, execute_count) = (Arc::clone(&sessions), Arc::clone(&executed));

    let client = NetworkClient::with_factory(move || {
        session_count.fetch_add(1, Ordering::SeqCst);
        Ok::<_, RequestError>(ScriptedTransport {
            token: CancellationToken::new(),
            executed: Arc::clone(&execute_count),
        })
    });

    Harness {
        client,
        sessions,
        executed,
    }
}

#[tokio::test]
async fn test_invalid_url_never_completes() {
    init_test_env();
    let h = harness();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let (tx, rx) = oneshot::channel::<()>();

    h.client.perform_with_completion(
        HttpMethod::GET,
        "http://exa mple.com/",
        &Query::new(),
        None,
        move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            let _ = tx.send(());
        },
    );

    let waited = tokio::time::timeout(Duration::from_millis(200), rx).await;
    assert!(!matches!(waited, Ok(Ok(()))));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.sessions.load(Ordering::SeqCst), 0);
    assert_eq!(h.executed.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_completion_receives_body_once() {
    init_test_env();
    let h = harness();
    let (tx, mut rx) = mpsc::unbounded_channel();

    h.client.perform_with_completion(
        HttpMethod::GET,
        "https://example.com/users",
        &Query::new(),
        None,
        move |bytes, error| {
            let _ = tx.send((bytes, error.map(|e| e.to_string())));
        },
    );

    let (bytes, error) = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bytes.as_deref(), Some(&b"/users"[..]));
    assert!(error.is_none());

    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_concurrent_completions_all_arrive() {
    init_test_env();
    let h = harness();
    let (tx, mut rx) = mpsc::unbounded_channel();

    for i in 0..16 {
        let tx = tx.clone();
        h.client.perform_with_completion(
            HttpMethod::GET,
            &format!("https://example.com/item/{}", i),
            &Query::new(),
            None,
            move |bytes, _| {
                let _ = tx.send(bytes.unwrap_or_default());
            },
        );
    }
    drop(tx);

    let mut bodies = Vec::new();
    while let Some(body) = rx.recv().await {
        bodies.push(String::from_utf8(body).unwrap());
    }
    bodies.sort();

    let mut expected: Vec<String> = (0..16).map(|i| format!("/item/{}", i)).collect();
    expected.sort();
    assert_eq!(bodies, expected);
    assert_eq!(h.sessions.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cancel_fails_pending_and_next_request_gets_new_session() {
    init_test_env();
    let h = harness();
    let (tx, rx) = oneshot::channel();

    h.client.perform_with_completion(
        HttpMethod::GET,
        "https://example.com/hold",
        &Query::new(),
        None,
        move |bytes, error| {
            let _ = tx.send((bytes, error));
        },
    );

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(h.client.cancel_requests());

    let (bytes, error) = tokio::time::timeout(Duration::from_secs(1), rx)
        .await
        .unwrap()
        .unwrap();
    assert!(bytes.is_none());
    assert!(error.map(|e| e.is_cancelled()).unwrap_or(false));

    let outcome = h
        .client
        .perform(HttpMethod::GET, "https://example.com/after", &Query::new(), None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(outcome.body, b"/after");
    assert_eq!(h.sessions.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_cancel_before_first_request_is_harmless() {
    init_test_env();
    let h = harness();

    assert!(!h.client.cancel_requests());

    let outcome = h
        .client
        .perform(HttpMethod::DELETE, "https://example.com/x", &Query::new(), None)
        .await;
    assert!(matches!(outcome, Some(Ok(_))));
    assert_eq!(h.sessions.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_clones_share_one_session() {
    init_test_env();
    let h = harness();
    let clone = h.client.clone();

    clone
        .perform(HttpMethod::GET, "https://example.com/a", &Query::new(), None)
        .await;
    h.client
        .perform(HttpMethod::GET, "https://example.com/b", &Query::new(), None)
        .await;
    assert_eq!(h.sessions.load(Ordering::SeqCst), 1);

    assert!(clone.cancel_requests());
    h.client
        .perform(HttpMethod::GET, "https://example.com/c", &Query::new(), None)
        .await;
    assert_eq!(h.sessions.load(Ordering::SeqCst), 2);
}
