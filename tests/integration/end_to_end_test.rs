//! End-to-end tests against a local mock HTTP server.

use super::init_test_env;
use httpmock::prelude::*;
use image::{DynamicImage, GenericImageView, ImageOutputFormat};
use networkable::config::{reset_config, update_config};
use networkable::executor::{cancel_requests, ExecutionConfig, NetworkClient, RequestError};
use networkable::models::{HttpMethod, Query};
use networkable::networkable::{
    deserialize_object, serialize_object, DecodeError, FetchError, JsonObject, NetworkableController,
    NetworkableObject,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use serial_test::serial;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Repo {
    id: u64,
    name: String,
    #[serde(skip)]
    base: Option<Url>,
}

impl NetworkableObject for Repo {
    fn json_value(&self) -> JsonObject {
        serialize_object(self)
    }

    fn endpoint(&self) -> Url {
        let base = self
            .base
            .clone()
            .unwrap_or_else(|| Url::parse("http://localhost/").unwrap());
        base.join(&format!("repos/{}", self.id)).unwrap()
    }

    fn from_json(json: &JsonObject) -> Result<Self, DecodeError> {
        deserialize_object(json)
    }
}

struct GitHost {
    base: Url,
    client: NetworkClient,
}

impl GitHost {
    fn new(server: &MockServer) -> Self {
        Self {
            base: Url::parse(&server.url("/api/")).unwrap(),
            client: NetworkClient::with_config(ExecutionConfig::with_timeout(Duration::from_secs(5))),
        }
    }
}

impl NetworkableController for GitHost {
    fn base_url(&self) -> &Url {
        &self.base
    }

    fn client(&self) -> &NetworkClient {
        &self.client
    }
}

fn query(pairs: &[(&str, &str)]) -> Query {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_get_forwards_query_and_body() {
    init_test_env();
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/repos")
                .query_param("page", "2")
                .query_param("sort", "name");
            then.status(200).body("listing");
        })
        .await;

    let host = GitHost::new(&server);
    let url = host.url_for("repos").unwrap();
    let response = host
        .get(url.as_str(), &query(&[("page", "2"), ("sort", "name")]))
        .await
        .unwrap()
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, b"listing");
}

#[tokio::test]
async fn test_existing_query_items_are_kept() {
    init_test_env();
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/search")
                .query_param("q", "rust")
                .query_param("page", "3");
            then.status(200).body("found");
        })
        .await;

    let host = GitHost::new(&server);
    let url = format!("{}?q=rust", server.url("/api/search"));
    let outcome = host.get(&url, &query(&[("page", "3")])).await;

    mock.assert_async().await;
    assert!(matches!(outcome, Some(Ok(_))));
}

#[tokio::test]
async fn test_post_sends_body() {
    init_test_env();
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/repos").body("payload");
            then.status(201).body("created");
        })
        .await;

    let host = GitHost::new(&server);
    let response = host
        .post(&server.url("/api/repos"), &Query::new(), Some(b"payload".to_vec()))
        .await
        .unwrap()
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.status_code, 201);
    assert_eq!(response.body, b"created");
}

#[tokio::test]
async fn test_error_status_is_not_an_error() {
    init_test_env();
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/missing");
            then.status(404).body(r#"{"message":"Not Found"}"#);
        })
        .await;

    let host = GitHost::new(&server);
    let response = host
        .get(&server.url("/api/missing"), &Query::new())
        .await
        .unwrap()
        .unwrap();

    assert!(response.is_client_error());
    assert_eq!(response.body, br#"{"message":"Not Found"}"#);
}

#[tokio::test]
async fn test_invalid_url_sends_nothing() {
    init_test_env();
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.any_request();
            then.status(200);
        })
        .await;

    let host = GitHost::new(&server);
    assert!(host.get("not a url", &query(&[("a", "1")])).await.is_none());
    assert!(host.get_object::<Repo>("", &Query::new()).await.is_none());

    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn test_get_object_and_objects() {
    init_test_env();
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/repos/1");
            then.status(200)
                .json_body(json!({"id": 1, "name": "networkable"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/repos");
            then.status(200).json_body(json!({
                "items": [
                    {"id": 1, "name": "one"},
                    {"bad": true},
                    {"id": 2, "name": "two"}
                ]
            }));
        })
        .await;

    let host = GitHost::new(&server);

    let repo: Repo = host
        .get_object(&server.url("/api/repos/1"), &Query::new())
        .await
        .unwrap();
    assert_eq!((repo.id, repo.name.as_str()), (1, "networkable"));

    let repos: Vec<Repo> = host
        .get_objects(&server.url("/api/repos"), &Query::new(), "items")
        .await;
    let ids: Vec<u64> = repos.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2]);

    let absent: Vec<Repo> = host
        .get_objects(&server.url("/api/repos"), &Query::new(), "data")
        .await;
    assert!(absent.is_empty());
}

#[tokio::test]
async fn test_try_get_object_reports_decode_error() {
    init_test_env();
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/html");
            then.status(200).body("<html></html>");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/empty");
            then.status(204);
        })
        .await;

    let host = GitHost::new(&server);

    let html = host
        .try_get_object::<Repo>(&server.url("/api/html"), &Query::new())
        .await;
    assert!(matches!(html, Err(FetchError::Decode(DecodeError::InvalidJson(_)))));

    let empty = host
        .try_get_object::<Repo>(&server.url("/api/empty"), &Query::new())
        .await;
    assert!(matches!(empty, Err(FetchError::NoData)));
}

#[tokio::test]
async fn test_get_image() {
    init_test_env();
    let mut png = Vec::new();
    DynamicImage::new_rgba8(4, 2)
        .write_to(&mut std::io::Cursor::new(&mut png), ImageOutputFormat::Png)
        .unwrap();

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/avatar.png");
            then.status(200)
                .header("Content-Type", "image/png")
                .body(png.clone());
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/avatar.txt");
            then.status(200).body("plain text");
        })
        .await;

    let host = GitHost::new(&server);

    let image = host
        .get_image(&server.url("/api/avatar.png"), &Query::new())
        .await
        .unwrap();
    assert_eq!(image.dimensions(), (4, 2));

    assert!(host
        .get_image(&server.url("/api/avatar.txt"), &Query::new())
        .await
        .is_none());
}

#[tokio::test]
async fn test_put_object_writes_json_to_endpoint() {
    init_test_env();
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/api/repos/5")
                .header("content-type", "application/json")
                .json_body(json!({"id": 5, "name": "five"}));
            then.status(200).body("saved");
        })
        .await;

    let host = GitHost::new(&server);
    let repo = Repo {
        id: 5,
        name: "five".to_string(),
        base: Some(host.base.clone()),
    };

    let response = host.put_object(&repo).await.unwrap().unwrap();

    mock.assert_async().await;
    assert_eq!(response.body, b"saved");
}

#[tokio::test]
async fn test_cancel_aborts_in_flight_then_recovers() {
    init_test_env();
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/slow");
            then.status(200).delay(Duration::from_secs(3)).body("late");
        })
        .await;
    let fast = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/fast");
            then.status(200).body("quick");
        })
        .await;

    let host = GitHost::new(&server);
    let client = host.client.clone();
    let slow_url = server.url("/api/slow");

    let pending = tokio::spawn(async move {
        client
            .perform(HttpMethod::GET, &slow_url, &Query::new(), None)
            .await
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(host.client.cancel_requests());

    let outcome = tokio::time::timeout(Duration::from_secs(2), pending)
        .await
        .expect("cancelled request should finish promptly")
        .unwrap();
    assert!(matches!(outcome, Some(Err(RequestError::Cancelled))));

    let response = host
        .get(&server.url("/api/fast"), &Query::new())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(response.body, b"quick");
    fast.assert_async().await;
}

#[tokio::test]
async fn test_connection_refused_reaches_caller() {
    init_test_env();
    let host = GitHost {
        base: Url::parse("http://127.0.0.1:1/").unwrap(),
        client: NetworkClient::with_config(ExecutionConfig::with_timeout(Duration::from_secs(2))),
    };

    let outcome = host.get("http://127.0.0.1:1/nothing", &Query::new()).await;
    let err = match outcome {
        Some(Err(e)) => e,
        other => panic!("expected transport error, got {:?}", other),
    };
    assert!(err.is_connect());

    let source = std::error::Error::source(&err).unwrap();
    let original = source.downcast_ref::<reqwest::Error>().unwrap();
    assert!(original.is_connect());
    assert_eq!(original.url().map(Url::as_str), Some("http://127.0.0.1:1/nothing"));

    let objects: Vec<Repo> = host
        .get_objects("http://127.0.0.1:1/nothing", &Query::new(), "items")
        .await;
    assert!(objects.is_empty());
}

/// Controller running on the process-wide client.
struct SharedHost {
    base: Url,
}

impl NetworkableController for SharedHost {
    fn base_url(&self) -> &Url {
        &self.base
    }
}

#[tokio::test]
#[serial]
async fn test_shared_session_picks_up_config_after_cancel() {
    init_test_env();
    let server = MockServer::start_async().await;
    let plain = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/plain");
            then.status(200).body("plain");
        })
        .await;
    let tagged = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/tagged")
                .header("x-client", "integration");
            then.status(200).body("tagged");
        })
        .await;

    let host = SharedHost {
        base: Url::parse(&server.url("/api/")).unwrap(),
    };

    let first = host.get(host.url_for("plain").unwrap().as_str(), &Query::new()).await;
    assert!(matches!(first, Some(Ok(_))));

    update_config(|config| {
        config
            .default_headers
            .insert("X-Client".to_string(), "integration".to_string());
    });
    assert!(cancel_requests());

    let second = host
        .get(host.url_for("tagged").unwrap().as_str(), &Query::new())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.body, b"tagged");

    plain.assert_async().await;
    tagged.assert_async().await;

    reset_config();
    cancel_requests();
}
