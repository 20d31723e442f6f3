//! Request helpers available to any type that owns a base URL.
//!
//! Implement [`NetworkableController`] by providing `base_url`; every helper
//! comes for free and runs on the process-wide client unless `client` is
//! overridden.

use crate::executor::{shared_client, NetworkClient, RequestError};
use crate::models::{HttpMethod, HttpResponse, PreparedRequest, Query};
use crate::networkable::decode::{decode_image, decode_model, decode_models, FetchError};
use crate::networkable::object::NetworkableObject;
use async_trait::async_trait;
use image::DynamicImage;
use url::Url;

/// Raw outcome of a helper: `None` when the URL could not be composed,
/// otherwise the transport's result.
pub type RawOutcome = Option<Result<HttpResponse, RequestError>>;

/// A type that issues requests relative to a base URL.
///
/// # Example
///
/// ```no_run
/// use networkable::models::Query;
/// use networkable::networkable::NetworkableController;
/// use url::Url;
///
/// struct Api {
///     base: Url,
/// }
///
/// impl NetworkableController for Api {
///     fn base_url(&self) -> &Url {
///         &self.base
///     }
/// }
///
/// # async fn example() {
/// let api = Api { base: Url::parse("https://api.example.com/v1/").unwrap() };
/// let url = api.url_for("status").unwrap();
/// if let Some(Ok(response)) = api.get(url.as_str(), &Query::new()).await {
///     println!("{}", response.status_code);
/// }
/// # }
/// ```
#[async_trait]
pub trait NetworkableController: Send + Sync {
    /// Base URL relative paths are resolved against.
    fn base_url(&self) -> &Url;

    /// Client used for every helper. Defaults to the process-wide client.
    fn client(&self) -> &NetworkClient {
        shared_client()
    }

    /// Resolves `path` against [`base_url`](Self::base_url).
    fn url_for(&self, path: &str) -> Option<Url> {
        self.base_url().join(path).ok()
    }

    /// Sends a request with any method.
    async fn perform(
        &self,
        method: HttpMethod,
        url: &str,
        query: &Query,
        body: Option<Vec<u8>>,
    ) -> RawOutcome {
        self.client().perform(method, url, query, body).await
    }

    /// GET, forwarding the transport outcome unchanged.
    async fn get(&self, url: &str, query: &Query) -> RawOutcome {
        self.perform(HttpMethod::GET, url, query, None).await
    }

    /// PUT, forwarding the transport outcome unchanged.
    async fn put(&self, url: &str, query: &Query, body: Option<Vec<u8>>) -> RawOutcome {
        self.perform(HttpMethod::PUT, url, query, body).await
    }

    /// POST, forwarding the transport outcome unchanged.
    async fn post(&self, url: &str, query: &Query, body: Option<Vec<u8>>) -> RawOutcome {
        self.perform(HttpMethod::POST, url, query, body).await
    }

    /// PATCH, forwarding the transport outcome unchanged.
    async fn patch(&self, url: &str, query: &Query, body: Option<Vec<u8>>) -> RawOutcome {
        self.perform(HttpMethod::PATCH, url, query, body).await
    }

    /// DELETE, forwarding the transport outcome unchanged.
    async fn delete(&self, url: &str, query: &Query) -> RawOutcome {
        self.perform(HttpMethod::DELETE, url, query, None).await
    }

    /// GETs and decodes an image. Any failure yields `None`.
    async fn get_image(&self, url: &str, query: &Query) -> Option<DynamicImage> {
        let bytes = body_or_log(url, self.get(url, query).await)?;
        decode_image(&bytes)
            .map_err(|e| log::debug!("get_image {}: {}", url, e))
            .ok()
    }

    /// GETs and builds one model. Any failure yields `None`.
    async fn get_object<T: NetworkableObject>(&self, url: &str, query: &Query) -> Option<T> {
        let bytes = body_or_log(url, self.get(url, query).await)?;
        decode_model(&bytes)
            .map_err(|e| log::debug!("get_object {}: {}", url, e))
            .ok()
    }

    /// GETs and builds the models in the array at `key`.
    ///
    /// Elements the model rejects are dropped; any other failure yields an
    /// empty vector.
    async fn get_objects<T: NetworkableObject>(&self, url: &str, query: &Query, key: &str) -> Vec<T> {
        let Some(bytes) = body_or_log(url, self.get(url, query).await) else {
            return Vec::new();
        };
        decode_models(&bytes, key)
            .map_err(|e| log::debug!("get_objects {}: {}", url, e))
            .unwrap_or_default()
    }

    /// Like [`get_object`](Self::get_object), reporting why it failed.
    async fn try_get_object<T: NetworkableObject>(&self, url: &str, query: &Query) -> Result<T, FetchError> {
        let bytes = body_or_error(url, self.get(url, query).await)?;
        Ok(decode_model(&bytes)?)
    }

    /// Like [`get_objects`](Self::get_objects), reporting why it failed.
    ///
    /// Elements the model rejects are still dropped silently.
    async fn try_get_objects<T: NetworkableObject>(
        &self,
        url: &str,
        query: &Query,
        key: &str,
    ) -> Result<Vec<T>, FetchError> {
        let bytes = body_or_error(url, self.get(url, query).await)?;
        Ok(decode_models(&bytes, key)?)
    }

    /// PUTs the object's JSON to its endpoint.
    async fn put_object<T: NetworkableObject>(&self, object: &T) -> RawOutcome {
        self.write_object(HttpMethod::PUT, object).await
    }

    /// POSTs the object's JSON to its endpoint.
    async fn post_object<T: NetworkableObject>(&self, object: &T) -> RawOutcome {
        self.write_object(HttpMethod::POST, object).await
    }

    /// Sends the object's JSON to its endpoint with `method`.
    ///
    /// Returns `None` only if the object cannot be serialized.
    async fn write_object<T: NetworkableObject>(&self, method: HttpMethod, object: &T) -> RawOutcome {
        let endpoint = object.endpoint();
        let body = match serde_json::to_vec(&object.json_value()) {
            Ok(body) => body,
            Err(e) => {
                log::debug!("cannot serialize object for {}: {}", endpoint, e);
                return None;
            }
        };

        let mut request = PreparedRequest::new(method, endpoint);
        request.add_header("Content-Type", "application/json");
        request.set_body(body);

        Some(self.client().execute(request).await)
    }
}

/// Body bytes of a successful outcome, logging what was discarded otherwise.
fn body_or_log(url: &str, outcome: RawOutcome) -> Option<Vec<u8>> {
    match outcome {
        Some(Ok(response)) => Some(response.into_body()),
        Some(Err(e)) => {
            log::debug!("request to {} failed: {}", url, e);
            None
        }
        None => {
            log::debug!("request to {} not sent: cannot compose URL", url);
            None
        }
    }
}

fn body_or_error(url: &str, outcome: RawOutcome) -> Result<Vec<u8>, FetchError> {
    let response = outcome.ok_or_else(|| FetchError::InvalidUrl(url.to_string()))??;
    if response.body.is_empty() {
        return Err(FetchError::NoData);
    }
    Ok(response.into_body())
}
