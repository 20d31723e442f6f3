//! Decoding response bodies into JSON objects, models and images.
//!
//! Every function here reports precisely why decoding failed. The
//! swallowing controller helpers discard that reason; the `try_` helpers
//! surface it.

use crate::executor::RequestError;
use crate::networkable::object::{JsonObject, NetworkableObject};
use image::DynamicImage;
use serde_json::Value;
use thiserror::Error;

/// Why a response body could not be turned into the requested value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The body is not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// The body is JSON but not an object at the top level.
    #[error("top-level JSON value is not an object")]
    NotAnObject,

    /// The requested key is absent from the object.
    #[error("missing key: {0}")]
    MissingKey(String),

    /// The value at the requested key is not an array.
    #[error("value at {0} is not an array")]
    NotAnArray(String),

    /// The model rejected the JSON object.
    #[error("model construction failed: {0}")]
    Model(String),

    /// The body is not a decodable image.
    #[error("invalid image: {0}")]
    Image(String),
}

/// Failure of a diagnosable fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL could not be composed; nothing was sent.
    #[error("cannot compose request URL from {0:?}")]
    InvalidUrl(String),

    /// The transport failed.
    #[error(transparent)]
    Transport(#[from] RequestError),

    /// The transport succeeded but returned an empty body.
    #[error("response contained no data")]
    NoData,

    /// The body could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Parses `bytes` as a top-level JSON object.
pub fn decode_object(bytes: &[u8]) -> Result<JsonObject, DecodeError> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(DecodeError::NotAnObject),
        Err(e) => Err(DecodeError::InvalidJson(e.to_string())),
    }
}

/// Builds one model from a top-level JSON object.
pub fn decode_model<T: NetworkableObject>(bytes: &[u8]) -> Result<T, DecodeError> {
    T::from_json(&decode_object(bytes)?)
}

/// Builds models from the array stored at `key` of a top-level JSON object.
///
/// Elements that are not objects or that the model rejects are dropped.
pub fn decode_models<T: NetworkableObject>(bytes: &[u8], key: &str) -> Result<Vec<T>, DecodeError> {
    let object = decode_object(bytes)?;
    let elements = object
        .get(key)
        .ok_or_else(|| DecodeError::MissingKey(key.to_string()))?
        .as_array()
        .ok_or_else(|| DecodeError::NotAnArray(key.to_string()))?;

    let models: Vec<T> = elements
        .iter()
        .filter_map(|element| match element {
            Value::Object(json) => T::from_json(json)
                .map_err(|e| log::debug!("dropping element of {:?}: {}", key, e))
                .ok(),
            other => {
                log::debug!("dropping non-object element of {:?}: {}", key, other);
                None
            }
        })
        .collect();

    if models.len() < elements.len() {
        log::debug!(
            "decoded {} of {} element(s) at {:?}",
            models.len(),
            elements.len(),
            key
        );
    }

    Ok(models)
}

/// Decodes an image in any enabled format.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    image::load_from_memory(bytes).map_err(|e| DecodeError::Image(e.to_string()))
}
