//! Model types that can be read from and written to an endpoint.

use crate::networkable::decode::DecodeError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

/// A JSON object, the top-level shape every model is built from.
pub type JsonObject = Map<String, Value>;

/// A model that can describe itself as JSON, knows where it lives, and can
/// be rebuilt from a JSON object.
///
/// # Example
///
/// ```
/// use networkable::networkable::{DecodeError, JsonObject, NetworkableObject};
/// use serde_json::json;
/// use url::Url;
///
/// struct User {
///     id: u64,
/// }
///
/// impl NetworkableObject for User {
///     fn json_value(&self) -> JsonObject {
///         let mut json = JsonObject::new();
///         json.insert("id".to_string(), json!(self.id));
///         json
///     }
///
///     fn endpoint(&self) -> Url {
///         Url::parse(&format!("https://api.example.com/users/{}", self.id)).unwrap()
///     }
///
///     fn from_json(json: &JsonObject) -> Result<Self, DecodeError> {
///         let id = json
///             .get("id")
///             .and_then(|v| v.as_u64())
///             .ok_or_else(|| DecodeError::Model("missing id".to_string()))?;
///         Ok(User { id })
///     }
/// }
/// ```
pub trait NetworkableObject: Sized + Send + Sync {
    /// JSON representation sent when the object is written back.
    fn json_value(&self) -> JsonObject;

    /// URL this object is read from and written to.
    fn endpoint(&self) -> Url;

    /// Builds the object, rejecting mappings that are malformed for this type.
    fn from_json(json: &JsonObject) -> Result<Self, DecodeError>;
}

/// `from_json` for models that derive `Deserialize`.
pub fn deserialize_object<T: DeserializeOwned>(json: &JsonObject) -> Result<T, DecodeError> {
    serde_json::from_value(Value::Object(json.clone())).map_err(|e| DecodeError::Model(e.to_string()))
}

/// `json_value` for models that derive `Serialize`.
///
/// Values that do not serialize to a JSON object yield an empty object.
pub fn serialize_object<T: Serialize>(value: &T) -> JsonObject {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            log::debug!("model serialized to non-object JSON: {}", other);
            JsonObject::new()
        }
        Err(e) => {
            log::debug!("model failed to serialize: {}", e);
            JsonObject::new()
        }
    }
}
