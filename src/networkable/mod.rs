//! Model and controller capabilities.
//!
//! - [`NetworkableObject`]: a model that can be built from a JSON object and
//!   written back to its endpoint.
//! - [`NetworkableController`]: a type with a base URL that gains the
//!   request, decode and write-back helpers.

pub mod controller;
pub mod decode;
pub mod object;

pub use controller::{NetworkableController, RawOutcome};
pub use decode::{decode_image, decode_model, decode_models, decode_object, DecodeError, FetchError};
pub use object::{deserialize_object, serialize_object, JsonObject, NetworkableObject};
