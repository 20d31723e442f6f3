//! Request helpers over a shared HTTP session.
//!
//! This crate lets any type with a base URL issue GET/PUT/POST (and the rest
//! of the HTTP methods), decode JSON responses into model objects and fetch
//! images, all on one lazily created, replaceable session.
//!
//! # Architecture
//!
//! - **models**: HTTP method enumeration, query mapping, prepared requests and raw responses
//! - **query**: appends query parameters to a base URL
//! - **executor**: dispatches requests on the current session and cancels them all at once
//! - **networkable**: the model and controller capabilities with their decode helpers
//! - **config**: transport settings applied when a session is created
//!
//! # Usage
//!
//! ```no_run
//! use networkable::models::Query;
//! use networkable::networkable::{DecodeError, JsonObject, NetworkableController, NetworkableObject};
//! use serde_json::Value;
//! use url::Url;
//!
//! struct Repo {
//!     name: String,
//! }
//!
//! impl NetworkableObject for Repo {
//!     fn json_value(&self) -> JsonObject {
//!         let mut json = JsonObject::new();
//!         json.insert("name".to_string(), Value::String(self.name.clone()));
//!         json
//!     }
//!
//!     fn endpoint(&self) -> Url {
//!         Url::parse("https://api.example.com/repos").unwrap().join(&self.name).unwrap()
//!     }
//!
//!     fn from_json(json: &JsonObject) -> Result<Self, DecodeError> {
//!         match json.get("name") {
//!             Some(Value::String(name)) => Ok(Repo { name: name.clone() }),
//!             _ => Err(DecodeError::Model("name is required".to_string())),
//!         }
//!     }
//! }
//!
//! struct Api {
//!     base: Url,
//! }
//!
//! impl NetworkableController for Api {
//!     fn base_url(&self) -> &Url {
//!         &self.base
//!     }
//! }
//!
//! # async fn example() {
//! let api = Api { base: Url::parse("https://api.example.com/").unwrap() };
//! let url = api.url_for("repos").unwrap();
//!
//! let mut query = Query::new();
//! query.insert("page".to_string(), "1".to_string());
//!
//! let repos: Vec<Repo> = api.get_objects(url.as_str(), &query, "items").await;
//! for repo in &repos {
//!     println!("{}", repo.name);
//! }
//! # }
//! ```

pub mod config;
pub mod executor;
pub mod models;
pub mod networkable;
pub mod query;

pub use executor::{cancel_requests, shared_client, NetworkClient, RequestError};
pub use models::{HttpMethod, HttpResponse, Query};
pub use networkable::{NetworkableController, NetworkableObject};
