//! Data models for HTTP requests and responses.

pub mod request;
pub mod response;

pub use request::{HttpMethod, PreparedRequest, Query};
pub use response::HttpResponse;
