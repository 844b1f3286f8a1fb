//! Single chokepoint for every backend call.
//!
//! Injects the bearer token, serializes query and body, and decodes the
//! backend's `{code, message, data}` envelope into a value or a `ClientError`.

pub mod client;
pub mod envelope;
pub mod loading;

pub use client::{create_http_client, ApiClient, RequestOptions};
pub use envelope::{decode_response, sanitize_error_body, Envelope};
pub use loading::{LoadingGuard, LoadingIndicator, NoopLoading};
