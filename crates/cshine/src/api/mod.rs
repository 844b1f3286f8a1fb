//! Endpoint-specific calls on top of [`ApiClient`](crate::http::ApiClient).

pub mod auth;
pub mod backend;
pub mod contact;
pub mod flash;
pub mod folder;
pub mod meeting;
pub mod models;
pub mod upload;

pub use backend::{CreateJobRequest, CreatedJob, JobBackend};
pub use models::*;
