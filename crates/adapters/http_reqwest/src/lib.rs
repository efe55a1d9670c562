//! # parkhub-adapter-http-reqwest
//!
//! REST adapter: implements the `ApiClient` port over [`reqwest`].
//!
//! ## Responsibilities
//! - Join request paths onto the configured base URL
//! - Attach `Authorization: Bearer <token>` when the shared token cell holds one
//! - Encode bodies as JSON or `multipart/form-data`
//! - Unwrap the backend envelope `{statusCode, success, message, data, errors}`
//! - Classify failures: no response, non-2xx status, undecodable body
//!
//! No retries happen here; callers own retry policy.
//!
//! ## Dependency rule
//! Same as other adapters: depends on `parkhub-app` and `parkhub-domain`.

mod client;
mod config;
mod envelope;
mod error;

pub use client::ReqwestApiClient;
pub use config::HttpConfig;
pub use error::HttpAdapterError;
