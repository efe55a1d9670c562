//! API client port: one authenticated request against the backend REST API.
//!
//! Adapters own the transport details (base URL, bearer header, body
//! encoding, response envelope). Services only see the envelope's `data`
//! member as a [`Value`] and decode it with [`decode`].

use std::fmt;
use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use parkhub_domain::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        })
    }
}

/// Outbound request body. The variant decides the encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(MultipartForm),
}

impl RequestBody {
    /// Serialise `value` into a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Encode`] if `value` cannot be represented as JSON.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ApiError> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(ApiError::Encode)
    }
}

/// A `multipart/form-data` body with text fields and at most one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    pub fields: Vec<(String, String)>,
    pub file: Option<FilePart>,
}

impl MultipartForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn file(mut self, part: FilePart) -> Self {
        self.file = Some(part);
        self
    }
}

/// Binary part of a multipart body.
#[derive(Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for FilePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePart")
            .field("field", &self.field)
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Sends requests to the backend.
///
/// Implementations attach `Authorization: Bearer <token>` when a token is
/// available and never retry. On success they resolve to the `data` member
/// of the response envelope (`Value::Null` when absent).
pub trait ApiClient: Send + Sync {
    fn request(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send;
}

impl<T: ApiClient> ApiClient for std::sync::Arc<T> {
    fn request(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send {
        (**self).request(method, path, body)
    }
}

/// Decode an envelope `data` value into a typed response.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] when the value does not match `T`.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(ApiError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_encode_serializable_value_as_json_body() {
        let body = RequestBody::json(&serde_json::json!({"fileId": "k1"})).unwrap();
        assert_eq!(
            body,
            RequestBody::Json(serde_json::json!({"fileId": "k1"}))
        );
    }

    #[test]
    fn should_build_multipart_form() {
        let form = MultipartForm::new().text("path", "parking-lots").file(FilePart {
            field: "file".to_string(),
            file_name: "a.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        });
        assert_eq!(form.fields, vec![("path".to_string(), "parking-lots".to_string())]);
        assert!(format!("{form:?}").contains("len: 3"));
    }

    #[test]
    fn should_report_decode_failure() {
        let result = decode::<Vec<String>>(serde_json::json!({"not": "a list"}));
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }
}
