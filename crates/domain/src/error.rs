//! Common error types used across the workspace.
//!
//! Each layer defines typed errors and converts via `#[from]`:
//! - [`ApiError`] is what a transport returns for one request.
//! - [`ImageSyncError`] reports a failed image commit together with the
//!   storage effects that already happened.
//! - [`ParkHubError`] is what services hand back to their callers.

use std::fmt;

use serde::Deserialize;

use crate::image::{Image, ImageKey, PreviewKey};

/// Message used when a failure carries no usable text.
pub const FALLBACK_MESSAGE: &str = "Unexpected error";

/// Coarse classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No response reached the client.
    Network,
    /// Missing, expired, or rejected token (401/403).
    Authorization,
    /// The addressed record does not exist (404).
    NotFound,
    /// Any other 4xx, usually carrying field errors.
    Validation,
    /// 5xx.
    Server,
    /// A body could not be (de)serialised.
    Decode,
}

impl FailureKind {
    /// Classify an HTTP status code.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Authorization,
            404 => Self::NotFound,
            400..=499 => Self::Validation,
            _ => Self::Server,
        }
    }
}

/// The backend sends `message` either as one string or as a list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MessageField {
    One(String),
    Many(Vec<String>),
}

impl MessageField {
    fn joined(&self) -> String {
        match self {
            Self::One(text) => text.clone(),
            Self::Many(parts) => parts.join(", "),
        }
    }
}

/// Error fields of the response envelope (`{ message, errors }`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorPayload {
    #[serde(default)]
    pub message: Option<MessageField>,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
}

impl ErrorPayload {
    /// Apply the extraction rule: `errors` joined, then `message`.
    #[must_use]
    pub fn extract(&self) -> Option<String> {
        if let Some(errors) = self.errors.as_ref().filter(|e| !e.is_empty()) {
            return Some(errors.join(", "));
        }
        self.message
            .as_ref()
            .map(MessageField::joined)
            .filter(|m| !m.is_empty())
    }
}

/// Failure of a single outbound request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("network error")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The backend answered with a non-success status.
    #[error("request failed with status code {status}")]
    Http { status: u16, payload: ErrorPayload },

    /// The request body could not be encoded.
    #[error("failed to encode request body")]
    Encode(#[source] serde_json::Error),

    /// The response body could not be decoded.
    #[error("failed to decode response body")]
    Decode(#[source] serde_json::Error),
}

impl ApiError {
    /// Build an [`ApiError::Http`] without a payload.
    #[must_use]
    pub fn status(status: u16) -> Self {
        Self::Http {
            status,
            payload: ErrorPayload::default(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Network(_) => FailureKind::Network,
            Self::Http { status, .. } => FailureKind::from_status(*status),
            Self::Encode(_) | Self::Decode(_) => FailureKind::Decode,
        }
    }

    /// Human-readable message for the error queue.
    ///
    /// Prefers the structured `errors` array (comma-joined), then the
    /// `message` field, then the transport text, then [`FALLBACK_MESSAGE`].
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http { payload, .. } => payload.extract().unwrap_or_else(|| self.to_string()),
            Self::Network(source) => {
                let text = source.to_string();
                if text.is_empty() {
                    FALLBACK_MESSAGE.to_string()
                } else {
                    text
                }
            }
            Self::Encode(_) | Self::Decode(_) => FALLBACK_MESSAGE.to_string(),
        }
    }
}

/// Domain-level validation failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("code must not be empty")]
    EmptyCode,

    #[error("name must not be empty")]
    EmptyName,

    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// A record looked up by id is absent from the local cache.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Storage effects that completed before an image commit failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncProgress {
    /// Keys already deleted from storage.
    pub deleted: Vec<ImageKey>,
    /// Images already uploaded, in display order.
    pub uploaded: Vec<Image>,
}

/// An image commit stopped partway. Completed effects are not rolled back.
#[derive(Debug, thiserror::Error)]
pub enum ImageSyncError {
    #[error("failed to delete stored image {key}")]
    Delete {
        key: ImageKey,
        #[source]
        source: ApiError,
        completed: Box<SyncProgress>,
    },

    #[error("failed to upload image {preview_key}")]
    Upload {
        preview_key: PreviewKey,
        #[source]
        source: ApiError,
        completed: Box<SyncProgress>,
    },
}

impl ImageSyncError {
    /// Effects already applied to storage.
    #[must_use]
    pub fn completed(&self) -> &SyncProgress {
        match self {
            Self::Delete { completed, .. } | Self::Upload { completed, .. } => completed,
        }
    }

    /// The request failure that stopped the commit.
    #[must_use]
    pub fn api_error(&self) -> &ApiError {
        match self {
            Self::Delete { source, .. } | Self::Upload { source, .. } => source,
        }
    }
}

/// Remote operation kinds tracked by the stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Get,
    Create,
    Update,
    Delete,
    GetHistory,
    Login,
    Me,
}

impl Operation {
    /// Every operation kind, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Get,
        Self::Create,
        Self::Update,
        Self::Delete,
        Self::GetHistory,
        Self::Login,
        Self::Me,
    ];
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::GetHistory => "getHistory",
            Self::Login => "login",
            Self::Me => "me",
        })
    }
}

/// Top-level error returned by application services.
#[derive(Debug, thiserror::Error)]
pub enum ParkHubError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// A remote operation failed; `message` is what was queued for display.
    #[error("{message}")]
    Request {
        operation: Operation,
        kind: FailureKind,
        message: String,
    },

    #[error("image synchronisation failed")]
    ImageSync(#[from] ImageSyncError),

    #[error("not authenticated")]
    Unauthenticated,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16, body: serde_json::Value) -> ApiError {
        ApiError::Http {
            status,
            payload: serde_json::from_value(body).unwrap(),
        }
    }

    #[test]
    fn should_prefer_errors_array_over_message() {
        let err = http(
            422,
            serde_json::json!({"message": "Unprocessable", "errors": ["code already exists", "name is required"]}),
        );
        assert_eq!(err.user_message(), "code already exists, name is required");
    }

    #[test]
    fn should_use_message_when_errors_absent() {
        let err = http(401, serde_json::json!({"message": "Invalid token"}));
        assert_eq!(err.user_message(), "Invalid token");
        assert_eq!(err.kind(), FailureKind::Authorization);
    }

    #[test]
    fn should_join_message_list() {
        let err = http(400, serde_json::json!({"message": ["a is bad", "b is bad"]}));
        assert_eq!(err.user_message(), "a is bad, b is bad");
    }

    #[test]
    fn should_fall_back_to_status_text_when_payload_empty() {
        let err = ApiError::status(500);
        assert_eq!(err.user_message(), "request failed with status code 500");
        assert_eq!(err.kind(), FailureKind::Server);
    }

    #[test]
    fn should_ignore_empty_errors_array() {
        let err = http(400, serde_json::json!({"message": "Bad", "errors": []}));
        assert_eq!(err.user_message(), "Bad");
    }

    #[test]
    fn should_use_transport_text_for_network_errors() {
        let err = ApiError::Network("connection refused".into());
        assert_eq!(err.user_message(), "connection refused");
        assert_eq!(err.kind(), FailureKind::Network);
    }

    #[test]
    fn should_use_fallback_for_decode_errors() {
        let json_err = serde_json::from_str::<serde_json::Value>("{{").unwrap_err();
        let err = ApiError::Decode(json_err);
        assert_eq!(err.user_message(), FALLBACK_MESSAGE);
    }

    #[test]
    fn should_classify_statuses() {
        assert_eq!(FailureKind::from_status(403), FailureKind::Authorization);
        assert_eq!(FailureKind::from_status(404), FailureKind::NotFound);
        assert_eq!(FailureKind::from_status(422), FailureKind::Validation);
        assert_eq!(FailureKind::from_status(503), FailureKind::Server);
    }

    #[test]
    fn should_display_request_error_as_its_message() {
        let err = ParkHubError::Request {
            operation: Operation::Create,
            kind: FailureKind::Validation,
            message: "code already exists".to_string(),
        };
        assert_eq!(err.to_string(), "code already exists");
    }
}
