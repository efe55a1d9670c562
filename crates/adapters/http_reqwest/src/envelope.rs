//! Response envelope: `{ statusCode, success, message, data, errors, timestamp }`.

use serde::Deserialize;
use serde_json::Value;

use parkhub_domain::error::{ApiError, ErrorPayload, MessageField};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    #[serde(default)]
    status_code: Option<u16>,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<MessageField>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<String>>,
}

/// Extract `data` from a 2xx body.
///
/// An empty body yields `Value::Null`. A 2xx envelope carrying
/// `success: false` is reported as an HTTP failure with the envelope's own
/// status code.
pub(crate) fn into_data(status: u16, body: &[u8]) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    let envelope: Envelope = serde_json::from_slice(body).map_err(ApiError::Decode)?;
    if envelope.success == Some(false) {
        return Err(ApiError::Http {
            status: envelope.status_code.unwrap_or(status),
            payload: ErrorPayload {
                message: envelope.message,
                errors: envelope.errors,
            },
        });
    }
    Ok(envelope.data.unwrap_or(Value::Null))
}

/// Build the failure for a non-2xx response. Unparseable bodies give an
/// empty payload so the status text is used as the message.
pub(crate) fn into_error(status: u16, body: &[u8]) -> ApiError {
    let payload = serde_json::from_slice::<ErrorPayload>(body).unwrap_or_default();
    ApiError::Http { status, payload }
}
