//! [`ApiClient`] implementation over a shared [`reqwest::Client`].

use std::future::Future;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde_json::Value;

use parkhub_app::ports::{ApiClient, FilePart, Method, MultipartForm, RequestBody};
use parkhub_app::token::TokenCell;
use parkhub_domain::error::ApiError;

use crate::config::HttpConfig;
use crate::envelope;
use crate::error::HttpAdapterError;

/// REST client for the parking backend.
///
/// Cloning is cheap: the connection pool and the token cell are shared.
#[derive(Debug, Clone)]
pub struct ReqwestApiClient {
    client: reqwest::Client,
    base_url: String,
    token: TokenCell,
}

impl ReqwestApiClient {
    /// Build a client from configuration and the session token cell.
    ///
    /// # Errors
    ///
    /// Returns [`HttpAdapterError`] when the base URL is not `http(s)`, the
    /// timeout is zero, or reqwest fails to initialise.
    pub fn new(config: &HttpConfig, token: TokenCell) -> Result<Self, HttpAdapterError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(HttpAdapterError::InvalidBaseUrl(config.base_url.clone()));
        }
        if config.timeout_secs == 0 {
            return Err(HttpAdapterError::ZeroTimeout);
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl ApiClient for ReqwestApiClient {
    fn request(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send {
        let url = self.url(path);
        let mut builder = self.client.request(http_method(method), &url);
        if let Some(token) = self.token.get() {
            builder = builder.bearer_auth(token);
        }
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(multipart(form)),
        };

        async move {
            tracing::debug!(%method, %url, "sending request");
            let response = builder.send().await.map_err(network)?;
            let status = response.status().as_u16();
            let bytes = response.bytes().await.map_err(network)?;
            if (200..300).contains(&status) {
                envelope::into_data(status, &bytes)
            } else {
                tracing::debug!(%method, %url, status, "request rejected");
                Err(envelope::into_error(status, &bytes))
            }
        }
    }
}

fn network(err: reqwest::Error) -> ApiError {
    tracing::debug!(error = %err, "request did not complete");
    ApiError::Network(Box::new(err))
}

fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn multipart(form: MultipartForm) -> Form {
    let mut out = Form::new();
    for (name, value) in form.fields {
        out = out.text(name, value);
    }
    if let Some(file) = form.file {
        let field = file.field.clone();
        out = out.part(field, file_part(file));
    }
    out
}

fn file_part(file: FilePart) -> Part {
    let FilePart {
        file_name,
        content_type,
        bytes,
        ..
    } = file;
    match Part::bytes(bytes.clone())
        .file_name(file_name.clone())
        .mime_str(&content_type)
    {
        Ok(part) => part,
        Err(err) => {
            tracing::warn!(%content_type, error = %err, "invalid content type, sending without one");
            Part::bytes(bytes).file_name(file_name)
        }
    }
}
