//! Image storage over the backend's `/files` endpoints.

use std::future::Future;

use serde::de::IgnoredAny;

use parkhub_domain::error::ApiError;
use parkhub_domain::image::{Image, ImageKey, LocalFile};

use crate::ports::api_client::decode;
use crate::ports::{ApiClient, FilePart, FileStorage, Method, MultipartForm, RequestBody};

/// Folder the backend stores parking lot images under.
pub const DEFAULT_FOLDER: &str = "parking-lots";

/// [`FileStorage`] backed by `POST /files/upload` and `POST /files/delete`.
pub struct RestFileStorage<C> {
    api: C,
    folder: String,
}

impl<C: ApiClient> RestFileStorage<C> {
    pub fn new(api: C, folder: impl Into<String>) -> Self {
        Self {
            api,
            folder: folder.into(),
        }
    }
}

impl<C: ApiClient> FileStorage for RestFileStorage<C> {
    fn upload(&self, file: &LocalFile) -> impl Future<Output = Result<Image, ApiError>> + Send {
        let form = MultipartForm::new()
            .text("path", self.folder.clone())
            .file(FilePart {
                field: "file".to_string(),
                file_name: file.name.clone(),
                content_type: file.content_type.clone(),
                bytes: file.bytes.clone(),
            });
        async move {
            let data = self
                .api
                .request(Method::Post, "/files/upload", RequestBody::Multipart(form))
                .await?;
            decode(data)
        }
    }

    fn delete(&self, key: &ImageKey) -> impl Future<Output = Result<(), ApiError>> + Send {
        let body = RequestBody::json(&serde_json::json!({ "fileId": key }));
        async move {
            let data = self.api.request(Method::Post, "/files/delete", body?).await?;
            let _: IgnoredAny = decode(data)?;
            Ok(())
        }
    }
}
