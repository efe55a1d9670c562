//! File storage port: upload and delete stored images.

use std::future::Future;

use parkhub_domain::error::ApiError;
use parkhub_domain::image::{Image, ImageKey, LocalFile};

/// Stores image files and hands back their durable `{key, url}`.
pub trait FileStorage: Send + Sync {
    /// Upload one file and return the persisted image record.
    fn upload(&self, file: &LocalFile) -> impl Future<Output = Result<Image, ApiError>> + Send;

    /// Delete a stored image by its storage key.
    fn delete(&self, key: &ImageKey) -> impl Future<Output = Result<(), ApiError>> + Send;
}

impl<T: FileStorage> FileStorage for std::sync::Arc<T> {
    fn upload(&self, file: &LocalFile) -> impl Future<Output = Result<Image, ApiError>> + Send {
        (**self).upload(file)
    }

    fn delete(&self, key: &ImageKey) -> impl Future<Output = Result<(), ApiError>> + Send {
        (**self).delete(key)
    }
}
