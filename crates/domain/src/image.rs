//! Images: persisted storage objects and pending local uploads.
//!
//! A persisted [`Image`] has a durable storage [`ImageKey`]. A file the user
//! picked but that is not uploaded yet only has a [`PreviewKey`]. The two key
//! types are distinct so a preview key can never reach a storage call.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Durable storage identifier of an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageKey(String);

impl ImageKey {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session-local key of a file waiting to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewKey(String);

impl PreviewKey {
    /// Build a preview key from a timestamp token, a per-session sequence
    /// number, and the file name. The sequence number keeps keys unique even
    /// when several files with the same name are added in the same millisecond.
    #[must_use]
    pub fn generate(millis: i64, sequence: u64, file_name: &str) -> Self {
        Self(format!("preview-{millis}-{sequence}-{file_name}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PreviewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An image stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub key: ImageKey,
    pub url: String,
}

impl Image {
    #[must_use]
    pub fn new(key: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            key: ImageKey::new(key),
            url: url.into(),
        }
    }
}

/// Raw file selected locally, not yet known to storage.
#[derive(Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl LocalFile {
    #[must_use]
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

impl fmt::Debug for LocalFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A local file paired with its preview key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingImage {
    pub preview_key: PreviewKey,
    pub file: LocalFile,
}

/// Key of an entry in an edited image list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryKey {
    Stored(ImageKey),
    Preview(PreviewKey),
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stored(key) => key.fmt(f),
            Self::Preview(key) => key.fmt(f),
        }
    }
}

/// One position in the user's desired image order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageEntry {
    /// Already in storage.
    Persisted(Image),
    /// Waiting for upload.
    Pending(PendingImage),
}

impl ImageEntry {
    #[must_use]
    pub fn key(&self) -> EntryKey {
        match self {
            Self::Persisted(image) => EntryKey::Stored(image.key.clone()),
            Self::Pending(pending) => EntryKey::Preview(pending.preview_key.clone()),
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Whether this entry is identified by `key`.
    #[must_use]
    pub fn matches(&self, key: &EntryKey) -> bool {
        match (self, key) {
            (Self::Persisted(image), EntryKey::Stored(k)) => &image.key == k,
            (Self::Pending(pending), EntryKey::Preview(k)) => &pending.preview_key == k,
            _ => false,
        }
    }
}
