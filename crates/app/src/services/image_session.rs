//! Image reconciliation for one edit session.
//!
//! The session holds the user's desired image order as a list of
//! [`ImageEntry`] values, persisted or pending, and turns it into storage
//! operations on [`ImageSession::commit`].

use std::collections::HashSet;

use parkhub_domain::error::{ImageSyncError, SyncProgress};
use parkhub_domain::image::{
    EntryKey, Image, ImageEntry, ImageKey, LocalFile, PendingImage, PreviewKey,
};
use parkhub_domain::time::{now, unix_millis};

use crate::ports::FileStorage;

/// Transient edit state of a parking lot's image gallery.
///
/// Three partitions are tracked: `existing` (persisted and still shown),
/// pending uploads (the pending entries of the ordered list), and
/// `to_delete` (persisted keys the user removed).
#[derive(Debug, Default)]
pub struct ImageSession {
    existing: Vec<Image>,
    to_delete: Vec<ImageKey>,
    ordered: Vec<ImageEntry>,
    sequence: u64,
}

impl ImageSession {
    /// Empty session, for a parking lot being created.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Session seeded with the images a parking lot already has, in order.
    ///
    /// A key listed twice is kept once, at its first position.
    #[must_use]
    pub fn from_images(mut images: Vec<Image>) -> Self {
        let mut seen = HashSet::new();
        images.retain(|image| seen.insert(image.key.clone()));
        Self {
            ordered: images.iter().cloned().map(ImageEntry::Persisted).collect(),
            existing: images,
            ..Self::default()
        }
    }

    /// Append local files as pending entries and return their preview keys.
    pub fn add_files(&mut self, files: impl IntoIterator<Item = LocalFile>) -> Vec<PreviewKey> {
        let millis = unix_millis(now());
        files
            .into_iter()
            .map(|file| {
                self.sequence += 1;
                let preview_key = PreviewKey::generate(millis, self.sequence, &file.name);
                self.ordered.push(ImageEntry::Pending(PendingImage {
                    preview_key: preview_key.clone(),
                    file,
                }));
                preview_key
            })
            .collect()
    }

    /// Remove an entry from the ordered list.
    ///
    /// A persisted image moves to the delete set; a pending one is simply
    /// dropped. Returns `false` when no entry has `key`.
    pub fn remove_image(&mut self, key: &EntryKey) -> bool {
        let Some(position) = self.ordered.iter().position(|entry| entry.matches(key)) else {
            return false;
        };
        if let ImageEntry::Persisted(image) = self.ordered.remove(position) {
            self.existing.retain(|kept| kept.key != image.key);
            if !self.to_delete.contains(&image.key) {
                self.to_delete.push(image.key);
            }
        }
        true
    }

    /// Move one entry from `from` to `to`. Out-of-range indices are ignored.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        if from >= self.ordered.len() || to >= self.ordered.len() {
            return false;
        }
        let entry = self.ordered.remove(from);
        self.ordered.insert(to, entry);
        true
    }

    /// Apply the session to storage and return the final ordered images.
    ///
    /// Deletions run first, then uploads in display order. Each completed
    /// step is removed from the session, so calling `commit` again after a
    /// failure resumes where it stopped.
    ///
    /// # Errors
    ///
    /// Returns [`ImageSyncError`] on the first failed storage call. Steps that
    /// already succeeded are not rolled back; they are listed in
    /// [`ImageSyncError::completed`].
    #[tracing::instrument(skip_all, fields(deletes = self.to_delete.len(), uploads = self.pending_count()))]
    pub async fn commit(
        &mut self,
        storage: &impl FileStorage,
    ) -> Result<Vec<Image>, ImageSyncError> {
        let mut completed = SyncProgress::default();

        while let Some(key) = self.to_delete.first().cloned() {
            if let Err(source) = storage.delete(&key).await {
                return Err(ImageSyncError::Delete {
                    key,
                    source,
                    completed: Box::new(completed),
                });
            }
            tracing::debug!(%key, "stored image deleted");
            self.to_delete.remove(0);
            completed.deleted.push(key);
        }

        for index in 0..self.ordered.len() {
            let ImageEntry::Pending(pending) = &self.ordered[index] else {
                continue;
            };
            match storage.upload(&pending.file).await {
                Ok(image) => {
                    tracing::debug!(key = %image.key, "image uploaded");
                    completed.uploaded.push(image.clone());
                    self.existing.push(image.clone());
                    self.ordered[index] = ImageEntry::Persisted(image);
                }
                Err(source) => {
                    return Err(ImageSyncError::Upload {
                        preview_key: pending.preview_key.clone(),
                        source,
                        completed: Box::new(completed),
                    });
                }
            }
        }

        Ok(self
            .ordered
            .iter()
            .filter_map(|entry| match entry {
                ImageEntry::Persisted(image) => Some(image.clone()),
                ImageEntry::Pending(_) => None,
            })
            .collect())
    }

    #[must_use]
    pub fn entries(&self) -> &[ImageEntry] {
        &self.ordered
    }

    #[must_use]
    pub fn existing(&self) -> &[Image] {
        &self.existing
    }

    #[must_use]
    pub fn to_delete(&self) -> &[ImageKey] {
        &self.to_delete
    }

    pub fn pending_uploads(&self) -> impl Iterator<Item = &PendingImage> {
        self.ordered.iter().filter_map(|entry| match entry {
            ImageEntry::Pending(pending) => Some(pending),
            ImageEntry::Persisted(_) => None,
        })
    }

    fn pending_count(&self) -> usize {
        self.pending_uploads().count()
    }

    /// Whether committing would touch storage.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.to_delete.is_empty() || self.pending_count() > 0
    }
}
