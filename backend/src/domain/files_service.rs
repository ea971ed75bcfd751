//! File domain service.
//!
//! Coordinates the metadata repository and the blob store. Blobs are written
//! before metadata and removed after it, so a failure leaves at worst an
//! unreferenced blob, never a row pointing at nothing.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    BlobStore, BlobStoreError, FilePersistenceError, FileRepository, FilesCommand, FilesQuery,
};
use crate::domain::{
    ContentKind, Error, FileContent, FileId, FileName, StorageKey, StoredFile, UserId,
};

fn map_file_error(error: FilePersistenceError) -> Error {
    match error {
        FilePersistenceError::Connection { message } => {
            Error::service_unavailable(format!("file repository unavailable: {message}"))
        }
        FilePersistenceError::Query { message } => {
            Error::internal(format!("file repository error: {message}"))
        }
    }
}

fn map_blob_error(error: BlobStoreError) -> Error {
    match error {
        BlobStoreError::NotFound { .. } => Error::not_found("file not found"),
        BlobStoreError::Io { message } => Error::internal(format!("blob store error: {message}")),
    }
}

/// File service implementing [`FilesCommand`] and [`FilesQuery`].
#[derive(Clone)]
pub struct FileService<F, B> {
    files: Arc<F>,
    blobs: Arc<B>,
    clock: Arc<dyn Clock>,
}

impl<F, B> FileService<F, B> {
    /// Create the service over a metadata repository and blob store.
    pub fn new(files: Arc<F>, blobs: Arc<B>, clock: Arc<dyn Clock>) -> Self {
        Self {
            files,
            blobs,
            clock,
        }
    }
}

impl<F, B> FileService<F, B>
where
    F: FileRepository,
    B: BlobStore,
{
    async fn discard_blob(&self, owner: &UserId, key: &StorageKey) {
        match self.blobs.delete(owner, key).await {
            Ok(()) => {}
            Err(BlobStoreError::NotFound { .. }) => {
                debug!(user_id = %owner, storage_key = %key, "blob already absent");
            }
            Err(err) => {
                warn!(user_id = %owner, storage_key = %key, error = %err, "failed to remove blob");
            }
        }
    }

    async fn remove(&self, owner: &UserId, file: StoredFile) -> Result<(), Error> {
        let deleted = self
            .files
            .delete(owner, &file.id)
            .await
            .map_err(map_file_error)?;
        if !deleted {
            return Err(Error::not_found("file not found"));
        }
        self.discard_blob(owner, &file.storage_key).await;
        info!(user_id = %owner, file_id = %file.id, "file deleted");
        Ok(())
    }
}

#[async_trait]
impl<F, B> FilesCommand for FileService<F, B>
where
    F: FileRepository,
    B: BlobStore,
{
    async fn save_file(
        &self,
        owner: &UserId,
        filename: FileName,
        bytes: Vec<u8>,
    ) -> Result<StoredFile, Error> {
        let previous = self
            .files
            .find_by_name(owner, &filename)
            .await
            .map_err(map_file_error)?;

        let stored = StoredFile {
            id: FileId::random(),
            owner: *owner,
            filename,
            storage_key: StorageKey::random(),
            uploaded_at: self.clock.utc(),
        };
        let size = bytes.len();
        self.blobs
            .put(owner, &stored.storage_key, bytes)
            .await
            .map_err(map_blob_error)?;

        if let Err(err) = self.files.upsert(&stored).await {
            self.discard_blob(owner, &stored.storage_key).await;
            return Err(map_file_error(err));
        }
        if let Some(previous) = previous {
            self.discard_blob(owner, &previous.storage_key).await;
        }
        info!(user_id = %owner, file_id = %stored.id, size, "file stored");
        Ok(stored)
    }

    async fn delete_file_by_name(
        &self,
        owner: &UserId,
        filename: &FileName,
    ) -> Result<(), Error> {
        let file = self
            .files
            .find_by_name(owner, filename)
            .await
            .map_err(map_file_error)?
            .ok_or_else(|| Error::not_found("file not found"))?;
        self.remove(owner, file).await
    }

    async fn delete_file_by_id(&self, owner: &UserId, id: &FileId) -> Result<(), Error> {
        let file = self
            .files
            .find_by_id(owner, id)
            .await
            .map_err(map_file_error)?
            .ok_or_else(|| Error::not_found("file not found"))?;
        self.remove(owner, file).await
    }
}

#[async_trait]
impl<F, B> FilesQuery for FileService<F, B>
where
    F: FileRepository,
    B: BlobStore,
{
    async fn list_files(&self, owner: &UserId) -> Result<Vec<StoredFile>, Error> {
        self.files
            .list_by_owner(owner)
            .await
            .map_err(map_file_error)
    }

    async fn read_file(&self, owner: &UserId, filename: &FileName) -> Result<FileContent, Error> {
        let file = self
            .files
            .find_by_name(owner, filename)
            .await
            .map_err(map_file_error)?
            .ok_or_else(|| Error::not_found("file not found"))?;
        let bytes = self
            .blobs
            .get(owner, &file.storage_key)
            .await
            .inspect_err(|err| {
                if matches!(err, BlobStoreError::NotFound { .. }) {
                    warn!(user_id = %owner, file_id = %file.id, "metadata references a missing blob");
                }
            })
            .map_err(map_blob_error)?;
        let kind = ContentKind::sniff(&bytes);
        Ok(FileContent { file, bytes, kind })
    }
}

#[cfg(test)]
#[path = "files_service_tests.rs"]
mod tests;
