//! Port for uploaded file metadata.
//!
//! Metadata rows map a per-owner display name to the opaque storage key of a
//! blob held by a [`super::BlobStore`].

use async_trait::async_trait;

use crate::domain::{FileId, FileName, StoredFile, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by file metadata repository adapters.
    pub enum FilePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "file repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "file repository query failed: {message}",
    }
}

/// Persistence for file metadata.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileRepository: Send + Sync {
    /// Insert metadata, replacing any row with the same owner and filename.
    async fn upsert(&self, file: &StoredFile) -> Result<(), FilePersistenceError>;

    /// Files of `owner` ordered by upload time.
    async fn list_by_owner(&self, owner: &UserId)
    -> Result<Vec<StoredFile>, FilePersistenceError>;

    async fn find_by_name(
        &self,
        owner: &UserId,
        filename: &FileName,
    ) -> Result<Option<StoredFile>, FilePersistenceError>;

    async fn find_by_id(
        &self,
        owner: &UserId,
        id: &FileId,
    ) -> Result<Option<StoredFile>, FilePersistenceError>;

    /// Delete the row `id` owned by `owner`; returns whether a row matched.
    async fn delete(&self, owner: &UserId, id: &FileId) -> Result<bool, FilePersistenceError>;
}
