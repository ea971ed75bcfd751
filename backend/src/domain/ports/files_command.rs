//! Driving port for file uploads and deletions.

use async_trait::async_trait;

use crate::domain::{Error, FileId, FileName, StoredFile, UserId};

/// File upload and deletion use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FilesCommand: Send + Sync {
    /// Store `bytes` under `filename`, replacing an earlier upload with the
    /// same name.
    async fn save_file(
        &self,
        owner: &UserId,
        filename: FileName,
        bytes: Vec<u8>,
    ) -> Result<StoredFile, Error>;

    async fn delete_file_by_name(&self, owner: &UserId, filename: &FileName)
    -> Result<(), Error>;

    async fn delete_file_by_id(&self, owner: &UserId, id: &FileId) -> Result<(), Error>;
}
