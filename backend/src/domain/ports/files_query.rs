//! Driving port for listing and reading uploaded files.

use async_trait::async_trait;

use crate::domain::{Error, FileContent, FileName, StoredFile, UserId};

/// Read side of the file use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FilesQuery: Send + Sync {
    /// Files of `owner` ordered by upload time.
    async fn list_files(&self, owner: &UserId) -> Result<Vec<StoredFile>, Error>;

    /// Read a file's bytes and sniff their content kind.
    async fn read_file(&self, owner: &UserId, filename: &FileName) -> Result<FileContent, Error>;
}
