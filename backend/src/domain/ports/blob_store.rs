//! Port for raw file bytes.
//!
//! Blobs are addressed by owner and [`StorageKey`]; adapters lay them out as
//! `<owner>/<storage key>` beneath their root.

use async_trait::async_trait;

use crate::domain::{StorageKey, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by blob store adapters.
    pub enum BlobStoreError {
        /// No blob exists under the requested key.
        NotFound { key: String } => "blob not found: {key}",
        /// Filesystem or transport failure.
        Io { message: String } => "blob store i/o failed: {message}",
    }
}

/// Byte storage for uploads, partitioned by owner.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write `bytes`, creating the owner's directory on first use.
    async fn put(
        &self,
        owner: &UserId,
        key: &StorageKey,
        bytes: Vec<u8>,
    ) -> Result<(), BlobStoreError>;

    async fn get(&self, owner: &UserId, key: &StorageKey) -> Result<Vec<u8>, BlobStoreError>;

    /// Remove one blob; a missing blob yields [`BlobStoreError::NotFound`].
    async fn delete(&self, owner: &UserId, key: &StorageKey) -> Result<(), BlobStoreError>;

    /// Remove every blob of `owner`. Succeeds when nothing was stored.
    async fn delete_owner(&self, owner: &UserId) -> Result<(), BlobStoreError>;
}
