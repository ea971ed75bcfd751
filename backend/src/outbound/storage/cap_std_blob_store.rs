//! Filesystem `BlobStore` confined to the uploads directory.
//!
//! All access goes through a `cap_std` [`Dir`] capability, so paths are
//! always relative to the root and cannot escape it. Blobs live at
//! `<owner uuid>/<storage key uuid>`; neither component is user supplied.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;

use crate::domain::ports::{BlobStore, BlobStoreError};
use crate::domain::{StorageKey, UserId};

fn owner_dir(owner: &UserId) -> PathBuf {
    PathBuf::from(owner.to_string())
}

fn blob_path(owner: &UserId, key: &StorageKey) -> PathBuf {
    owner_dir(owner).join(key.to_string())
}

fn map_io_error(error: &io::Error, key: &StorageKey) -> BlobStoreError {
    if error.kind() == io::ErrorKind::NotFound {
        BlobStoreError::not_found(key.to_string())
    } else {
        BlobStoreError::io(error.to_string())
    }
}

/// Blob store rooted at a directory on the local filesystem.
#[derive(Clone)]
pub struct CapStdBlobStore {
    root: Arc<Dir>,
}

impl CapStdBlobStore {
    /// Open (creating if needed) the uploads directory at `path`.
    pub fn open(path: &Path) -> Result<Self, BlobStoreError> {
        Dir::create_ambient_dir_all(path, ambient_authority())
            .map_err(|err| BlobStoreError::io(format!("{}: {err}", path.display())))?;
        let root = Dir::open_ambient_dir(path, ambient_authority())
            .map_err(|err| BlobStoreError::io(format!("{}: {err}", path.display())))?;
        Ok(Self {
            root: Arc::new(root),
        })
    }

    async fn with_root<T, F>(&self, op: F) -> Result<T, BlobStoreError>
    where
        F: FnOnce(&Dir) -> Result<T, BlobStoreError> + Send + 'static,
        T: Send + 'static,
    {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || op(&root))
            .await
            .map_err(|err| BlobStoreError::io(format!("blob store task failed: {err}")))?
    }
}

#[async_trait]
impl BlobStore for CapStdBlobStore {
    async fn put(
        &self,
        owner: &UserId,
        key: &StorageKey,
        bytes: Vec<u8>,
    ) -> Result<(), BlobStoreError> {
        let (owner, key) = (*owner, *key);
        self.with_root(move |root| {
            let dir = owner_dir(&owner);
            root.create_dir_all(&dir)
                .map_err(|err| BlobStoreError::io(err.to_string()))?;
            // Write beside the final name, then rename into place.
            let staging = dir.join(format!(".{key}.part"));
            let target = blob_path(&owner, &key);
            root.write(&staging, &bytes)
                .map_err(|err| BlobStoreError::io(err.to_string()))?;
            root.rename(&staging, root, &target).map_err(|err| {
                let _cleanup = root.remove_file(&staging);
                BlobStoreError::io(err.to_string())
            })
        })
        .await
    }

    async fn get(&self, owner: &UserId, key: &StorageKey) -> Result<Vec<u8>, BlobStoreError> {
        let (owner, key) = (*owner, *key);
        self.with_root(move |root| {
            root.read(blob_path(&owner, &key))
                .map_err(|err| map_io_error(&err, &key))
        })
        .await
    }

    async fn delete(&self, owner: &UserId, key: &StorageKey) -> Result<(), BlobStoreError> {
        let (owner, key) = (*owner, *key);
        self.with_root(move |root| {
            root.remove_file(blob_path(&owner, &key))
                .map_err(|err| map_io_error(&err, &key))
        })
        .await
    }

    async fn delete_owner(&self, owner: &UserId) -> Result<(), BlobStoreError> {
        let owner = *owner;
        self.with_root(move |root| match root.remove_dir_all(owner_dir(&owner)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(user_id = %owner, "no blob directory to remove");
                Ok(())
            }
            Err(err) => Err(BlobStoreError::io(err.to_string())),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use crate::test_support::cap_fs::{path_exists, read_file};

    #[fixture]
    fn store() -> (TempDir, CapStdBlobStore) {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = CapStdBlobStore::open(dir.path()).expect("open store");
        (dir, store)
    }

    #[rstest]
    #[tokio::test]
    async fn put_then_get_returns_identical_bytes(store: (TempDir, CapStdBlobStore)) {
        let (dir, store) = store;
        let owner = UserId::random();
        let key = StorageKey::random();
        let bytes = vec![0_u8, 159, 146, 150, 255];

        store.put(&owner, &key, bytes.clone()).await.expect("put");
        assert_eq!(store.get(&owner, &key).await.expect("get"), bytes);
        let on_disk = dir.path().join(owner.to_string()).join(key.to_string());
        assert_eq!(read_file(&on_disk).expect("read blob from disk"), bytes);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_blob_is_not_found(store: (TempDir, CapStdBlobStore)) {
        let (_dir, store) = store;
        let owner = UserId::random();
        let key = StorageKey::random();
        assert!(matches!(
            store.get(&owner, &key).await,
            Err(BlobStoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete(&owner, &key).await,
            Err(BlobStoreError::NotFound { .. })
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn delete_owner_removes_directory_and_is_idempotent(
        store: (TempDir, CapStdBlobStore),
    ) {
        let (dir, store) = store;
        let owner = UserId::random();
        store
            .put(&owner, &StorageKey::random(), b"a".to_vec())
            .await
            .expect("put");
        store
            .put(&owner, &StorageKey::random(), b"b".to_vec())
            .await
            .expect("put");

        store.delete_owner(&owner).await.expect("delete owner");
        assert!(!path_exists(&dir.path().join(owner.to_string())));
        store.delete_owner(&owner).await.expect("second delete");
    }

    #[rstest]
    #[tokio::test]
    async fn owners_do_not_share_blobs(store: (TempDir, CapStdBlobStore)) {
        let (_dir, store) = store;
        let key = StorageKey::random();
        let alice = UserId::random();
        store.put(&alice, &key, b"secret".to_vec()).await.expect("put");

        assert!(matches!(
            store.get(&UserId::random(), &key).await,
            Err(BlobStoreError::NotFound { .. })
        ));
    }
}
