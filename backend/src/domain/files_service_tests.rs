//! Tests for the file service.

use std::sync::{Arc, Mutex};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{MockBlobStore, MockFileRepository};
use crate::test_support::fixture_clock;

type Service = FileService<MockFileRepository, MockBlobStore>;

fn make_service(files: MockFileRepository, blobs: MockBlobStore) -> Service {
    FileService::new(Arc::new(files), Arc::new(blobs), fixture_clock())
}

fn name(raw: &str) -> FileName {
    FileName::new(raw).expect("fixture file name")
}

fn stored(owner: UserId, raw: &str) -> StoredFile {
    StoredFile {
        id: FileId::random(),
        owner,
        filename: name(raw),
        storage_key: StorageKey::random(),
        uploaded_at: fixture_clock().utc(),
    }
}

#[tokio::test]
async fn save_writes_blob_under_fresh_key_then_metadata() {
    let owner = UserId::random();
    let written_key: Arc<Mutex<Option<StorageKey>>> = Arc::new(Mutex::new(None));
    let mut files = MockFileRepository::new();
    files
        .expect_find_by_name()
        .times(1)
        .return_once(|_, _| Ok(None));
    let seen = Arc::clone(&written_key);
    files
        .expect_upsert()
        .withf(move |file| {
            let key = *seen.lock().expect("lock");
            file.filename.as_ref() == "a.txt" && Some(file.storage_key) == key
        })
        .times(1)
        .return_once(|_| Ok(()));
    let mut blobs = MockBlobStore::new();
    let record = Arc::clone(&written_key);
    blobs
        .expect_put()
        .withf(|_, _, bytes| bytes.as_slice() == b"hello")
        .times(1)
        .returning(move |_, key, _| {
            *record.lock().expect("lock") = Some(*key);
            Ok(())
        });

    let service = make_service(files, blobs);
    let file = service
        .save_file(&owner, name("a.txt"), b"hello".to_vec())
        .await
        .expect("saved");
    assert_eq!(file.owner, owner);
}

#[tokio::test]
async fn same_name_upload_replaces_previous_blob() {
    let owner = UserId::random();
    let previous = stored(owner, "a.txt");
    let previous_key = previous.storage_key;
    let mut files = MockFileRepository::new();
    files
        .expect_find_by_name()
        .times(1)
        .return_once(move |_, _| Ok(Some(previous)));
    files.expect_upsert().times(1).return_once(|_| Ok(()));
    let mut blobs = MockBlobStore::new();
    blobs.expect_put().times(1).returning(|_, _, _| Ok(()));
    blobs
        .expect_delete()
        .withf(move |_, key| *key == previous_key)
        .times(1)
        .return_once(|_, _| Ok(()));

    let service = make_service(files, blobs);
    let file = service
        .save_file(&owner, name("a.txt"), b"v2".to_vec())
        .await
        .expect("saved");
    assert_ne!(file.storage_key, previous_key);
}

#[tokio::test]
async fn failed_metadata_write_discards_new_blob() {
    let mut files = MockFileRepository::new();
    files
        .expect_find_by_name()
        .times(1)
        .return_once(|_, _| Ok(None));
    files
        .expect_upsert()
        .times(1)
        .return_once(|_| Err(FilePersistenceError::query("constraint")));
    let mut blobs = MockBlobStore::new();
    blobs.expect_put().times(1).returning(|_, _, _| Ok(()));
    blobs.expect_delete().times(1).return_once(|_, _| Ok(()));

    let service = make_service(files, blobs);
    let error = service
        .save_file(&UserId::random(), name("a.txt"), Vec::new())
        .await
        .expect_err("metadata failure");
    assert_eq!(error.code(), ErrorCode::InternalError);
}

#[tokio::test]
async fn read_sniffs_png_bytes() {
    let owner = UserId::random();
    let file = stored(owner, "image.bin");
    let mut files = MockFileRepository::new();
    files
        .expect_find_by_name()
        .times(1)
        .return_once(move |_, _| Ok(Some(file)));
    let mut blobs = MockBlobStore::new();
    blobs
        .expect_get()
        .times(1)
        .return_once(|_, _| Ok(b"\x89PNG\r\n\x1a\nrest".to_vec()));

    let service = make_service(files, blobs);
    let content = service
        .read_file(&owner, &name("image.bin"))
        .await
        .expect("read");
    assert_eq!(content.kind, ContentKind::Png);
    assert_eq!(content.bytes, b"\x89PNG\r\n\x1a\nrest");
}

#[tokio::test]
async fn read_of_missing_blob_is_not_found() {
    let owner = UserId::random();
    let file = stored(owner, "gone.txt");
    let mut files = MockFileRepository::new();
    files
        .expect_find_by_name()
        .times(1)
        .return_once(move |_, _| Ok(Some(file)));
    let mut blobs = MockBlobStore::new();
    blobs
        .expect_get()
        .times(1)
        .return_once(|_, key| Err(BlobStoreError::not_found(key.to_string())));

    let service = make_service(files, blobs);
    let error = service
        .read_file(&owner, &name("gone.txt"))
        .await
        .expect_err("missing blob");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn delete_by_id_tolerates_missing_blob() {
    let owner = UserId::random();
    let file = stored(owner, "a.txt");
    let id = file.id;
    let mut files = MockFileRepository::new();
    files
        .expect_find_by_id()
        .times(1)
        .return_once(move |_, _| Ok(Some(file)));
    files
        .expect_delete()
        .withf(move |_, candidate| *candidate == id)
        .times(1)
        .return_once(|_, _| Ok(true));
    let mut blobs = MockBlobStore::new();
    blobs
        .expect_delete()
        .times(1)
        .return_once(|_, key| Err(BlobStoreError::not_found(key.to_string())));

    let service = make_service(files, blobs);
    service
        .delete_file_by_id(&owner, &id)
        .await
        .expect("deleted");
}

#[tokio::test]
async fn delete_by_name_of_unknown_file_is_not_found() {
    let mut files = MockFileRepository::new();
    files
        .expect_find_by_name()
        .times(1)
        .return_once(|_, _| Ok(None));
    files.expect_delete().never();

    let service = make_service(files, MockBlobStore::new());
    let error = service
        .delete_file_by_name(&UserId::random(), &name("nope.txt"))
        .await
        .expect_err("unknown");
    assert_eq!(error.code(), ErrorCode::NotFound);
}
