//! Test utilities for the vault crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is compiled for tests and behind the
//! `test-support` feature.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use actix_web::{HttpResponse, web};
use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{
    BlobStore, BlobStoreError, FilePersistenceError, FileRepository, NotePersistenceError,
    NoteRepository, UserPersistenceError, UserRepository,
};
use crate::domain::{
    AccountService, Error, FileId, FileName, FileService, Note, NoteId, NoteService, Role,
    SessionUser, StorageKey, StoredFile, User, UserAccount, UserId, Username,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::{HttpState, HttpStatePorts};

pub mod cap_fs {
    //! Capability-safe filesystem helpers for tests.
    //!
    //! The crate forbids direct `std::fs` calls. These helpers provide common
    //! read/write/existence operations built on `cap_std::fs::Dir` so test
    //! suites share consistent, policy-compliant file access.

    use std::ffi::OsString;
    use std::io;
    use std::path::Path;

    use cap_std::{ambient_authority, fs::Dir};

    /// Read a file's bytes through `cap_std`.
    pub fn read_file(path: &Path) -> io::Result<Vec<u8>> {
        let (parent, file_name) = parent_and_file_name(path)?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
        directory.read(Path::new(&file_name))
    }

    /// Write bytes to a file through `cap_std`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vault::test_support::cap_fs::{read_file, write_file};
    ///
    /// let path = std::env::temp_dir().join("cap-fs-write-example.txt");
    /// write_file(&path, b"key material\n")?;
    /// assert_eq!(read_file(&path)?, b"key material\n");
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn write_file(path: &Path, contents: &[u8]) -> io::Result<()> {
        let (parent, file_name) = parent_and_file_name(path)?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
        directory.write(Path::new(&file_name), contents)
    }

    /// Return true when `path` exists, false when it does not.
    pub fn path_exists(path: &Path) -> bool {
        let Ok((parent, file_name)) = parent_and_file_name(path) else {
            return false;
        };
        let Ok(directory) = Dir::open_ambient_dir(parent, ambient_authority()) else {
            return false;
        };
        directory.exists(Path::new(&file_name))
    }

    fn parent_and_file_name(path: &Path) -> io::Result<(&Path, OsString)> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "path must include a file or directory name",
            )
        })?;
        Ok((parent, file_name.to_os_string()))
    }
}

const FIXTURE_ADMIN_ID: &str = "0b6f2a4e-6c1d-4f0e-9a55-3a1f0d2c7e11";
const FIXTURE_STANDARD_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

/// Fixed instant used by fixture clocks and records.
pub fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 24, 10, 30, 0)
        .single()
        .unwrap_or_else(|| panic!("valid fixture timestamp"))
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl FixtureClock {
    /// Clock frozen at `utc_now`.
    pub fn at(utc_now: DateTime<Utc>) -> Self {
        Self { utc_now }
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

/// Clock frozen at [`fixture_timestamp`].
pub fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock::at(fixture_timestamp()))
}

/// Deterministic session identity: `admin` for [`Role::Admin`], `alice`
/// otherwise.
pub fn fixture_session_user(role: Role) -> SessionUser {
    let (raw_id, username) = match role {
        Role::Admin => (FIXTURE_ADMIN_ID, Username::admin()),
        Role::Standard => (
            FIXTURE_STANDARD_ID,
            Username::new("alice").unwrap_or_else(|err| panic!("fixture username: {err}")),
        ),
    };
    SessionUser {
        user_id: UserId::new(raw_id).unwrap_or_else(|err| panic!("fixture user id: {err}")),
        username,
        role,
    }
}

/// `GET /sign-in` resource that stores `user` in the session.
///
/// Handler tests call it first and replay the returned cookie, which avoids
/// running the password flow for every request under test.
pub fn sign_in_route(user: SessionUser) -> actix_web::Resource {
    web::resource("/sign-in").route(web::get().to(move |session: SessionContext| {
        let user = user.clone();
        async move {
            session.persist_user(&user)?;
            Ok::<_, Error>(HttpResponse::Ok().finish())
        }
    }))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct StoreState {
    users: Vec<UserAccount>,
    notes: Vec<Note>,
    files: Vec<StoredFile>,
}

/// In-memory implementation of the user, note, and file repositories.
///
/// Rows keep insertion order. Deleting a user drops the user's notes and
/// file rows, as the database foreign keys do.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts currently stored under `username`.
    pub fn count_username(&self, username: &str) -> usize {
        lock(&self.state)
            .users
            .iter()
            .filter(|account| account.user.username().as_ref() == username)
            .count()
    }

    /// Fetch an account by username without going through the port.
    pub fn account(&self, username: &str) -> Option<UserAccount> {
        lock(&self.state)
            .users
            .iter()
            .find(|account| account.user.username().as_ref() == username)
            .cloned()
    }

    /// Notes across all owners.
    pub fn note_count(&self) -> usize {
        lock(&self.state).notes.len()
    }

    /// File metadata rows across all owners.
    pub fn file_count(&self) -> usize {
        lock(&self.state).files.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut state = lock(&self.state);
        let username = account.user.username();
        if state
            .users
            .iter()
            .any(|existing| existing.user.username() == username)
        {
            return Err(UserPersistenceError::duplicate_username(username.as_ref()));
        }
        state.users.push(account.clone());
        Ok(())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        Ok(lock(&self.state)
            .users
            .iter()
            .find(|account| account.user.username() == username)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        Ok(lock(&self.state)
            .users
            .iter()
            .map(|account| account.user.clone())
            .collect())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut state = lock(&self.state);
        let before = state.users.len();
        state.users.retain(|account| account.user.id() != id);
        if state.users.len() == before {
            return Ok(false);
        }
        state.notes.retain(|note| note.owner != *id);
        state.files.retain(|file| file.owner != *id);
        Ok(true)
    }
}

#[async_trait]
impl NoteRepository for InMemoryStore {
    async fn insert(&self, note: &Note) -> Result<(), NotePersistenceError> {
        lock(&self.state).notes.push(note.clone());
        Ok(())
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Note>, NotePersistenceError> {
        Ok(lock(&self.state)
            .notes
            .iter()
            .filter(|note| note.owner == *owner)
            .cloned()
            .collect())
    }

    async fn delete(&self, owner: &UserId, id: &NoteId) -> Result<bool, NotePersistenceError> {
        let mut state = lock(&self.state);
        let before = state.notes.len();
        state
            .notes
            .retain(|note| !(note.owner == *owner && note.id == *id));
        Ok(state.notes.len() != before)
    }
}

#[async_trait]
impl FileRepository for InMemoryStore {
    async fn upsert(&self, file: &StoredFile) -> Result<(), FilePersistenceError> {
        let mut state = lock(&self.state);
        state
            .files
            .retain(|existing| !(existing.owner == file.owner && existing.filename == file.filename));
        state.files.push(file.clone());
        Ok(())
    }

    async fn list_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<StoredFile>, FilePersistenceError> {
        Ok(lock(&self.state)
            .files
            .iter()
            .filter(|file| file.owner == *owner)
            .cloned()
            .collect())
    }

    async fn find_by_name(
        &self,
        owner: &UserId,
        filename: &FileName,
    ) -> Result<Option<StoredFile>, FilePersistenceError> {
        Ok(lock(&self.state)
            .files
            .iter()
            .find(|file| file.owner == *owner && file.filename == *filename)
            .cloned())
    }

    async fn find_by_id(
        &self,
        owner: &UserId,
        id: &FileId,
    ) -> Result<Option<StoredFile>, FilePersistenceError> {
        Ok(lock(&self.state)
            .files
            .iter()
            .find(|file| file.owner == *owner && file.id == *id)
            .cloned())
    }

    async fn delete(&self, owner: &UserId, id: &FileId) -> Result<bool, FilePersistenceError> {
        let mut state = lock(&self.state);
        let before = state.files.len();
        state
            .files
            .retain(|file| !(file.owner == *owner && file.id == *id));
        Ok(state.files.len() != before)
    }
}

/// Blob store holding bytes in a map keyed by owner and storage key.
#[derive(Default)]
pub struct InMemoryBlobStore {
    blobs: Mutex<HashMap<(UserId, StorageKey), Vec<u8>>>,
}

impl InMemoryBlobStore {
    /// Empty blob store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blobs held for `owner`.
    pub fn count_for(&self, owner: &UserId) -> usize {
        lock(&self.blobs)
            .keys()
            .filter(|(blob_owner, _)| blob_owner == owner)
            .count()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(
        &self,
        owner: &UserId,
        key: &StorageKey,
        bytes: Vec<u8>,
    ) -> Result<(), BlobStoreError> {
        lock(&self.blobs).insert((*owner, *key), bytes);
        Ok(())
    }

    async fn get(&self, owner: &UserId, key: &StorageKey) -> Result<Vec<u8>, BlobStoreError> {
        lock(&self.blobs)
            .get(&(*owner, *key))
            .cloned()
            .ok_or_else(|| BlobStoreError::not_found(key.to_string()))
    }

    async fn delete(&self, owner: &UserId, key: &StorageKey) -> Result<(), BlobStoreError> {
        lock(&self.blobs)
            .remove(&(*owner, *key))
            .map(|_| ())
            .ok_or_else(|| BlobStoreError::not_found(key.to_string()))
    }

    async fn delete_owner(&self, owner: &UserId) -> Result<(), BlobStoreError> {
        lock(&self.blobs).retain(|(blob_owner, _), _| blob_owner != owner);
        Ok(())
    }
}

/// Real domain services wired to in-memory adapters.
///
/// Integration tests build an HTTP app from [`InMemoryVault::http_state`]
/// and inspect the adapters directly to check persisted effects.
pub struct InMemoryVault {
    store: Arc<InMemoryStore>,
    blobs: Arc<InMemoryBlobStore>,
    accounts: Arc<AccountService<InMemoryStore, InMemoryBlobStore>>,
    notes: Arc<NoteService<InMemoryStore>>,
    files: Arc<FileService<InMemoryStore, InMemoryBlobStore>>,
}

impl Default for InMemoryVault {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryVault {
    /// Build the services over empty adapters and a frozen clock.
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let blobs = Arc::new(InMemoryBlobStore::new());
        let clock = fixture_clock();
        Self {
            accounts: Arc::new(AccountService::new(
                Arc::clone(&store),
                Arc::clone(&blobs),
                Arc::clone(&clock),
            )),
            notes: Arc::new(NoteService::new(Arc::clone(&store), Arc::clone(&clock))),
            files: Arc::new(FileService::new(
                Arc::clone(&store),
                Arc::clone(&blobs),
                clock,
            )),
            store,
            blobs,
        }
    }

    /// Backing repository store.
    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }

    /// Backing blob store.
    pub fn blobs(&self) -> &InMemoryBlobStore {
        &self.blobs
    }

    /// Account service over the in-memory adapters.
    pub fn accounts(&self) -> &AccountService<InMemoryStore, InMemoryBlobStore> {
        &self.accounts
    }

    /// HTTP state whose ports are the services of this vault.
    pub fn http_state(&self) -> HttpState {
        HttpState::new(HttpStatePorts {
            accounts: self.accounts.clone(),
            users: self.accounts.clone(),
            notes: self.notes.clone(),
            notes_query: self.notes.clone(),
            files: self.files.clone(),
            files_query: self.files.clone(),
        })
    }
}

/// HTTP state backed by a fresh, empty [`InMemoryVault`].
///
/// Handler tests replace individual ports with mocks.
pub fn stub_http_state() -> HttpState {
    InMemoryVault::new().http_state()
}
