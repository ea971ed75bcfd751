//! Diesel adapters against a disposable PostgreSQL database.
//!
//! Set `VAULT_TEST_DATABASE_URL` to run these; otherwise each test logs a
//! skip marker and returns.

mod support;

use chrono::Duration;
use uuid::Uuid;

use support::test_database_url;
use vault::domain::ports::{
    FileRepository, NoteRepository, UserPersistenceError, UserRepository,
};
use vault::domain::{
    FileId, FileName, Note, NoteId, PasswordHash, Role, StorageKey, StoredFile, User, UserAccount,
    UserId, Username,
};
use vault::outbound::persistence::{
    DbPool, DieselFileRepository, DieselNoteRepository, DieselUserRepository, PoolConfig,
    run_pending_migrations,
};
use vault::test_support::fixture_timestamp;

struct Adapters {
    users: DieselUserRepository,
    notes: DieselNoteRepository,
    files: DieselFileRepository,
}

async fn adapters() -> Option<Adapters> {
    let url = test_database_url()?;
    run_pending_migrations(&url).await.expect("run migrations");
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(2))
        .await
        .expect("database pool");
    Some(Adapters {
        users: DieselUserRepository::new(pool.clone()),
        notes: DieselNoteRepository::new(pool.clone()),
        files: DieselFileRepository::new(pool),
    })
}

fn account(prefix: &str) -> UserAccount {
    let suffix = Uuid::new_v4().simple().to_string();
    let username = Username::new(format!("{prefix}-{}", &suffix[..12])).expect("username");
    UserAccount {
        user: User::new(UserId::random(), username, Role::Standard, fixture_timestamp()),
        password_hash: PasswordHash::from_phc("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA"),
    }
}

fn note(owner: UserId, title: &str, minutes: i64) -> Note {
    Note {
        id: NoteId::random(),
        owner,
        title: title.to_owned(),
        content: format!("{title} body"),
        created_at: fixture_timestamp() + Duration::minutes(minutes),
    }
}

fn stored_file(owner: UserId, name: &str) -> StoredFile {
    StoredFile {
        id: FileId::random(),
        owner,
        filename: FileName::new(name).expect("file name"),
        storage_key: StorageKey::random(),
        uploaded_at: fixture_timestamp(),
    }
}

#[tokio::test]
async fn users_insert_find_and_reject_duplicates() {
    let Some(db) = adapters().await else { return };
    let alice = account("alice");

    db.users.insert(&alice).await.expect("insert");
    let found = db
        .users
        .find_by_username(alice.user.username())
        .await
        .expect("find")
        .expect("stored account");
    assert_eq!(found, alice);

    let mut twin = account("twin");
    twin.user = User::new(
        UserId::random(),
        alice.user.username().clone(),
        Role::Standard,
        fixture_timestamp(),
    );
    let err = db.users.insert(&twin).await.expect_err("duplicate");
    assert!(matches!(err, UserPersistenceError::DuplicateUsername { .. }));

    let listed = db.users.list().await.expect("list");
    assert!(listed.iter().any(|user| user == &alice.user));

    assert!(db.users.delete(alice.user.id()).await.expect("delete"));
    assert!(!db.users.delete(alice.user.id()).await.expect("second delete"));
}

#[tokio::test]
async fn notes_are_scoped_to_their_owner() {
    let Some(db) = adapters().await else { return };
    let alice = account("alice");
    let bob = account("bob");
    db.users.insert(&alice).await.expect("insert alice");
    db.users.insert(&bob).await.expect("insert bob");
    let alice_id = *alice.user.id();
    let bob_id = *bob.user.id();

    let later = note(alice_id, "second", 5);
    let earlier = note(alice_id, "first", 0);
    db.notes.insert(&later).await.expect("insert later");
    db.notes.insert(&earlier).await.expect("insert earlier");

    let listed = db.notes.list_by_owner(&alice_id).await.expect("list");
    assert_eq!(listed, vec![earlier.clone(), later.clone()]);
    assert!(db.notes.list_by_owner(&bob_id).await.expect("list").is_empty());

    assert!(!db.notes.delete(&bob_id, &earlier.id).await.expect("foreign delete"));
    assert!(db.notes.delete(&alice_id, &earlier.id).await.expect("delete"));

    db.users.delete(&alice_id).await.expect("cleanup alice");
    db.users.delete(&bob_id).await.expect("cleanup bob");
}

#[tokio::test]
async fn file_upsert_replaces_same_name() {
    let Some(db) = adapters().await else { return };
    let alice = account("alice");
    db.users.insert(&alice).await.expect("insert");
    let owner = *alice.user.id();

    let first = stored_file(owner, "report.pdf");
    let second = stored_file(owner, "report.pdf");
    db.files.upsert(&first).await.expect("first upsert");
    db.files.upsert(&second).await.expect("second upsert");

    let listed = db.files.list_by_owner(&owner).await.expect("list");
    assert_eq!(listed.len(), 1);
    let found = db
        .files
        .find_by_name(&owner, &second.filename)
        .await
        .expect("find by name")
        .expect("stored file");
    assert_eq!(found.storage_key, second.storage_key);
    assert_eq!(
        db.files
            .find_by_id(&owner, &found.id)
            .await
            .expect("find by id")
            .map(|file| file.filename),
        Some(second.filename.clone())
    );

    assert!(db.files.delete(&owner, &found.id).await.expect("delete"));
    assert!(db.files.list_by_owner(&owner).await.expect("list").is_empty());
    db.users.delete(&owner).await.expect("cleanup");
}

#[tokio::test]
async fn deleting_a_user_cascades_to_notes_and_files() {
    let Some(db) = adapters().await else { return };
    let alice = account("alice");
    db.users.insert(&alice).await.expect("insert");
    let owner = *alice.user.id();

    db.notes
        .insert(&note(owner, "groceries", 0))
        .await
        .expect("note");
    db.files
        .upsert(&stored_file(owner, "a.txt"))
        .await
        .expect("file");

    assert!(db.users.delete(&owner).await.expect("delete"));
    assert!(db.notes.list_by_owner(&owner).await.expect("notes").is_empty());
    assert!(db.files.list_by_owner(&owner).await.expect("files").is_empty());
}
