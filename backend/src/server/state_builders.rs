//! Builders wiring persistence adapters into the domain services and the
//! shared HTTP state.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use vault::domain::ports::{BlobStore, FileRepository, NoteRepository, UserRepository};
use vault::domain::{AccountService, FileService, NoteService};
use vault::inbound::http::state::{HttpState, HttpStatePorts};
use vault::outbound::persistence::{
    DieselFileRepository, DieselNoteRepository, DieselUserRepository,
};
use vault::outbound::storage::CapStdBlobStore;

use super::ServerConfig;

/// Account service over the production adapters; also runs the admin
/// bootstrap at startup.
pub(super) type VaultAccountService = AccountService<DieselUserRepository, CapStdBlobStore>;

/// Adapters a vault is assembled from.
pub(super) struct VaultAdapters<U, N, F, B> {
    pub users: Arc<U>,
    pub notes: Arc<N>,
    pub files: Arc<F>,
    pub blobs: Arc<B>,
}

/// Build every domain service over `adapters` and bundle them as HTTP state.
///
/// The account service is returned separately so the caller can bootstrap
/// the administrator before serving.
pub(super) fn assemble<U, N, F, B>(
    adapters: VaultAdapters<U, N, F, B>,
    clock: Arc<dyn Clock>,
    max_upload_bytes: usize,
) -> (Arc<AccountService<U, B>>, HttpState)
where
    U: UserRepository + 'static,
    N: NoteRepository + 'static,
    F: FileRepository + 'static,
    B: BlobStore + 'static,
{
    let VaultAdapters {
        users,
        notes,
        files,
        blobs,
    } = adapters;
    let accounts = Arc::new(AccountService::new(
        users,
        Arc::clone(&blobs),
        Arc::clone(&clock),
    ));
    let notes = Arc::new(NoteService::new(notes, Arc::clone(&clock)));
    let files = Arc::new(FileService::new(files, blobs, clock));

    let state = HttpState::new(HttpStatePorts {
        accounts: accounts.clone(),
        users: accounts.clone(),
        notes: notes.clone(),
        notes_query: notes,
        files: files.clone(),
        files_query: files,
    })
    .with_max_upload_bytes(max_upload_bytes);
    (accounts, state)
}

/// Build the production services from the server configuration.
pub(super) fn build_http_state(config: &ServerConfig) -> (Arc<VaultAccountService>, HttpState) {
    let pool = &config.db_pool;
    assemble(
        VaultAdapters {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            notes: Arc::new(DieselNoteRepository::new(pool.clone())),
            files: Arc::new(DieselFileRepository::new(pool.clone())),
            blobs: Arc::new(config.blobs.clone()),
        },
        Arc::new(DefaultClock),
        config.max_upload_bytes,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use vault::domain::{AdminBootstrap, LoginCredentials, NoteDraft, Role, SessionUser, UserId};
    use vault::test_support::{InMemoryBlobStore, InMemoryStore, fixture_clock};

    type InMemoryAccounts = AccountService<InMemoryStore, InMemoryBlobStore>;

    fn in_memory(max_upload_bytes: usize) -> (Arc<InMemoryAccounts>, HttpState) {
        let store = Arc::new(InMemoryStore::new());
        assemble(
            VaultAdapters {
                users: Arc::clone(&store),
                notes: Arc::clone(&store),
                files: store,
                blobs: Arc::new(InMemoryBlobStore::new()),
            },
            fixture_clock(),
            max_upload_bytes,
        )
    }

    #[rstest]
    #[tokio::test]
    async fn bootstrapped_admin_is_visible_through_http_ports() {
        let (accounts, state) = in_memory(1024);
        let outcome = accounts.ensure_admin("cle").await.expect("bootstrap");
        assert!(matches!(outcome, AdminBootstrap::Created(_)));

        let users = state.users.list_users().await.expect("list users");
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role(), Role::Admin);

        let credentials = LoginCredentials::try_from_parts("admin", "cle").expect("credentials");
        let session: SessionUser = state
            .accounts
            .authenticate(&credentials)
            .await
            .expect("admin login");
        assert!(session.role.is_admin());
    }

    #[rstest]
    #[tokio::test]
    async fn note_ports_share_one_store() {
        let (_, state) = in_memory(1024);
        let owner = UserId::random();
        let draft = NoteDraft::try_from_parts("Title", "Body").expect("draft");
        state.notes.create_note(&owner, draft).await.expect("create");

        let notes = state.notes_query.list_notes(&owner).await.expect("list");
        assert_eq!(notes.len(), 1);
    }

    #[rstest]
    fn upload_cap_is_applied() {
        let (_, state) = in_memory(2048);
        assert_eq!(state.max_upload_bytes, 2048);
    }
}
