//! Driving port for account lifecycle use-cases.
//!
//! Inbound adapters register, authenticate and delete accounts through this
//! port without knowing how credentials are stored or hashed.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, RegistrationRequest, SessionUser, UserId};

/// Account registration, login, bootstrap and deletion.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountsCommand: Send + Sync {
    /// Create a standard account.
    ///
    /// Fails with `Conflict` when the username is taken and with
    /// `InvalidRequest` when the confirmation does not match.
    async fn register(&self, request: &RegistrationRequest) -> Result<UserId, Error>;

    /// Verify credentials and return the identity to store in the session.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<SessionUser, Error>;

    /// Delete the caller's own account along with its notes and files.
    async fn delete_account(&self, user: &SessionUser) -> Result<(), Error>;

    /// Delete the account named in `credentials` after re-checking its
    /// password. Unknown users yield `NotFound`, bad passwords `Unauthorized`.
    async fn delete_with_credentials(&self, credentials: &LoginCredentials) -> Result<(), Error>;
}
