//! Account domain service.
//!
//! Implements registration, authentication and deletion on top of a
//! [`UserRepository`], plus the startup bootstrap of the administrator.
//! Argon2 work runs on the blocking pool.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::domain::ports::{
    AccountsCommand, BlobStore, UserPersistenceError, UserRepository, UsersQuery,
};
use crate::domain::{
    Error, LoginCredentials, PasswordHash, RegistrationRequest, Role, SessionUser, User,
    UserAccount, UserId, Username,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateUsername { username } => {
            Error::conflict(format!("username already exists: {username}"))
        }
    }
}

async fn hash_password(password: Zeroizing<String>) -> Result<PasswordHash, Error> {
    tokio::task::spawn_blocking(move || PasswordHash::generate(password.as_str()))
        .await
        .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
        .map_err(|err| Error::internal(err.to_string()))
}

async fn verify_password(hash: PasswordHash, password: Zeroizing<String>) -> Result<bool, Error> {
    tokio::task::spawn_blocking(move || hash.verify(password.as_str()))
        .await
        .map_err(|err| Error::internal(format!("password verification task failed: {err}")))?
        .map_err(|err| Error::internal(err.to_string()))
}

/// Outcome of [`AccountService::ensure_admin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminBootstrap {
    /// The administrator account was created with the default credential.
    Created(UserId),
    /// An administrator account already existed.
    AlreadyPresent,
}

/// Account service implementing [`AccountsCommand`] and [`UsersQuery`].
#[derive(Clone)]
pub struct AccountService<U, B> {
    users: Arc<U>,
    blobs: Arc<B>,
    clock: Arc<dyn Clock>,
}

impl<U, B> AccountService<U, B> {
    /// Create a new service over the given repository and blob store.
    pub fn new(users: Arc<U>, blobs: Arc<B>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            blobs,
            clock,
        }
    }
}

impl<U, B> AccountService<U, B>
where
    U: UserRepository,
    B: BlobStore,
{
    /// Make sure the `admin` account exists, creating it with `password` if
    /// absent. Safe to call on every startup.
    pub async fn ensure_admin(&self, password: &str) -> Result<AdminBootstrap, Error> {
        let username = Username::admin();
        if let Some(existing) = self
            .users
            .find_by_username(&username)
            .await
            .map_err(map_user_error)?
        {
            if !existing.user.role().is_admin() {
                return Err(Error::internal(
                    "account 'admin' exists without the admin role",
                ));
            }
            return Ok(AdminBootstrap::AlreadyPresent);
        }

        let password_hash = hash_password(Zeroizing::new(password.to_owned())).await?;
        let user = User::new(UserId::random(), username, Role::Admin, self.clock.utc());
        let account = UserAccount {
            user,
            password_hash,
        };
        match self.users.insert(&account).await {
            Ok(()) => {
                info!(user_id = %account.user.id(), "administrator account created");
                Ok(AdminBootstrap::Created(*account.user.id()))
            }
            Err(UserPersistenceError::DuplicateUsername { .. }) => {
                Ok(AdminBootstrap::AlreadyPresent)
            }
            Err(err) => Err(map_user_error(err)),
        }
    }

    async fn find_account(&self, username: &Username) -> Result<Option<UserAccount>, Error> {
        self.users
            .find_by_username(username)
            .await
            .map_err(map_user_error)
    }

    async fn remove(&self, id: &UserId) -> Result<(), Error> {
        let deleted = self.users.delete(id).await.map_err(map_user_error)?;
        if !deleted {
            return Err(Error::not_found("user not found"));
        }
        if let Err(err) = self.blobs.delete_owner(id).await {
            warn!(user_id = %id, error = %err, "account deleted but its files were not removed");
        }
        info!(user_id = %id, "account deleted");
        Ok(())
    }
}

#[async_trait]
impl<U, B> AccountsCommand for AccountService<U, B>
where
    U: UserRepository,
    B: BlobStore,
{
    async fn register(&self, request: &RegistrationRequest) -> Result<UserId, Error> {
        if self.find_account(request.username()).await?.is_some() {
            return Err(Error::conflict("username already exists"));
        }
        if !request.passwords_match() {
            return Err(Error::invalid_request("passwords do not match"));
        }

        let password_hash = hash_password(Zeroizing::new(request.password().to_owned())).await?;
        let user = User::new(
            UserId::random(),
            request.username().clone(),
            Role::Standard,
            self.clock.utc(),
        );
        let id = *user.id();
        self.users
            .insert(&UserAccount {
                user,
                password_hash,
            })
            .await
            .map_err(map_user_error)?;
        info!(user_id = %id, "account registered");
        Ok(id)
    }

    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<SessionUser, Error> {
        let Some(account) = self.find_account(credentials.username()).await? else {
            debug!(reason = "unknown_user", "login rejected");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let verified = verify_password(
            account.password_hash.clone(),
            Zeroizing::new(credentials.password().to_owned()),
        )
        .await?;
        if !verified {
            debug!(reason = "wrong_password", user_id = %account.user.id(), "login rejected");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        Ok(SessionUser::from(&account.user))
    }

    async fn delete_account(&self, user: &SessionUser) -> Result<(), Error> {
        if user.role.is_admin() {
            return Err(Error::forbidden("the administrator account cannot be deleted"));
        }
        self.remove(&user.user_id).await
    }

    async fn delete_with_credentials(&self, credentials: &LoginCredentials) -> Result<(), Error> {
        let Some(account) = self.find_account(credentials.username()).await? else {
            return Err(Error::not_found("user does not exist"));
        };
        let verified = verify_password(
            account.password_hash.clone(),
            Zeroizing::new(credentials.password().to_owned()),
        )
        .await?;
        if !verified {
            return Err(Error::unauthorized("wrong password"));
        }
        if account.user.role().is_admin() {
            return Err(Error::forbidden("the administrator account cannot be deleted"));
        }
        self.remove(account.user.id()).await
    }
}

#[async_trait]
impl<U, B> UsersQuery for AccountService<U, B>
where
    U: UserRepository,
    B: BlobStore,
{
    async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.users.list().await.map_err(map_user_error)
    }
}

#[cfg(test)]
#[path = "accounts_service_tests.rs"]
mod tests;
