//! Driving port for the administrator's account listing.

use async_trait::async_trait;

use crate::domain::{Error, User};

/// Account listing for administrators.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Every account, oldest first.
    async fn list_users(&self) -> Result<Vec<User>, Error>;
}
