//! Port for note persistence.

use async_trait::async_trait;

use crate::domain::{Note, NoteId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by note repository adapters.
    pub enum NotePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "note repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "note repository query failed: {message}",
    }
}

/// Owner-scoped note storage.
///
/// Every read and delete filters on the owner, so one user can never observe
/// or remove another user's notes through this port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn insert(&self, note: &Note) -> Result<(), NotePersistenceError>;

    /// Notes of `owner` in creation order.
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Note>, NotePersistenceError>;

    /// Delete `id` when it belongs to `owner`; returns whether a row matched.
    async fn delete(&self, owner: &UserId, id: &NoteId) -> Result<bool, NotePersistenceError>;
}
