//! Driving port for reading a user's notes.

use async_trait::async_trait;

use crate::domain::{Error, Note, UserId};

/// Read side of the note use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotesQuery: Send + Sync {
    /// Notes of `owner` in creation order.
    async fn list_notes(&self, owner: &UserId) -> Result<Vec<Note>, Error>;
}
