//! Driving port for note mutations.

use async_trait::async_trait;

use crate::domain::{Error, Note, NoteDraft, NoteId, UserId};

/// Note creation and deletion use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotesCommand: Send + Sync {
    async fn create_note(&self, owner: &UserId, draft: NoteDraft) -> Result<Note, Error>;

    /// Delete a note owned by `owner`; any other note is `NotFound`.
    async fn delete_note(&self, owner: &UserId, id: &NoteId) -> Result<(), Error>;
}
