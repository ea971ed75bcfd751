//! Note domain service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{NotePersistenceError, NoteRepository, NotesCommand, NotesQuery};
use crate::domain::{Error, Note, NoteDraft, NoteId, UserId};

fn map_note_error(error: NotePersistenceError) -> Error {
    match error {
        NotePersistenceError::Connection { message } => {
            Error::service_unavailable(format!("note repository unavailable: {message}"))
        }
        NotePersistenceError::Query { message } => {
            Error::internal(format!("note repository error: {message}"))
        }
    }
}

/// Note service implementing [`NotesCommand`] and [`NotesQuery`].
#[derive(Clone)]
pub struct NoteService<N> {
    notes: Arc<N>,
    clock: Arc<dyn Clock>,
}

impl<N> NoteService<N> {
    /// Create the service over a note repository.
    pub fn new(notes: Arc<N>, clock: Arc<dyn Clock>) -> Self {
        Self { notes, clock }
    }
}

#[async_trait]
impl<N> NotesCommand for NoteService<N>
where
    N: NoteRepository,
{
    async fn create_note(&self, owner: &UserId, draft: NoteDraft) -> Result<Note, Error> {
        let note = Note::from_draft(*owner, draft, self.clock.utc());
        self.notes.insert(&note).await.map_err(map_note_error)?;
        info!(user_id = %owner, note_id = %note.id, "note created");
        Ok(note)
    }

    async fn delete_note(&self, owner: &UserId, id: &NoteId) -> Result<(), Error> {
        let deleted = self.notes.delete(owner, id).await.map_err(map_note_error)?;
        if !deleted {
            return Err(Error::not_found("note not found"));
        }
        info!(user_id = %owner, note_id = %id, "note deleted");
        Ok(())
    }
}

#[async_trait]
impl<N> NotesQuery for NoteService<N>
where
    N: NoteRepository,
{
    async fn list_notes(&self, owner: &UserId) -> Result<Vec<Note>, Error> {
        self.notes
            .list_by_owner(owner)
            .await
            .map_err(map_note_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockNoteRepository;
    use crate::test_support::{fixture_clock, fixture_timestamp};

    fn make_service(repo: MockNoteRepository) -> NoteService<MockNoteRepository> {
        NoteService::new(Arc::new(repo), fixture_clock())
    }

    #[tokio::test]
    async fn create_stamps_owner_and_clock() {
        let owner = UserId::random();
        let mut repo = MockNoteRepository::new();
        repo.expect_insert()
            .withf(move |note| note.owner == owner && note.title == "T")
            .times(1)
            .return_once(|_| Ok(()));

        let service = make_service(repo);
        let draft = NoteDraft::try_from_parts("T", "C").expect("draft");
        let note = service.create_note(&owner, draft).await.expect("created");
        assert_eq!(note.content, "C");
        assert_eq!(note.created_at, fixture_timestamp());
    }

    #[tokio::test]
    async fn deleting_someone_elses_note_is_not_found() {
        let mut repo = MockNoteRepository::new();
        repo.expect_delete().times(1).return_once(|_, _| Ok(false));

        let service = make_service(repo);
        let error = service
            .delete_note(&UserId::random(), &NoteId::random())
            .await
            .expect_err("not owner");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn connection_failure_is_service_unavailable() {
        let mut repo = MockNoteRepository::new();
        repo.expect_list_by_owner()
            .times(1)
            .return_once(|_| Err(NotePersistenceError::connection("pool timed out")));

        let service = make_service(repo);
        let error = service
            .list_notes(&UserId::random())
            .await
            .expect_err("unavailable");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
