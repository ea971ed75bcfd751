//! PostgreSQL-backed `NoteRepository`.
//!
//! Every statement filters on `owner_id`, which keeps deletes owner-scoped.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{NotePersistenceError, NoteRepository};
use crate::domain::{Note, NoteId, UserId};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewNoteRow, NoteRow};
use super::pool::{DbPool, PoolError};
use super::schema::notes;

/// Diesel-backed [`NoteRepository`].
#[derive(Clone)]
pub struct DieselNoteRepository {
    pool: DbPool,
}

impl DieselNoteRepository {
    /// Create a repository over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> NotePersistenceError {
    map_basic_pool_error(error, NotePersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> NotePersistenceError {
    map_basic_diesel_error(
        error,
        NotePersistenceError::query,
        NotePersistenceError::connection,
    )
}

fn row_to_note(row: NoteRow) -> Note {
    Note {
        id: NoteId::from_uuid(row.id),
        owner: UserId::from_uuid(row.owner_id),
        title: row.title,
        content: row.content,
        created_at: row.created_at,
    }
}

#[async_trait]
impl NoteRepository for DieselNoteRepository {
    async fn insert(&self, note: &Note) -> Result<(), NotePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewNoteRow {
            id: *note.id.as_uuid(),
            owner_id: *note.owner.as_uuid(),
            title: &note.title,
            content: &note.content,
            created_at: note.created_at,
        };
        diesel::insert_into(notes::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Note>, NotePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<NoteRow> = notes::table
            .filter(notes::owner_id.eq(owner.as_uuid()))
            .order((notes::created_at.asc(), notes::id.asc()))
            .select(NoteRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_note).collect())
    }

    async fn delete(&self, owner: &UserId, id: &NoteId) -> Result<bool, NotePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            notes::table.filter(
                notes::id
                    .eq(id.as_uuid())
                    .and(notes::owner_id.eq(owner.as_uuid())),
            ),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
