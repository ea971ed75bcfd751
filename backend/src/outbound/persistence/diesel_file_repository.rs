//! PostgreSQL-backed `FileRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{FilePersistenceError, FileRepository};
use crate::domain::{FileId, FileName, StorageKey, StoredFile, UserId};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{FileRow, NewFileRow};
use super::pool::{DbPool, PoolError};
use super::schema::files;

/// Diesel-backed file metadata store.
///
/// Upserts target the unique `(owner_id, filename)` index, so a re-upload
/// swaps the row's id, storage key and timestamp in one statement.
#[derive(Clone)]
pub struct DieselFileRepository {
    pool: DbPool,
}

impl DieselFileRepository {
    /// Create a repository over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> FilePersistenceError {
    map_basic_pool_error(error, FilePersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> FilePersistenceError {
    map_basic_diesel_error(
        error,
        FilePersistenceError::query,
        FilePersistenceError::connection,
    )
}

fn row_to_file(row: FileRow) -> Result<StoredFile, FilePersistenceError> {
    let filename = FileName::new(row.filename).map_err(|err| {
        FilePersistenceError::query(format!("invalid file name in database: {err}"))
    })?;
    Ok(StoredFile {
        id: FileId::from_uuid(row.id),
        owner: UserId::from_uuid(row.owner_id),
        filename,
        storage_key: StorageKey::from_uuid(row.storage_key),
        uploaded_at: row.uploaded_at,
    })
}

#[async_trait]
impl FileRepository for DieselFileRepository {
    async fn upsert(&self, file: &StoredFile) -> Result<(), FilePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewFileRow {
            id: *file.id.as_uuid(),
            owner_id: *file.owner.as_uuid(),
            filename: file.filename.as_ref(),
            storage_key: *file.storage_key.as_uuid(),
            uploaded_at: file.uploaded_at,
        };
        diesel::insert_into(files::table)
            .values(&row)
            .on_conflict((files::owner_id, files::filename))
            .do_update()
            .set((
                files::id.eq(excluded(files::id)),
                files::storage_key.eq(excluded(files::storage_key)),
                files::uploaded_at.eq(excluded(files::uploaded_at)),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn list_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<StoredFile>, FilePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<FileRow> = files::table
            .filter(files::owner_id.eq(owner.as_uuid()))
            .order((files::uploaded_at.asc(), files::id.asc()))
            .select(FileRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_file).collect()
    }

    async fn find_by_name(
        &self,
        owner: &UserId,
        filename: &FileName,
    ) -> Result<Option<StoredFile>, FilePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = files::table
            .filter(
                files::owner_id
                    .eq(owner.as_uuid())
                    .and(files::filename.eq(filename.as_ref())),
            )
            .select(FileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_file).transpose()
    }

    async fn find_by_id(
        &self,
        owner: &UserId,
        id: &FileId,
    ) -> Result<Option<StoredFile>, FilePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = files::table
            .filter(
                files::id
                    .eq(id.as_uuid())
                    .and(files::owner_id.eq(owner.as_uuid())),
            )
            .select(FileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_file).transpose()
    }

    async fn delete(&self, owner: &UserId, id: &FileId) -> Result<bool, FilePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            files::table.filter(
                files::id
                    .eq(id.as_uuid())
                    .and(files::owner_id.eq(owner.as_uuid())),
            ),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
