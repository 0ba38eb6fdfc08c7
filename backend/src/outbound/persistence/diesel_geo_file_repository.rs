//! PostgreSQL-backed geo file storage using Diesel ORM.
//!
//! Every statement filters on `owner_id`, so a row owned by someone else is
//! indistinguishable from a missing row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{OwnedRecordRepository, OwnedRecordRepositoryError};
use crate::domain::{GeoFile, GeoFileDraft, GeoFilePatch, RecordId, RecordName, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{GeoFileRow, GeoFileUpdate, NewGeoFileRow};
use super::pool::{DbPool, PoolError};
use super::schema::geo_files;

/// Diesel-backed implementation of `OwnedRecordRepository<GeoFile>`.
#[derive(Clone)]
pub struct DieselGeoFileRepository {
    pool: DbPool,
}

impl DieselGeoFileRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OwnedRecordRepositoryError {
    map_basic_pool_error(error, OwnedRecordRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> OwnedRecordRepositoryError {
    map_basic_diesel_error(
        error,
        OwnedRecordRepositoryError::query,
        OwnedRecordRepositoryError::connection,
    )
}

fn corrupt_row(field: &str, err: impl std::fmt::Display) -> OwnedRecordRepositoryError {
    OwnedRecordRepositoryError::query(format!("invalid stored geo file {field}: {err}"))
}

/// Convert a database row to a domain geo file.
fn row_to_geo_file(row: GeoFileRow) -> Result<GeoFile, OwnedRecordRepositoryError> {
    Ok(GeoFile {
        id: RecordId::new(row.id).map_err(|err| corrupt_row("id", err))?,
        owner_id: UserId::new(row.owner_id).map_err(|err| corrupt_row("owner", err))?,
        name: RecordName::new(&row.name).map_err(|err| corrupt_row("name", err))?,
        kind: row.kind.parse().map_err(|err| corrupt_row("kind", err))?,
        content: row.content,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl OwnedRecordRepository<GeoFile> for DieselGeoFileRepository {
    async fn create(
        &self,
        owner_id: UserId,
        draft: GeoFileDraft,
        at: DateTime<Utc>,
    ) -> Result<GeoFile, OwnedRecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewGeoFileRow {
            owner_id: owner_id.as_i64(),
            name: draft.name().as_ref(),
            kind: draft.kind().as_str(),
            content: draft.content(),
            created_at: at,
            updated_at: at,
        };

        let row = diesel::insert_into(geo_files::table)
            .values(&new_row)
            .returning(GeoFileRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_geo_file(row)
    }

    async fn list_by_owner(
        &self,
        owner_id: UserId,
    ) -> Result<Vec<GeoFile>, OwnedRecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<GeoFileRow> = geo_files::table
            .filter(geo_files::owner_id.eq(owner_id.as_i64()))
            .order(geo_files::id.asc())
            .select(GeoFileRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_geo_file).collect()
    }

    async fn find_by_owner_and_id(
        &self,
        owner_id: UserId,
        id: RecordId,
    ) -> Result<Option<GeoFile>, OwnedRecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let result: Option<GeoFileRow> = geo_files::table
            .filter(geo_files::owner_id.eq(owner_id.as_i64()))
            .filter(geo_files::id.eq(id.as_i64()))
            .select(GeoFileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        result.map(row_to_geo_file).transpose()
    }

    async fn update_by_owner_and_id(
        &self,
        owner_id: UserId,
        id: RecordId,
        patch: GeoFilePatch,
        at: DateTime<Utc>,
    ) -> Result<Option<GeoFile>, OwnedRecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let update = GeoFileUpdate {
            content: patch.content(),
            updated_at: at,
        };

        let result: Option<GeoFileRow> = diesel::update(
            geo_files::table
                .filter(geo_files::owner_id.eq(owner_id.as_i64()))
                .filter(geo_files::id.eq(id.as_i64())),
        )
        .set(&update)
        .returning(GeoFileRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        result.map(row_to_geo_file).transpose()
    }

    async fn delete_by_owner_and_id(
        &self,
        owner_id: UserId,
        id: RecordId,
    ) -> Result<bool, OwnedRecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(
            geo_files::table
                .filter(geo_files::owner_id.eq(owner_id.as_i64()))
                .filter(geo_files::id.eq(id.as_i64())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}
