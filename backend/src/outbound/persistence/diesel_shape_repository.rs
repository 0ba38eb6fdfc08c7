//! PostgreSQL-backed shape storage using Diesel ORM.
//!
//! Every statement filters on `owner_id`, so a row owned by someone else is
//! indistinguishable from a missing row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{OwnedRecordRepository, OwnedRecordRepositoryError};
use crate::domain::{RecordId, RecordName, Shape, ShapeDraft, ShapePatch, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewShapeRow, ShapeRow, ShapeUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::shapes;

/// Diesel-backed implementation of `OwnedRecordRepository<Shape>`.
#[derive(Clone)]
pub struct DieselShapeRepository {
    pool: DbPool,
}

impl DieselShapeRepository {
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

fn row_to_shape(row: ShapeRow) -> Result<Shape, OwnedRecordRepositoryError> {
    let corrupt = |field: &str, err: String| {
        OwnedRecordRepositoryError::query(format!("invalid stored shape {field}: {err}"))
    };
    Ok(Shape {
        id: RecordId::new(row.id).map_err(|err| corrupt("id", err.to_string()))?,
        owner_id: UserId::new(row.owner_id).map_err(|err| corrupt("owner", err.to_string()))?,
        name: RecordName::new(&row.name).map_err(|err| corrupt("name", err.to_string()))?,
        geometry: row.geometry,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl OwnedRecordRepository<Shape> for DieselShapeRepository {
    async fn create(
        &self,
        owner_id: UserId,
        draft: ShapeDraft,
        at: DateTime<Utc>,
    ) -> Result<Shape, OwnedRecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewShapeRow {
            owner_id: owner_id.as_i64(),
            name: draft.name().as_ref(),
            geometry: draft.geometry(),
            created_at: at,
            updated_at: at,
        };

        let row = diesel::insert_into(shapes::table)
            .values(&new_row)
            .returning(ShapeRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_shape(row)
    }

    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Shape>, OwnedRecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ShapeRow> = shapes::table
            .filter(shapes::owner_id.eq(owner_id.as_i64()))
            .order(shapes::id.asc())
            .select(ShapeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_shape).collect()
    }

    async fn find_by_owner_and_id(
        &self,
        owner_id: UserId,
        id: RecordId,
    ) -> Result<Option<Shape>, OwnedRecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let result: Option<ShapeRow> = shapes::table
            .filter(shapes::owner_id.eq(owner_id.as_i64()))
            .filter(shapes::id.eq(id.as_i64()))
            .select(ShapeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        result.map(row_to_shape).transpose()
    }

    async fn update_by_owner_and_id(
        &self,
        owner_id: UserId,
        id: RecordId,
        patch: ShapePatch,
        at: DateTime<Utc>,
    ) -> Result<Option<Shape>, OwnedRecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let update = ShapeUpdate {
            name: patch.name().map(AsRef::as_ref),
            geometry: patch.geometry(),
            updated_at: at,
        };

        let result: Option<ShapeRow> = diesel::update(
            shapes::table
                .filter(shapes::owner_id.eq(owner_id.as_i64()))
                .filter(shapes::id.eq(id.as_i64())),
        )
        .set(&update)
        .returning(ShapeRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        result.map(row_to_shape).transpose()
    }

    async fn delete_by_owner_and_id(
        &self,
        owner_id: UserId,
        id: RecordId,
    ) -> Result<bool, OwnedRecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(
            shapes::table
                .filter(shapes::owner_id.eq(owner_id.as_i64()))
                .filter(shapes::id.eq(id.as_i64())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}
