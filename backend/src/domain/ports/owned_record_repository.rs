//! Port for ownership-scoped record storage.
//!
//! Every operation takes the owner id as a mandatory filter. Adapters must
//! never return, update, or delete a record whose owner differs from the one
//! supplied; a foreign record is reported exactly like an absent one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{OwnedRecord, RecordId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by owned record repository adapters.
    pub enum OwnedRecordRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "record repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "record repository query failed: {message}",
    }
}

/// Storage for records of kind `R`, always filtered by owner.
#[async_trait]
pub trait OwnedRecordRepository<R: OwnedRecord>: Send + Sync {
    /// Insert a record stamped with `owner_id`, assigning its id.
    async fn create(
        &self,
        owner_id: UserId,
        draft: R::Draft,
        at: DateTime<Utc>,
    ) -> Result<R, OwnedRecordRepositoryError>;

    /// Records owned by `owner_id`, ordered by id ascending.
    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<R>, OwnedRecordRepositoryError>;

    /// The record with `id` if, and only if, `owner_id` owns it.
    async fn find_by_owner_and_id(
        &self,
        owner_id: UserId,
        id: RecordId,
    ) -> Result<Option<R>, OwnedRecordRepositoryError>;

    /// Apply `patch` to the matching owned record, returning the new state.
    ///
    /// Returns `Ok(None)` when no record matches both `owner_id` and `id`.
    async fn update_by_owner_and_id(
        &self,
        owner_id: UserId,
        id: RecordId,
        patch: R::Patch,
        at: DateTime<Utc>,
    ) -> Result<Option<R>, OwnedRecordRepositoryError>;

    /// Remove the matching owned record; `Ok(false)` when nothing matched.
    async fn delete_by_owner_and_id(
        &self,
        owner_id: UserId,
        id: RecordId,
    ) -> Result<bool, OwnedRecordRepositoryError>;
}
