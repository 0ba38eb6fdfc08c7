//! Ownership-scoped CRUD over geo files and shapes.
//!
//! The owner id always comes from the authenticated identity, never from a
//! request body. A record that does not exist and a record owned by someone
//! else produce the same not-found error, so callers cannot probe for ids.

use std::sync::Arc;

use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{OwnedRecordRepository, OwnedRecordRepositoryError};
use crate::domain::{Error, OwnedRecord, RecordId, UserId};

/// Domain service wrapping an [`OwnedRecordRepository`] for records of kind `R`.
pub struct OwnedRecordService<R: OwnedRecord> {
    repo: Arc<dyn OwnedRecordRepository<R>>,
    clock: Arc<dyn Clock>,
}

impl<R: OwnedRecord> Clone for OwnedRecordService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            clock: Arc::clone(&self.clock),
        }
    }
}

fn map_repository_error(label: &str, error: OwnedRecordRepositoryError) -> Error {
    match error {
        OwnedRecordRepositoryError::Connection { message } => {
            Error::internal(format!("{label} repository unavailable: {message}"))
        }
        OwnedRecordRepositoryError::Query { message } => {
            Error::internal(format!("{label} repository error: {message}"))
        }
    }
}

impl<R: OwnedRecord> OwnedRecordService<R> {
    /// Create a new service with the given repository and clock.
    pub fn new(repo: Arc<dyn OwnedRecordRepository<R>>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    fn not_found() -> Error {
        Error::not_found(format!("{} not found", R::LABEL))
    }

    fn storage_error(error: OwnedRecordRepositoryError) -> Error {
        map_repository_error(R::LABEL, error)
    }

    /// Store a new record stamped with `owner_id`.
    pub async fn create(&self, owner_id: UserId, draft: R::Draft) -> Result<R, Error> {
        let record = self
            .repo
            .create(owner_id, draft, self.clock.utc())
            .await
            .map_err(Self::storage_error)?;
        debug!(owner_id = %owner_id, id = %record.id(), kind = R::LABEL, "record created");
        Ok(record)
    }

    /// Every record owned by `owner_id`; empty when the user has none.
    pub async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<R>, Error> {
        self.repo
            .list_by_owner(owner_id)
            .await
            .map_err(Self::storage_error)
    }

    /// Fetch one record, failing with not-found unless `owner_id` owns it.
    pub async fn get_by_owner_and_id(&self, owner_id: UserId, id: RecordId) -> Result<R, Error> {
        self.repo
            .find_by_owner_and_id(owner_id, id)
            .await
            .map_err(Self::storage_error)?
            .ok_or_else(Self::not_found)
    }

    /// Apply a partial update to a record owned by `owner_id`.
    pub async fn update_by_owner_and_id(
        &self,
        owner_id: UserId,
        id: RecordId,
        patch: R::Patch,
    ) -> Result<R, Error> {
        let updated = self
            .repo
            .update_by_owner_and_id(owner_id, id, patch, self.clock.utc())
            .await
            .map_err(Self::storage_error)?
            .ok_or_else(Self::not_found)?;
        debug!(owner_id = %owner_id, id = %id, kind = R::LABEL, "record updated");
        Ok(updated)
    }

    /// Remove a record owned by `owner_id`.
    pub async fn delete_by_owner_and_id(&self, owner_id: UserId, id: RecordId) -> Result<(), Error> {
        let deleted = self
            .repo
            .delete_by_owner_and_id(owner_id, id)
            .await
            .map_err(Self::storage_error)?;
        if !deleted {
            return Err(Self::not_found());
        }
        debug!(owner_id = %owner_id, id = %id, kind = R::LABEL, "record deleted");
        Ok(())
    }
}
