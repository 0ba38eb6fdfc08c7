//! In-memory `OwnedRecordRepository` shared by geo files and shapes.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{OwnedRecordRepository, OwnedRecordRepositoryError};
use crate::domain::{OwnedRecord, RecordId, UserId};

use super::lock;

/// Record store keyed by id; every lookup also compares the owner.
#[derive(Debug)]
pub struct InMemoryOwnedRecordRepository<R> {
    records: Mutex<BTreeMap<RecordId, R>>,
    next_id: AtomicI64,
}

impl<R> Default for InMemoryOwnedRecordRepository<R> {
    fn default() -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl<R> InMemoryOwnedRecordRepository<R> {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl<R: OwnedRecord> OwnedRecordRepository<R> for InMemoryOwnedRecordRepository<R> {
    async fn create(
        &self,
        owner_id: UserId,
        draft: R::Draft,
        at: DateTime<Utc>,
    ) -> Result<R, OwnedRecordRepositoryError> {
        let raw_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let id = RecordId::new(raw_id).map_err(|err| {
            OwnedRecordRepositoryError::query(format!("id allocation failed: {err}"))
        })?;
        let record = R::from_draft(id, owner_id, draft, at);
        lock(&self.records).insert(id, record.clone());
        Ok(record)
    }

    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<R>, OwnedRecordRepositoryError> {
        Ok(lock(&self.records)
            .values()
            .filter(|record| record.owner_id() == owner_id)
            .cloned()
            .collect())
    }

    async fn find_by_owner_and_id(
        &self,
        owner_id: UserId,
        id: RecordId,
    ) -> Result<Option<R>, OwnedRecordRepositoryError> {
        Ok(lock(&self.records)
            .get(&id)
            .filter(|record| record.owner_id() == owner_id)
            .cloned())
    }

    async fn update_by_owner_and_id(
        &self,
        owner_id: UserId,
        id: RecordId,
        patch: R::Patch,
        at: DateTime<Utc>,
    ) -> Result<Option<R>, OwnedRecordRepositoryError> {
        let mut records = lock(&self.records);
        let Some(record) = records
            .get_mut(&id)
            .filter(|record| record.owner_id() == owner_id)
        else {
            return Ok(None);
        };
        record.apply_patch(patch, at);
        Ok(Some(record.clone()))
    }

    async fn delete_by_owner_and_id(
        &self,
        owner_id: UserId,
        id: RecordId,
    ) -> Result<bool, OwnedRecordRepositoryError> {
        let mut records = lock(&self.records);
        let owned = records
            .get(&id)
            .is_some_and(|record| record.owner_id() == owner_id);
        if owned {
            records.remove(&id);
        }
        Ok(owned)
    }
}
