//! In-process adapters used when no database is configured and by tests.
//!
//! State lives behind a `Mutex`; identifiers come from per-repository atomic
//! counters starting at 1, so ids are never reused within a process.

mod owned_record_repository;
mod user_repository;

pub use owned_record_repository::InMemoryOwnedRecordRepository;
pub use user_repository::InMemoryUserRepository;

use std::sync::{Mutex, MutexGuard};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
