//! Test utilities for the geodata crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled when running tests or
//! when the `test-support` feature is enabled.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{AccountService, OwnedRecordService};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::credentials::{Argon2CredentialVerifier, Argon2Settings};
use crate::outbound::memory::{InMemoryOwnedRecordRepository, InMemoryUserRepository};
use crate::outbound::tokens::{JwtTokenService, SigningKey};

/// Signing key shared by tests that need tokens to survive across services.
pub const TEST_SIGNING_KEY: &[u8] = b"geodata-test-signing-key-0123456789abcdef";

/// Fixed instant used as "now" by deterministic tests.
pub fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0)
        .single()
        .unwrap_or_else(|| panic!("valid fixture timestamp"))
}

/// Clock whose reading only moves when a test advances it.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock_clock() = now;
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Default for MutableClock {
    fn default() -> Self {
        Self::new(fixture_timestamp())
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Argon2 costs low enough for tests to hash freely.
pub fn fast_argon2_settings() -> Argon2Settings {
    Argon2Settings {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    }
}

/// Fully wired in-memory application state driven by a [`MutableClock`].
pub struct InMemoryHarness {
    pub state: HttpState,
    pub clock: Arc<MutableClock>,
}

impl InMemoryHarness {
    /// Harness signing tokens with [`TEST_SIGNING_KEY`].
    pub fn new() -> Self {
        Self::with_key(&SigningKey::from_bytes(TEST_SIGNING_KEY))
    }

    pub fn with_key(key: &SigningKey) -> Self {
        let clock = Arc::new(MutableClock::default());
        let verifier = Argon2CredentialVerifier::new(fast_argon2_settings())
            .unwrap_or_else(|err| panic!("test argon2 settings: {err}"));
        let accounts = Arc::new(AccountService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(verifier),
            Arc::new(JwtTokenService::new(key)),
            clock.clone(),
        ));
        let state = HttpState::new(HttpStatePorts {
            registration: accounts.clone(),
            login: accounts.clone(),
            sessions: accounts,
            geo_files: OwnedRecordService::new(
                Arc::new(InMemoryOwnedRecordRepository::new()),
                clock.clone(),
            ),
            shapes: OwnedRecordService::new(
                Arc::new(InMemoryOwnedRecordRepository::new()),
                clock.clone(),
            ),
        });
        Self { state, clock }
    }
}

impl Default for InMemoryHarness {
    fn default() -> Self {
        Self::new()
    }
}
