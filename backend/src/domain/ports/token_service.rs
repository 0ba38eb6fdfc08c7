//! Driven port for issuing and validating signed session tokens.
//!
//! Implementations hold the process-wide signing key, injected once at
//! construction. `now` is always supplied by the caller so expiry checks are
//! deterministic under test.

use chrono::{DateTime, Utc};

use crate::domain::{SessionToken, UserId};

use super::define_port_error;

define_port_error! {
    /// Failures raised by token service adapters.
    pub enum TokenError {
        /// The token is forged, tampered, expired, uses the wrong algorithm,
        /// or carries an unusable subject.
        Invalid { reason: String } => "session token rejected: {reason}",
        /// The token could not be signed.
        Signing { message: String } => "session token signing failed: {message}",
    }
}

/// Bearer token issuer and validator.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Issue a token for `user_id` that expires a fixed lifetime after `now`.
    fn issue(&self, user_id: UserId, now: DateTime<Utc>) -> Result<SessionToken, TokenError>;

    /// Validate a token and return the user id it was issued for.
    ///
    /// Fails when `now >= expires_at`. Never consults storage.
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, TokenError>;
}
