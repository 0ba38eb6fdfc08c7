//! Driven port for one-way password hashing.
//!
//! Implementations must salt every hash, use a deliberately expensive
//! transform, and compare in constant time. Both operations are synchronous
//! and CPU bound; callers decide where to run them.

use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Failures raised by credential verifier adapters.
    pub enum CredentialError {
        /// The hash could not be produced (entropy or parameter failure).
        Hashing { message: String } => "password hashing failed: {message}",
        /// The stored hash was not produced by this verifier.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

/// Salted, cost-tunable password hashing.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialVerifier: Send + Sync {
    /// Hash a plaintext password. Two calls with the same input produce
    /// different outputs.
    fn hash(&self, plaintext: &str) -> Result<PasswordHash, CredentialError>;

    /// Check a plaintext password against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch; errors only for malformed hashes.
    fn verify(&self, plaintext: &str, hash: &PasswordHash) -> Result<bool, CredentialError>;
}
