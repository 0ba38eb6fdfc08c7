//! Argon2id implementation of the `CredentialVerifier` port.
//!
//! Hashes are stored in PHC string format, so the cost parameters and salt
//! travel with each hash and verification keeps working after the configured
//! costs change.

use argon2::{Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version};
use password_hash::{PasswordHash as PhcHash, SaltString};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::domain::PasswordHash;
use crate::domain::ports::{CredentialError, CredentialVerifier};

const SALT_LEN: usize = 16;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Settings {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for Argon2Settings {
    /// OWASP's minimum recommendation for Argon2id.
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Rejected Argon2 parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid argon2 parameters: {message}")]
pub struct Argon2SettingsError {
    message: String,
}

/// Argon2id hasher with fixed cost parameters.
#[derive(Clone)]
pub struct Argon2CredentialVerifier {
    hasher: Argon2<'static>,
}

impl Argon2CredentialVerifier {
    /// Build a verifier, validating the cost parameters up front.
    pub fn new(settings: Argon2Settings) -> Result<Self, Argon2SettingsError> {
        let params = Params::new(
            settings.memory_kib,
            settings.iterations,
            settings.parallelism,
            None,
        )
        .map_err(|err| Argon2SettingsError {
            message: err.to_string(),
        })?;
        Ok(Self {
            hasher: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

fn random_salt() -> Result<SaltString, CredentialError> {
    let mut bytes = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|err| CredentialError::hashing(format!("salt generation failed: {err}")))?;
    SaltString::encode_b64(&bytes).map_err(|err| CredentialError::hashing(err.to_string()))
}

impl CredentialVerifier for Argon2CredentialVerifier {
    fn hash(&self, plaintext: &str) -> Result<PasswordHash, CredentialError> {
        let salt = random_salt()?;
        let phc = self
            .hasher
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|err| CredentialError::hashing(err.to_string()))?;
        Ok(PasswordHash::new(phc.to_string()))
    }

    fn verify(&self, plaintext: &str, hash: &PasswordHash) -> Result<bool, CredentialError> {
        let parsed = PhcHash::new(hash.as_str())
            .map_err(|err| CredentialError::malformed_hash(err.to_string()))?;
        match self.hasher.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(CredentialError::malformed_hash(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn verifier() -> Argon2CredentialVerifier {
        Argon2CredentialVerifier::new(Argon2Settings {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        })
        .expect("cheap test parameters")
    }

    #[rstest]
    fn hash_then_verify_accepts_original_password(verifier: Argon2CredentialVerifier) {
        let hash = verifier.hash("pw1").expect("hash");

        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(verifier.verify("pw1", &hash).expect("verify"));
    }

    #[rstest]
    #[case("pw2")]
    #[case("PW1")]
    #[case("pw1 ")]
    fn verify_rejects_other_passwords(verifier: Argon2CredentialVerifier, #[case] attempt: &str) {
        let hash = verifier.hash("pw1").expect("hash");
        assert!(!verifier.verify(attempt, &hash).expect("verify"));
    }

    #[rstest]
    fn hashing_is_salted(verifier: Argon2CredentialVerifier) {
        let first = verifier.hash("same").expect("hash");
        let second = verifier.hash("same").expect("hash");
        assert_ne!(first, second);
    }

    #[rstest]
    fn hashes_from_other_costs_still_verify(verifier: Argon2CredentialVerifier) {
        let stronger = Argon2CredentialVerifier::new(Argon2Settings {
            memory_kib: 128,
            iterations: 2,
            parallelism: 1,
        })
        .expect("parameters");
        let hash = stronger.hash("pw1").expect("hash");

        assert!(verifier.verify("pw1", &hash).expect("verify"));
    }

    #[rstest]
    #[case("")]
    #[case("plaintext")]
    fn malformed_hashes_are_errors(verifier: Argon2CredentialVerifier, #[case] stored: &str) {
        let error = verifier
            .verify("pw1", &PasswordHash::new(stored))
            .expect_err("malformed");
        assert!(matches!(error, CredentialError::MalformedHash { .. }));
    }

    #[rstest]
    fn zero_memory_is_rejected() {
        let result = Argon2CredentialVerifier::new(Argon2Settings {
            memory_kib: 0,
            iterations: 1,
            parallelism: 1,
        });
        assert!(result.is_err());
    }
}
