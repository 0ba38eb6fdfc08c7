//! Credential verifier adapters.

mod argon2_verifier;

pub use argon2_verifier::{Argon2CredentialVerifier, Argon2Settings, Argon2SettingsError};
