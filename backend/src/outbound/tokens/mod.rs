//! Session token adapters: HS256 signing and signing key loading.

mod jwt;
pub mod signing_key;

pub use jwt::JwtTokenService;
pub use signing_key::{BuildMode, SigningKey, SigningKeyError, signing_key_from_env};
