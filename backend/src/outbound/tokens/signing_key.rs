//! Token signing key loading and validation.
//!
//! The key is read once at startup from the environment, either inline
//! (`JWT_SECRET`) or from a file (`JWT_SECRET_FILE`). Release builds insist on
//! a real key of adequate length; debug builds fall back to a random key so
//! local runs work without setup. Tokens signed with a random key do not
//! survive a restart.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use mockable::Env;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroizing;

const SECRET_ENV: &str = "JWT_SECRET";
const SECRET_FILE_ENV: &str = "JWT_SECRET_FILE";
const ALLOW_EPHEMERAL_ENV: &str = "JWT_ALLOW_EPHEMERAL";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";

/// Minimum key length accepted by release builds.
pub const SIGNING_KEY_MIN_LEN: usize = 32;
const EPHEMERAL_KEY_LEN: usize = 32;
/// Length of the fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Build mode for signing key validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate missing keys and emit warnings.
    Debug,
    /// Release builds require an explicit, adequately sized key.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use geodata::outbound::tokens::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Errors raised while loading the signing key.
#[derive(thiserror::Error, Debug)]
pub enum SigningKeyError {
    /// Neither `JWT_SECRET` nor `JWT_SECRET_FILE` is set.
    #[error("missing signing key: set JWT_SECRET or JWT_SECRET_FILE")]
    Missing,
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the key file failed.
    #[error("failed to read signing key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The key is too short for release builds.
    #[error("signing key too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort { length: usize, min_len: usize },
    /// Release builds must not allow ephemeral keys.
    #[error("JWT_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// HMAC key material for session tokens. Zeroed on drop.
#[derive(Clone)]
pub struct SigningKey {
    bytes: Zeroizing<Vec<u8>>,
    ephemeral: bool,
}

impl SigningKey {
    /// Wrap caller-provided key bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Zeroizing::new(bytes.into()),
            ephemeral: false,
        }
    }

    /// Generate a random key that lives only as long as the process.
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; EPHEMERAL_KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self {
            bytes: Zeroizing::new(bytes),
            ephemeral: true,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    /// Whether the key was generated rather than configured.
    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }

    /// Truncated SHA-256 fingerprint for logs; reveals nothing usable.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use geodata::outbound::tokens::SigningKey;
    ///
    /// let fp = SigningKey::from_bytes(vec![b'a'; 32]).fingerprint();
    /// assert_eq!(fp.len(), 16);
    /// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    /// ```
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.as_bytes());
        hex::encode(&digest[..FINGERPRINT_BYTES])
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("fingerprint", &self.fingerprint())
            .field("ephemeral", &self.ephemeral)
            .finish()
    }
}

/// Load the signing key from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use geodata::outbound::tokens::{BuildMode, signing_key_from_env};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "JWT_SECRET" => Some("0123456789abcdef0123456789abcdef".to_owned()),
///     _ => None,
/// });
///
/// let key = signing_key_from_env(&env, BuildMode::Release).unwrap();
/// assert!(!key.is_ephemeral());
/// ```
pub fn signing_key_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<SigningKey, SigningKeyError> {
    let allow_ephemeral = allow_ephemeral_from_env(env, mode)?;

    let loaded = match configured_key(env) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return fallback(mode, allow_ephemeral, SigningKeyError::Missing),
        Err(error) => return fallback(mode, allow_ephemeral, error),
    };

    let length = loaded.len();
    if length < SIGNING_KEY_MIN_LEN {
        if !mode.is_debug() {
            return Err(SigningKeyError::KeyTooShort {
                length,
                min_len: SIGNING_KEY_MIN_LEN,
            });
        }
        warn!(
            length,
            min_len = SIGNING_KEY_MIN_LEN,
            "signing key shorter than recommended (dev only)"
        );
    }
    Ok(SigningKey {
        bytes: loaded,
        ephemeral: false,
    })
}

fn configured_key<E: Env>(env: &E) -> Result<Option<Zeroizing<Vec<u8>>>, SigningKeyError> {
    if let Some(secret) = env.string(SECRET_ENV).filter(|value| !value.is_empty()) {
        return Ok(Some(Zeroizing::new(secret.into_bytes())));
    }
    let Some(path) = env.string(SECRET_FILE_ENV).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    let path = PathBuf::from(path);
    let mut bytes = read_key_file(&path).map_err(|source| SigningKeyError::KeyRead {
        path: path.clone(),
        source,
    })?;
    // Secret managers commonly append a newline when mounting files.
    while bytes.last().is_some_and(|byte| matches!(byte, b'\n' | b'\r')) {
        bytes.pop();
    }
    Ok(Some(bytes))
}

fn read_key_file(path: &Path) -> io::Result<Zeroizing<Vec<u8>>> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name: OsString = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path must name a file"))?
        .to_os_string();
    let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
    directory.read(Path::new(&file_name)).map(Zeroizing::new)
}

fn fallback(
    mode: BuildMode,
    allow_ephemeral: bool,
    reason: SigningKeyError,
) -> Result<SigningKey, SigningKeyError> {
    if mode.is_debug() || allow_ephemeral {
        warn!(reason = %reason, "using temporary signing key (dev only)");
        Ok(SigningKey::generate())
    } else {
        Err(reason)
    }
}

fn allow_ephemeral_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<bool, SigningKeyError> {
    let Some(value) = env.string(ALLOW_EPHEMERAL_ENV) else {
        return Ok(false);
    };
    match parse_bool(&value) {
        Some(true) if !mode.is_debug() => Err(SigningKeyError::EphemeralNotAllowed),
        Some(flag) => Ok(flag),
        None if mode.is_debug() => {
            warn!(value = %value, "invalid {ALLOW_EPHEMERAL_ENV}; defaulting to disabled");
            Ok(false)
        }
        None => Err(SigningKeyError::InvalidEnv {
            name: ALLOW_EPHEMERAL_ENV,
            value,
            expected: BOOL_EXPECTED,
        }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
