//! Driving port used by the identity middleware to resolve bearer tokens.
use crate::domain::{Error, UserId};

/// Resolve a raw bearer token into the authenticated user id.
///
/// Implementations read the current time themselves and must not consult
/// storage; the token alone decides.
#[cfg_attr(test, mockall::automock)]
pub trait SessionAuthenticator: Send + Sync {
    fn authenticate(&self, token: &str) -> Result<UserId, Error>;
}
