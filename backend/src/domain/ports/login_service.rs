//! Driving port for exchanging credentials for a session token.
use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, SessionToken};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Verify credentials and issue a session token.
    ///
    /// Unknown usernames and wrong passwords yield the same
    /// [`crate::domain::ErrorCode::Unauthorized`] error.
    async fn login(&self, credentials: &LoginCredentials) -> Result<SessionToken, Error>;
}
