//! Driving port for creating accounts.
use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, User};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationService: Send + Sync {
    /// Hash the password and persist a new user.
    ///
    /// A taken username surfaces as an internal error.
    async fn register(&self, credentials: &LoginCredentials) -> Result<User, Error>;
}
