//! Account registration, login, and bearer token authentication.
//!
//! This service implements the three authentication driving ports on top of
//! the user repository, the credential verifier, and the token service.
//! Password hashing is CPU bound, so it always runs on the blocking pool.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::domain::ports::{
    CredentialError, CredentialVerifier, LoginService, RegistrationService, SessionAuthenticator,
    TokenError, TokenService, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Error, LoginCredentials, NewUser, PasswordHash, SessionToken, User, UserId, Username,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";
const INVALID_TOKEN: &str = "invalid or expired token";

/// Authentication service implementing the account driving ports.
pub struct AccountService<U, C, T> {
    users: Arc<U>,
    verifier: Arc<C>,
    tokens: Arc<T>,
    clock: Arc<dyn Clock>,
}

impl<U, C, T> Clone for AccountService<U, C, T> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            verifier: Arc::clone(&self.verifier),
            tokens: Arc::clone(&self.tokens),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<U, C, T> AccountService<U, C, T> {
    /// Create a new service from its driven ports.
    pub fn new(users: Arc<U>, verifier: Arc<C>, tokens: Arc<T>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            verifier,
            tokens,
            clock,
        }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::internal(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateUsername { username } => {
            Error::internal(format!("failed to create user {username}"))
        }
    }
}

fn map_credential_error(error: CredentialError) -> Error {
    Error::internal(format!("credential verification failed: {error}"))
}

fn map_issue_error(error: TokenError) -> Error {
    Error::internal(format!("failed to issue session token: {error}"))
}

fn invalid_credentials() -> Error {
    Error::unauthorized(INVALID_CREDENTIALS)
}

async fn run_blocking<F, R>(task: F) -> Result<R, Error>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| Error::internal(format!("credential task failed: {err}")))
}

impl<U, C, T> AccountService<U, C, T>
where
    U: UserRepository,
    C: CredentialVerifier + 'static,
    T: TokenService,
{
    async fn hash_password(&self, password: &str) -> Result<PasswordHash, Error> {
        let verifier = Arc::clone(&self.verifier);
        let password = Zeroizing::new(password.to_owned());
        run_blocking(move || verifier.hash(password.as_str()))
            .await?
            .map_err(map_credential_error)
    }

    async fn verify_password(&self, password: &str, hash: &PasswordHash) -> Result<bool, Error> {
        let verifier = Arc::clone(&self.verifier);
        let password = Zeroizing::new(password.to_owned());
        let hash = hash.clone();
        run_blocking(move || verifier.verify(password.as_str(), &hash))
            .await?
            .map_err(map_credential_error)
    }
}

#[async_trait]
impl<U, C, T> RegistrationService for AccountService<U, C, T>
where
    U: UserRepository,
    C: CredentialVerifier + 'static,
    T: TokenService,
{
    async fn register(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let username = Username::new(credentials.username())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let password_hash = self.hash_password(credentials.password()).await?;
        let new_user = NewUser {
            username,
            password_hash,
            created_at: self.clock.utc(),
        };

        let user = self.users.create(&new_user).await.map_err(|err| {
            warn!(error = %err, "user registration failed");
            map_user_error(err)
        })?;
        info!(user_id = %user.id(), "user registered");
        Ok(user)
    }
}

#[async_trait]
impl<U, C, T> LoginService for AccountService<U, C, T>
where
    U: UserRepository,
    C: CredentialVerifier + 'static,
    T: TokenService,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<SessionToken, Error> {
        let Ok(username) = Username::new(credentials.username()) else {
            return Err(invalid_credentials());
        };
        let Some(user) = self
            .users
            .find_by_username(&username)
            .await
            .map_err(map_user_error)?
        else {
            // Spend a hash so unknown usernames take as long as wrong passwords.
            if let Err(error) = self.hash_password(credentials.password()).await {
                debug!(%error, "timing hash for unknown username failed");
            }
            debug!("login rejected: unknown username");
            return Err(invalid_credentials());
        };

        if !self
            .verify_password(credentials.password(), user.password_hash())
            .await?
        {
            debug!(user_id = %user.id(), "login rejected: password mismatch");
            return Err(invalid_credentials());
        }

        let token = self
            .tokens
            .issue(user.id(), self.clock.utc())
            .map_err(map_issue_error)?;
        info!(user_id = %user.id(), expires_at = %token.expires_at(), "session issued");
        Ok(token)
    }
}

impl<U, C, T> SessionAuthenticator for AccountService<U, C, T>
where
    U: UserRepository,
    C: CredentialVerifier + 'static,
    T: TokenService,
{
    fn authenticate(&self, token: &str) -> Result<UserId, Error> {
        self.tokens
            .validate(token, self.clock.utc())
            .map_err(|err| {
                debug!(error = %err, "bearer token rejected");
                Error::unauthorized(INVALID_TOKEN)
            })
    }
}
