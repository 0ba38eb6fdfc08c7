//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (implemented by outbound adapters): credential hashing,
//! session token signing, user storage, and ownership-scoped record storage.
//! Driving ports (called by inbound adapters): registration, login, and
//! bearer token authentication.

mod macros;
pub(crate) use macros::define_port_error;

mod credential_verifier;
mod login_service;
mod owned_record_repository;
mod registration_service;
mod session_authenticator;
mod token_service;
mod user_repository;

#[cfg(test)]
pub use credential_verifier::MockCredentialVerifier;
pub use credential_verifier::{CredentialError, CredentialVerifier};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
pub use owned_record_repository::{OwnedRecordRepository, OwnedRecordRepositoryError};
#[cfg(test)]
pub use registration_service::MockRegistrationService;
pub use registration_service::RegistrationService;
#[cfg(test)]
pub use session_authenticator::MockSessionAuthenticator;
pub use session_authenticator::SessionAuthenticator;
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{TokenError, TokenService};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
