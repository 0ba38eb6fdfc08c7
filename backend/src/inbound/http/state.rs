//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and services and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{LoginService, RegistrationService, SessionAuthenticator};
use crate::domain::{GeoFile, OwnedRecordService, Shape};

/// Parameter object bundling the port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub registration: Arc<dyn RegistrationService>,
    pub login: Arc<dyn LoginService>,
    pub sessions: Arc<dyn SessionAuthenticator>,
    pub geo_files: OwnedRecordService<GeoFile>,
    pub shapes: OwnedRecordService<Shape>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub registration: Arc<dyn RegistrationService>,
    pub login: Arc<dyn LoginService>,
    /// Validates bearer tokens; also handed to the identity middleware.
    pub sessions: Arc<dyn SessionAuthenticator>,
    pub geo_files: OwnedRecordService<GeoFile>,
    pub shapes: OwnedRecordService<Shape>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use geodata::domain::{AccountService, OwnedRecordService};
    /// use geodata::inbound::http::state::{HttpState, HttpStatePorts};
    /// use geodata::outbound::credentials::{Argon2CredentialVerifier, Argon2Settings};
    /// use geodata::outbound::memory::{InMemoryOwnedRecordRepository, InMemoryUserRepository};
    /// use geodata::outbound::tokens::{JwtTokenService, SigningKey};
    /// use mockable::DefaultClock;
    ///
    /// let clock = Arc::new(DefaultClock);
    /// let accounts = Arc::new(AccountService::new(
    ///     Arc::new(InMemoryUserRepository::new()),
    ///     Arc::new(Argon2CredentialVerifier::new(Argon2Settings::default()).unwrap()),
    ///     Arc::new(JwtTokenService::new(&SigningKey::generate())),
    ///     clock.clone(),
    /// ));
    /// let state = HttpState::new(HttpStatePorts {
    ///     registration: accounts.clone(),
    ///     login: accounts.clone(),
    ///     sessions: accounts,
    ///     geo_files: OwnedRecordService::new(
    ///         Arc::new(InMemoryOwnedRecordRepository::new()),
    ///         clock.clone(),
    ///     ),
    ///     shapes: OwnedRecordService::new(Arc::new(InMemoryOwnedRecordRepository::new()), clock),
    /// });
    /// let _sessions = state.sessions.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            registration,
            login,
            sessions,
            geo_files,
            shapes,
        } = ports;
        Self {
            registration,
            login,
            sessions,
            geo_files,
            shapes,
        }
    }
}
