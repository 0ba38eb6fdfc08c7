//! Builders wiring domain services to their storage, credential, and token
//! adapters.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use geodata::domain::ports::{OwnedRecordRepository, UserRepository};
use geodata::domain::{AccountService, GeoFile, OwnedRecordService, Shape};
use geodata::inbound::http::state::{HttpState, HttpStatePorts};
use geodata::outbound::credentials::Argon2CredentialVerifier;
use geodata::outbound::memory::{InMemoryOwnedRecordRepository, InMemoryUserRepository};
use geodata::outbound::persistence::{
    DbPool, DieselGeoFileRepository, DieselShapeRepository, DieselUserRepository, PoolConfig,
    run_pending_migrations,
};
use geodata::outbound::tokens::{JwtTokenService, SigningKey};

use super::settings::AppSettings;

/// Repository adapters for every stored entity.
struct Repositories<U> {
    users: Arc<U>,
    geo_files: Arc<dyn OwnedRecordRepository<GeoFile>>,
    shapes: Arc<dyn OwnedRecordRepository<Shape>>,
}

fn build_state<U: UserRepository + 'static>(
    repositories: Repositories<U>,
    verifier: Argon2CredentialVerifier,
    key: &SigningKey,
) -> HttpState {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let accounts = Arc::new(AccountService::new(
        repositories.users,
        Arc::new(verifier),
        Arc::new(JwtTokenService::new(key)),
        Arc::clone(&clock),
    ));
    HttpState::new(HttpStatePorts {
        registration: accounts.clone(),
        login: accounts.clone(),
        sessions: accounts,
        geo_files: OwnedRecordService::new(repositories.geo_files, Arc::clone(&clock)),
        shapes: OwnedRecordService::new(repositories.shapes, clock),
    })
}

/// Build the HTTP state from settings.
///
/// Uses PostgreSQL when a database URL is configured, running pending
/// migrations first unless disabled; otherwise falls back to in-memory
/// repositories that lose their contents on restart.
///
/// # Errors
///
/// Returns [`std::io::Error`] when the Argon2 settings are invalid, the pool
/// cannot be built, or migrations fail.
pub(crate) async fn build_http_state(
    settings: &AppSettings,
    key: &SigningKey,
) -> std::io::Result<HttpState> {
    let verifier = Argon2CredentialVerifier::new(settings.argon2_settings())
        .map_err(std::io::Error::other)?;

    match settings.database_url.as_deref() {
        Some(url) => {
            if settings.run_migrations() {
                run_pending_migrations(url)
                    .await
                    .map_err(std::io::Error::other)?;
            }
            let pool = DbPool::new(
                PoolConfig::new(url)
                    .with_max_size(settings.db_max_connections())
                    .with_connection_timeout(settings.db_connection_timeout()),
            )
            .await
            .map_err(std::io::Error::other)?;
            info!(
                max_connections = settings.db_max_connections(),
                "using PostgreSQL repositories"
            );
            let repositories = Repositories {
                users: Arc::new(DieselUserRepository::new(pool.clone())),
                geo_files: Arc::new(DieselGeoFileRepository::new(pool.clone())),
                shapes: Arc::new(DieselShapeRepository::new(pool)),
            };
            Ok(build_state(repositories, verifier, key))
        }
        None => {
            warn!("no database configured; using in-memory repositories (data is lost on restart)");
            let repositories = Repositories {
                users: Arc::new(InMemoryUserRepository::new()),
                geo_files: Arc::new(InMemoryOwnedRecordRepository::<GeoFile>::new()),
                shapes: Arc::new(InMemoryOwnedRecordRepository::<Shape>::new()),
            };
            Ok(build_state(repositories, verifier, key))
        }
    }
}
