//! geodata entry-point: loads settings and the signing key, wires storage,
//! and serves the REST API.

mod server;

use std::ffi::OsString;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use geodata::inbound::http::cors::Cors;
use geodata::inbound::http::health::HealthState;
use geodata::outbound::tokens::{BuildMode, signing_key_from_env};
use server::settings::AppSettings;
#[cfg(feature = "metrics")]
use server::RequestMetrics;
use server::{ServerConfig, build_http_state, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os().collect::<Vec<OsString>>())
        .map_err(|e| std::io::Error::other(format!("load settings: {e}")))?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;

    let key = signing_key_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    info!(
        fingerprint = %key.fingerprint(),
        ephemeral = key.is_ephemeral(),
        "signing key loaded"
    );

    let http_state = build_http_state(&settings, &key).await?;
    let cors = Cors::new(settings.cors_allowed_origin()).map_err(std::io::Error::other)?;

    let config = ServerConfig::new(bind_addr, http_state, cors, settings.max_body_bytes());
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(RequestMetrics::prometheus()?);

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting HTTP server");
    let server = create_server(health_state, config)?;
    server.await
}
