//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
pub(crate) mod settings;
mod state_builders;

pub use config::ServerConfig;
pub(crate) use state_builders::build_http_state;

#[cfg(feature = "metrics")]
pub(crate) use metrics::RequestMetrics;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use geodata::Trace;
#[cfg(debug_assertions)]
use geodata::doc::ApiDoc;
use geodata::inbound::http::configure_api;
use geodata::inbound::http::cors::Cors;
use geodata::inbound::http::health::{HealthState, live, ready};
use geodata::inbound::http::json::json_config;
use geodata::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    cors: Cors,
    max_body_bytes: usize,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        cors,
        max_body_bytes,
    } = deps;
    let sessions = http_state.sessions.clone();

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config(max_body_bytes))
        .wrap(Trace)
        .wrap(cors)
        .configure(configure_api(sessions))
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig {
        bind_addr,
        http_state,
        cors,
        max_body_bytes,
        #[cfg(feature = "metrics")]
        metrics,
    } = config;
    let http_state = web::Data::new(http_state);

    let server = HttpServer::new(move || {
        let app = build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            cors: cors.clone(),
            max_body_bytes,
        });

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
