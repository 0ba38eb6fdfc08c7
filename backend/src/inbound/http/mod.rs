//! HTTP inbound adapter exposing REST endpoints.
//!
//! Everything lives under `/api/v1`. Account endpoints are public; geo file
//! and shape scopes sit behind [`identity::RequireIdentity`].

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::SessionAuthenticator;

pub mod accounts;
pub mod cors;
pub mod error;
pub mod geo_files;
pub mod health;
pub mod identity;
pub mod json;
pub mod shapes;
pub mod state;
mod validation;

pub use error::ApiResult;

/// Register the `/api/v1` routes.
///
/// Handlers expect [`state::HttpState`] and a JSON config in app data.
///
/// # Examples
/// ```no_run
/// use actix_web::{App, web};
/// use geodata::inbound::http::configure_api;
/// use geodata::inbound::http::json::{DEFAULT_MAX_BODY_BYTES, json_config};
/// use geodata::inbound::http::state::HttpState;
///
/// fn app(state: HttpState) {
///     let sessions = state.sessions.clone();
///     let _app = App::new()
///         .app_data(web::Data::new(state))
///         .app_data(json_config(DEFAULT_MAX_BODY_BYTES))
///         .configure(configure_api(sessions));
/// }
/// ```
pub fn configure_api(
    sessions: Arc<dyn SessionAuthenticator>,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.service(
            web::scope("/api/v1")
                .service(accounts::register)
                .service(accounts::login)
                .service(
                    web::scope("/files")
                        .wrap(identity::RequireIdentity::new(Arc::clone(&sessions)))
                        .service(geo_files::upload_geo_file)
                        .service(geo_files::list_geo_files)
                        .service(geo_files::get_geo_file_content)
                        .service(geo_files::replace_geo_file_content)
                        .service(geo_files::delete_geo_file),
                )
                .service(
                    web::scope("/shapes")
                        .wrap(identity::RequireIdentity::new(sessions))
                        .service(shapes::create_shape)
                        .service(shapes::list_shapes)
                        .service(shapes::get_shape)
                        .service(shapes::update_shape)
                        .service(shapes::delete_shape),
                ),
        );
    }
}

#[cfg(test)]
pub(crate) mod test_utils;
