//! JSON extractor configuration.
//!
//! Body extraction failures are reported with the same error schema as every
//! other client error instead of Actix's plain-text defaults.

use actix_web::error::JsonPayloadError;
use actix_web::web::JsonConfig;
use serde_json::json;
use tracing::debug;

use crate::domain::Error;

/// Default request body limit: 5 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

fn payload_error(err: &JsonPayloadError) -> Error {
    let (message, code) = match err {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            ("request body is too large", "payload_too_large")
        }
        JsonPayloadError::ContentType => {
            ("request body must be application/json", "unsupported_content_type")
        }
        JsonPayloadError::Deserialize(_) => ("request body is not valid JSON for this endpoint", "malformed_json"),
        _ => ("request body could not be read", "unreadable_body"),
    };
    Error::invalid_request(message).with_details(json!({ "field": "body", "code": code }))
}

/// Build the [`JsonConfig`] shared by every handler.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use geodata::inbound::http::json::{DEFAULT_MAX_BODY_BYTES, json_config};
///
/// let _app = App::new().app_data(json_config(DEFAULT_MAX_BODY_BYTES));
/// ```
pub fn json_config(limit: usize) -> JsonConfig {
    JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            debug!(error = %err, "json payload rejected");
            payload_error(&err).into()
        })
}
