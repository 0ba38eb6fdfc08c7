//! geodata: multi-user storage for geo files and map shapes.
//!
//! Accounts authenticate with a username and password and receive a signed
//! bearer token. Every stored artefact is scoped to its owner.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
