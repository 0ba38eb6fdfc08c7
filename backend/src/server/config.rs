//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

#[cfg(feature = "metrics")]
use super::metrics::RequestMetrics;

use geodata::inbound::http::cors::Cors;
use geodata::inbound::http::state::HttpState;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) http_state: HttpState,
    pub(crate) cors: Cors,
    pub(crate) max_body_bytes: usize,
    #[cfg(feature = "metrics")]
    pub(crate) metrics: RequestMetrics,
}

impl ServerConfig {
    /// Construct a server configuration from wired state and transport settings.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, http_state: HttpState, cors: Cors, max_body_bytes: usize) -> Self {
        Self {
            bind_addr,
            http_state,
            cors,
            max_body_bytes,
            #[cfg(feature = "metrics")]
            metrics: RequestMetrics::disabled(),
        }
    }

    #[cfg(feature = "metrics")]
    /// Attach request metrics middleware to the configuration.
    #[must_use]
    pub(crate) fn with_metrics(mut self, metrics: RequestMetrics) -> Self {
        self.metrics = metrics;
        self
    }
}
