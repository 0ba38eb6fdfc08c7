//! Prometheus request metrics, compiled in with the `metrics` feature.
//!
//! Request counters and latency histograms are exported under the `geodata`
//! namespace at [`METRICS_PATH`]. Health probes are left unmetered so
//! orchestrator polling does not drown out API traffic.

use std::io;
use std::sync::Arc;

use actix_service::{
    Service, ServiceExt as _, Transform,
    boxed::{self, BoxService},
};
use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Compat;
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use futures_util::future::LocalBoxFuture;

pub(crate) const METRICS_PATH: &str = "/metrics";
const NAMESPACE: &str = "geodata";
const UNMETERED_PATHS: [&str; 2] = ["/health/live", "/health/ready"];

/// Request metrics middleware; a pass-through when disabled.
#[derive(Clone)]
pub(crate) struct RequestMetrics {
    prometheus: Option<Arc<PrometheusMetrics>>,
}

impl RequestMetrics {
    /// Middleware that records nothing and serves no endpoint.
    #[must_use]
    pub(crate) fn disabled() -> Self {
        Self { prometheus: None }
    }

    /// Prometheus middleware with its own registry, serving [`METRICS_PATH`].
    pub(crate) fn prometheus() -> io::Result<Self> {
        let metrics = UNMETERED_PATHS
            .into_iter()
            .fold(
                PrometheusMetricsBuilder::new(NAMESPACE).endpoint(METRICS_PATH),
                |builder, path| builder.exclude(path),
            )
            .build()
            .map_err(|err| io::Error::other(format!("configure Prometheus metrics: {err}")))?;
        Ok(Self {
            prometheus: Some(Arc::new(metrics)),
        })
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestMetrics
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = BoxService<ServiceRequest, ServiceResponse<BoxBody>, actix_web::Error>;
    type Future = LocalBoxFuture<'static, Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        match self.prometheus.clone() {
            Some(prometheus) => {
                let metered = Compat::new((*prometheus).clone()).new_transform(service);
                Box::pin(async move { Ok(boxed::service(metered.await?)) })
            }
            None => Box::pin(async move {
                let plain = service.map(|res: ServiceResponse<B>| res.map_into_boxed_body());
                Ok(boxed::service(plain))
            }),
        }
    }
}
