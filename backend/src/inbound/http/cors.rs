//! Cross-origin headers for browser clients.
//!
//! Every response carries the configured allow-origin, method, and header
//! lists. `OPTIONS` preflights are answered with `204` here, before any
//! identity check runs.

use std::future::{Ready, ready};
use std::sync::Arc;

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::Method;
use actix_web::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, HeaderMap, HeaderValue, InvalidHeaderValue,
};
use actix_web::HttpResponse;
use futures_util::future::LocalBoxFuture;

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str =
    "Authorization, Content-Type, Content-Length, Accept, Accept-Encoding, Origin, Cache-Control, X-Requested-With";
const PREFLIGHT_MAX_AGE_SECS: &str = "600";

/// CORS middleware factory.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use geodata::inbound::http::cors::Cors;
///
/// let cors = Cors::new("*").expect("valid origin");
/// let _app = App::new().wrap(cors);
/// ```
#[derive(Clone)]
pub struct Cors {
    headers: Arc<HeaderMap>,
}

impl Cors {
    /// Build the middleware for a single allowed origin (or `*`).
    ///
    /// # Errors
    ///
    /// Returns an error when `origin` is not a valid header value.
    pub fn new(origin: &str) -> Result<Self, InvalidHeaderValue> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_str(origin)?);
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        Ok(Self {
            headers: Arc::new(headers),
        })
    }
}

fn apply(headers: &HeaderMap, target: &mut HeaderMap) {
    for (name, value) in headers {
        target.insert(name.clone(), value.clone());
    }
}

impl<S, B> Transform<S, ServiceRequest> for Cors
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = CorsMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CorsMiddleware {
            service,
            headers: Arc::clone(&self.headers),
        }))
    }
}

/// Service wrapper produced by [`Cors`].
pub struct CorsMiddleware<S> {
    service: S,
    headers: Arc<HeaderMap>,
}

impl<S, B> Service<ServiceRequest> for CorsMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let headers = Arc::clone(&self.headers);
        if req.method() == Method::OPTIONS {
            let mut preflight = HttpResponse::NoContent().finish();
            apply(&headers, preflight.headers_mut());
            preflight.headers_mut().insert(
                ACCESS_CONTROL_MAX_AGE,
                HeaderValue::from_static(PREFLIGHT_MAX_AGE_SECS),
            );
            let response = req.into_response(preflight).map_into_right_body();
            return Box::pin(async move { Ok(response) });
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let mut res = fut.await?;
            apply(&headers, res.headers_mut());
            Ok(res.map_into_left_body())
        })
    }
}
