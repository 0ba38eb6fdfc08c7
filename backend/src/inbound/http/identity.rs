//! Bearer token identity gate.
//!
//! [`RequireIdentity`] wraps every protected scope. It reads
//! `Authorization: Bearer <token>`, asks the [`SessionAuthenticator`] port
//! for the token's subject, and binds the result into the request's own
//! extension map as an [`AuthenticatedUser`]. Requests that fail any step end
//! with `401` before the handler runs. Handlers take [`AuthenticatedUser`] as
//! an extractor, which fails closed if no identity was bound.

use std::future::{Ready, ready};
use std::sync::Arc;

use actix_web::body::EitherBody;
use actix_web::dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::domain::ports::SessionAuthenticator;
use crate::domain::{Error, UserId};

const BEARER_SCHEME: &str = "Bearer";

/// Why the `Authorization` header could not yield a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsError {
    /// No `Authorization` header was sent.
    MissingCredentials,
    /// The header does not follow `Bearer <token>` framing.
    MalformedCredentials,
}

impl From<CredentialsError> for Error {
    fn from(value: CredentialsError) -> Self {
        match value {
            CredentialsError::MissingCredentials => Error::unauthorized("missing credentials"),
            CredentialsError::MalformedCredentials => Error::unauthorized("malformed credentials"),
        }
    }
}

/// Extract the bearer token from request headers.
///
/// The scheme is matched case-insensitively. The token must be non-empty
/// visible ASCII with no embedded whitespace.
///
/// # Examples
/// ```
/// use actix_web::http::header::{AUTHORIZATION, HeaderMap, HeaderValue};
/// use geodata::inbound::http::identity::{CredentialsError, bearer_token};
///
/// let mut headers = HeaderMap::new();
/// assert_eq!(bearer_token(&headers), Err(CredentialsError::MissingCredentials));
///
/// headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
/// assert_eq!(bearer_token(&headers), Ok("abc.def.ghi"));
/// ```
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, CredentialsError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(CredentialsError::MissingCredentials)?;
    let raw = value
        .to_str()
        .map_err(|_| CredentialsError::MalformedCredentials)?;
    let (scheme, token) = raw
        .split_once(' ')
        .ok_or(CredentialsError::MalformedCredentials)?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(CredentialsError::MalformedCredentials);
    }
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_graphic()) {
        return Err(CredentialsError::MalformedCredentials);
    }
    Ok(token)
}

/// Identity bound to the current request by [`RequireIdentity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(UserId);

impl AuthenticatedUser {
    pub fn user_id(self) -> UserId {
        self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let bound = req.extensions().get::<AuthenticatedUser>().copied();
        ready(bound.ok_or_else(|| Error::from(CredentialsError::MissingCredentials)))
    }
}

/// Middleware factory enforcing bearer authentication on a scope.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
///
/// use actix_web::{App, web};
/// use geodata::domain::ports::SessionAuthenticator;
/// use geodata::inbound::http::identity::RequireIdentity;
///
/// fn app(sessions: Arc<dyn SessionAuthenticator>) {
///     let _app = App::new().service(
///         web::scope("/shapes").wrap(RequireIdentity::new(sessions)),
///     );
/// }
/// ```
#[derive(Clone)]
pub struct RequireIdentity {
    authenticator: Arc<dyn SessionAuthenticator>,
}

impl RequireIdentity {
    pub fn new(authenticator: Arc<dyn SessionAuthenticator>) -> Self {
        Self { authenticator }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireIdentity
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RequireIdentityMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireIdentityMiddleware {
            service,
            authenticator: Arc::clone(&self.authenticator),
        }))
    }
}

/// Service wrapper produced by [`RequireIdentity`].
pub struct RequireIdentityMiddleware<S> {
    service: S,
    authenticator: Arc<dyn SessionAuthenticator>,
}

impl<S> RequireIdentityMiddleware<S> {
    fn identify(&self, headers: &HeaderMap) -> Result<AuthenticatedUser, Error> {
        let token = bearer_token(headers).map_err(|err| {
            debug!(reason = ?err, "bearer credentials rejected");
            Error::from(err)
        })?;
        self.authenticator.authenticate(token).map(AuthenticatedUser)
    }
}

impl<S, B> Service<ServiceRequest> for RequireIdentityMiddleware<S>
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
        match self.identify(req.headers()) {
            Ok(user) => {
                req.extensions_mut().insert(user);
                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            Err(error) => {
                let response = req.error_response(error).map_into_right_body();
                Box::pin(async move { Ok(response) })
            }
        }
    }
}
