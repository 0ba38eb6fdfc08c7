//! Account handlers: registration and login.
//!
//! ```text
//! POST /api/v1/register {"username":"alice","password":"pw1"}
//! POST /api/v1/login    {"username":"alice","password":"pw1"}
//! ```

use actix_web::{HttpResponse, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, LoginCredentials, SessionToken, User, Username};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{credentials_error, username_error};

/// Credentials body shared by `POST /register` and `POST /login`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<CredentialsRequest> for LoginCredentials {
    type Error = Error;

    fn try_from(value: CredentialsRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password).map_err(credentials_error)
    }
}

/// Public view of a newly registered user.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUserResponse {
    pub id: i64,
    pub username: String,
}

impl From<User> for RegisteredUserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id().as_i64(),
            username: user.username().as_ref().to_owned(),
        }
    }
}

/// Bearer token returned by a successful login.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    /// Always `Bearer`.
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

impl From<SessionToken> for LoginResponse {
    fn from(token: SessionToken) -> Self {
        Self {
            token: token.as_str().to_owned(),
            token_type: "Bearer".to_owned(),
            expires_at: token.expires_at(),
        }
    }
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Account created", body = RegisteredUserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = LoginCredentials::try_from(payload.into_inner())?;
    Username::new(credentials.username()).map_err(username_error)?;
    let user = state.registration.register(&credentials).await?;
    Ok(HttpResponse::Created().json(RegisteredUserResponse::from(user)))
}

/// Exchange credentials for a bearer token valid for 24 hours.
///
/// Unknown usernames and wrong passwords get the same response.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let credentials = LoginCredentials::try_from(payload.into_inner())?;
    let token = state.login.login(&credentials).await?;
    Ok(web::Json(LoginResponse::from(token)))
}
