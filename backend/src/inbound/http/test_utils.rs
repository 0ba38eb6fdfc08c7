//! Test helpers for inbound HTTP components.

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test, web};
use serde_json::json;

use crate::Trace;
use crate::inbound::http::accounts::LoginResponse;
use crate::inbound::http::configure_api;
use crate::inbound::http::json::{DEFAULT_MAX_BODY_BYTES, json_config};
use crate::test_support::InMemoryHarness;

/// Initialise the `/api/v1` routes over the harness's in-memory state.
pub(crate) async fn init_app(
    harness: &InMemoryHarness,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    let sessions = harness.state.sessions.clone();
    test::init_service(
        App::new()
            .app_data(web::Data::new(harness.state.clone()))
            .app_data(json_config(DEFAULT_MAX_BODY_BYTES))
            .wrap(Trace)
            .configure(configure_api(sessions)),
    )
    .await
}

/// Register `username` and return a bearer token for them.
pub(crate) async fn bearer_for<S, B>(app: &S, username: &str, password: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let body = json!({ "username": username, "password": password });
    let registered = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(&body)
            .to_request(),
    )
    .await;
    assert_eq!(registered.status(), StatusCode::CREATED);

    let login = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(&body)
            .to_request(),
    )
    .await;
    assert_eq!(login.status(), StatusCode::OK);
    let token: LoginResponse = test::read_body_json(login).await;
    format!("Bearer {}", token.token)
}

/// Build a request carrying `authorization`.
pub(crate) fn authed(
    request: test::TestRequest,
    authorization: &str,
) -> test::TestRequest {
    request.insert_header((AUTHORIZATION, authorization.to_owned()))
}
