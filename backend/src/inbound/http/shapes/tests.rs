//! Tests for the shape handlers.

use actix_web::http::StatusCode;
use actix_web::test;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::ErrorCode;
use crate::inbound::http::test_utils::{authed, bearer_for, init_app};
use crate::test_support::InMemoryHarness;

const POINT: &str = r#"{"type":"Point","coordinates":[0,0]}"#;
const LINE: &str = r#"{"type":"LineString","coordinates":[[0,0],[1,1]]}"#;

async fn create<S, B>(app: &S, token: &str, name: &str) -> ShapeResponse
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse<B>,
            Error = actix_web::Error,
        >,
    B: actix_web::body::MessageBody,
{
    let res = test::call_service(
        app,
        authed(test::TestRequest::post().uri("/api/v1/shapes"), token)
            .set_json(json!({"name": name, "geometry": POINT}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    test::read_body_json(res).await
}

#[actix_web::test]
async fn create_then_get_round_trips_fields() {
    let harness = InMemoryHarness::new();
    let app = init_app(&harness).await;
    let alice = bearer_for(&app, "alice", "pw1").await;
    let created = create(&app, &alice, "S1").await;

    let res = test::call_service(
        &app,
        authed(
            test::TestRequest::get().uri(&format!("/api/v1/shapes/{}", created.id)),
            &alice,
        )
        .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let fetched: ShapeResponse = test::read_body_json(res).await;
    assert_eq!(fetched.name, "S1");
    assert_eq!(fetched.geometry, POINT);
    assert_eq!(fetched.created_at, created.created_at);
}

#[rstest]
#[case(json!({"name": "S2"}), "S2", POINT)]
#[case(json!({"geometry": LINE}), "S1", LINE)]
#[case(json!({"name": "S3", "geometry": LINE}), "S3", LINE)]
#[actix_web::test]
async fn partial_update_changes_only_present_fields(
    #[case] patch: Value,
    #[case] name: &str,
    #[case] geometry: &str,
) {
    let harness = InMemoryHarness::new();
    let app = init_app(&harness).await;
    let alice = bearer_for(&app, "alice", "pw1").await;
    let created = create(&app, &alice, "S1").await;

    let res = test::call_service(
        &app,
        authed(
            test::TestRequest::put().uri(&format!("/api/v1/shapes/{}", created.id)),
            &alice,
        )
        .set_json(patch)
        .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let updated: ShapeResponse = test::read_body_json(res).await;
    assert_eq!(updated.name, name);
    assert_eq!(updated.geometry, geometry);
}

#[actix_web::test]
async fn empty_patch_is_rejected() {
    let harness = InMemoryHarness::new();
    let app = init_app(&harness).await;
    let alice = bearer_for(&app, "alice", "pw1").await;
    let created = create(&app, &alice, "S1").await;

    let res = test::call_service(
        &app,
        authed(
            test::TestRequest::put().uri(&format!("/api/v1/shapes/{}", created.id)),
            &alice,
        )
        .set_json(json!({}))
        .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let error: Error = test::read_body_json(res).await;
    assert_eq!(
        error.details().and_then(|d| d.get("code")).and_then(Value::as_str),
        Some("empty_patch")
    );
}

#[actix_web::test]
async fn bob_cannot_touch_alices_shape() {
    let harness = InMemoryHarness::new();
    let app = init_app(&harness).await;
    let alice = bearer_for(&app, "alice", "pw1").await;
    let bob = bearer_for(&app, "bob", "pw2").await;
    let shape = create(&app, &alice, "S1").await;
    let uri = format!("/api/v1/shapes/{}", shape.id);

    let requests = [
        test::TestRequest::get().uri(&uri),
        test::TestRequest::put().uri(&uri).set_json(json!({"name": "S2"})),
        test::TestRequest::delete().uri(&uri),
    ];
    for request in requests {
        let res = test::call_service(&app, authed(request, &bob).to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let error: Error = test::read_body_json(res).await;
        assert_eq!(error.code(), ErrorCode::NotFound);
        assert_eq!(error.message(), "shape not found");
    }

    let missing = test::call_service(
        &app,
        authed(test::TestRequest::get().uri("/api/v1/shapes/9999"), &bob).to_request(),
    )
    .await;
    let missing_error: Error = test::read_body_json(missing).await;
    assert_eq!(missing_error.message(), "shape not found");

    let updated = test::call_service(
        &app,
        authed(test::TestRequest::put().uri(&uri), &alice)
            .set_json(json!({"name": "S2"}))
            .to_request(),
    )
    .await;
    assert_eq!(updated.status(), StatusCode::OK);
    let body: ShapeResponse = test::read_body_json(updated).await;
    assert_eq!(body.name, "S2");
}

#[actix_web::test]
async fn listing_is_owner_scoped_and_ordered() {
    let harness = InMemoryHarness::new();
    let app = init_app(&harness).await;
    let alice = bearer_for(&app, "alice", "pw1").await;
    let bob = bearer_for(&app, "bob", "pw2").await;
    create(&app, &alice, "A1").await;
    create(&app, &bob, "B1").await;
    create(&app, &alice, "A2").await;

    let res = test::call_service(
        &app,
        authed(test::TestRequest::get().uri("/api/v1/shapes"), &alice).to_request(),
    )
    .await;

    let shapes: Vec<ShapeResponse> = test::read_body_json(res).await;
    let names: Vec<_> = shapes.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["A1", "A2"]);
}

#[actix_web::test]
async fn token_expires_after_a_day() {
    let harness = InMemoryHarness::new();
    let app = init_app(&harness).await;
    let alice = bearer_for(&app, "alice", "pw1").await;

    harness.clock.advance_seconds(24 * 60 * 60 - 1);
    let before = test::call_service(
        &app,
        authed(test::TestRequest::get().uri("/api/v1/shapes"), &alice).to_request(),
    )
    .await;
    assert_eq!(before.status(), StatusCode::OK);

    harness.clock.advance_seconds(1);
    let after = test::call_service(
        &app,
        authed(test::TestRequest::get().uri("/api/v1/shapes"), &alice).to_request(),
    )
    .await;
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
}
