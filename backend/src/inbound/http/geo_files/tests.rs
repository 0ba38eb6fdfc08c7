//! Tests for the geo file handlers.

use actix_web::http::StatusCode;
use actix_web::test;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::ErrorCode;
use crate::inbound::http::test_utils::{authed, bearer_for, init_app};
use crate::test_support::InMemoryHarness;

const GEOJSON: &str = r#"{"type":"FeatureCollection","features":[]}"#;

#[actix_web::test]
async fn upload_then_fetch_content_round_trips() {
    let harness = InMemoryHarness::new();
    let app = init_app(&harness).await;
    let alice = bearer_for(&app, "alice", "pw1").await;

    let created = test::call_service(
        &app,
        authed(test::TestRequest::post().uri("/api/v1/files"), &alice)
            .set_json(json!({"name": "parks.geojson", "content": GEOJSON}))
            .to_request(),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let meta: GeoFileResponse = test::read_body_json(created).await;
    assert_eq!(meta.name, "parks.geojson");
    assert_eq!(meta.kind, GeoFileKind::Geojson);

    let fetched = test::call_service(
        &app,
        authed(
            test::TestRequest::get().uri(&format!("/api/v1/files/{}/content", meta.id)),
            &alice,
        )
        .to_request(),
    )
    .await;
    assert_eq!(fetched.status(), StatusCode::OK);
    let body: GeoFileContentResponse = test::read_body_json(fetched).await;
    assert_eq!(body.content, GEOJSON);
    assert_eq!(body.file.id, meta.id);
}

#[rstest]
#[case(json!({"name": "route.KML", "content": "<kml/>"}), GeoFileKind::Kml)]
#[case(json!({"name": "route.txt", "content": "<kml/>", "kind": "kml"}), GeoFileKind::Kml)]
#[case(json!({"name": "data", "content": "{}"}), GeoFileKind::Geojson)]
#[actix_web::test]
async fn upload_infers_or_accepts_kind(#[case] body: Value, #[case] expected: GeoFileKind) {
    let harness = InMemoryHarness::new();
    let app = init_app(&harness).await;
    let alice = bearer_for(&app, "alice", "pw1").await;

    let res = test::call_service(
        &app,
        authed(test::TestRequest::post().uri("/api/v1/files"), &alice)
            .set_json(body)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let meta: GeoFileResponse = test::read_body_json(res).await;
    assert_eq!(meta.kind, expected);
}

#[actix_web::test]
async fn unknown_kind_is_a_validation_error() {
    let harness = InMemoryHarness::new();
    let app = init_app(&harness).await;
    let alice = bearer_for(&app, "alice", "pw1").await;

    let res = test::call_service(
        &app,
        authed(test::TestRequest::post().uri("/api/v1/files"), &alice)
            .set_json(json!({"name": "a.shp", "content": "x", "kind": "shapefile"}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let error: Error = test::read_body_json(res).await;
    assert_eq!(
        error.details().and_then(|d| d.get("field")).and_then(Value::as_str),
        Some("kind")
    );
}

#[actix_web::test]
async fn files_are_invisible_to_other_users() {
    let harness = InMemoryHarness::new();
    let app = init_app(&harness).await;
    let alice = bearer_for(&app, "alice", "pw1").await;
    let bob = bearer_for(&app, "bob", "pw2").await;

    let created = test::call_service(
        &app,
        authed(test::TestRequest::post().uri("/api/v1/files"), &alice)
            .set_json(json!({"name": "a.geojson", "content": GEOJSON}))
            .to_request(),
    )
    .await;
    let meta: GeoFileResponse = test::read_body_json(created).await;

    let listed = test::call_service(
        &app,
        authed(test::TestRequest::get().uri("/api/v1/files"), &bob).to_request(),
    )
    .await;
    let bob_files: Vec<GeoFileResponse> = test::read_body_json(listed).await;
    assert!(bob_files.is_empty());

    let requests = [
        test::TestRequest::get().uri(&format!("/api/v1/files/{}/content", meta.id)),
        test::TestRequest::put()
            .uri(&format!("/api/v1/files/{}/content", meta.id))
            .set_json(json!({"content": "{}"})),
        test::TestRequest::delete().uri(&format!("/api/v1/files/{}", meta.id)),
    ];
    for request in requests {
        let res = test::call_service(&app, authed(request, &bob).to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let error: Error = test::read_body_json(res).await;
        assert_eq!(error.message(), "geo file not found");
    }

    let still_there = test::call_service(
        &app,
        authed(
            test::TestRequest::get().uri(&format!("/api/v1/files/{}/content", meta.id)),
            &alice,
        )
        .to_request(),
    )
    .await;
    let body: GeoFileContentResponse = test::read_body_json(still_there).await;
    assert_eq!(body.content, GEOJSON);
}

#[actix_web::test]
async fn replace_content_refreshes_updated_at() {
    let harness = InMemoryHarness::new();
    let app = init_app(&harness).await;
    let alice = bearer_for(&app, "alice", "pw1").await;
    let created = test::call_service(
        &app,
        authed(test::TestRequest::post().uri("/api/v1/files"), &alice)
            .set_json(json!({"name": "a.geojson", "content": GEOJSON}))
            .to_request(),
    )
    .await;
    let meta: GeoFileResponse = test::read_body_json(created).await;

    harness.clock.advance_seconds(60);
    let res = test::call_service(
        &app,
        authed(
            test::TestRequest::put().uri(&format!("/api/v1/files/{}/content", meta.id)),
            &alice,
        )
        .set_json(json!({"content": "{\"type\":\"Point\"}"}))
        .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let updated: GeoFileResponse = test::read_body_json(res).await;
    assert_eq!(updated.created_at, meta.created_at);
    assert_eq!((updated.updated_at - meta.updated_at).num_seconds(), 60);
}

#[rstest]
#[case("0")]
#[case("-1")]
#[case("abc")]
#[actix_web::test]
async fn unusable_ids_are_not_found(#[case] id: &str) {
    let harness = InMemoryHarness::new();
    let app = init_app(&harness).await;
    let alice = bearer_for(&app, "alice", "pw1").await;

    let res = test::call_service(
        &app,
        authed(test::TestRequest::delete().uri(&format!("/api/v1/files/{id}")), &alice)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let error: Error = test::read_body_json(res).await;
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[actix_web::test]
async fn delete_then_fetch_is_not_found() {
    let harness = InMemoryHarness::new();
    let app = init_app(&harness).await;
    let alice = bearer_for(&app, "alice", "pw1").await;
    let created = test::call_service(
        &app,
        authed(test::TestRequest::post().uri("/api/v1/files"), &alice)
            .set_json(json!({"name": "a.geojson", "content": GEOJSON}))
            .to_request(),
    )
    .await;
    let meta: GeoFileResponse = test::read_body_json(created).await;

    let deleted = test::call_service(
        &app,
        authed(test::TestRequest::delete().uri(&format!("/api/v1/files/{}", meta.id)), &alice)
            .to_request(),
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let fetched = test::call_service(
        &app,
        authed(
            test::TestRequest::get().uri(&format!("/api/v1/files/{}/content", meta.id)),
            &alice,
        )
        .to_request(),
    )
    .await;
    assert_eq!(fetched.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn requests_without_token_are_unauthorised() {
    let harness = InMemoryHarness::new();
    let app = init_app(&harness).await;

    let res = test::call_service(&app, test::TestRequest::get().uri("/api/v1/files").to_request())
        .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
