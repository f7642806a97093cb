mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, json_request, StubModel, TestAppBuilder};
use tower::ServiceExt;

fn get_profile() -> Request<Body> {
    Request::builder()
        .uri("/api/profile")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn profile_is_created_lazily_with_defaults() {
    let test = TestAppBuilder::new(StubModel::replying("unused")).build();

    let response = test.router.oneshot(get_profile()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["id"], 1);
    assert_eq!(json["name"], "User");
    assert_eq!(json["likes"], "Anime, Tech");
    assert_eq!(json["preferences"], serde_json::json!({}));
}

#[tokio::test]
async fn update_changes_only_present_fields() {
    let test = TestAppBuilder::new(StubModel::replying("unused")).build();

    let response = test
        .router
        .clone()
        .oneshot(json_request(
            Method::PUT,
            "/api/profile",
            r#"{"name":"Rahul","likes":"","preferences":{"voice":"soft"}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(test.router.oneshot(get_profile()).await.unwrap()).await;
    assert_eq!(json["name"], "Rahul");
    assert_eq!(json["likes"], "Anime, Tech");
    assert_eq!(json["preferences"]["voice"], "soft");
}

#[tokio::test]
async fn malformed_update_is_rejected() {
    let test = TestAppBuilder::new(StubModel::replying("unused")).build();

    let response = test
        .router
        .oneshot(json_request(Method::PUT, "/api/profile", r#"{"name": 5}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
