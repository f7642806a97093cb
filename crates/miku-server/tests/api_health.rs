mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::{body_json, StubModel, TestAppBuilder};
use tower::ServiceExt;

#[tokio::test]
async fn health_check_returns_ok() {
    let test = TestAppBuilder::new(StubModel::replying("unused")).build();

    let response = test
        .router
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let test = TestAppBuilder::new(StubModel::replying("unused")).build();

    let response = test
        .router
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/chat")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn serves_index_and_static_files() {
    let site = tempfile::tempdir().unwrap();
    let static_dir = site.path().join("static");
    std::fs::create_dir_all(&static_dir).unwrap();
    std::fs::write(static_dir.join("app.js"), "console.log('miku');").unwrap();
    let index = site.path().join("index.html");
    std::fs::write(&index, "<html>Miku</html>").unwrap();

    let test = TestAppBuilder::new(StubModel::replying("unused"))
        .static_files(static_dir, index)
        .build();

    let page = test
        .router
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    let body = axum::body::to_bytes(page.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"<html>Miku</html>");

    let script = test
        .router
        .oneshot(
            Request::builder()
                .uri("/static/app.js")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(script.status(), StatusCode::OK);
}
