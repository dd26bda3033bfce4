use axum::http::StatusCode;
use axum::Router;
use axum_test::TestServer;
use httpmock::prelude::*;
use qbank_rs::api;
use qbank_rs::test_utils;
use serde_json::json;
use uuid::Uuid;

async fn test_server(storage_base_url: &str) -> TestServer {
    let app_state = test_utils::create_test_state(storage_base_url).expect("test state");
    let router = api::create_router().await.expect("Failed to create router");
    let app = Router::new().nest("/api", router).with_state(app_state);
    TestServer::new(app).expect("Failed to create test server")
}

#[tokio::test]
async fn test_status_endpoint_is_reachable() {
    let server = test_server("http://localhost:1").await;

    let response = server.get("/api/status").await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let server = test_server("http://localhost:1").await;

    let response = server.get("/api/does-not-exist").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_routes_reject_missing_token() {
    let server = test_server("http://localhost:1").await;

    let stats = server.get("/api/admin/stats").await;
    assert_eq!(stats.status_code(), StatusCode::UNAUTHORIZED);

    let papers = server.get("/api/admin/papers").await;
    assert_eq!(papers.status_code(), StatusCode::UNAUTHORIZED);

    let delete = server
        .delete(&format!("/api/admin/papers/{}", Uuid::new_v4()))
        .await;
    assert_eq!(delete.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_reject_garbage_token() {
    let server = test_server("http://localhost:1").await;

    let response = server
        .get("/api/admin/stats")
        .add_header("authorization", "Bearer not-a-real-token")
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_requires_auth_header() {
    let server = test_server("http://localhost:1").await;

    let response = server.get("/api/auth/profile").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_rejects_invalid_shapes_before_touching_the_store() {
    let server = test_server("http://localhost:1").await;

    // Not an email address
    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": "nope", "password": "long-enough" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    // Password too short
    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": "admin@example.edu", "password": "123" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_blank_search_returns_empty_results() {
    let server = MockServer::start_async().await;
    let api = test_server(&server.base_url()).await;

    let response = api.get("/api/search").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["total"], 0);
    assert_eq!(body["results"], json!([]));

    let response = api.get("/api/search?q=%20%20").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_hierarchical_lookup_requires_all_path_segments() {
    let server = test_server("http://localhost:1").await;

    let response = server.get("/api/papers").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server.get("/api/papers?branch=cse&year=2023").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_paper_detail_rejects_malformed_id() {
    let server = test_server("http://localhost:1").await;

    let response = server.get("/api/papers/not-a-uuid").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
