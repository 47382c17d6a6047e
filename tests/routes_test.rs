mod common;

use serde_json::Value;
use std::time::Duration;
use warp::http::StatusCode;

use demo_generator::auth::TokenKeys;
use demo_generator::routes::app;

const ORIGIN: &str = "http://localhost:5173";

fn api(
    upload_root: &std::path::Path,
) -> impl warp::Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let provider = common::ScriptedProvider::replying(vec![]);
    let state = common::test_state(common::lazy_store(), provider, upload_root);
    app(state, &[ORIGIN.to_string(), "not-a-url".to_string()])
}

fn json(body: &[u8]) -> Value {
    serde_json::from_slice(body).expect("response body is not JSON")
}

#[tokio::test]
async fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let resp = warp::test::request()
        .method("GET")
        .path("/api/health")
        .reply(&api(dir.path()))
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json(resp.body())["status"], "ok");
}

#[tokio::test]
async fn test_unknown_route_is_404_json() {
    let dir = tempfile::tempdir().unwrap();
    let resp = warp::test::request()
        .method("GET")
        .path("/api/v1/nothing/here")
        .reply(&api(dir.path()))
        .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(json(resp.body())["detail"], "Not Found");
}

#[tokio::test]
async fn test_missing_token_is_401_with_challenge() {
    let dir = tempfile::tempdir().unwrap();
    let resp = warp::test::request()
        .method("GET")
        .path("/api/v1/generation/projects")
        .reply(&api(dir.path()))
        .await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers()["www-authenticate"], "Bearer");
    assert_eq!(json(resp.body())["detail"], "Could not validate credentials");
}

#[tokio::test]
async fn test_malformed_authorization_is_401() {
    let dir = tempfile::tempdir().unwrap();
    let resp = warp::test::request()
        .method("GET")
        .path("/api/v1/admin/check-me")
        .header("authorization", "Token abc")
        .reply(&api(dir.path()))
        .await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_foreign_token_is_401() {
    let dir = tempfile::tempdir().unwrap();
    let foreign = TokenKeys::new("some-other-secret", Duration::from_secs(600))
        .issue("alice")
        .unwrap();

    let resp = warp::test::request()
        .method("POST")
        .path("/api/v1/generation/stream/requirements")
        .header("authorization", format!("Bearer {}", foreign))
        .json(&serde_json::json!({ "raw_requirement": "a todo app" }))
        .reply(&api(dir.path()))
        .await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json(resp.body())["detail"], "Could not validate credentials");
}

#[tokio::test]
async fn test_register_requires_username_and_password() {
    let dir = tempfile::tempdir().unwrap();
    let resp = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/register")
        .json(&serde_json::json!({ "username": "   ", "password": "secret" }))
        .reply(&api(dir.path()))
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_rejects_malformed_json() {
    let dir = tempfile::tempdir().unwrap();
    let resp = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/register")
        .header("content-type", "application/json")
        .body("{not json")
        .reply(&api(dir.path()))
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json(resp.body())["detail"].is_string());
}

#[tokio::test]
async fn test_clear_demo_data_skips_non_numeric_project() {
    let dir = tempfile::tempdir().unwrap();
    let resp = warp::test::request()
        .method("DELETE")
        .path("/api/v1/demo/default/data/tasks")
        .reply(&api(dir.path()))
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = json(resp.body());
    assert_eq!(body["status"], "skipped");
    assert_eq!(body["reason"], "invalid project id");
}

#[tokio::test]
async fn test_cors_preflight_for_configured_origin() {
    let dir = tempfile::tempdir().unwrap();
    let resp = warp::test::request()
        .method("OPTIONS")
        .path("/api/v1/generation/projects")
        .header("origin", ORIGIN)
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "authorization, content-type")
        .reply(&api(dir.path()))
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["access-control-allow-origin"], ORIGIN);
}

#[tokio::test]
async fn test_cors_rejects_unknown_origin() {
    let dir = tempfile::tempdir().unwrap();
    let resp = warp::test::request()
        .method("OPTIONS")
        .path("/api/v1/generation/projects")
        .header("origin", "http://evil.example")
        .header("access-control-request-method", "POST")
        .reply(&api(dir.path()))
        .await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
