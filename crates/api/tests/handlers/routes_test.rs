use axum::http::{HeaderName, HeaderValue, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use test_log::test;

use crate::test_utils::test_server;

fn authorization(value: &str) -> (HeaderName, HeaderValue) {
    (
        axum::http::header::AUTHORIZATION,
        HeaderValue::from_str(value).unwrap(),
    )
}

#[test(tokio::test)]
async fn test_health_check() {
    let server = test_server();

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "status": "ok" }));
}

#[test(tokio::test)]
async fn test_version_reports_crate_version() {
    let server = test_server();

    let response = server.get("/version").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["version"], json!(env!("CARGO_PKG_VERSION")));
}

#[test(tokio::test)]
async fn test_me_requires_token() {
    let server = test_server();

    let response = server.get("/api/auth/me").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Authentication error: Missing bearer token" })
    );
}

#[test(tokio::test)]
async fn test_non_bearer_scheme_is_rejected() {
    let server = test_server();
    let (name, value) = authorization("Basic dXNlcjpwYXNz");

    let response = server.get("/api/auth/me").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[test(tokio::test)]
async fn test_create_program_requires_login() {
    let server = test_server();

    let response = server
        .post("/api/programs")
        .json(&json!({ "name": "Camp day", "start_time": "09:00" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[test(tokio::test)]
async fn test_listing_own_programs_requires_login() {
    let server = test_server();

    let response = server.get("/api/programs").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[test(tokio::test)]
async fn test_entry_writes_require_login() {
    let server = test_server();
    let id = uuid::Uuid::new_v4();

    let replace = server
        .put(&format!("/api/programs/{}/entries", id))
        .json(&json!({ "entries": [] }))
        .await;
    let reorder = server
        .post(&format!("/api/programs/{}/entries/reorder", id))
        .json(&json!({ "moved_id": id, "from_index": 0, "to_index": 1 }))
        .await;

    assert_eq!(replace.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(reorder.status_code(), StatusCode::UNAUTHORIZED);
}

#[test(tokio::test)]
async fn test_unapproved_listing_needs_admin() {
    let server = test_server();

    let response = server.get("/api/activities?approved=false").await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[test(tokio::test)]
async fn test_malformed_program_id_is_bad_request() {
    let server = test_server();

    let response = server.get("/api/programs/not-a-uuid").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[test(tokio::test)]
async fn test_category_creation_requires_login() {
    let server = test_server();

    let response = server
        .post("/api/categories")
        .json(&json!({ "name": "Games" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[test(tokio::test)]
async fn test_unknown_route_is_not_found() {
    let server = test_server();

    let response = server.get("/api/schedules").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
