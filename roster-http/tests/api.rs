//! End-to-end route tests over the in-memory store

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use roster_core::selection::LeastLoadedSelection;
use roster_core::{MemoryStore, Services};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    let services = Services::new(Arc::new(MemoryStore::new()), Arc::new(LeastLoadedSelection));
    roster_http::router(services, Duration::from_secs(5))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn seed_team(app: &Router) {
    let (status, body) = call(
        app,
        Method::POST,
        "/team/add",
        Some(json!({
            "team_name": "backend",
            "members": [
                {"user_id": "a", "username": "Alice", "is_active": true},
                {"user_id": "r1", "username": "Rob", "is_active": true},
                {"user_id": "r2", "username": "Rae", "is_active": true}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["team"]["team_name"], "backend");
}

async fn create_pr(app: &Router, id: &str) -> (StatusCode, Value) {
    call(
        app,
        Method::POST,
        "/pullRequest/create",
        Some(json!({
            "pull_request_id": id,
            "pull_request_name": "Add search endpoint",
            "author_id": "a"
        })),
    )
    .await
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let app = app();
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

#[tokio::test]
async fn test_team_lifecycle() {
    let app = app();
    seed_team(&app).await;

    let (status, body) = call(&app, Method::GET, "/team/get?team_name=backend", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["members"].as_array().unwrap().len(), 3);

    let (status, body) = call(
        &app,
        Method::POST,
        "/team/add",
        Some(json!({"team_name": "backend", "members": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "TEAM_EXISTS");

    let (status, body) = call(&app, Method::GET, "/team/get?team_name=nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, body) = call(&app, Method::GET, "/team/get", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_create_merge_reassign_flow() {
    let app = app();
    seed_team(&app).await;

    let (status, body) = create_pr(&app, "pr-1").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["pr"]["status"], "OPEN");
    assert_eq!(body["pr"]["assigned_reviewers"], json!(["r1"]));
    assert!(body["pr"]["mergedAt"].is_null());

    let (status, body) = create_pr(&app, "pr-1").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "PR_EXISTS");

    let (status, body) = call(
        &app,
        Method::POST,
        "/pullRequest/reassign",
        Some(json!({"pull_request_id": "pr-1", "old_reviewer_id": "r1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["replaced_by"], "r2");
    assert_eq!(body["pr"]["assigned_reviewers"], json!(["r2"]));

    let (status, body) = call(
        &app,
        Method::POST,
        "/pullRequest/reassign",
        Some(json!({"pull_request_id": "pr-1", "old_reviewer_id": "r2"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "NO_CANDIDATE");

    let (status, body) = call(
        &app,
        Method::POST,
        "/pullRequest/reassign",
        Some(json!({"pull_request_id": "pr-1", "old_reviewer_id": "a"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "NOT_ASSIGNED");

    let (status, merged) = call(
        &app,
        Method::POST,
        "/pullRequest/merge",
        Some(json!({"pull_request_id": "pr-1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(merged["pr"]["status"], "MERGED");

    let (status, again) = call(
        &app,
        Method::POST,
        "/pullRequest/merge",
        Some(json!({"pull_request_id": "pr-1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["pr"]["mergedAt"], merged["pr"]["mergedAt"]);

    let (status, body) = call(
        &app,
        Method::POST,
        "/pullRequest/reassign",
        Some(json!({"pull_request_id": "pr-1", "old_reviewer_id": "r2"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "PR_MERGED");
}

#[tokio::test]
async fn test_create_validation() {
    let app = app();
    seed_team(&app).await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/pullRequest/create",
        Some(json!({"pull_request_id": "pr-1", "pull_request_name": "Fix", "author_id": "a"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, _) = call(
        &app,
        Method::POST,
        "/pullRequest/create",
        Some(json!({"pull_request_id": "pr-1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &app,
        Method::POST,
        "/pullRequest/create",
        Some(json!({
            "pull_request_id": "pr-1",
            "pull_request_name": "Add search endpoint",
            "author_id": "ghost"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = call(&app, Method::POST, "/pullRequest/merge", Some(json!({"pull_request_id": "x"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_users_and_stats() {
    let app = app();
    seed_team(&app).await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/users/setIsActive",
        Some(json!({"user_id": "r1", "is_active": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["is_active"], false);
    assert_eq!(body["user"]["team_name"], "backend");

    let (_, body) = create_pr(&app, "pr-1").await;
    assert_eq!(body["pr"]["assigned_reviewers"], json!(["r2"]));

    let (status, body) = call(&app, Method::GET, "/users/getReview?user_id=r2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "r2");
    assert_eq!(body["pull_requests"][0]["pull_request_id"], "pr-1");
    assert_eq!(body["pull_requests"][0]["status"], "OPEN");

    let (status, _) = call(&app, Method::GET, "/users/getReview?user_id=ghost", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(&app, Method::GET, "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"][0]["user_id"], "r2");
    assert_eq!(body["users"][0]["assignment_count"], 1);
    assert_eq!(body["pull_requests"], json!({"total": 1, "open": 1, "merged": 0}));

    let (status, body) = call(&app, Method::GET, "/stats?sort=asc", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"][2]["user_id"], "r2");

    let (status, body) = call(&app, Method::GET, "/stats?sort=sideways", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/team/add")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
