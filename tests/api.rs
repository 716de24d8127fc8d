//! End-to-end tests of the HTTP API over in-memory stores.

use accounts_service::create_routes;
use accounts_service::testing::TestContext;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(ctx: &TestContext) -> Router {
    create_routes(ctx.service.clone())
}

async fn post(app: &Router, uri: &str, body: Value, bearer: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, body)
}

fn alice() -> Value {
    json!({
        "username": "alice",
        "email": "a@x.com",
        "password": "password1",
        "password_confirm": "password1"
    })
}

#[tokio::test]
async fn register_returns_account_and_tokens() {
    let ctx = TestContext::new();
    let app = app(&ctx);

    let (status, body) = post(&app, "/register", alice(), None).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "a@x.com");
    assert!(body["id"].is_string());
    assert!(!body["refresh"].as_str().unwrap().is_empty());
    assert!(!body["access"].as_str().unwrap().is_empty());
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn register_password_mismatch() {
    let ctx = TestContext::new();
    let mut req = alice();
    req["password_confirm"] = json!("password2");

    let (status, body) = post(&app(&ctx), "/register", req, None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Password fields do not match."));
    assert!(ctx.accounts.is_empty().await);
}

#[tokio::test]
async fn register_short_password() {
    let ctx = TestContext::new();
    let mut req = alice();
    req["password"] = json!("short12");
    req["password_confirm"] = json!("short12");

    let (status, body) = post(&app(&ctx), "/register", req, None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("at least 8 characters"));
}

#[tokio::test]
async fn register_duplicate_email() {
    let ctx = TestContext::new();
    let app = app(&ctx);

    let (first, _) = post(&app, "/register", alice(), None).await;
    let mut again = alice();
    again["username"] = json!("alice2");
    let (second, body) = post(&app, "/register", again, None).await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "An account with this email already exists.");
    assert_eq!(ctx.accounts.len().await, 1);
}

#[tokio::test]
async fn register_missing_field() {
    let ctx = TestContext::new();
    let (status, body) = post(
        &app(&ctx),
        "/register",
        json!({ "username": "alice", "email": "a@x.com" }),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "password: This field is required.");
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let ctx = TestContext::new();
    let response = app(&ctx)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_with_correct_and_wrong_password() {
    let ctx = TestContext::new();
    let app = app(&ctx);
    let (_, registered) = post(&app, "/register", alice(), None).await;

    let (status, body) = post(
        &app,
        "/login",
        json!({ "email": "a@x.com", "password": "password1" }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], registered["id"]);
    assert!(!body["refresh"].as_str().unwrap().is_empty());
    assert!(!body["access"].as_str().unwrap().is_empty());

    let (status, body) = post(
        &app,
        "/login",
        json!({ "email": "a@x.com", "password": "wrong" }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn login_requires_email_and_password() {
    let ctx = TestContext::new();
    let (status, body) = post(&app(&ctx), "/login", json!({ "email": "a@x.com" }), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email and password are required");
}

#[tokio::test]
async fn login_inactive_account_rejected() {
    let ctx = TestContext::new();
    let app = app(&ctx);
    let (_, registered) = post(&app, "/register", alice(), None).await;
    let id = registered["id"].as_str().unwrap().parse().unwrap();
    ctx.accounts.set_active(id, false).await;

    let (status, body) = post(
        &app,
        "/login",
        json!({ "email": "a@x.com", "password": "password1" }),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn logout_with_registration_tokens() {
    let ctx = TestContext::new();
    let app = app(&ctx);
    let (_, tokens) = post(&app, "/register", alice(), None).await;
    let access = tokens["access"].as_str().unwrap();
    let refresh = tokens["refresh"].as_str().unwrap();

    let (status, body) = post(&app, "/logout", json!({ "refresh": refresh }), Some(access)).await;
    assert_eq!(status, StatusCode::RESET_CONTENT);
    assert_eq!(body, Value::Null);
    assert_eq!(ctx.blacklist.len().await, 1);

    // A revoked refresh token stays rejected
    let (status, body) = post(&app, "/logout", json!({ "refresh": refresh }), Some(access)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, Value::Null);

    let (status, _) = post(&app, "/token/refresh", json!({ "refresh": refresh }), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_requires_bearer() {
    let ctx = TestContext::new();
    let app = app(&ctx);
    let (_, tokens) = post(&app, "/register", alice(), None).await;
    let refresh = tokens["refresh"].as_str().unwrap();

    let (status, _) = post(&app, "/logout", json!({ "refresh": refresh }), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A refresh token is not a bearer credential
    let (status, _) = post(&app, "/logout", json!({ "refresh": refresh }), Some(refresh)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert!(ctx.blacklist.is_empty().await);
}

#[tokio::test]
async fn logout_with_missing_or_invalid_refresh() {
    let ctx = TestContext::new();
    let app = app(&ctx);
    let (_, tokens) = post(&app, "/register", alice(), None).await;
    let access = tokens["access"].as_str().unwrap();

    let (status, body) = post(&app, "/logout", json!({}), Some(access)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, Value::Null);

    let (status, body) = post(&app, "/logout", json!({ "refresh": "garbage" }), Some(access)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, Value::Null);

    // An access token cannot be revoked as a refresh token
    let (status, _) = post(&app, "/logout", json!({ "refresh": access }), Some(access)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn refresh_issues_working_access_token() {
    let ctx = TestContext::new();
    let app = app(&ctx);
    let (_, tokens) = post(&app, "/register", alice(), None).await;
    let refresh = tokens["refresh"].as_str().unwrap();

    let (status, body) = post(&app, "/token/refresh", json!({ "refresh": refresh }), None).await;
    assert_eq!(status, StatusCode::OK);
    let access = body["access"].as_str().unwrap();

    let (status, _) = post(&app, "/logout", json!({ "refresh": refresh }), Some(access)).await;
    assert_eq!(status, StatusCode::RESET_CONTENT);
}
