//! Integration tests for the HTTP adapter.
//!
//! These drive the full middleware stack (rate limiting, bearer auth) and
//! the handler surface against an in-memory SQLite repository.
//!
//! This test requires the `sqlite` feature flag.

#![cfg(feature = "sqlite")]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use backoffice_hex::inbound::HttpServer;
use backoffice_repo::SqliteRepo;

async fn create_test_app() -> Router {
    let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();
    HttpServer::new(repo).router()
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    match body {
        Some(value) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

/// Bootstraps the first admin and returns their bearer token.
async fn bootstrap_admin(app: &Router) -> String {
    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/api/bootstrap",
            None,
            Some(json!({"name": "first-admin"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

/// Creates a staff account through the admin and returns its token.
async fn create_staff(app: &Router, admin_token: &str, name: &str, role: &str) -> String {
    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/api/staff",
            Some(admin_token),
            Some(json!({"name": name, "role": role})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_is_public() {
    let app = create_test_app().await;

    let response = app
        .oneshot(request(Method::GET, "/health", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = create_test_app().await;

    let (status, body) = send(&app, request(Method::GET, "/api/payments", None, None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);
}

#[tokio::test]
async fn test_bootstrap_works_only_once() {
    let app = create_test_app().await;

    let _token = bootstrap_admin(&app).await;

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/api/bootstrap",
            None,
            Some(json!({"name": "second-admin"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_payment_transaction_flow() {
    let app = create_test_app().await;
    let admin = bootstrap_admin(&app).await;

    let (status, method) = send(
        &app,
        request(
            Method::POST,
            "/api/payment-methods",
            Some(&admin),
            Some(json!({"name": "Cash desk"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, payment) = send(
        &app,
        request(
            Method::POST,
            "/api/payments",
            Some(&admin),
            Some(json!({
                "booking_id": "7f0c8b9e-0b1a-4f22-9a32-5a4b2cd4e711",
                "amount_due": 10000
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payment["status"], "PENDING");

    let payment_id = payment["id"].as_str().unwrap().to_string();
    let tx_uri = format!("/api/payments/{}/transactions", payment_id);

    // over-cap deposit -> 409
    let (status, body) = send(
        &app,
        request(
            Method::POST,
            &tx_uri,
            Some(&admin),
            Some(json!({
                "payment_method_id": method["id"],
                "kind": "DEPOSIT",
                "amount": 8001
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("Deposit"));

    // valid deposit, then exact remainder
    let (status, _) = send(
        &app,
        request(
            Method::POST,
            &tx_uri,
            Some(&admin),
            Some(json!({
                "payment_method_id": method["id"],
                "kind": "DEPOSIT",
                "amount": 6000
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            &tx_uri,
            Some(&admin),
            Some(json!({
                "payment_method_id": method["id"],
                "kind": "FINAL",
                "amount": 4000
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, history) = send(&app, request(Method::GET, &tx_uri, Some(&admin), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_post_lifecycle_over_http() {
    let app = create_test_app().await;
    let admin = bootstrap_admin(&app).await;
    let employee = create_staff(&app, &admin, "emp1", "EMPLOYEE").await;

    let (status, post_type) = send(
        &app,
        request(
            Method::POST,
            "/api/post-types",
            Some(&admin),
            Some(json!({"name": "Travel guide"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, post) = send(
        &app,
        request(
            Method::POST,
            "/api/posts",
            Some(&employee),
            Some(json!({
                "title": "Petra day trip",
                "body": "Full-day guided tour.",
                "slug": "petra-day-trip",
                "post_type_id": post_type["id"]
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(post["status"], "DRAFT");

    let post_id = post["id"].as_str().unwrap().to_string();

    let (status, submitted) = send(
        &app,
        request(
            Method::POST,
            &format!("/api/posts/{}/submit", post_id),
            Some(&employee),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(submitted["status"], "PENDING");

    // the author cannot approve their own post
    let (status, _) = send(
        &app,
        request(
            Method::POST,
            &format!("/api/posts/{}/approve", post_id),
            Some(&employee),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, published) = send(
        &app,
        request(
            Method::POST,
            &format!("/api/posts/{}/approve", post_id),
            Some(&admin),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(published["status"], "PUBLISHED");
    assert!(published["publish_date"].is_string());

    // a second submit is an invalid transition
    let (status, _) = send(
        &app,
        request(
            Method::POST,
            &format!("/api/posts/{}/submit", post_id),
            Some(&employee),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_staff_management_requires_admin() {
    let app = create_test_app().await;
    let admin = bootstrap_admin(&app).await;
    let employee = create_staff(&app, &admin, "emp1", "EMPLOYEE").await;

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/api/staff",
            Some(&employee),
            Some(json!({"name": "emp2", "role": "EMPLOYEE"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, staff) = send(&app, request(Method::GET, "/api/staff", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(staff.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_rate_limiting_returns_429_when_exceeded() {
    let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();
    let app = HttpServer::with_rate_limit(repo, 3).router();

    let admin = bootstrap_admin(&app).await;

    // the admin token has a quota of 3; bootstrap ran as "anonymous"
    for _ in 1..=3 {
        let (status, _) = send(
            &app,
            request(Method::GET, "/api/payments", Some(&admin), None),
        )
        .await;
        assert_ne!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    let (status, body) = send(
        &app,
        request(Method::GET, "/api/payments", Some(&admin), None),
    )
    .await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["error"].as_str().unwrap().contains("Rate limit"));
    assert_eq!(body["retry_after_seconds"], 60);
}
