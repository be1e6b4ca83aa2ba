//! Shared harness for the HTTP tests: an in-memory database, a mailer that
//! records what it would have sent, and request helpers.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use biztrack_db::{Database, DbConfig};
use biztrack_server::{build_router, AppState, Email, MailError, Mailer, ServerConfig};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Records every message instead of sending it. `set_failing(true)` makes
/// it behave like a mail API that is down.
#[derive(Default)]
pub struct CapturingMailer {
    sent: Mutex<Vec<Email>>,
    failing: AtomicBool,
}

impl CapturingMailer {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_to(&self, to: &str) -> Option<Email> {
        self.sent().into_iter().rev().find(|email| email.to == to)
    }
}

#[async_trait]
impl Mailer for CapturingMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MailError::Rejected(503));
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub mailer: Arc<CapturingMailer>,
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        jwt_secret: "integration-test-secret".to_string(),
        app_url: "https://app.biztrack.test".to_string(),
        ..ServerConfig::default()
    }
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: ServerConfig) -> Self {
        let db = Database::new(DbConfig::in_memory())
            .await
            .expect("in-memory database");
        let mailer = Arc::new(CapturingMailer::default());
        let router = build_router(Arc::new(AppState::new(db, config, mailer.clone())));
        TestApp { router, mailer }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        send(&self.router, request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let (status, _, body) = self.send(request(Method::GET, uri, token, None)).await;
        (status, body)
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let (status, _, body) = self.send(request(Method::POST, uri, token, Some(body))).await;
        (status, body)
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let (status, _, body) = self.send(request(Method::PUT, uri, token, Some(body))).await;
        (status, body)
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let (status, _, body) = self.send(request(Method::DELETE, uri, token, None)).await;
        (status, body)
    }

    /// The code from the most recent verification mail sent to `email`.
    pub fn code_for(&self, email: &str) -> String {
        let mail = self.mailer.last_to(email).expect("verification mail sent");
        extract_code(&mail.text).expect("mail contains a code")
    }

    /// Signs up and verifies a new owner. Returns the session token.
    pub async fn register(&self, email: &str, business_name: &str) -> String {
        let (status, body) = self
            .post(
                "/api/auth/signup",
                None,
                json!({
                    "name": "Owner",
                    "email": email,
                    "password": "correct-horse",
                    "business_name": business_name,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true), "signup failed: {body}");

        let code = self.code_for(email);
        let (_, body) = self
            .post("/api/auth/verify-otp", None, json!({ "email": email, "code": code }))
            .await;
        assert_eq!(body["success"], json!(true), "verification failed: {body}");
        body["data"]["token"].as_str().expect("token").to_string()
    }

    /// Creates a product and returns its id.
    pub async fn create_product(&self, token: &str, name: &str, price: i64, qty: i64) -> String {
        let (_, body) = self
            .post(
                "/api/products",
                Some(token),
                json!({ "name": name, "price_cents": price, "quantity": qty }),
            )
            .await;
        assert_eq!(body["success"], json!(true), "product create failed: {body}");
        body["data"]["id"].as_str().expect("product id").to_string()
    }
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

/// Runs one request. Non-JSON bodies come back as a JSON string.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = router.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, headers, body)
}

/// The code line of a verification mail.
pub fn extract_code(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| line.len() == 6 && line.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_string)
}
