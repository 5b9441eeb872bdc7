#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use tower::ServiceExt;

use items_api::auth::{Claims, TokenVerifier};
use items_api::config::DEFAULT_REQUIRED_SCOPE;
use items_api::database::MemoryTable;
use items_api::{app, AppState};

pub const TEST_SECRET: &str = "integration-test-secret";

/// Router over a fresh in-memory table, optionally verifying tokens
pub fn test_app(with_auth: bool) -> Router {
    let verifier = with_auth.then(|| TokenVerifier::with_secret(TEST_SECRET, DEFAULT_REQUIRED_SCOPE));
    app(AppState::new(Arc::new(MemoryTable::new("itemId")), verifier))
}

pub fn token_with_scope(scope: &str) -> String {
    let claims = Claims {
        sub: "test-user".to_string(),
        scope: scope.to_string(),
        exp: chrono::Utc::now().timestamp() + 600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("encode token")
}

pub fn token() -> String {
    token_with_scope(DEFAULT_REQUIRED_SCOPE)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|e| panic!("body is not JSON ({}): {:?}", e, String::from_utf8_lossy(&self.body)))
    }

    pub fn message(&self) -> String {
        self.json()["message"].as_str().unwrap_or_default().to_string()
    }
}

/// Send one request through the router in-process
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<&str>,
    bearer: Option<&str>,
) -> Result<TestResponse> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = builder.body(match body {
        Some(b) => Body::from(b.to_string()),
        None => Body::empty(),
    })?;

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?.to_vec();

    Ok(TestResponse { status, headers, body })
}

/// The built binary running on a free port with an in-memory store
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let child = Command::new(env!("CARGO_BIN_EXE_items-api"))
            .env("ITEMS_API_PORT", port.to_string())
            .env("REGION", "us-east-1")
            .env("COGNITO_USER_POOL_ID", "us-east-1_test")
            .env("ITEM_TABLE", "items-test")
            .env("ITEM_STORE", "memory")
            .env("AUTH_JWT_SECRET", TEST_SECRET)
            .env("RUST_LOG", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .context("failed to spawn server binary")?;

        let server = Self { port, base_url, child };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
