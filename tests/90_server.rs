mod common;

use std::process::Command;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{token, TestServer};

#[tokio::test]
async fn test_item_lifecycle_over_http() -> Result<()> {
    let server = TestServer::start().await?;
    let client = reqwest::Client::new();
    let bearer = token();
    let url = |path: &str| format!("{}{}", server.base_url, path);

    let created = client
        .post(url("/items"))
        .bearer_auth(&bearer)
        .json(&json!({"itemId": "abc", "name": "widget", "count": 3}))
        .send()
        .await?;
    assert_eq!(created.status(), StatusCode::CREATED);
    assert_eq!(created.headers()["access-control-allow-origin"], "*");
    assert!(created.text().await?.is_empty());

    let duplicate = client
        .post(url("/items"))
        .bearer_auth(&bearer)
        .json(&json!({"itemId": "abc", "name": "other", "count": 9}))
        .send()
        .await?;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let patched: Value = client
        .patch(url("/items/abc"))
        .bearer_auth(&bearer)
        .json(&json!({"count": 5}))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert_eq!(patched, json!({"itemId": "abc", "name": "widget", "count": 5}));

    let fetched: Value = client
        .get(url("/items/abc"))
        .bearer_auth(&bearer)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert_eq!(fetched, json!({"itemId": "abc", "name": "widget", "count": 5}));

    let deleted: Value = client
        .delete(url("/items/abc"))
        .bearer_auth(&bearer)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert_eq!(deleted["count"], 5);

    let listed: Value = client
        .get(url("/items"))
        .bearer_auth(&bearer)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert_eq!(listed, json!([]));

    Ok(())
}

#[tokio::test]
async fn test_server_rejects_anonymous_requests() -> Result<()> {
    let server = TestServer::start().await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/items", server.base_url))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await?;
    assert_eq!(body["code"], "UNAUTHORIZED");

    let health = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await?;
    assert_eq!(health.status(), StatusCode::OK);

    Ok(())
}

#[test]
fn test_missing_required_config_fails_fast() -> Result<()> {
    let output = Command::new(env!("CARGO_BIN_EXE_items-api"))
        .env_remove("REGION")
        .env_remove("COGNITO_USER_POOL_ID")
        .env_remove("ITEM_TABLE")
        .output()?;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("REGION environment variable missing"), "stderr: {}", stderr);

    Ok(())
}
