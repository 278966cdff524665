mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn login_rejects_missing_email() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // Validation runs before any database access, so this is deterministic
    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "password": "whatever-password" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], true, "body: {}", body);
    assert_eq!(body["field"], "email", "body: {}", body);
    Ok(())
}

#[tokio::test]
async fn register_rejects_malformed_email() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/register", server.base_url))
        .json(&json!({
            "email": "not-an-email",
            "password": "long-enough-password",
            "full_name": "Test User"
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], true, "body: {}", body);
    assert_eq!(body["field"], "email", "body: {}", body);
    Ok(())
}

#[tokio::test]
async fn register_rejects_short_password() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/register", server.base_url))
        .json(&json!({
            "email": "someone@example.com",
            "password": "short",
            "full_name": "Test User"
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["field"], "password", "body: {}", body);
    Ok(())
}

#[tokio::test]
async fn login_without_body_is_client_error() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .send()
        .await?;

    assert!(
        res.status().is_client_error(),
        "expected client error, got {}",
        res.status()
    );
    Ok(())
}
