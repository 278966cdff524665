mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn webhooks_require_api_key() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for path in ["/meet/webhook", "/crm/webhook", "/payment/webhook", "/zalo/webhook"] {
        let res = client
            .post(format!("{}{}", server.base_url, path))
            .json(&json!({}))
            .send()
            .await?;
        assert_eq!(
            res.status(),
            StatusCode::UNAUTHORIZED,
            "path {} should reject a missing api-key",
            path
        );
    }
    Ok(())
}

#[tokio::test]
async fn webhooks_reject_wrong_api_key() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/payment/webhook", server.base_url))
        .header("api-key", "definitely-wrong-key")
        .json(&json!({ "order_code": "ORD-TEST" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], true, "body: {}", body);
    Ok(())
}
