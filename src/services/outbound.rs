//! HTTP clients for dependent services (CRM, meeting provider, Zalo).
//! Every call carries an explicit timeout from configuration.

use futures::{stream, StreamExt};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

use crate::config;
use crate::models::User;

#[derive(Debug, thiserror::Error)]
pub enum OutboundError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("service returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("unexpected response shape: {0}")]
    BadResponse(String),
}

fn build_client() -> Result<Client, OutboundError> {
    let timeout = config::config().services.outbound_timeout_secs;
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout))
        .build()?)
}

/// Meeting provider: provisions a room per confirmed booking
pub struct MeetClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl MeetClient {
    pub fn from_config() -> Result<Self, OutboundError> {
        let services = &config::config().services;
        Ok(Self {
            http: build_client()?,
            base_url: services.meet_url.clone(),
            api_key: services.meet_api_key.clone(),
        })
    }

    pub async fn create_room(&self, booking_id: Uuid) -> Result<String, OutboundError> {
        let response = self
            .http
            .post(format!("{}/rooms", self.base_url))
            .header("api-key", &self.api_key)
            .json(&json!({ "booking_id": booking_id }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OutboundError::Status(response.status()));
        }

        let body: serde_json::Value = response.json().await?;
        body.get("join_url")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| OutboundError::BadResponse("missing join_url".to_string()))
    }
}

/// CRM: receives registration events. Failures are logged by the caller,
/// never surfaced to the registering user.
pub struct CrmClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl CrmClient {
    pub fn from_config() -> Result<Self, OutboundError> {
        let services = &config::config().services;
        Ok(Self {
            http: build_client()?,
            base_url: services.crm_url.clone(),
            api_key: services.crm_api_key.clone(),
        })
    }

    pub async fn notify_registration(&self, user: &User) -> Result<(), OutboundError> {
        let response = self
            .http
            .post(format!("{}/events", self.base_url))
            .header("api-key", &self.api_key)
            .json(&json!({
                "type": "user_registered",
                "user_id": user.id,
                "email": user.email,
                "full_name": user.full_name,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OutboundError::Status(response.status()));
        }
        Ok(())
    }
}

/// Zalo messaging
pub struct ZaloClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl ZaloClient {
    pub fn from_config() -> Result<Self, OutboundError> {
        let services = &config::config().services;
        Ok(Self {
            http: build_client()?,
            base_url: services.zalo_url.clone(),
            api_key: services.zalo_api_key.clone(),
        })
    }

    pub async fn send_message(&self, phone: &str, text: &str) -> Result<(), OutboundError> {
        let response = self
            .http
            .post(format!("{}/messages", self.base_url))
            .header("api-key", &self.api_key)
            .json(&json!({ "phone": phone, "text": text }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OutboundError::Status(response.status()));
        }
        Ok(())
    }

    /// Fan a message out to many recipients with bounded concurrency.
    /// Returns (sent, failed); individual failures are logged and skipped.
    /// Each future owns its phone number so the stream stays lifetime-free.
    pub async fn broadcast(&self, phones: &[String], text: &str) -> (usize, usize) {
        let concurrency = config::config().api.broadcast_concurrency;
        let results = stream::iter(phones.to_vec())
            .map(|phone| async move {
                match self.send_message(&phone, text).await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!("Zalo send to {} failed: {}", phone, e);
                        false
                    }
                }
            })
            .buffer_unordered(concurrency)
            .collect::<Vec<bool>>()
            .await;

        let sent = results.iter().filter(|ok| **ok).count();
        (sent, results.len() - sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_zalo() -> ZaloClient {
        // Port 9 (discard) has no listener; every send fails fast
        ZaloClient {
            http: build_client().expect("client"),
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: String::new(),
        }
    }

    #[tokio::test]
    async fn broadcast_counts_failures_without_aborting() {
        let phones = vec!["+84900000001".to_string(), "+84900000002".to_string()];
        let (sent, failed) = unreachable_zalo().broadcast(&phones, "hello").await;
        assert_eq!(sent, 0);
        assert_eq!(failed, 2);
    }

    #[tokio::test]
    async fn broadcast_with_no_recipients_is_a_noop() {
        let (sent, failed) = unreachable_zalo().broadcast(&[], "hello").await;
        assert_eq!((sent, failed), (0, 0));
    }
}
