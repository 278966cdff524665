use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::actions::students::StudentActions;
use crate::database::actions::users::UserActions;
use crate::database::manager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::outbound::ZaloClient;
use crate::validate;

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub student_id: Option<Uuid>,
    pub message: Option<String>,
}

/// POST /admin/notifications/send - Zalo message to a single student
pub async fn send(Json(payload): Json<SendRequest>) -> ApiResult<Value> {
    let student_id = validate::require("student_id", payload.student_id)?;
    let message = validate::require_str("message", payload.message.as_deref())?;

    let pool = manager::pool().await?;
    let student = StudentActions::new(pool.clone())
        .find_by_id(student_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("student {} not found", student_id)))?;
    let user = UserActions::new(pool)
        .find_by_id(student.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Account for this student no longer exists"))?;
    let phone = user
        .phone
        .ok_or_else(|| ApiError::bad_request("Student has no phone number on file"))?;

    ZaloClient::from_config()?.send_message(&phone, &message).await?;

    Ok(ApiResponse::success(json!({ "sent": true })))
}

#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    pub message: Option<String>,
}

/// POST /admin/notifications/broadcast - send a Zalo message to every active
/// student. Fan-out runs with bounded concurrency; per-recipient failures
/// are logged and counted, not fatal.
pub async fn broadcast(Json(payload): Json<BroadcastRequest>) -> ApiResult<Value> {
    let message = validate::require_str("message", payload.message.as_deref())?;

    let pool = manager::pool().await?;
    let phones = StudentActions::new(pool).active_phones().await?;

    let zalo = ZaloClient::from_config()?;
    let (sent, failed) = zalo.broadcast(&phones, &message).await;
    tracing::info!("Broadcast finished: {} sent, {} failed", sent, failed);

    Ok(ApiResponse::success(json!({
        "recipients": phones.len(),
        "sent": sent,
        "failed": failed,
    })))
}
