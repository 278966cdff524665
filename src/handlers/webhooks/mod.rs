//! Machine-to-machine callbacks. Every route here sits behind the
//! service-key middleware for its provider.

use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::actions::bookings::BookingActions;
use crate::database::actions::orders::{OrderActions, OrderedPackageActions};
use crate::database::manager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{Order, OrderStatus};
use crate::validate;

#[derive(Debug, Deserialize)]
pub struct MeetEvent {
    pub booking_id: Option<Uuid>,
    pub event: Option<String>,
    pub participant: Option<String>,
    pub payload: Option<Value>,
}

/// POST /meet/webhook - join/leave events from the meeting provider
pub async fn meet(Json(payload): Json<MeetEvent>) -> ApiResult<Value> {
    let booking_id = validate::require("booking_id", payload.booking_id)?;
    let event = validate::require_str("event", payload.event.as_deref())?;

    let pool = manager::pool().await?;
    let bookings = BookingActions::new(pool);

    bookings
        .find_by_id(booking_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("booking {} not found", booking_id)))?;

    bookings
        .record_meeting_event(booking_id, &event, payload.participant.as_deref(), payload.payload)
        .await?;

    Ok(ApiResponse::success(json!({ "recorded": true })))
}

#[derive(Debug, Deserialize)]
pub struct PaymentNotification {
    pub order_code: Option<String>,
}

/// POST /payment/webhook - the banking checker confirmed a transfer.
/// Marks the order paid and activates its packages. Idempotent: a repeat
/// notification for a paid order is acknowledged without changes.
pub async fn payment(Json(payload): Json<PaymentNotification>) -> ApiResult<Order> {
    let code = validate::require_str("order_code", payload.order_code.as_deref())?;

    let pool = manager::pool().await?;
    let orders = OrderActions::new(pool.clone());

    let order = orders
        .find_by_code(&code)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("order {} not found", code)))?;

    if order.status == OrderStatus::Paid {
        return Ok(ApiResponse::with_message("Order already paid", order));
    }
    if order.status == OrderStatus::Cancelled {
        return Err(ApiError::bad_request("Order was cancelled"));
    }

    let paid = orders.set_status(order.id, OrderStatus::Paid).await?;
    let activated = OrderedPackageActions::new(pool)
        .activate_for_order(order.id)
        .await?;
    tracing::info!("Order {} paid, {} packages activated", code, activated);

    Ok(ApiResponse::with_message("Order paid", paid))
}

/// POST /crm/webhook - CRM pushes contact/lead updates; acknowledged and
/// logged for the sync job
pub async fn crm(Json(payload): Json<Value>) -> ApiResult<Value> {
    let event = payload
        .get("type")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown");
    tracing::info!("CRM webhook received: {}", event);
    Ok(ApiResponse::success(json!({ "received": true })))
}

/// POST /zalo/webhook - Zalo interactive callback
pub async fn zalo(Json(payload): Json<Value>) -> ApiResult<Value> {
    let event = payload
        .get("event_name")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown");
    tracing::info!("Zalo webhook received: {}", event);
    Ok(ApiResponse::success(json!({ "received": true })))
}
