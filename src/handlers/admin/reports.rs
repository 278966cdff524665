use axum::extract::Query;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::actions::bookings::BookingActions;
use crate::database::actions::orders::OrderActions;
use crate::database::manager;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

fn window(query: &ReportQuery) -> (DateTime<Utc>, DateTime<Utc>) {
    let to = query.to.unwrap_or_else(Utc::now);
    let from = query.from.unwrap_or(to - Duration::days(30));
    (from, to)
}

/// GET /admin/reports/bookings - booking counts per status in a window
pub async fn bookings(Query(query): Query<ReportQuery>) -> ApiResult<Value> {
    let (from, to) = window(&query);
    let pool = manager::pool().await?;
    let rows = BookingActions::new(pool).counts_by_status(from, to).await?;

    let total: i64 = rows.iter().map(|(_, n)| n).sum();
    let mut counts = serde_json::Map::new();
    for (status, n) in rows {
        let key = serde_json::to_value(status)
            .ok()
            .and_then(|v| v.as_str().map(|s| s.to_string()))
            .unwrap_or_else(|| format!("{:?}", status));
        counts.insert(key, json!(n));
    }

    Ok(ApiResponse::success(json!({
        "from": from,
        "to": to,
        "total": total,
        "counts": counts,
    })))
}

/// GET /admin/reports/revenue - paid order totals in a window
pub async fn revenue(Query(query): Query<ReportQuery>) -> ApiResult<Value> {
    let (from, to) = window(&query);
    let pool = manager::pool().await?;
    let total = OrderActions::new(pool).revenue(from, to).await?;

    Ok(ApiResponse::success(json!({
        "from": from,
        "to": to,
        "revenue": total,
    })))
}
