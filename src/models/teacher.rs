use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Teacher {
    pub id: Uuid,
    pub user_id: Uuid,
    pub hourly_rate: Decimal,
    pub location: Option<String>,
    /// Weekly availability, minutes from Monday 00:00 UTC for each slot start
    pub weekly_slots: Vec<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
