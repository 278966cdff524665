use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Platform account. Role-specific profile data lives on Student/Teacher,
/// linked by `user_id`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub roles: Vec<String>,
    pub is_verified: bool,
    pub is_active: bool,
    /// Recurring weekly availability, minutes from Monday 00:00 UTC
    pub regular_times: Vec<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
