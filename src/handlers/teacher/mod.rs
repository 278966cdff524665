use axum::extract::{Path, Query};
use axum::Extension;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::actions::bookings::BookingActions;
use crate::database::actions::teachers::TeacherActions;
use crate::database::manager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::{Booking, BookingStatus, Teacher};
use crate::services::BookingService;

/// Resolve the caller's teacher profile; 404 when the account has none
async fn current_teacher(auth_user: &AuthUser) -> Result<Teacher, ApiError> {
    let pool = manager::pool().await?;
    TeacherActions::new(pool)
        .find_by_user_id(auth_user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Teacher profile not found for this account"))
}

/// GET /teacher/profile
pub async fn profile(Extension(auth_user): Extension<AuthUser>) -> ApiResult<Teacher> {
    Ok(ApiResponse::success(current_teacher(&auth_user).await?))
}

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct Schedule {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// Recurring weekly availability, minutes from Monday 00:00 UTC
    pub weekly_slots: Vec<i32>,
    /// Concrete lessons inside the window
    pub bookings: Vec<Booking>,
}

/// GET /teacher/schedule - weekly availability merged with booked slots
pub async fn schedule(
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ScheduleQuery>,
) -> ApiResult<Schedule> {
    let teacher = current_teacher(&auth_user).await?;

    let from = query.from.unwrap_or_else(Utc::now);
    let to = query.to.unwrap_or(from + Duration::days(7));
    if to <= from {
        return Err(ApiError::validation_error(
            "to must be after from",
            Some("to".to_string()),
        ));
    }

    let pool = manager::pool().await?;
    let bookings = BookingActions::new(pool)
        .teacher_window(teacher.id, from, to)
        .await?;

    Ok(ApiResponse::success(Schedule {
        from,
        to,
        weekly_slots: teacher.weekly_slots,
        bookings,
    }))
}

/// PUT /teacher/bookings/:id/confirm - teacher accepts a pending lesson
pub async fn confirm(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Booking> {
    own_transition(&auth_user, id, BookingStatus::Confirmed).await
}

/// PUT /teacher/bookings/:id/start
pub async fn start_teaching(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Booking> {
    own_transition(&auth_user, id, BookingStatus::Teaching).await
}

/// PUT /teacher/bookings/:id/complete
pub async fn complete(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Booking> {
    own_transition(&auth_user, id, BookingStatus::Completed).await
}

async fn own_transition(
    auth_user: &AuthUser,
    id: Uuid,
    to: BookingStatus,
) -> ApiResult<Booking> {
    let teacher = current_teacher(auth_user).await?;
    let pool = manager::pool().await?;

    let booking = BookingActions::new(pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("booking {} not found", id)))?;
    if booking.teacher_id != teacher.id {
        return Err(ApiError::forbidden("Booking belongs to another teacher"));
    }

    let updated = BookingService::new(pool).transition(id, to).await?;
    Ok(ApiResponse::success(updated))
}
