use axum::extract::{Path, Query};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::actions::bookings::{BookingActions, BookingFilter, NewBooking};
use crate::database::manager;
use crate::database::page::{Page, Paginated};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{Booking, BookingStatus, TrialBooking};
use crate::services::BookingService;
use crate::validate;

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub student_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
    pub ordered_package_id: Option<Uuid>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

/// POST /admin/bookings
pub async fn create(Json(payload): Json<CreateBookingRequest>) -> ApiResult<Booking> {
    let student_id = validate::require("student_id", payload.student_id)?;
    let teacher_id = validate::require("teacher_id", payload.teacher_id)?;
    let start_time = validate::require("start_time", payload.start_time)?;
    let end_time = validate::require("end_time", payload.end_time)?;

    let pool = manager::pool().await?;
    let booking = BookingService::new(pool)
        .create_booking(NewBooking {
            student_id,
            teacher_id,
            course_id: payload.course_id,
            ordered_package_id: payload.ordered_package_id,
            start_time,
            end_time,
            note: payload.note,
        })
        .await?;
    Ok(ApiResponse::created(booking))
}

#[derive(Debug, Deserialize)]
pub struct ListBookingsQuery {
    pub page_size: Option<i64>,
    pub page_number: Option<i64>,
    pub student_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    pub status: Option<BookingStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// GET /admin/bookings
pub async fn list(Query(query): Query<ListBookingsQuery>) -> ApiResult<Paginated<Booking>> {
    let pool = manager::pool().await?;
    let page = Page { page_size: query.page_size, page_number: query.page_number };
    let filter = BookingFilter {
        student_id: query.student_id,
        teacher_id: query.teacher_id,
        status: query.status,
        from: query.from,
        to: query.to,
    };
    Ok(ApiResponse::success(
        BookingActions::new(pool).find_all_paginated(filter, &page).await?,
    ))
}

/// GET /admin/bookings/:id
pub async fn get(Path(id): Path<Uuid>) -> ApiResult<Booking> {
    let pool = manager::pool().await?;
    let booking = BookingActions::new(pool)
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("booking {} not found", id)))?;
    Ok(ApiResponse::success(booking))
}

/// PUT /admin/bookings/:id/confirm
pub async fn confirm(Path(id): Path<Uuid>) -> ApiResult<Booking> {
    transition(id, BookingStatus::Confirmed).await
}

/// PUT /admin/bookings/:id/start
pub async fn start_teaching(Path(id): Path<Uuid>) -> ApiResult<Booking> {
    transition(id, BookingStatus::Teaching).await
}

/// PUT /admin/bookings/:id/complete
pub async fn complete(Path(id): Path<Uuid>) -> ApiResult<Booking> {
    transition(id, BookingStatus::Completed).await
}

#[derive(Debug, Deserialize)]
pub struct AbsentRequest {
    pub party: Option<String>,
}

/// PUT /admin/bookings/:id/absent - record which party missed the lesson
pub async fn absent(
    Path(id): Path<Uuid>,
    Json(payload): Json<AbsentRequest>,
) -> ApiResult<Booking> {
    let party = validate::require_str("party", payload.party.as_deref())?;
    let to = match party.as_str() {
        "student" => BookingStatus::StudentAbsent,
        "teacher" => BookingStatus::TeacherAbsent,
        _ => {
            return Err(ApiError::validation_error(
                "party must be 'student' or 'teacher'",
                Some("party".to_string()),
            ))
        }
    };
    transition(id, to).await
}

/// PUT /admin/bookings/:id/cancel
pub async fn cancel(Path(id): Path<Uuid>) -> ApiResult<Booking> {
    transition(id, BookingStatus::Cancelled).await
}

async fn transition(id: Uuid, to: BookingStatus) -> ApiResult<Booking> {
    let pool = manager::pool().await?;
    let booking = BookingService::new(pool).transition(id, to).await?;
    Ok(ApiResponse::success(booking))
}

#[derive(Debug, Deserialize)]
pub struct CreateTrialRequest {
    pub student_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

/// POST /admin/trial-bookings
pub async fn create_trial(Json(payload): Json<CreateTrialRequest>) -> ApiResult<TrialBooking> {
    let student_id = validate::require("student_id", payload.student_id)?;
    let teacher_id = validate::require("teacher_id", payload.teacher_id)?;
    let start_time = validate::require("start_time", payload.start_time)?;
    let end_time = validate::require("end_time", payload.end_time)?;

    let pool = manager::pool().await?;
    let trial = BookingService::new(pool)
        .create_trial(student_id, teacher_id, payload.course_id, start_time, end_time)
        .await?;
    Ok(ApiResponse::created(trial))
}

/// PUT /admin/trial-bookings/:id/confirm
pub async fn confirm_trial(Path(id): Path<Uuid>) -> ApiResult<TrialBooking> {
    transition_trial(id, BookingStatus::Confirmed).await
}

/// PUT /admin/trial-bookings/:id/cancel
pub async fn cancel_trial(Path(id): Path<Uuid>) -> ApiResult<TrialBooking> {
    transition_trial(id, BookingStatus::Cancelled).await
}

async fn transition_trial(id: Uuid, to: BookingStatus) -> ApiResult<TrialBooking> {
    let pool = manager::pool().await?;
    let trial = BookingService::new(pool).transition_trial(id, to).await?;
    Ok(ApiResponse::success(trial))
}
