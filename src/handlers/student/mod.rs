use axum::extract::{Path, Query};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::actions::bookings::{BookingActions, BookingFilter, NewBooking};
use crate::database::actions::orders::OrderedPackageActions;
use crate::database::actions::students::StudentActions;
use crate::database::manager;
use crate::database::page::{Page, Paginated};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::{Booking, BookingStatus, OrderedPackage, Student};
use crate::services::BookingService;
use crate::validate;

/// Resolve the caller's student profile; 404 when the account has none
async fn current_student(auth_user: &AuthUser) -> Result<Student, ApiError> {
    let pool = manager::pool().await?;
    StudentActions::new(pool)
        .find_by_user_id(auth_user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Student profile not found for this account"))
}

/// GET /student/profile
pub async fn profile(Extension(auth_user): Extension<AuthUser>) -> ApiResult<Student> {
    Ok(ApiResponse::success(current_student(&auth_user).await?))
}

/// GET /student/packages - the caller's entitlements, newest first
pub async fn packages(
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Vec<OrderedPackage>> {
    let student = current_student(&auth_user).await?;
    let pool = manager::pool().await?;
    let packages = OrderedPackageActions::new(pool)
        .find_by_student(student.id)
        .await?;
    Ok(ApiResponse::success(packages))
}

#[derive(Debug, Deserialize)]
pub struct MyBookingsQuery {
    pub page_size: Option<i64>,
    pub page_number: Option<i64>,
    pub status: Option<BookingStatus>,
}

/// GET /student/bookings
pub async fn bookings(
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<MyBookingsQuery>,
) -> ApiResult<Paginated<Booking>> {
    let student = current_student(&auth_user).await?;
    let pool = manager::pool().await?;
    let page = Page { page_size: query.page_size, page_number: query.page_number };
    let filter = BookingFilter {
        student_id: Some(student.id),
        status: query.status,
        ..Default::default()
    };
    Ok(ApiResponse::success(
        BookingActions::new(pool).find_all_paginated(filter, &page).await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct BookRequest {
    pub teacher_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
    pub ordered_package_id: Option<Uuid>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub booking: Booking,
}

/// POST /student/bookings - book a class against one of the caller's own
/// packages
pub async fn book(
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<BookRequest>,
) -> ApiResult<BookResponse> {
    let teacher_id = validate::require("teacher_id", payload.teacher_id)?;
    let ordered_package_id = validate::require("ordered_package_id", payload.ordered_package_id)?;
    let start_time = validate::require("start_time", payload.start_time)?;
    let end_time = validate::require("end_time", payload.end_time)?;

    let student = current_student(&auth_user).await?;
    let pool = manager::pool().await?;

    // The entitlement must belong to the caller
    let package = OrderedPackageActions::new(pool.clone())
        .find_by_id(ordered_package_id)
        .await?
        .ok_or_else(|| ApiError::bad_request("ordered package does not exist"))?;
    if package.student_id != student.id {
        return Err(ApiError::forbidden("Package belongs to another student"));
    }
    // Advisory pre-check; the conditional consume in SQL stays authoritative
    if !package.usable_at(start_time) {
        return Err(ApiError::bad_request(
            "Package has no usable credit for this time",
        ));
    }

    let booking = BookingService::new(pool)
        .create_booking(NewBooking {
            student_id: student.id,
            teacher_id,
            course_id: payload.course_id,
            ordered_package_id: Some(ordered_package_id),
            start_time,
            end_time,
            note: payload.note,
        })
        .await?;
    Ok(ApiResponse::created(BookResponse { booking }))
}

/// PUT /student/bookings/:id/cancel - cancel one of the caller's own
/// bookings; unstarted lessons refund their credit
pub async fn cancel(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Booking> {
    let student = current_student(&auth_user).await?;
    let pool = manager::pool().await?;

    let booking = BookingActions::new(pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("booking {} not found", id)))?;
    if booking.student_id != student.id {
        return Err(ApiError::forbidden("Booking belongs to another student"));
    }

    let cancelled = BookingService::new(pool)
        .transition(id, BookingStatus::Cancelled)
        .await?;
    Ok(ApiResponse::success(cancelled))
}
