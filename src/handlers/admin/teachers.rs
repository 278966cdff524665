use axum::extract::{Path, Query};
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::permissions;
use crate::database::actions::teachers::{NewTeacher, TeacherActions, TeacherDiff};
use crate::database::actions::users::{UserActions, UserDiff};
use crate::database::manager;
use crate::database::page::{Page, Paginated};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::Teacher;

const MINUTES_PER_WEEK: i32 = 7 * 24 * 60;

#[derive(Debug, Deserialize)]
pub struct CreateTeacherRequest {
    pub hourly_rate: Option<Decimal>,
    pub location: Option<String>,
    pub weekly_slots: Option<Vec<i32>>,
}

/// POST /admin/teachers/:user_id - attach a teacher profile to an existing
/// account. A second call for the same user conflicts.
pub async fn create(
    Path(user_id): Path<Uuid>,
    Json(payload): Json<CreateTeacherRequest>,
) -> ApiResult<Teacher> {
    let weekly_slots = payload.weekly_slots.unwrap_or_default();
    check_slots(&weekly_slots)?;

    let pool = manager::pool().await?;
    let users = UserActions::new(pool.clone());
    let teachers = TeacherActions::new(pool);

    let user = users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::bad_request(format!("user {} does not exist", user_id)))?;

    if teachers.find_by_user_id(user_id).await?.is_some() {
        return Err(ApiError::conflict("Teacher profile already exists for this user"));
    }

    let teacher = teachers
        .create(NewTeacher {
            user_id,
            hourly_rate: payload.hourly_rate.unwrap_or_default(),
            location: payload.location,
            weekly_slots,
        })
        .await?;

    if !user.roles.iter().any(|r| r == permissions::ROLE_TEACHER) {
        let mut roles = user.roles.clone();
        roles.push(permissions::ROLE_TEACHER.to_string());
        users
            .update(user_id, UserDiff { roles: Some(roles), ..Default::default() })
            .await?;
    }

    Ok(ApiResponse::created(teacher))
}

#[derive(Debug, Deserialize)]
pub struct ListTeachersQuery {
    pub page_size: Option<i64>,
    pub page_number: Option<i64>,
}

/// GET /admin/teachers
pub async fn list(Query(query): Query<ListTeachersQuery>) -> ApiResult<Paginated<Teacher>> {
    let pool = manager::pool().await?;
    let page = Page { page_size: query.page_size, page_number: query.page_number };
    Ok(ApiResponse::success(
        TeacherActions::new(pool).find_all_paginated(&page).await?,
    ))
}

/// GET /admin/teachers/:id
pub async fn get(Path(id): Path<Uuid>) -> ApiResult<Teacher> {
    let pool = manager::pool().await?;
    let teacher = TeacherActions::new(pool)
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("teacher {} not found", id)))?;
    Ok(ApiResponse::success(teacher))
}

#[derive(Debug, Deserialize)]
pub struct UpdateTeacherRequest {
    pub hourly_rate: Option<Decimal>,
    #[serde(default, deserialize_with = "crate::validate::double_option")]
    pub location: Option<Option<String>>,
    pub weekly_slots: Option<Vec<i32>>,
}

/// PUT /admin/teachers/:id - partial update; absent fields are unchanged,
/// explicit null clears a nullable field
pub async fn update(
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTeacherRequest>,
) -> ApiResult<Teacher> {
    if let Some(slots) = &payload.weekly_slots {
        check_slots(slots)?;
    }
    let pool = manager::pool().await?;
    let teacher = TeacherActions::new(pool)
        .update(
            id,
            TeacherDiff {
                hourly_rate: payload.hourly_rate,
                location: payload.location,
                weekly_slots: payload.weekly_slots,
            },
        )
        .await?;
    Ok(ApiResponse::success(teacher))
}

fn check_slots(slots: &[i32]) -> Result<(), ApiError> {
    if slots.iter().any(|m| *m < 0 || *m >= MINUTES_PER_WEEK) {
        return Err(ApiError::validation_error(
            "weekly_slots entries must be minutes within one week",
            Some("weekly_slots".to_string()),
        ));
    }
    Ok(())
}
