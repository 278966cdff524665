use axum::extract::{Path, Query};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::permissions;
use crate::database::actions::students::{NewStudent, StudentActions, StudentDiff};
use crate::database::actions::users::{UserActions, UserDiff};
use crate::database::manager;
use crate::database::page::{Page, Paginated};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::Student;

#[derive(Debug, Deserialize)]
pub struct CreateStudentRequest {
    pub staff_id: Option<Uuid>,
    pub level: Option<i32>,
    pub note: Option<String>,
}

/// POST /admin/students/:user_id - attach a student profile to an existing
/// account. A second call for the same user conflicts.
pub async fn create(
    Path(user_id): Path<Uuid>,
    Json(payload): Json<CreateStudentRequest>,
) -> ApiResult<Student> {
    let pool = manager::pool().await?;
    let users = UserActions::new(pool.clone());
    let students = StudentActions::new(pool);

    let user = users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::bad_request(format!("user {} does not exist", user_id)))?;

    if students.find_by_user_id(user_id).await?.is_some() {
        return Err(ApiError::conflict("Student profile already exists for this user"));
    }

    let student = students
        .create(NewStudent {
            user_id,
            staff_id: payload.staff_id,
            level: payload.level.unwrap_or(0),
            note: payload.note,
        })
        .await?;

    // Grant the student role if the account does not carry it yet
    if !user.roles.iter().any(|r| r == permissions::ROLE_STUDENT) {
        let mut roles = user.roles.clone();
        roles.push(permissions::ROLE_STUDENT.to_string());
        users
            .update(user_id, UserDiff { roles: Some(roles), ..Default::default() })
            .await?;
    }

    Ok(ApiResponse::created(student))
}

#[derive(Debug, Deserialize)]
pub struct ListStudentsQuery {
    pub page_size: Option<i64>,
    pub page_number: Option<i64>,
    pub staff_id: Option<Uuid>,
}

/// GET /admin/students
pub async fn list(Query(query): Query<ListStudentsQuery>) -> ApiResult<Paginated<Student>> {
    let pool = manager::pool().await?;
    let page = Page { page_size: query.page_size, page_number: query.page_number };
    let students = StudentActions::new(pool)
        .find_all_paginated(query.staff_id, &page)
        .await?;
    Ok(ApiResponse::success(students))
}

/// GET /admin/students/:id
pub async fn get(Path(id): Path<Uuid>) -> ApiResult<Student> {
    let pool = manager::pool().await?;
    let student = StudentActions::new(pool)
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("student {} not found", id)))?;
    Ok(ApiResponse::success(student))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStudentRequest {
    #[serde(default, deserialize_with = "crate::validate::double_option")]
    pub staff_id: Option<Option<Uuid>>,
    pub level: Option<i32>,
    #[serde(default, deserialize_with = "crate::validate::double_option")]
    pub note: Option<Option<String>>,
}

/// PUT /admin/students/:id - partial update; absent fields are unchanged,
/// explicit null clears a nullable field
pub async fn update(
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStudentRequest>,
) -> ApiResult<Student> {
    let pool = manager::pool().await?;
    let student = StudentActions::new(pool)
        .update(
            id,
            StudentDiff {
                staff_id: payload.staff_id,
                level: payload.level,
                note: payload.note,
            },
        )
        .await?;
    Ok(ApiResponse::success(student))
}
