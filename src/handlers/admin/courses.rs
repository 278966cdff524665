use axum::extract::{Path, Query};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::actions::courses::{CourseActions, CourseDiff};
use crate::database::manager;
use crate::database::page::{Page, Paginated};
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::Course;
use crate::validate;

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// POST /admin/courses
pub async fn create(Json(payload): Json<CreateCourseRequest>) -> ApiResult<Course> {
    let name = validate::require_str("name", payload.name.as_deref())?;
    let pool = manager::pool().await?;
    let course = CourseActions::new(pool)
        .create(&name, payload.description.as_deref())
        .await?;
    Ok(ApiResponse::created(course))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page_size: Option<i64>,
    pub page_number: Option<i64>,
}

/// GET /admin/courses
pub async fn list(Query(query): Query<ListQuery>) -> ApiResult<Paginated<Course>> {
    let pool = manager::pool().await?;
    let page = Page { page_size: query.page_size, page_number: query.page_number };
    Ok(ApiResponse::success(
        CourseActions::new(pool).find_all_paginated(&page).await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateCourseRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::validate::double_option")]
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
}

/// PUT /admin/courses/:id - partial update; absent fields are unchanged,
/// explicit null clears the description
pub async fn update(
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCourseRequest>,
) -> ApiResult<Course> {
    let pool = manager::pool().await?;
    let course = CourseActions::new(pool)
        .update(
            id,
            CourseDiff {
                name: payload.name,
                description: payload.description,
                is_active: payload.is_active,
            },
        )
        .await?;
    Ok(ApiResponse::success(course))
}

/// DELETE /admin/courses/:id
pub async fn remove(Path(id): Path<Uuid>) -> ApiResult<()> {
    let pool = manager::pool().await?;
    CourseActions::new(pool).remove(id).await?;
    Ok(ApiResponse::with_message("Course deleted", ()))
}
