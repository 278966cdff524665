use axum::extract::{Path, Query};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{password, permissions};
use crate::database::actions::users::{NewUser, UserActions, UserDiff, UserFilter};
use crate::database::manager;
use crate::database::page::{Page, Paginated};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::User;
use crate::validate;

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub page_size: Option<i64>,
    pub page_number: Option<i64>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

/// GET /admin/users
pub async fn list(Query(query): Query<ListUsersQuery>) -> ApiResult<Paginated<User>> {
    let pool = manager::pool().await?;
    let users = UserActions::new(pool);

    let page = Page { page_size: query.page_size, page_number: query.page_number };
    let filter = UserFilter {
        role: query.role,
        is_active: query.is_active,
        search: query.search,
    };
    Ok(ApiResponse::success(users.find_all_paginated(filter, &page).await?))
}

/// GET /admin/users/:id
pub async fn get(Path(id): Path<Uuid>) -> ApiResult<User> {
    let pool = manager::pool().await?;
    let user = UserActions::new(pool)
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("user {} not found", id)))?;
    Ok(ApiResponse::success(user))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub roles: Option<Vec<String>>,
}

/// POST /admin/users
pub async fn create(Json(payload): Json<CreateUserRequest>) -> ApiResult<User> {
    let email = validate::require_email("email", payload.email.as_deref())?;
    let pw = validate::require_password("password", payload.password.as_deref())?;
    let full_name = validate::require_str("full_name", payload.full_name.as_deref())?;
    let roles = validate::require("roles", payload.roles)?;
    check_roles(&roles)?;

    let pool = manager::pool().await?;
    let users = UserActions::new(pool);

    if users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("An account with this email already exists"));
    }

    let user = users
        .create(NewUser {
            email,
            password_hash: password::hash_password(&pw)?,
            full_name,
            phone: payload.phone,
            roles,
        })
        .await?;
    Ok(ApiResponse::created(user))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub roles: Option<Vec<String>>,
    pub is_verified: Option<bool>,
    pub is_active: Option<bool>,
    pub regular_times: Option<Vec<i32>>,
}

/// PUT /admin/users/:id - partial update; unspecified fields are unchanged
pub async fn update(
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<User> {
    if let Some(roles) = &payload.roles {
        check_roles(roles)?;
    }
    let password_hash = match payload.password.as_deref() {
        Some(pw) => Some(password::hash_password(&validate::require_password(
            "password",
            Some(pw),
        )?)?),
        None => None,
    };

    let pool = manager::pool().await?;
    let user = UserActions::new(pool)
        .update(
            id,
            UserDiff {
                full_name: payload.full_name,
                phone: payload.phone,
                password_hash,
                roles: payload.roles,
                is_verified: payload.is_verified,
                is_active: payload.is_active,
                regular_times: payload.regular_times,
            },
        )
        .await?;
    Ok(ApiResponse::success(user))
}

/// DELETE /admin/users/:id - soft-disable, the account row stays
pub async fn disable(Path(id): Path<Uuid>) -> ApiResult<User> {
    let pool = manager::pool().await?;
    let user = UserActions::new(pool)
        .update(id, UserDiff { is_active: Some(false), ..Default::default() })
        .await?;
    Ok(ApiResponse::with_message("User disabled", user))
}

fn check_roles(roles: &[String]) -> Result<(), ApiError> {
    if roles.is_empty() {
        return Err(ApiError::validation_error(
            "roles must not be empty",
            Some("roles".to_string()),
        ));
    }
    for role in roles {
        if permissions::role_grants(role).is_empty() {
            return Err(ApiError::validation_error(
                format!("unknown role: {}", role),
                Some("roles".to_string()),
            ));
        }
    }
    Ok(())
}
