use axum::extract::{Path, Query};
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::actions::packages::{NewPackage, PackageActions, PackageDiff};
use crate::database::manager;
use crate::database::page::{Page, Paginated};
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::Package;
use crate::validate;

#[derive(Debug, Deserialize)]
pub struct CreatePackageRequest {
    pub course_id: Option<Uuid>,
    pub name: Option<String>,
    pub number_class: Option<i32>,
    pub price: Option<Decimal>,
    pub validity_days: Option<i32>,
}

/// POST /admin/packages
pub async fn create(Json(payload): Json<CreatePackageRequest>) -> ApiResult<Package> {
    let name = validate::require_str("name", payload.name.as_deref())?;
    let number_class = validate::require_positive("number_class", payload.number_class)?;
    let price = validate::require("price", payload.price)?;
    let validity_days = validate::require_positive("validity_days", payload.validity_days)?;

    let pool = manager::pool().await?;
    let package = PackageActions::new(pool)
        .create(NewPackage {
            course_id: payload.course_id,
            name,
            number_class,
            price,
            validity_days,
        })
        .await?;
    Ok(ApiResponse::created(package))
}

#[derive(Debug, Deserialize)]
pub struct ListPackagesQuery {
    pub page_size: Option<i64>,
    pub page_number: Option<i64>,
    pub only_active: Option<bool>,
}

/// GET /admin/packages
pub async fn list(Query(query): Query<ListPackagesQuery>) -> ApiResult<Paginated<Package>> {
    let pool = manager::pool().await?;
    let page = Page { page_size: query.page_size, page_number: query.page_number };
    Ok(ApiResponse::success(
        PackageActions::new(pool)
            .find_all_paginated(query.only_active.unwrap_or(false), &page)
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePackageRequest {
    pub name: Option<String>,
    pub number_class: Option<i32>,
    pub price: Option<Decimal>,
    pub validity_days: Option<i32>,
    pub is_active: Option<bool>,
}

/// PUT /admin/packages/:id
pub async fn update(
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePackageRequest>,
) -> ApiResult<Package> {
    let pool = manager::pool().await?;
    let package = PackageActions::new(pool)
        .update(
            id,
            PackageDiff {
                name: payload.name,
                number_class: payload.number_class,
                price: payload.price,
                validity_days: payload.validity_days,
                is_active: payload.is_active,
            },
        )
        .await?;
    Ok(ApiResponse::success(package))
}

/// DELETE /admin/packages/:id
pub async fn remove(Path(id): Path<Uuid>) -> ApiResult<()> {
    let pool = manager::pool().await?;
    PackageActions::new(pool).remove(id).await?;
    Ok(ApiResponse::with_message("Package deleted", ()))
}
