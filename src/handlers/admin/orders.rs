use axum::extract::{Path, Query};
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::actions::orders::{OrderActions, OrderedPackageActions};
use crate::database::actions::packages::PackageActions;
use crate::database::actions::students::StudentActions;
use crate::database::manager;
use crate::database::page::{Page, Paginated};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{Order, OrderedPackage};
use crate::validate;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub student_id: Option<Uuid>,
    pub package_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order: Order,
    pub packages: Vec<OrderedPackage>,
}

/// POST /admin/orders - create an order for catalog packages. The resulting
/// OrderedPackages stay unactivated until the payment webhook arrives.
pub async fn create(Json(payload): Json<CreateOrderRequest>) -> ApiResult<OrderResponse> {
    let student_id = validate::require("student_id", payload.student_id)?;
    let package_ids = validate::require("package_ids", payload.package_ids)?;
    if package_ids.is_empty() {
        return Err(ApiError::validation_error(
            "package_ids must not be empty",
            Some("package_ids".to_string()),
        ));
    }

    let pool = manager::pool().await?;
    let students = StudentActions::new(pool.clone());
    let packages = PackageActions::new(pool.clone());
    let orders = OrderActions::new(pool.clone());
    let ordered = OrderedPackageActions::new(pool);

    students
        .find_by_id(student_id)
        .await?
        .ok_or_else(|| ApiError::bad_request(format!("student {} does not exist", student_id)))?;

    let mut total = Decimal::ZERO;
    let mut selected = Vec::with_capacity(package_ids.len());
    for package_id in &package_ids {
        let package = packages
            .find_by_id(*package_id)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| {
                ApiError::bad_request(format!("package {} is not available", package_id))
            })?;
        total += package.price;
        selected.push(package);
    }

    let code = new_order_code();
    let order = orders.create(&code, student_id, total).await?;

    let mut created = Vec::with_capacity(selected.len());
    for package in selected {
        created.push(
            ordered
                .create(order.id, student_id, package.id, package.number_class)
                .await?,
        );
    }

    Ok(ApiResponse::created(OrderResponse { order, packages: created }))
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub page_size: Option<i64>,
    pub page_number: Option<i64>,
    pub student_id: Option<Uuid>,
}

/// GET /admin/orders
pub async fn list(Query(query): Query<ListOrdersQuery>) -> ApiResult<Paginated<Order>> {
    let pool = manager::pool().await?;
    let page = Page { page_size: query.page_size, page_number: query.page_number };
    Ok(ApiResponse::success(
        OrderActions::new(pool)
            .find_all_paginated(query.student_id, &page)
            .await?,
    ))
}

/// GET /admin/orders/:id
pub async fn get(Path(id): Path<Uuid>) -> ApiResult<Order> {
    let pool = manager::pool().await?;
    let order = OrderActions::new(pool)
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("order {} not found", id)))?;
    Ok(ApiResponse::success(order))
}

fn new_order_code() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("ORD-{}", &id[..12].to_uppercase())
}
