use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::page::{Page, Paginated};
use crate::models::Package;

#[derive(Debug)]
pub struct NewPackage {
    pub course_id: Option<Uuid>,
    pub name: String,
    pub number_class: i32,
    pub price: Decimal,
    pub validity_days: i32,
}

#[derive(Debug, Default)]
pub struct PackageDiff {
    pub name: Option<String>,
    pub number_class: Option<i32>,
    pub price: Option<Decimal>,
    pub validity_days: Option<i32>,
    pub is_active: Option<bool>,
}

pub struct PackageActions {
    pool: PgPool,
}

impl PackageActions {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewPackage) -> Result<Package, DatabaseError> {
        let package = sqlx::query_as::<_, Package>(
            "INSERT INTO packages (course_id, name, number_class, price, validity_days)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(new.course_id)
        .bind(&new.name)
        .bind(new.number_class)
        .bind(new.price)
        .bind(new.validity_days)
        .fetch_one(&self.pool)
        .await?;
        Ok(package)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Package>, DatabaseError> {
        let package = sqlx::query_as::<_, Package>("SELECT * FROM packages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(package)
    }

    pub async fn find_all_paginated(
        &self,
        only_active: bool,
        page: &Page,
    ) -> Result<Paginated<Package>, DatabaseError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM packages");
        if only_active {
            count_qb.push(" WHERE is_active");
        }
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM packages");
        if only_active {
            qb.push(" WHERE is_active");
        }
        qb.push(" ORDER BY created_at DESC LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let items = qb.build_query_as::<Package>().fetch_all(&self.pool).await?;
        Ok(Paginated::new(items, total, page))
    }

    pub async fn update(&self, id: Uuid, diff: PackageDiff) -> Result<Package, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE packages SET updated_at = now()");
        if let Some(v) = diff.name {
            qb.push(", name = ");
            qb.push_bind(v);
        }
        if let Some(v) = diff.number_class {
            qb.push(", number_class = ");
            qb.push_bind(v);
        }
        if let Some(v) = diff.price {
            qb.push(", price = ");
            qb.push_bind(v);
        }
        if let Some(v) = diff.validity_days {
            qb.push(", validity_days = ");
            qb.push_bind(v);
        }
        if let Some(v) = diff.is_active {
            qb.push(", is_active = ");
            qb.push_bind(v);
        }
        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" RETURNING *");

        qb.build_query_as::<Package>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("package {} not found", id)))
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM packages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("package {} not found", id)));
        }
        Ok(())
    }
}
