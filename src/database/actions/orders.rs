use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::page::{Page, Paginated};
use crate::models::{Order, OrderStatus, OrderedPackage};

pub struct OrderActions {
    pool: PgPool,
}

impl OrderActions {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        code: &str,
        student_id: Uuid,
        total: Decimal,
    ) -> Result<Order, DatabaseError> {
        let order = sqlx::query_as::<_, Order>(
            "INSERT INTO orders (code, student_id, total) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(code)
        .bind(student_id)
        .bind(total)
        .fetch_one(&self.pool)
        .await?;
        Ok(order)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DatabaseError> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<Order>, DatabaseError> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    pub async fn find_all_paginated(
        &self,
        student_id: Option<Uuid>,
        page: &Page,
    ) -> Result<Paginated<Order>, DatabaseError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM orders WHERE 1 = 1");
        if let Some(sid) = student_id {
            count_qb.push(" AND student_id = ");
            count_qb.push_bind(sid);
        }
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM orders WHERE 1 = 1");
        if let Some(sid) = student_id {
            qb.push(" AND student_id = ");
            qb.push_bind(sid);
        }
        qb.push(" ORDER BY created_at DESC LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let items = qb.build_query_as::<Order>().fetch_all(&self.pool).await?;
        Ok(Paginated::new(items, total, page))
    }

    pub async fn set_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, DatabaseError> {
        sqlx::query_as::<_, Order>(
            "UPDATE orders SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("order {} not found", id)))
    }

    /// Paid revenue inside a window, for the admin report
    pub async fn revenue(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Decimal, DatabaseError> {
        let total: Option<Decimal> = sqlx::query_scalar(
            "SELECT SUM(total) FROM orders
             WHERE status = 'paid' AND updated_at >= $1 AND updated_at < $2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;
        Ok(total.unwrap_or_default())
    }
}

pub struct OrderedPackageActions {
    pool: PgPool,
}

impl OrderedPackageActions {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        order_id: Uuid,
        student_id: Uuid,
        package_id: Uuid,
        number_class: i32,
    ) -> Result<OrderedPackage, DatabaseError> {
        let op = sqlx::query_as::<_, OrderedPackage>(
            "INSERT INTO ordered_packages (order_id, student_id, package_id, number_class)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(order_id)
        .bind(student_id)
        .bind(package_id)
        .bind(number_class)
        .fetch_one(&self.pool)
        .await?;
        Ok(op)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<OrderedPackage>, DatabaseError> {
        let op = sqlx::query_as::<_, OrderedPackage>("SELECT * FROM ordered_packages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(op)
    }

    pub async fn find_by_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<OrderedPackage>, DatabaseError> {
        let ops = sqlx::query_as::<_, OrderedPackage>(
            "SELECT * FROM ordered_packages WHERE student_id = $1 ORDER BY created_at DESC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ops)
    }

    /// Consume one credit. The guard is a single conditional UPDATE so two
    /// concurrent bookings cannot both take the last credit. Returns false
    /// when the package is exhausted, unactivated or outside its window.
    pub async fn consume_credit(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE ordered_packages
             SET used_class = used_class + 1, updated_at = now()
             WHERE id = $1
               AND used_class < number_class
               AND activation_date IS NOT NULL AND activation_date <= $2
               AND expired_date IS NOT NULL AND $2 < expired_date",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Give a credit back after cancelling an unstarted lesson
    pub async fn refund_credit(&self, id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query(
            "UPDATE ordered_packages
             SET used_class = GREATEST(used_class - 1, 0), updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Activate every package on a paid order: validity window starts now
    /// and runs for the catalog package's validity_days
    pub async fn activate_for_order(&self, order_id: Uuid) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "UPDATE ordered_packages op
             SET activation_date = now(),
                 expired_date = now() + make_interval(days => p.validity_days),
                 updated_at = now()
             FROM packages p
             WHERE p.id = op.package_id
               AND op.order_id = $1
               AND op.activation_date IS NULL",
        )
        .bind(order_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
