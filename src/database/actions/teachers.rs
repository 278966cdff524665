use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::page::{Page, Paginated};
use crate::models::Teacher;

#[derive(Debug)]
pub struct NewTeacher {
    pub user_id: Uuid,
    pub hourly_rate: Decimal,
    pub location: Option<String>,
    pub weekly_slots: Vec<i32>,
}

#[derive(Debug, Default)]
pub struct TeacherDiff {
    pub hourly_rate: Option<Decimal>,
    pub location: Option<Option<String>>,
    pub weekly_slots: Option<Vec<i32>>,
}

pub struct TeacherActions {
    pool: PgPool,
}

impl TeacherActions {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewTeacher) -> Result<Teacher, DatabaseError> {
        let teacher = sqlx::query_as::<_, Teacher>(
            "INSERT INTO teachers (user_id, hourly_rate, location, weekly_slots)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(new.user_id)
        .bind(new.hourly_rate)
        .bind(&new.location)
        .bind(&new.weekly_slots)
        .fetch_one(&self.pool)
        .await?;
        Ok(teacher)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Teacher>, DatabaseError> {
        let teacher = sqlx::query_as::<_, Teacher>("SELECT * FROM teachers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(teacher)
    }

    pub async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Teacher>, DatabaseError> {
        let teacher = sqlx::query_as::<_, Teacher>("SELECT * FROM teachers WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(teacher)
    }

    pub async fn find_all_paginated(&self, page: &Page) -> Result<Paginated<Teacher>, DatabaseError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM teachers")
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, Teacher>(
            "SELECT * FROM teachers ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(Paginated::new(items, total, page))
    }

    pub async fn update(&self, id: Uuid, diff: TeacherDiff) -> Result<Teacher, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE teachers SET updated_at = now()");
        if let Some(v) = diff.hourly_rate {
            qb.push(", hourly_rate = ");
            qb.push_bind(v);
        }
        if let Some(v) = diff.location {
            qb.push(", location = ");
            qb.push_bind(v);
        }
        if let Some(v) = diff.weekly_slots {
            qb.push(", weekly_slots = ");
            qb.push_bind(v);
        }
        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" RETURNING *");

        qb.build_query_as::<Teacher>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("teacher {} not found", id)))
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM teachers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("teacher {} not found", id)));
        }
        Ok(())
    }
}
