use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::page::{Page, Paginated};
use crate::models::Course;

#[derive(Debug, Default)]
pub struct CourseDiff {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
}

pub struct CourseActions {
    pool: PgPool,
}

impl CourseActions {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Course, DatabaseError> {
        let course = sqlx::query_as::<_, Course>(
            "INSERT INTO courses (name, description) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;
        Ok(course)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>, DatabaseError> {
        let course = sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(course)
    }

    pub async fn find_all_paginated(&self, page: &Page) -> Result<Paginated<Course>, DatabaseError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses")
            .fetch_one(&self.pool)
            .await?;
        let items = sqlx::query_as::<_, Course>(
            "SELECT * FROM courses ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(Paginated::new(items, total, page))
    }

    pub async fn update(&self, id: Uuid, diff: CourseDiff) -> Result<Course, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE courses SET updated_at = now()");
        if let Some(v) = diff.name {
            qb.push(", name = ");
            qb.push_bind(v);
        }
        if let Some(v) = diff.description {
            qb.push(", description = ");
            qb.push_bind(v);
        }
        if let Some(v) = diff.is_active {
            qb.push(", is_active = ");
            qb.push_bind(v);
        }
        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" RETURNING *");

        qb.build_query_as::<Course>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("course {} not found", id)))
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("course {} not found", id)));
        }
        Ok(())
    }
}
