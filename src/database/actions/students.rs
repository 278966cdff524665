use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::page::{Page, Paginated};
use crate::models::Student;

#[derive(Debug)]
pub struct NewStudent {
    pub user_id: Uuid,
    pub staff_id: Option<Uuid>,
    pub level: i32,
    pub note: Option<String>,
}

#[derive(Debug, Default)]
pub struct StudentDiff {
    pub staff_id: Option<Option<Uuid>>,
    pub level: Option<i32>,
    pub note: Option<Option<String>>,
}

pub struct StudentActions {
    pool: PgPool,
}

impl StudentActions {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewStudent) -> Result<Student, DatabaseError> {
        let student = sqlx::query_as::<_, Student>(
            "INSERT INTO students (user_id, staff_id, level, note)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(new.user_id)
        .bind(new.staff_id)
        .bind(new.level)
        .bind(&new.note)
        .fetch_one(&self.pool)
        .await?;
        Ok(student)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Student>, DatabaseError> {
        let student = sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(student)
    }

    pub async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Student>, DatabaseError> {
        let student = sqlx::query_as::<_, Student>("SELECT * FROM students WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(student)
    }

    pub async fn find_all_paginated(
        &self,
        staff_id: Option<Uuid>,
        page: &Page,
    ) -> Result<Paginated<Student>, DatabaseError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM students WHERE 1 = 1");
        if let Some(staff) = staff_id {
            count_qb.push(" AND staff_id = ");
            count_qb.push_bind(staff);
        }
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM students WHERE 1 = 1");
        if let Some(staff) = staff_id {
            qb.push(" AND staff_id = ");
            qb.push_bind(staff);
        }
        qb.push(" ORDER BY created_at DESC LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let items = qb.build_query_as::<Student>().fetch_all(&self.pool).await?;
        Ok(Paginated::new(items, total, page))
    }

    pub async fn update(&self, id: Uuid, diff: StudentDiff) -> Result<Student, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE students SET updated_at = now()");
        if let Some(v) = diff.staff_id {
            qb.push(", staff_id = ");
            qb.push_bind(v);
        }
        if let Some(v) = diff.level {
            qb.push(", level = ");
            qb.push_bind(v);
        }
        if let Some(v) = diff.note {
            qb.push(", note = ");
            qb.push_bind(v);
        }
        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" RETURNING *");

        qb.build_query_as::<Student>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("student {} not found", id)))
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("student {} not found", id)));
        }
        Ok(())
    }

    /// Phone numbers of all active students, for broadcast sends
    pub async fn active_phones(&self) -> Result<Vec<String>, DatabaseError> {
        let phones: Vec<String> = sqlx::query_scalar(
            "SELECT u.phone FROM students s
             JOIN users u ON u.id = s.user_id
             WHERE u.is_active AND u.phone IS NOT NULL",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(phones)
    }
}
