use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::page::{Page, Paginated};
use crate::models::User;

#[derive(Debug)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub roles: Vec<String>,
}

#[derive(Debug, Default)]
pub struct UserDiff {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
    pub roles: Option<Vec<String>>,
    pub is_verified: Option<bool>,
    pub is_active: Option<bool>,
    pub regular_times: Option<Vec<i32>>,
}

#[derive(Debug, Default)]
pub struct UserFilter {
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

pub struct UserActions {
    pool: PgPool,
}

impl UserActions {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewUser) -> Result<User, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash, full_name, phone, roles)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.full_name)
        .bind(&new.phone)
        .bind(&new.roles)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_all_paginated(
        &self,
        filter: UserFilter,
        page: &Page,
    ) -> Result<Paginated<User>, DatabaseError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        push_filters(&mut count_qb, &filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM users");
        push_filters(&mut qb, &filter);
        qb.push(" ORDER BY created_at DESC LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let items = qb.build_query_as::<User>().fetch_all(&self.pool).await?;
        Ok(Paginated::new(items, total, page))
    }

    pub async fn update(&self, id: Uuid, diff: UserDiff) -> Result<User, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE users SET updated_at = now()");
        if let Some(v) = diff.full_name {
            qb.push(", full_name = ");
            qb.push_bind(v);
        }
        if let Some(v) = diff.phone {
            qb.push(", phone = ");
            qb.push_bind(v);
        }
        if let Some(v) = diff.password_hash {
            qb.push(", password_hash = ");
            qb.push_bind(v);
        }
        if let Some(v) = diff.roles {
            qb.push(", roles = ");
            qb.push_bind(v);
        }
        if let Some(v) = diff.is_verified {
            qb.push(", is_verified = ");
            qb.push_bind(v);
        }
        if let Some(v) = diff.is_active {
            qb.push(", is_active = ");
            qb.push_bind(v);
        }
        if let Some(v) = diff.regular_times {
            qb.push(", regular_times = ");
            qb.push_bind(v);
        }
        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" RETURNING *");

        qb.build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("user {} not found", id)))
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("user {} not found", id)));
        }
        Ok(())
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    qb.push(" WHERE 1 = 1");
    if let Some(role) = &filter.role {
        qb.push(" AND ");
        qb.push_bind(role.clone());
        qb.push(" = ANY(roles)");
    }
    if let Some(active) = filter.is_active {
        qb.push(" AND is_active = ");
        qb.push_bind(active);
    }
    if let Some(q) = &filter.search {
        let pattern = format!("%{}%", q);
        qb.push(" AND (full_name ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR email ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
}
