use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::page::{Page, Paginated};
use crate::models::{Booking, BookingStatus, TrialBooking};

#[derive(Debug)]
pub struct NewBooking {
    pub student_id: Uuid,
    pub teacher_id: Uuid,
    pub course_id: Option<Uuid>,
    pub ordered_package_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub note: Option<String>,
}

#[derive(Debug, Default)]
pub struct BookingFilter {
    pub student_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    pub status: Option<BookingStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

pub struct BookingActions {
    pool: PgPool,
}

impl BookingActions {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewBooking) -> Result<Booking, DatabaseError> {
        let booking = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings
                 (student_id, teacher_id, course_id, ordered_package_id, start_time, end_time, note)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(new.student_id)
        .bind(new.teacher_id)
        .bind(new.course_id)
        .bind(new.ordered_package_id)
        .bind(new.start_time)
        .bind(new.end_time)
        .bind(&new.note)
        .fetch_one(&self.pool)
        .await?;
        Ok(booking)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, DatabaseError> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(booking)
    }

    pub async fn find_all_paginated(
        &self,
        filter: BookingFilter,
        page: &Page,
    ) -> Result<Paginated<Booking>, DatabaseError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM bookings");
        push_filters(&mut count_qb, &filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM bookings");
        push_filters(&mut qb, &filter);
        qb.push(" ORDER BY start_time DESC LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let items = qb.build_query_as::<Booking>().fetch_all(&self.pool).await?;
        Ok(Paginated::new(items, total, page))
    }

    /// All non-cancelled bookings for a teacher inside a window, for the
    /// schedule view
    pub async fn teacher_window(
        &self,
        teacher_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Booking>, DatabaseError> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings
             WHERE teacher_id = $1 AND status <> 'cancelled'
               AND start_time < $3 AND end_time > $2
             ORDER BY start_time",
        )
        .bind(teacher_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    /// True when the teacher already has a non-cancelled lesson (regular or
    /// trial) intersecting [start, end)
    pub async fn overlap_exists(
        &self,
        teacher_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool, DatabaseError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                 SELECT 1 FROM bookings
                 WHERE teacher_id = $1 AND status <> 'cancelled'
                   AND start_time < $3 AND end_time > $2
                 UNION ALL
                 SELECT 1 FROM trial_bookings
                 WHERE teacher_id = $1 AND status <> 'cancelled'
                   AND start_time < $3 AND end_time > $2
             )",
        )
        .bind(teacher_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking, DatabaseError> {
        sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("booking {} not found", id)))
    }

    pub async fn set_meeting_url(&self, id: Uuid, url: &str) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE bookings SET meeting_url = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(url)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("booking {} not found", id)));
        }
        Ok(())
    }

    /// Booking counts per status inside a window, for the admin report
    pub async fn counts_by_status(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<(BookingStatus, i64)>, DatabaseError> {
        let rows: Vec<(BookingStatus, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM bookings
             WHERE start_time >= $1 AND start_time < $2
             GROUP BY status",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Append a meeting-provider callback event
    pub async fn record_meeting_event(
        &self,
        booking_id: Uuid,
        event_type: &str,
        participant: Option<&str>,
        payload: Option<Value>,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO meeting_events (booking_id, event_type, participant, payload)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(booking_id)
        .bind(event_type)
        .bind(participant)
        .bind(payload)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

pub struct TrialBookingActions {
    pool: PgPool,
}

impl TrialBookingActions {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        student_id: Uuid,
        teacher_id: Uuid,
        course_id: Option<Uuid>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<TrialBooking, DatabaseError> {
        let trial = sqlx::query_as::<_, TrialBooking>(
            "INSERT INTO trial_bookings (student_id, teacher_id, course_id, start_time, end_time)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(student_id)
        .bind(teacher_id)
        .bind(course_id)
        .bind(start_time)
        .bind(end_time)
        .fetch_one(&self.pool)
        .await?;
        Ok(trial)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TrialBooking>, DatabaseError> {
        let trial = sqlx::query_as::<_, TrialBooking>("SELECT * FROM trial_bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(trial)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<TrialBooking, DatabaseError> {
        sqlx::query_as::<_, TrialBooking>(
            "UPDATE trial_bookings SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("trial booking {} not found", id)))
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &BookingFilter) {
    qb.push(" WHERE 1 = 1");
    if let Some(student_id) = filter.student_id {
        qb.push(" AND student_id = ");
        qb.push_bind(student_id);
    }
    if let Some(teacher_id) = filter.teacher_id {
        qb.push(" AND teacher_id = ");
        qb.push_bind(teacher_id);
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ");
        qb.push_bind(status);
    }
    if let Some(from) = filter.from {
        qb.push(" AND start_time >= ");
        qb.push_bind(from);
    }
    if let Some(to) = filter.to {
        qb.push(" AND start_time < ");
        qb.push_bind(to);
    }
}
