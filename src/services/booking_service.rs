use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::actions::bookings::{BookingActions, NewBooking, TrialBookingActions};
use crate::database::actions::orders::OrderedPackageActions;
use crate::error::ApiError;
use crate::models::{Booking, BookingStatus, TrialBooking};
use crate::services::outbound::MeetClient;

/// Longest lesson the calendar accepts
fn max_lesson() -> Duration {
    Duration::hours(4)
}

/// Booking workflow: slot validation, overlap avoidance, credit consumption
/// and the status transitions. All legality checks go through
/// `BookingStatus::can_transition`.
pub struct BookingService {
    bookings: BookingActions,
    trials: TrialBookingActions,
    packages: OrderedPackageActions,
}

impl BookingService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            bookings: BookingActions::new(pool.clone()),
            trials: TrialBookingActions::new(pool.clone()),
            packages: OrderedPackageActions::new(pool),
        }
    }

    fn check_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), ApiError> {
        if end <= start {
            return Err(ApiError::validation_error(
                "end_time must be after start_time",
                Some("end_time".to_string()),
            ));
        }
        if end - start > max_lesson() {
            return Err(ApiError::validation_error(
                "lesson exceeds the maximum duration",
                Some("end_time".to_string()),
            ));
        }
        if start < Utc::now() {
            return Err(ApiError::validation_error(
                "start_time must be in the future",
                Some("start_time".to_string()),
            ));
        }
        Ok(())
    }

    /// Create a regular booking: the slot must be free for the teacher and
    /// one credit is consumed from the named ordered package.
    pub async fn create_booking(&self, new: NewBooking) -> Result<Booking, ApiError> {
        Self::check_window(new.start_time, new.end_time)?;

        let package_id = new.ordered_package_id.ok_or_else(|| {
            ApiError::validation_error(
                "ordered_package_id is required",
                Some("ordered_package_id".to_string()),
            )
        })?;

        if self
            .bookings
            .overlap_exists(new.teacher_id, new.start_time, new.end_time)
            .await?
        {
            return Err(ApiError::conflict(
                "Teacher already has a lesson in this time slot",
            ));
        }

        // Conditional single-statement guard: fails when the package is
        // exhausted, unactivated or outside its validity window.
        if !self.packages.consume_credit(package_id, new.start_time).await? {
            return Err(ApiError::bad_request(
                "Package has no usable credit for this time",
            ));
        }

        match self.bookings.create(new).await {
            Ok(booking) => Ok(booking),
            Err(e) => {
                // Insert failed after the credit was taken; give it back
                self.packages.refund_credit(package_id).await?;
                Err(e.into())
            }
        }
    }

    /// Create a trial booking: no entitlement involved
    pub async fn create_trial(
        &self,
        student_id: Uuid,
        teacher_id: Uuid,
        course_id: Option<Uuid>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<TrialBooking, ApiError> {
        Self::check_window(start_time, end_time)?;

        if self.bookings.overlap_exists(teacher_id, start_time, end_time).await? {
            return Err(ApiError::conflict(
                "Teacher already has a lesson in this time slot",
            ));
        }

        let trial = self
            .trials
            .create(student_id, teacher_id, course_id, start_time, end_time)
            .await?;
        Ok(trial)
    }

    /// Move a booking to a new status. Confirming provisions a meeting room;
    /// cancelling an unstarted booking refunds its credit.
    pub async fn transition(&self, id: Uuid, to: BookingStatus) -> Result<Booking, ApiError> {
        let booking = self
            .bookings
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("booking {} not found", id)))?;

        if !booking.status.can_transition(to) {
            return Err(ApiError::bad_request(format!(
                "Cannot move booking from {:?} to {:?}",
                booking.status, to
            )));
        }

        if to == BookingStatus::Confirmed {
            // Meeting provisioning failure propagates as 502
            let meet = MeetClient::from_config()?;
            let url = meet.create_room(booking.id).await?;
            self.bookings.set_meeting_url(booking.id, &url).await?;
        }

        if to == BookingStatus::Cancelled && booking.status.refunds_credit_on_cancel() {
            if let Some(package_id) = booking.ordered_package_id {
                self.packages.refund_credit(package_id).await?;
            }
        }

        let updated = self.bookings.update_status(id, to).await?;
        Ok(updated)
    }

    /// Same transition table, applied to trial bookings. No entitlement and
    /// no meeting provisioning.
    pub async fn transition_trial(
        &self,
        id: Uuid,
        to: BookingStatus,
    ) -> Result<TrialBooking, ApiError> {
        let trial = self
            .trials
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("trial booking {} not found", id)))?;

        if !trial.status.can_transition(to) {
            return Err(ApiError::bad_request(format!(
                "Cannot move trial booking from {:?} to {:?}",
                trial.status, to
            )));
        }

        let updated = self.trials.update_status(id, to).await?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(minutes: i64) -> DateTime<Utc> {
        Utc::now() + Duration::minutes(minutes)
    }

    #[test]
    fn window_check_rejects_inverted_and_past_slots() {
        assert!(BookingService::check_window(t(60), t(30)).is_err());
        assert!(BookingService::check_window(t(-120), t(-60)).is_err());
        assert!(BookingService::check_window(t(60), t(60 + 5 * 60)).is_err());
        assert!(BookingService::check_window(t(60), t(120)).is_ok());
    }
}
