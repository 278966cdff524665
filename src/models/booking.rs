use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lesson lifecycle. The full transition table lives in `can_transition`;
/// every status endpoint goes through it, none encodes its own legality
/// check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Teaching,
    Completed,
    StudentAbsent,
    TeacherAbsent,
    Cancelled,
}

impl BookingStatus {
    pub fn can_transition(self, to: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, to),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Teaching)
                | (Confirmed, Cancelled)
                | (Confirmed, StudentAbsent)
                | (Confirmed, TeacherAbsent)
                | (Teaching, Completed)
                | (Teaching, StudentAbsent)
                | (Teaching, TeacherAbsent)
        )
    }

    pub fn is_terminal(self) -> bool {
        use BookingStatus::*;
        matches!(self, Completed | StudentAbsent | TeacherAbsent | Cancelled)
    }

    /// Lesson never started, so the package credit goes back
    pub fn refunds_credit_on_cancel(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

/// A scheduled lesson linking student, teacher, calendar slot, course and
/// the entitlement it consumes.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub student_id: Uuid,
    pub teacher_id: Uuid,
    pub course_id: Option<Uuid>,
    pub ordered_package_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub meeting_url: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Like Booking, but not backed by a purchased entitlement.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TrialBooking {
    pub id: Uuid,
    pub student_id: Uuid,
    pub teacher_id: Uuid,
    pub course_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub meeting_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::BookingStatus::*;

    #[test]
    fn happy_path_transitions() {
        assert!(Pending.can_transition(Confirmed));
        assert!(Confirmed.can_transition(Teaching));
        assert!(Teaching.can_transition(Completed));
    }

    #[test]
    fn terminal_states_allow_nothing() {
        for terminal in [Completed, StudentAbsent, TeacherAbsent, Cancelled] {
            assert!(terminal.is_terminal());
            for target in [Pending, Confirmed, Teaching, Completed, Cancelled] {
                assert!(!terminal.can_transition(target));
            }
        }
    }

    #[test]
    fn no_skipping_confirmation() {
        assert!(!Pending.can_transition(Teaching));
        assert!(!Pending.can_transition(Completed));
    }

    #[test]
    fn cancellation_reachable_before_teaching_only() {
        assert!(Pending.can_transition(Cancelled));
        assert!(Confirmed.can_transition(Cancelled));
        assert!(!Teaching.can_transition(Cancelled));
    }

    #[test]
    fn refund_applies_to_unstarted_lessons() {
        assert!(Pending.refunds_credit_on_cancel());
        assert!(Confirmed.refunds_credit_on_cancel());
        assert!(!Teaching.refunds_credit_on_cancel());
    }

    #[test]
    fn self_transitions_rejected() {
        for s in [Pending, Confirmed, Teaching] {
            assert!(!s.can_transition(s));
        }
    }
}
