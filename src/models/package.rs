use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Catalog package: N classes for a price, valid for `validity_days` after
/// activation.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Package {
    pub id: Uuid,
    pub course_id: Option<Uuid>,
    pub name: String,
    pub number_class: i32,
    pub price: Decimal,
    pub validity_days: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    PendingPayment,
    Paid,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    /// Human-facing order code, referenced by the payment-checker webhook
    pub code: String,
    pub student_id: Uuid,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A purchased lesson-credit entitlement consumed by bookings.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderedPackage {
    pub id: Uuid,
    pub order_id: Uuid,
    pub student_id: Uuid,
    pub package_id: Uuid,
    pub number_class: i32,
    pub used_class: i32,
    pub activation_date: Option<DateTime<Utc>>,
    pub expired_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderedPackage {
    pub fn remaining(&self) -> i32 {
        self.number_class - self.used_class
    }

    /// Usable at `at`: activated, not expired, credits left
    pub fn usable_at(&self, at: DateTime<Utc>) -> bool {
        let activated = matches!(self.activation_date, Some(d) if d <= at);
        let not_expired = self.expired_date.map_or(false, |d| at < d);
        activated && not_expired && self.remaining() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(used: i32, activated: bool, expired: bool) -> OrderedPackage {
        let now = Utc::now();
        OrderedPackage {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            package_id: Uuid::new_v4(),
            number_class: 10,
            used_class: used,
            activation_date: activated.then(|| now - Duration::days(1)),
            expired_date: Some(if expired {
                now - Duration::hours(1)
            } else {
                now + Duration::days(30)
            }),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn usable_within_window_with_credits() {
        assert!(sample(0, true, false).usable_at(Utc::now()));
    }

    #[test]
    fn exhausted_package_not_usable() {
        assert!(!sample(10, true, false).usable_at(Utc::now()));
    }

    #[test]
    fn unactivated_or_expired_not_usable() {
        assert!(!sample(0, false, false).usable_at(Utc::now()));
        assert!(!sample(0, true, true).usable_at(Utc::now()));
    }
}
