//! Declarative authorization policy table.
//!
//! Every permission-gated route group is declared here once; route builders
//! look requirements up by group name and attach them to the permission
//! middleware. Handlers never embed their own permission conditionals.

use crate::auth::permissions as perm;

pub struct Policy {
    pub group: &'static str,
    /// Any-of requirement: the caller needs at least one of these
    pub any_of: &'static [&'static str],
}

pub static POLICIES: &[Policy] = &[
    Policy { group: "admin.users", any_of: &[perm::USER_MANAGE] },
    Policy { group: "admin.users.view", any_of: &[perm::USER_VIEW, perm::USER_MANAGE] },
    Policy { group: "admin.students", any_of: &[perm::STUDENT_MANAGE] },
    Policy { group: "admin.teachers", any_of: &[perm::TEACHER_MANAGE] },
    Policy { group: "admin.courses", any_of: &[perm::COURSE_MANAGE] },
    Policy { group: "admin.packages", any_of: &[perm::PACKAGE_MANAGE] },
    Policy { group: "admin.orders", any_of: &[perm::ORDER_MANAGE] },
    Policy { group: "admin.bookings", any_of: &[perm::BOOKING_MANAGE] },
    Policy {
        group: "admin.bookings.view",
        any_of: &[perm::BOOKING_VIEW, perm::BOOKING_MANAGE],
    },
    Policy { group: "admin.reports", any_of: &[perm::REPORT_VIEW] },
    Policy { group: "admin.notify", any_of: &[perm::NOTIFY_SEND] },
    Policy { group: "student", any_of: &[perm::SELF_PROFILE, perm::SELF_BOOKING] },
    Policy { group: "teacher", any_of: &[perm::SELF_PROFILE, perm::SELF_SCHEDULE] },
];

/// Look up a route group's requirements. Called only while the router is
/// being assembled, so an unknown group is a startup defect, not a runtime
/// condition.
pub fn required(group: &str) -> &'static [&'static str] {
    POLICIES
        .iter()
        .find(|p| p.group == group)
        .map(|p| p.any_of)
        .unwrap_or_else(|| panic!("unknown policy group: {}", group))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_groups_resolve() {
        assert_eq!(required("admin.reports"), &[perm::REPORT_VIEW]);
        assert!(required("admin.users.view").contains(&perm::USER_VIEW));
    }

    #[test]
    #[should_panic(expected = "unknown policy group")]
    fn unknown_group_panics_at_startup() {
        required("admin.nonexistent");
    }

    #[test]
    fn no_group_has_empty_requirements() {
        for p in POLICIES {
            assert!(!p.any_of.is_empty(), "group {} has no requirements", p.group);
        }
    }

    #[test]
    fn group_names_are_unique() {
        for (i, a) in POLICIES.iter().enumerate() {
            for b in &POLICIES[i + 1..] {
                assert_ne!(a.group, b.group);
            }
        }
    }
}
