//! Static permission catalog and role grant sets.
//!
//! Permissions are opaque strings granted per role; the authorization check
//! is an any-of intersection between a route's requirements and the caller's
//! set. No hierarchy, no wildcards.

pub const USER_VIEW: &str = "user_view";
pub const USER_MANAGE: &str = "user_manage";
pub const STUDENT_MANAGE: &str = "student_manage";
pub const TEACHER_MANAGE: &str = "teacher_manage";
pub const COURSE_MANAGE: &str = "course_manage";
pub const PACKAGE_MANAGE: &str = "package_manage";
pub const ORDER_MANAGE: &str = "order_manage";
pub const BOOKING_VIEW: &str = "booking_view";
pub const BOOKING_MANAGE: &str = "booking_manage";
pub const REPORT_VIEW: &str = "report_view";
pub const NOTIFY_SEND: &str = "notify_send";

// Self-service permissions granted to end-user roles
pub const SELF_PROFILE: &str = "self_profile";
pub const SELF_BOOKING: &str = "self_booking";
pub const SELF_SCHEDULE: &str = "self_schedule";

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STAFF: &str = "staff";
pub const ROLE_TEACHER: &str = "teacher";
pub const ROLE_STUDENT: &str = "student";

/// Permissions granted to a single role. Unknown roles grant nothing.
pub fn role_grants(role: &str) -> &'static [&'static str] {
    match role {
        ROLE_ADMIN => &[
            USER_VIEW,
            USER_MANAGE,
            STUDENT_MANAGE,
            TEACHER_MANAGE,
            COURSE_MANAGE,
            PACKAGE_MANAGE,
            ORDER_MANAGE,
            BOOKING_VIEW,
            BOOKING_MANAGE,
            REPORT_VIEW,
            NOTIFY_SEND,
        ],
        ROLE_STAFF => &[
            USER_VIEW,
            STUDENT_MANAGE,
            BOOKING_VIEW,
            BOOKING_MANAGE,
            ORDER_MANAGE,
        ],
        ROLE_TEACHER => &[SELF_PROFILE, SELF_BOOKING, SELF_SCHEDULE],
        ROLE_STUDENT => &[SELF_PROFILE, SELF_BOOKING],
        _ => &[],
    }
}

/// Union of grants across the caller's roles, deduplicated.
pub fn grants_for_roles(roles: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for role in roles {
        for p in role_grants(role) {
            if !out.iter().any(|g| g == p) {
                out.push((*p).to_string());
            }
        }
    }
    out
}

/// Any-of (OR) check: succeeds when the intersection is non-empty.
pub fn any_granted(granted: &[String], required: &[&str]) -> bool {
    required.iter().any(|r| granted.iter().any(|g| g == r))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_holds_report_view() {
        let grants = grants_for_roles(&[ROLE_ADMIN.to_string()]);
        assert!(any_granted(&grants, &[REPORT_VIEW]));
    }

    #[test]
    fn any_of_needs_single_match() {
        let grants = grants_for_roles(&[ROLE_STAFF.to_string()]);
        // staff lacks report_view but holds booking_view
        assert!(any_granted(&grants, &[REPORT_VIEW, BOOKING_VIEW]));
        assert!(!any_granted(&grants, &[REPORT_VIEW, NOTIFY_SEND]));
    }

    #[test]
    fn unknown_role_grants_nothing() {
        assert!(grants_for_roles(&["superuser".to_string()]).is_empty());
    }

    #[test]
    fn multi_role_union_deduplicates() {
        let grants =
            grants_for_roles(&[ROLE_ADMIN.to_string(), ROLE_STAFF.to_string()]);
        let views = grants.iter().filter(|g| g.as_str() == USER_VIEW).count();
        assert_eq!(views, 1);
    }

    #[test]
    fn empty_requirements_never_match() {
        let grants = grants_for_roles(&[ROLE_ADMIN.to_string()]);
        assert!(!any_granted(&grants, &[]));
    }
}
