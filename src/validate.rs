//! Declarative field validation helpers. Handlers call these at entry;
//! the first failing field short-circuits with a 400.

use crate::error::ApiError;

fn missing(field: &str) -> ApiError {
    ApiError::validation_error(format!("{} is required", field), Some(field.to_string()))
}

/// Required non-empty string, trimmed
pub fn require_str(field: &str, value: Option<&str>) -> Result<String, ApiError> {
    let v = value.map(str::trim).filter(|v| !v.is_empty());
    v.map(|v| v.to_string()).ok_or_else(|| missing(field))
}

/// Required email: non-empty with a plausible local@domain shape
pub fn require_email(field: &str, value: Option<&str>) -> Result<String, ApiError> {
    let email = require_str(field, value)?;
    let well_formed = email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
        .unwrap_or(false);
    if !well_formed {
        return Err(ApiError::validation_error(
            format!("{} is not a valid email address", field),
            Some(field.to_string()),
        ));
    }
    Ok(email)
}

/// Required value of any type
pub fn require<T>(field: &str, value: Option<T>) -> Result<T, ApiError> {
    value.ok_or_else(|| missing(field))
}

/// Required positive integer
pub fn require_positive(field: &str, value: Option<i32>) -> Result<i32, ApiError> {
    let v = require(field, value)?;
    if v <= 0 {
        return Err(ApiError::validation_error(
            format!("{} must be positive", field),
            Some(field.to_string()),
        ));
    }
    Ok(v)
}

/// Deserializer for nullable fields in partial updates: an absent field
/// stays `None` (unchanged) while an explicit JSON `null` becomes
/// `Some(None)` (clear the column). Use with `#[serde(default,
/// deserialize_with = "...")]` on `Option<Option<T>>` fields.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(de).map(Some)
}

/// Minimum password length; strength rules beyond length are out of scope
pub fn require_password(field: &str, value: Option<&str>) -> Result<String, ApiError> {
    let pw = require_str(field, value)?;
    if pw.len() < 8 {
        return Err(ApiError::validation_error(
            format!("{} must be at least 8 characters", field),
            Some(field.to_string()),
        ));
    }
    Ok(pw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_str_trims_and_rejects_empty() {
        assert_eq!(require_str("name", Some("  bob ")).unwrap(), "bob");
        assert!(require_str("name", Some("   ")).is_err());
        assert!(require_str("name", None).is_err());
    }

    #[test]
    fn email_shape_is_checked() {
        assert!(require_email("email", Some("a@b.co")).is_ok());
        assert!(require_email("email", Some("a@b")).is_err());
        assert!(require_email("email", Some("@b.co")).is_err());
        assert!(require_email("email", Some("no-at-sign")).is_err());
    }

    #[test]
    fn failing_field_is_reported() {
        let err = require_str("full_name", None).unwrap_err();
        match err {
            ApiError::ValidationError { field, .. } => {
                assert_eq!(field.as_deref(), Some("full_name"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn positive_check() {
        assert!(require_positive("n", Some(0)).is_err());
        assert_eq!(require_positive("n", Some(3)).unwrap(), 3);
    }

    #[test]
    fn password_length() {
        assert!(require_password("password", Some("short")).is_err());
        assert!(require_password("password", Some("long-enough")).is_ok());
    }

    #[test]
    fn double_option_separates_absent_from_null() {
        #[derive(serde::Deserialize)]
        struct Patch {
            #[serde(default, deserialize_with = "crate::validate::double_option")]
            note: Option<Option<String>>,
        }

        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.note, None);

        let cleared: Patch = serde_json::from_str(r#"{"note": null}"#).unwrap();
        assert_eq!(cleared.note, Some(None));

        let set: Patch = serde_json::from_str(r#"{"note": "vip"}"#).unwrap();
        assert_eq!(set.note, Some(Some("vip".to_string())));
    }
}
