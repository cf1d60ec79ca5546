use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"));

pub fn require_non_blank(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be blank"));
    }
    Ok(())
}

pub fn validate_email(field: &str, value: &str) -> Result<(), ValidationError> {
    if !EMAIL.is_match(value) {
        return Err(ValidationError::new(field, format!("'{}' is not a valid email address", value)));
    }
    Ok(())
}

pub fn validate_non_negative(field: &str, value: i32) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::new(field, "must not be negative"));
    }
    Ok(())
}

pub fn validate_positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::new(field, "must be a positive number"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(validate_email("email", "tutor@example.com").is_ok());
        assert!(validate_email("email", "no-at-sign.com").is_err());
        assert!(validate_email("email", "two@@example.com").is_err());
    }

    #[test]
    fn test_numeric_predicates() {
        assert!(validate_non_negative("age", 0).is_ok());
        assert_eq!(validate_non_negative("age", -1).unwrap_err().field, "age");
        assert!(validate_positive("weight", 0.4).is_ok());
        assert!(validate_positive("weight", 0.0).is_err());
        assert!(validate_positive("weight", f64::NAN).is_err());
    }
}
