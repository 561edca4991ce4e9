//! Unit tests for the validation contract.

use super::*;

#[test]
fn violation_displays_as_path_and_message() {
    let violation = Violation::new("customerId", "must not be blank");
    assert_eq!(violation.to_string(), "customerId: must not be blank");
}

#[test]
fn error_message_joins_violations_with_semicolons() {
    let error = ValidationError::new(vec![
        Violation::new("customerId", "must not be blank"),
        Violation::new("totalAmount", "must be at least 0.01"),
    ]);

    assert_eq!(error.violation_count(), 2);
    assert_eq!(
        error.formatted_message(),
        "customerId: must not be blank; totalAmount: must be at least 0.01"
    );
    assert!(error.to_string().starts_with("validation failed: "));
}

#[test]
fn require_not_blank_flags_whitespace_only_values() {
    assert!(require_not_blank("name", "   ", "required").is_some());
    assert!(require_not_blank("name", "", "required").is_some());
    assert!(require_not_blank("name", "ok", "required").is_none());
}

#[test]
fn require_min_flags_values_below_the_threshold() {
    assert!(require_min("count", 0, 1, "too small").is_some());
    assert!(require_min("count", 1, 1, "too small").is_none());
    assert!(require_min("count", 5, 1, "too small").is_none());
}
