//! Constraint-validation contract for handler body parameters.
//!
//! The engine does not ship a constraint engine of its own; request types
//! opt in by implementing [`Validate`], returning the full set of
//! [`Violation`]s found. The dispatcher runs validation on bound body
//! arguments declared as validated and converts a non-empty violation set
//! into a 400-class outcome before the handler is ever invoked.

use thiserror::Error;

/// A single constraint violation: a property path and a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    path: String,
    message: String,
}

impl Violation {
    /// Creates a violation for the given property path.
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns the property path (e.g. `customerId`).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Contract implemented by request types that carry declarative constraints.
///
/// An empty vector means the value is valid.
pub trait Validate {
    /// Checks the value and returns every violation found.
    fn validate(&self) -> Vec<Violation>;
}

/// Raised when a validated body argument fails its constraints.
///
/// Carries the full violation set; the dispatcher surfaces it as a 400
/// response and never retries or logs it as a server fault.
#[derive(Debug, Error)]
#[error("validation failed: {}", format_violations(.violations))]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    /// Creates an error from a non-empty violation set.
    #[must_use]
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Returns the violations that caused the failure.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Returns the number of violations.
    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    /// Formats the violations as `"path: message; path: message"`.
    #[must_use]
    pub fn formatted_message(&self) -> String {
        format_violations(&self.violations)
    }
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Checks that a string field is non-blank, producing a violation otherwise.
#[must_use]
pub fn require_not_blank(path: &str, value: &str, message: &str) -> Option<Violation> {
    value
        .trim()
        .is_empty()
        .then(|| Violation::new(path, message))
}

/// Checks that a numeric field meets a minimum, producing a violation
/// otherwise.
#[must_use]
pub fn require_min<T: PartialOrd + Copy>(
    path: &str,
    value: T,
    min: T,
    message: &str,
) -> Option<Violation> {
    (value < min).then(|| Violation::new(path, message))
}

#[cfg(test)]
mod tests;
