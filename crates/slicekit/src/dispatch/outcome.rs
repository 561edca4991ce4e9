//! Dispatch outcomes and their JSON bodies.
//!
//! Every outcome, success or failure, carries a status code and a JSON body
//! ready for the transport collaborator. Error bodies use lowerCamel field
//! names; if serialising an error body itself fails the outcome degrades to
//! a minimal `{"error":"<Type>"}` object rather than losing the response.

use serde::Serialize;

use crate::validation::ValidationError;

/// Media type of every outcome body.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// The terminal result of dispatching one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    status: u16,
    body: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NotFoundBody {
    error: &'static str,
    message: String,
    available_routes: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidationFailedBody {
    error: &'static str,
    message: String,
    violation_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InternalErrorBody {
    error: &'static str,
    message: String,
}

impl DispatchOutcome {
    /// A successful invocation with a serialised JSON result.
    #[must_use]
    pub(crate) fn ok(body: String) -> Self {
        Self { status: 200, body }
    }

    /// A successful invocation that produced no result.
    #[must_use]
    pub(crate) fn no_content() -> Self {
        Self {
            status: 204,
            body: String::new(),
        }
    }

    /// No slice is mounted on the requested method and route.
    #[must_use]
    pub(crate) fn not_found(method: &str, path: &str, available_routes: Vec<String>) -> Self {
        let body = NotFoundBody {
            error: "Not Found",
            message: format!("No slice registered for {method} {path}"),
            available_routes,
        };
        Self {
            status: 404,
            body: encode("Not Found", &body),
        }
    }

    /// The bound argument violated its declared constraints.
    #[must_use]
    pub(crate) fn validation_failed(error: &ValidationError) -> Self {
        let body = ValidationFailedBody {
            error: "Validation Failed",
            message: error.formatted_message(),
            violation_count: error.violation_count(),
        };
        Self {
            status: 400,
            body: encode("Validation Failed", &body),
        }
    }

    /// Any pipeline failure that is not the caller's fault.
    #[must_use]
    pub(crate) fn internal_error(message: impl Into<String>) -> Self {
        let body = InternalErrorBody {
            error: "Internal Server Error",
            message: message.into(),
        };
        Self {
            status: 500,
            body: encode("Internal Server Error", &body),
        }
    }

    /// The HTTP status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The body's media type.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        JSON_CONTENT_TYPE
    }

    /// The serialised JSON body; empty for No Content.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Serialises an error body, degrading to `{"error":"<label>"}` when the
/// body itself cannot be encoded.
fn encode<T: Serialize>(label: &str, body: &T) -> String {
    serde_json::to_string(body).unwrap_or_else(|_| format!(r#"{{"error":"{label}"}}"#))
}
