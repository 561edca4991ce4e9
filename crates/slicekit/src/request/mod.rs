//! Transport-facing request wrapper consumed by the dispatch pipeline.
//!
//! The transport collaborator constructs a [`SliceRequest`] from whatever
//! wire representation it manages and hands it to the dispatcher. Header
//! names are normalised to lower case on insertion so lookups are
//! case-insensitive, and query parameters keep the first value seen for a
//! name.

use std::collections::HashMap;

/// An inbound request as seen by a feature unit.
///
/// Handlers that declare a raw-request parameter receive this wrapper
/// unchanged; handlers with a typed body parameter have the body
/// deserialized for them by the pipeline.
///
/// # Example
///
/// ```
/// use slicekit::SliceRequest;
///
/// let request = SliceRequest::new("POST", "/api/orders")
///     .with_json_body(r#"{"customerId":"a@b.c"}"#);
/// assert!(request.has_body());
/// assert!(request.is_json_content());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SliceRequest {
    method: String,
    path: String,
    headers: HashMap<String, String>,
    query: HashMap<String, String>,
    body: Option<String>,
}

impl SliceRequest {
    /// Creates a request with the given method and path and no headers,
    /// query parameters, or body.
    #[must_use]
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: HashMap::new(),
            query: HashMap::new(),
            body: None,
        }
    }

    /// Adds a header. The name is stored lower-cased.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_lowercase(), value.into());
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Sets the raw body text without touching the content type.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the body text and marks the content type as `application/json`.
    #[must_use]
    pub fn with_json_body(self, body: impl Into<String>) -> Self {
        self.with_header("content-type", "application/json")
            .with_body(body)
    }

    /// Returns the HTTP method as supplied by the transport.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns all headers (names lower-cased).
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Looks up a header by name, case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Returns all query parameters.
    #[must_use]
    pub fn query_parameters(&self) -> &HashMap<String, String> {
        &self.query
    }

    /// Looks up a single query parameter.
    #[must_use]
    pub fn query_parameter(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Returns the raw body text, or an empty string when absent.
    #[must_use]
    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }

    /// Returns `true` when the request carries a non-blank body.
    #[must_use]
    pub fn has_body(&self) -> bool {
        self.body
            .as_deref()
            .is_some_and(|body| !body.trim().is_empty())
    }

    /// Returns the `content-type` header value, if present.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Returns `true` when the content type declares a JSON payload.
    #[must_use]
    pub fn is_json_content(&self) -> bool {
        self.content_type()
            .is_some_and(|value| value.to_lowercase().contains("application/json"))
    }
}
