//! Slice descriptors: declared candidates and their validated form.
//!
//! A [`SliceDeclaration`] is what an application hands to discovery: a named
//! feature unit with its route, constructor, and handler operations, tagged
//! with the module it lives in. Discovery validates declarations into
//! [`SliceDescriptor`]s, which the registry indexes by route key.

use thiserror::Error;

use crate::handler::{HandlerOperation, UnitConstructor};

/// HTTP methods a slice handler can be mounted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

/// A method string that does not name a supported HTTP method.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown HTTP method: {0}")]
pub struct UnknownMethod(String);

impl HttpMethod {
    /// Returns the canonical upper-case method token.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = UnknownMethod;

    /// Parses a method token case-insensitively, ignoring surrounding
    /// whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "PATCH" => Ok(Self::Patch),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            _ => Err(UnknownMethod(s.to_owned())),
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared slice candidate, not yet validated.
#[derive(Debug, Clone)]
pub struct SliceDeclaration {
    name: String,
    module: String,
    method: HttpMethod,
    route: String,
    description: Option<String>,
    version: Option<String>,
    constructor: UnitConstructor,
    operations: Vec<HandlerOperation>,
}

impl SliceDeclaration {
    /// Declares a slice candidate. Add exactly one handler operation with
    /// [`SliceDeclaration::with_operation`] before handing it to discovery.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        module: impl Into<String>,
        method: HttpMethod,
        route: impl Into<String>,
        constructor: UnitConstructor,
    ) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            method,
            route: route.into(),
            description: None,
            version: None,
            constructor,
            operations: Vec::new(),
        }
    }

    /// Attaches a handler operation.
    #[must_use]
    pub fn with_operation(mut self, operation: HandlerOperation) -> Self {
        self.operations.push(operation);
        self
    }

    /// Attaches a human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Overrides the default version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// The declared slice name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The module the slice lives in, used for scope filtering.
    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    /// The declared HTTP method.
    #[must_use]
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// The declared route.
    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }

    /// The declared feature unit's type name.
    #[must_use]
    pub fn unit_type(&self) -> &'static str {
        self.constructor.type_name()
    }

    pub(crate) fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub(crate) fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub(crate) fn constructor(&self) -> &UnitConstructor {
        &self.constructor
    }

    pub(crate) fn operations(&self) -> &[HandlerOperation] {
        &self.operations
    }
}

/// A validated slice, ready for registration and dispatch.
#[derive(Debug, Clone)]
pub struct SliceDescriptor {
    name: String,
    method: HttpMethod,
    route: String,
    description: Option<String>,
    version: String,
    unit_type: &'static str,
    constructor: UnitConstructor,
    operation: HandlerOperation,
}

impl SliceDescriptor {
    pub(crate) fn new(
        name: String,
        method: HttpMethod,
        route: String,
        description: Option<String>,
        version: String,
        constructor: UnitConstructor,
        operation: HandlerOperation,
    ) -> Self {
        let unit_type = constructor.type_name();
        Self {
            name,
            method,
            route,
            description,
            version,
            unit_type,
            constructor,
            operation,
        }
    }

    /// The validated, trimmed slice name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The HTTP method the slice is mounted on.
    #[must_use]
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// The validated route, always starting with `/`.
    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Optional human-readable description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The slice version (defaults to `"1.0"`).
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The feature unit's type name.
    #[must_use]
    pub fn unit_type(&self) -> &'static str {
        self.unit_type
    }

    /// The unit constructor.
    #[must_use]
    pub fn constructor(&self) -> &UnitConstructor {
        &self.constructor
    }

    /// The slice's single handler operation.
    #[must_use]
    pub fn operation(&self) -> &HandlerOperation {
        &self.operation
    }

    /// The registry key, `"METHOD /route"`.
    #[must_use]
    pub fn route_key(&self) -> String {
        format_route_key(self.method.as_str(), &self.route)
    }
}

/// Formats a registry key from an already-normalised method and route.
pub(crate) fn format_route_key(method: &str, route: &str) -> String {
    format!("{method} {route}")
}

#[cfg(test)]
mod tests;
