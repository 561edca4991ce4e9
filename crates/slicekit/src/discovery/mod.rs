//! Discovery: validates declared slice candidates into registrable
//! descriptors.
//!
//! Discovery is fail-fast. Any malformed declaration or route conflict
//! aborts the whole run with an error naming the offending unit types; no
//! partially validated set is ever returned.

use std::collections::HashMap;

use thiserror::Error;

use crate::descriptor::{SliceDeclaration, SliceDescriptor};

/// Tracing target for discovery operations.
const DISCOVERY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::discovery");

/// Version assigned to declarations that do not specify one.
const DEFAULT_VERSION: &str = "1.0";

/// Failures raised while validating declared slices.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A declaration is malformed.
    #[error("invalid slice configuration for {unit_type}: {reason}")]
    SliceConfiguration {
        /// The offending unit's type name.
        unit_type: &'static str,
        /// What is wrong with the declaration.
        reason: String,
    },

    /// Two slices declare the same method and route.
    #[error("duplicate route {route_key}: declared by both {first} and {second}")]
    RouteConflict {
        /// The conflicting route key.
        route_key: String,
        /// The unit already holding the route.
        first: &'static str,
        /// The unit attempting to reuse it.
        second: &'static str,
    },
}

impl DiscoveryError {
    fn configuration(unit_type: &'static str, reason: impl Into<String>) -> Self {
        Self::SliceConfiguration {
            unit_type,
            reason: reason.into(),
        }
    }
}

/// Validates slice declarations within a set of module scopes.
#[derive(Debug, Clone)]
pub struct SliceDiscovery {
    scopes: Vec<String>,
}

impl SliceDiscovery {
    /// Creates a discovery pass over the given module scopes.
    #[must_use]
    pub fn new(scopes: Vec<String>) -> Self {
        Self { scopes }
    }

    /// Validates every in-scope candidate, returning descriptors keyed by
    /// route key.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::SliceConfiguration`] for a malformed
    /// declaration or [`DiscoveryError::RouteConflict`] when two slices
    /// claim the same route; either aborts the entire run.
    pub fn discover(
        &self,
        candidates: &[SliceDeclaration],
    ) -> Result<HashMap<String, SliceDescriptor>, DiscoveryError> {
        tracing::info!(
            target: DISCOVERY_TARGET,
            candidates = candidates.len(),
            scopes = ?self.scopes,
            "starting slice discovery"
        );

        let mut discovered: HashMap<String, SliceDescriptor> = HashMap::new();
        for candidate in candidates {
            if !self.in_scope(candidate.module()) {
                tracing::debug!(
                    target: DISCOVERY_TARGET,
                    slice = candidate.name(),
                    module = candidate.module(),
                    "skipping out-of-scope candidate"
                );
                continue;
            }

            let descriptor = validate(candidate)?;
            let route_key = descriptor.route_key();
            if let Some(existing) = discovered.get(&route_key) {
                return Err(DiscoveryError::RouteConflict {
                    route_key,
                    first: existing.unit_type(),
                    second: descriptor.unit_type(),
                });
            }

            tracing::debug!(
                target: DISCOVERY_TARGET,
                slice = descriptor.name(),
                route_key = %route_key,
                "validated slice"
            );
            discovered.insert(route_key, descriptor);
        }

        tracing::info!(
            target: DISCOVERY_TARGET,
            discovered = discovered.len(),
            "slice discovery finished"
        );
        Ok(discovered)
    }

    /// A module is in scope when it equals a configured scope or sits
    /// beneath one (`scope::nested`).
    fn in_scope(&self, module: &str) -> bool {
        self.scopes.iter().any(|scope| {
            module == scope
                || module
                    .strip_prefix(scope.as_str())
                    .is_some_and(|rest| rest.starts_with("::"))
        })
    }
}

fn validate(candidate: &SliceDeclaration) -> Result<SliceDescriptor, DiscoveryError> {
    let unit_type = candidate.unit_type();

    let name = candidate.name().trim();
    if name.is_empty() {
        return Err(DiscoveryError::configuration(
            unit_type,
            "slice name must not be blank",
        ));
    }

    let route = candidate.route().trim();
    if route.is_empty() {
        return Err(DiscoveryError::configuration(
            unit_type,
            "slice route must not be blank",
        ));
    }
    if !route.starts_with('/') {
        return Err(DiscoveryError::configuration(
            unit_type,
            format!("slice route must start with '/', got {route:?}"),
        ));
    }

    let operations = candidate.operations();
    if operations.len() != 1 {
        return Err(DiscoveryError::configuration(
            unit_type,
            format!(
                "slice must declare exactly one handler operation, found {}",
                operations.len()
            ),
        ));
    }

    let version = candidate.version().unwrap_or(DEFAULT_VERSION).to_owned();
    Ok(SliceDescriptor::new(
        name.to_owned(),
        candidate.method(),
        route.to_owned(),
        candidate.description().map(ToOwned::to_owned),
        version,
        candidate.constructor().clone(),
        operations[0].clone(),
    ))
}

#[cfg(test)]
mod tests;
