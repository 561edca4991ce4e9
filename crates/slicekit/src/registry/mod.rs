//! Route registry: the indexed catalogue of validated slices.
//!
//! The registry is populated once at startup through `&mut self` and is then
//! shared behind `Arc` for lock-free concurrent reads. Lookups normalise
//! their inputs (upper-cased method, trimmed route) so transport quirks
//! never cause silent misses; blank inputs are reported as caller errors.

use std::collections::HashMap;

use thiserror::Error;

use crate::descriptor::{SliceDescriptor, format_route_key};

/// Tracing target for registry operations.
const REGISTRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::registry");

/// A lookup was attempted with unusable input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    /// A required lookup argument was blank.
    #[error("{argument} must not be blank")]
    BlankArgument {
        /// The offending argument name.
        argument: &'static str,
    },
}

impl LookupError {
    fn blank(argument: &'static str) -> Self {
        Self::BlankArgument { argument }
    }
}

/// Indexes validated slices by route key and by name.
#[derive(Debug, Default)]
pub struct SliceRegistry {
    by_route: HashMap<String, SliceDescriptor>,
    by_name: HashMap<String, SliceDescriptor>,
}

impl SliceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every discovered slice. Call once at startup, before the
    /// registry is shared.
    pub fn register_all(&mut self, discovered: HashMap<String, SliceDescriptor>) {
        for (route_key, descriptor) in discovered {
            tracing::debug!(
                target: REGISTRY_TARGET,
                slice = descriptor.name(),
                route_key = %route_key,
                "registering slice"
            );
            self.by_name
                .insert(descriptor.name().to_owned(), descriptor.clone());
            self.by_route.insert(route_key, descriptor);
        }
        tracing::info!(
            target: REGISTRY_TARGET,
            total = self.by_route.len(),
            "slice registry populated"
        );
    }

    /// Finds the slice mounted on a method and route.
    ///
    /// The method is upper-cased and the route trimmed before matching, so a
    /// lower-case method from the transport still hits.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::BlankArgument`] when either input is blank.
    pub fn find_by_route(
        &self,
        method: &str,
        route: &str,
    ) -> Result<Option<&SliceDescriptor>, LookupError> {
        let method = method.trim();
        if method.is_empty() {
            return Err(LookupError::blank("method"));
        }
        let route = route.trim();
        if route.is_empty() {
            return Err(LookupError::blank("route"));
        }

        let key = format_route_key(&method.to_ascii_uppercase(), route);
        Ok(self.by_route.get(&key))
    }

    /// Finds a slice by its registered name.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::BlankArgument`] when the name is blank.
    pub fn find_by_name(&self, name: &str) -> Result<Option<&SliceDescriptor>, LookupError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LookupError::blank("name"));
        }
        Ok(self.by_name.get(name))
    }

    /// All registered descriptors, in no particular order.
    pub fn all_descriptors(&self) -> impl Iterator<Item = &SliceDescriptor> {
        self.by_route.values()
    }

    /// All registered route keys, sorted for deterministic output.
    #[must_use]
    pub fn all_route_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.by_route.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of registered slices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_route.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_route.is_empty()
    }

    /// Removes every registration. Retained for test-harness reset; never
    /// called on a shared registry.
    pub fn clear(&mut self) {
        self.by_route.clear();
        self.by_name.clear();
    }
}
