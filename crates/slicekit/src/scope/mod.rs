//! Two-tier resolution scope graph for feature-unit dependencies.
//!
//! A single shared scope holds every component declared shared; one child
//! scope per feature unit holds that slice's private components and falls
//! through to the shared parent for the rest. Lookups never reach sideways
//! into another slice's scope, and the shared parent enforces declared
//! visibility sets, so shared singletons stay process-wide single instances
//! while restricted components remain invisible to slices outside the set.
//!
//! Slice scopes are created lazily on first access and cached for the life
//! of the process with compute-if-absent semantics: under concurrent first
//! access exactly one scope is created and published.

mod component;

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

pub use self::component::{ComponentDescriptor, ComponentScope, ComponentVisibility};
use self::component::ComponentVisibility as Visibility;

/// Tracing target for scope operations.
pub(crate) const SCOPE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::scope");

/// Errors raised while assembling the scope graph at startup.
#[derive(Debug, Error)]
pub enum ScopeError {
    /// Two providers were declared for the same type in the same scope.
    #[error("duplicate component {type_name} declared in the {scope} scope")]
    DuplicateComponent {
        /// The conflicting component type.
        type_name: &'static str,
        /// `"shared"` or the owning slice name.
        scope: String,
    },
}

/// Errors raised while resolving a component from a scope.
///
/// Either variant is fatal for the request being served; the dispatcher
/// wraps it with the feature unit's name and surfaces a 500-class outcome.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// No provider for the requested type is reachable from this scope.
    #[error("no component of type {type_name} is registered")]
    ComponentMissing {
        /// The requested type.
        type_name: &'static str,
    },

    /// A provider exists but its visibility set excludes the requester.
    #[error("component {type_name} is not shared with slice '{slice}'")]
    NotVisible {
        /// The requested type.
        type_name: &'static str,
        /// The slice that attempted the resolution.
        slice: String,
    },

    /// A provider produced a value of an unexpected concrete type.
    #[error("component {type_name} resolved to an unexpected concrete type")]
    TypeMismatch {
        /// The requested type.
        type_name: &'static str,
    },
}

/// A lazily populated container of resolved component instances.
///
/// Slice scopes carry their slice name and a parent reference to the shared
/// scope; the shared scope has neither.
pub struct ResolutionScope {
    slice: Option<String>,
    registrations: HashMap<TypeId, ComponentDescriptor>,
    singletons: Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
    parent: Option<Arc<ResolutionScope>>,
}

impl ResolutionScope {
    fn new(
        slice: Option<String>,
        registrations: HashMap<TypeId, ComponentDescriptor>,
        parent: Option<Arc<Self>>,
    ) -> Self {
        Self {
            slice,
            registrations,
            singletons: Mutex::new(HashMap::new()),
            parent,
        }
    }

    /// Returns the owning slice name, or `None` for the shared scope.
    #[must_use]
    pub fn slice(&self) -> Option<&str> {
        self.slice.as_deref()
    }

    /// Resolves a component of type `T` from this scope.
    ///
    /// Own registrations are consulted first, then the shared parent.
    /// Singleton components are cached in the scope that registered them;
    /// prototype components produce a fresh instance per call.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::ComponentMissing`] when no provider is
    /// reachable, or [`ResolutionError::NotVisible`] when a shared provider
    /// exists but its visibility set excludes this slice.
    pub fn resolve<T: Any + Send + Sync>(&self) -> Result<Arc<T>, ResolutionError> {
        let type_name = std::any::type_name::<T>();
        let erased = self.lookup(TypeId::of::<T>(), type_name, self.slice.as_deref())?;
        erased
            .downcast::<T>()
            .map_err(|_| ResolutionError::TypeMismatch { type_name })
    }

    fn lookup(
        &self,
        type_id: TypeId,
        type_name: &'static str,
        requester: Option<&str>,
    ) -> Result<Arc<dyn Any + Send + Sync>, ResolutionError> {
        if let Some(registration) = self.registrations.get(&type_id) {
            if !registration.visibility().allows(requester) {
                return Err(ResolutionError::NotVisible {
                    type_name,
                    slice: requester.unwrap_or("<shared>").to_owned(),
                });
            }
            return Ok(self.instantiate(type_id, registration));
        }

        match &self.parent {
            Some(parent) => parent.lookup(type_id, type_name, requester),
            None => Err(ResolutionError::ComponentMissing { type_name }),
        }
    }

    fn instantiate(
        &self,
        type_id: TypeId,
        registration: &ComponentDescriptor,
    ) -> Arc<dyn Any + Send + Sync> {
        match registration.scope() {
            ComponentScope::Prototype => registration.provide(),
            ComponentScope::Singleton => {
                let mut cache = self
                    .singletons
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                cache
                    .entry(type_id)
                    .or_insert_with(|| registration.provide())
                    .clone()
            }
        }
    }
}

impl std::fmt::Debug for ResolutionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionScope")
            .field("slice", &self.slice)
            .field("registrations", &self.registrations.len())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

/// Owns the shared scope and the lazily created per-slice child scopes.
pub struct ScopeGraph {
    shared: Arc<ResolutionScope>,
    owned: HashMap<String, Vec<ComponentDescriptor>>,
    slice_scopes: Mutex<HashMap<String, Arc<ResolutionScope>>>,
}

impl ScopeGraph {
    /// Builds the graph from the full component declaration set.
    ///
    /// The shared scope is assembled eagerly; slice scopes are deferred to
    /// first access.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::DuplicateComponent`] when two providers are
    /// declared for the same type in the same scope.
    pub fn new(components: Vec<ComponentDescriptor>) -> Result<Self, ScopeError> {
        let mut shared_registrations: HashMap<TypeId, ComponentDescriptor> = HashMap::new();
        let mut owned: HashMap<String, Vec<ComponentDescriptor>> = HashMap::new();

        for component in components {
            match component.visibility() {
                Visibility::SharedWith(_) => {
                    if shared_registrations.contains_key(&component.type_id()) {
                        return Err(ScopeError::DuplicateComponent {
                            type_name: component.type_name(),
                            scope: "shared".to_owned(),
                        });
                    }
                    shared_registrations.insert(component.type_id(), component);
                }
                Visibility::OwnedBy(owner) => {
                    let slice_components = owned.entry(owner.clone()).or_default();
                    if slice_components
                        .iter()
                        .any(|existing| existing.type_id() == component.type_id())
                    {
                        return Err(ScopeError::DuplicateComponent {
                            type_name: component.type_name(),
                            scope: owner.clone(),
                        });
                    }
                    slice_components.push(component);
                }
            }
        }

        tracing::debug!(
            target: SCOPE_TARGET,
            shared = shared_registrations.len(),
            owned_slices = owned.len(),
            "scope graph assembled"
        );

        Ok(Self {
            shared: Arc::new(ResolutionScope::new(None, shared_registrations, None)),
            owned,
            slice_scopes: Mutex::new(HashMap::new()),
        })
    }

    /// Returns the shared scope.
    #[must_use]
    pub fn shared_scope(&self) -> &Arc<ResolutionScope> {
        &self.shared
    }

    /// Returns the resolution scope for the named slice, creating and
    /// caching it on first access.
    ///
    /// Creation happens at most once per slice: the cache lock is held
    /// while the scope is built, so concurrent first accesses observe the
    /// same published scope.
    #[must_use]
    pub fn slice_scope(&self, slice: &str) -> Arc<ResolutionScope> {
        let mut scopes = self
            .slice_scopes
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        scopes
            .entry(slice.to_owned())
            .or_insert_with(|| {
                tracing::debug!(target: SCOPE_TARGET, %slice, "creating slice scope");
                Arc::new(self.build_slice_scope(slice))
            })
            .clone()
    }

    fn build_slice_scope(&self, slice: &str) -> ResolutionScope {
        let registrations = self
            .owned
            .get(slice)
            .map(|components| {
                components
                    .iter()
                    .map(|component| (component.type_id(), component.clone()))
                    .collect()
            })
            .unwrap_or_default();

        ResolutionScope::new(
            Some(slice.to_owned()),
            registrations,
            Some(Arc::clone(&self.shared)),
        )
    }
}

impl std::fmt::Debug for ScopeGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeGraph")
            .field("shared", &self.shared)
            .field("owned_slices", &self.owned.len())
            .finish_non_exhaustive()
    }
}
