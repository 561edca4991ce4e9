//! Component descriptors placed into resolution scopes.
//!
//! A [`ComponentDescriptor`] pairs a concrete type with a provider closure,
//! a lifecycle scope, and a visibility rule. Ownership and sharing are a
//! single enum — a component is slice-owned or shared, never both.

use std::any::{Any, TypeId};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Erased provider producing a fresh component instance.
pub(crate) type ComponentProvider = Arc<dyn Fn() -> Arc<dyn Any + Send + Sync> + Send + Sync>;

/// Lifecycle of a component within its resolution scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentScope {
    /// One instance per owning scope, created on first resolution and
    /// reused for the life of the process. Instances are shared across
    /// concurrent requests and must be stateless or internally thread-safe.
    Singleton,
    /// A fresh instance on every resolution call.
    Prototype,
}

impl ComponentScope {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Singleton => "singleton",
            Self::Prototype => "prototype",
        }
    }
}

/// Who may resolve a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentVisibility {
    /// Private to exactly one feature unit; never visible outside its
    /// owner's resolution scope.
    OwnedBy(String),
    /// Placed in the shared scope. An empty set means visible to every
    /// slice; a non-empty set restricts visibility to the named slices.
    SharedWith(BTreeSet<String>),
}

impl ComponentVisibility {
    /// Returns `true` when the given requesting slice may see the component.
    ///
    /// `None` models a lookup made directly against the shared scope, which
    /// only unrestricted shared components satisfy.
    #[must_use]
    pub fn allows(&self, slice: Option<&str>) -> bool {
        match self {
            Self::OwnedBy(owner) => slice == Some(owner.as_str()),
            Self::SharedWith(names) => {
                names.is_empty() || slice.is_some_and(|name| names.contains(name))
            }
        }
    }
}

/// Declares a dependency that can be placed into a resolution scope.
///
/// # Example
///
/// ```
/// use slicekit::{ComponentDescriptor, ComponentScope};
///
/// struct OrderStore;
///
/// let owned = ComponentDescriptor::owned_by("create-order", ComponentScope::Singleton, || OrderStore);
/// assert_eq!(owned.type_name(), std::any::type_name::<OrderStore>());
/// ```
#[derive(Clone)]
pub struct ComponentDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    scope: ComponentScope,
    visibility: ComponentVisibility,
    provider: ComponentProvider,
}

impl ComponentDescriptor {
    fn new<T, F>(scope: ComponentScope, visibility: ComponentVisibility, provider: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            scope,
            visibility,
            provider: Arc::new(move || Arc::new(provider()) as Arc<dyn Any + Send + Sync>),
        }
    }

    /// Declares a component private to the named slice.
    #[must_use]
    pub fn owned_by<T, F>(slice: impl Into<String>, scope: ComponentScope, provider: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::new(scope, ComponentVisibility::OwnedBy(slice.into()), provider)
    }

    /// Declares a component shared with every slice.
    #[must_use]
    pub fn shared<T, F>(scope: ComponentScope, provider: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::new(
            scope,
            ComponentVisibility::SharedWith(BTreeSet::new()),
            provider,
        )
    }

    /// Declares a component shared with exactly the named slices.
    #[must_use]
    pub fn shared_with<T, F, I, S>(slices: I, scope: ComponentScope, provider: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = slices.into_iter().map(Into::into).collect();
        Self::new(scope, ComponentVisibility::SharedWith(names), provider)
    }

    /// Returns the `TypeId` the component resolves under.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the component's type name (for diagnostics).
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the lifecycle scope.
    #[must_use]
    pub fn scope(&self) -> ComponentScope {
        self.scope
    }

    /// Returns the visibility rule.
    #[must_use]
    pub fn visibility(&self) -> &ComponentVisibility {
        &self.visibility
    }

    pub(crate) fn provide(&self) -> Arc<dyn Any + Send + Sync> {
        (self.provider)()
    }
}

impl std::fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("type_name", &self.type_name)
            .field("scope", &self.scope)
            .field("visibility", &self.visibility)
            .finish_non_exhaustive()
    }
}
