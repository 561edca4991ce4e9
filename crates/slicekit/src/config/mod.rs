//! Startup configuration: assembles a dispatch-ready [`SliceKit`].
//!
//! The builder collects module scopes, declared slices, and component
//! descriptors, validates the configuration, then runs discovery and builds
//! the registry and scope graph. Any failure aborts the boot; a `SliceKit`
//! is only ever returned fully populated.

use std::sync::Arc;

use thiserror::Error;

use crate::codec::JsonCodec;
use crate::descriptor::SliceDeclaration;
use crate::discovery::{DiscoveryError, SliceDiscovery};
use crate::dispatch::Dispatcher;
use crate::registry::SliceRegistry;
use crate::scope::{ComponentDescriptor, ScopeError, ScopeGraph};

/// Tracing target for boot operations.
const BOOT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::boot");

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 8080;

/// Failures raised while booting a [`SliceKit`].
#[derive(Debug, Error)]
pub enum BootError {
    /// The builder configuration is unusable.
    #[error("invalid configuration: {reason}")]
    Configuration {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// Slice discovery failed.
    #[error("slice discovery failed")]
    Discovery(#[from] DiscoveryError),

    /// The component scope graph could not be built.
    #[error("scope graph construction failed")]
    Scope(#[from] ScopeError),
}

impl BootError {
    fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }
}

/// A fully booted framework instance.
#[derive(Debug)]
pub struct SliceKit {
    dispatcher: Dispatcher,
    registry: Arc<SliceRegistry>,
    host: String,
    port: u16,
}

impl SliceKit {
    /// Starts a fresh builder.
    #[must_use]
    pub fn builder() -> SliceKitBuilder {
        SliceKitBuilder::default()
    }

    /// The dispatcher, ready for the transport collaborator.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The populated route registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<SliceRegistry> {
        &self.registry
    }

    /// The configured bind host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The configured bind port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }
}

/// Collects configuration for a [`SliceKit`] boot.
#[derive(Debug, Default)]
pub struct SliceKitBuilder {
    scopes: Vec<String>,
    host: Option<String>,
    port: Option<u16>,
    slices: Vec<SliceDeclaration>,
    components: Vec<ComponentDescriptor>,
}

impl SliceKitBuilder {
    /// Adds a module scope to scan for slice declarations.
    #[must_use]
    pub fn scan_scope(mut self, scope: impl Into<String>) -> Self {
        self.scopes.push(scope.into());
        self
    }

    /// Overrides the bind host (default `localhost`).
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Overrides the bind port (default 8080).
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Declares a slice candidate.
    #[must_use]
    pub fn declare_slice(mut self, declaration: SliceDeclaration) -> Self {
        self.slices.push(declaration);
        self
    }

    /// Declares an injectable component.
    #[must_use]
    pub fn declare_component(mut self, component: ComponentDescriptor) -> Self {
        self.components.push(component);
        self
    }

    /// Validates the configuration, runs discovery, and assembles the
    /// registry, scope graph, and dispatcher.
    ///
    /// # Errors
    ///
    /// Returns [`BootError::Configuration`] for an unusable builder state,
    /// [`BootError::Discovery`] when a declared slice is rejected, or
    /// [`BootError::Scope`] when component registration conflicts.
    pub fn build(self) -> Result<SliceKit, BootError> {
        let scopes = self.validated_scopes()?;
        let host = self.validated_host()?;
        let port = self.validated_port()?;

        let discovered = SliceDiscovery::new(scopes).discover(&self.slices)?;
        if discovered.is_empty() {
            tracing::warn!(
                target: BOOT_TARGET,
                "no slices discovered; every request will miss"
            );
        }

        let mut registry = SliceRegistry::new();
        registry.register_all(discovered);
        let registry = Arc::new(registry);

        let scope_graph = Arc::new(ScopeGraph::new(self.components)?);
        let dispatcher = Dispatcher::new(Arc::clone(&registry), scope_graph, JsonCodec::new());

        tracing::info!(
            target: BOOT_TARGET,
            slices = registry.len(),
            host = %host,
            port,
            "slicekit boot complete"
        );
        Ok(SliceKit {
            dispatcher,
            registry,
            host,
            port,
        })
    }

    fn validated_scopes(&self) -> Result<Vec<String>, BootError> {
        if self.scopes.is_empty() {
            return Err(BootError::configuration(
                "at least one module scope must be configured",
            ));
        }
        if self.scopes.iter().any(|scope| scope.trim().is_empty()) {
            return Err(BootError::configuration("module scopes must not be blank"));
        }
        Ok(self
            .scopes
            .iter()
            .map(|scope| scope.trim().to_owned())
            .collect())
    }

    fn validated_host(&self) -> Result<String, BootError> {
        match &self.host {
            None => Ok(DEFAULT_HOST.to_owned()),
            Some(host) if host.trim().is_empty() => {
                Err(BootError::configuration("host must not be blank"))
            }
            Some(host) => Ok(host.trim().to_owned()),
        }
    }

    fn validated_port(&self) -> Result<u16, BootError> {
        match self.port {
            None => Ok(DEFAULT_PORT),
            Some(0) => Err(BootError::configuration("port must be between 1 and 65535")),
            Some(port) => Ok(port),
        }
    }
}
