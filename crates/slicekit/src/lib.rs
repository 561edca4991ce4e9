//! Vertical-slice web framework core: discovery, routing, scoped component
//! resolution, and request dispatch.
//!
//! `slicekit` organises an application as independent **slices**, each a
//! self-contained feature unit mounted on a single HTTP method and route
//! with exactly one handler operation. At boot, discovery validates the
//! declared slices fail-fast (malformed declarations and route conflicts
//! abort the whole run), the registry indexes them by route key, and a
//! two-tier scope graph wires each slice's components: a shared parent scope
//! for cross-slice singletons and a lazily built child scope per slice for
//! its own components.
//!
//! The dispatch pipeline then drives each request through match,
//! instantiate, bind, validate, invoke, and respond, converting every
//! failure into a JSON [`DispatchOutcome`] so the transport collaborator
//! never sees a panic or an unhandled error.
//!
//! # Example
//!
//! ```rust
//! use slicekit::{
//!     HandlerOperation, HttpMethod, SliceDeclaration, SliceKit, SliceRequest, UnitConstructor,
//! };
//!
//! struct HelloWorld;
//!
//! let hello = SliceDeclaration::new(
//!     "hello-world",
//!     "demo::greetings",
//!     HttpMethod::Get,
//!     "/hello",
//!     UnitConstructor::zero_arg(|| HelloWorld),
//! )
//! .with_operation(HandlerOperation::nullary(|_unit: &HelloWorld| {
//!     Ok(Some("Hello, World!".to_owned()))
//! }));
//!
//! let kit = SliceKit::builder()
//!     .scan_scope("demo")
//!     .declare_slice(hello)
//!     .build()
//!     .expect("boot succeeds");
//!
//! let outcome = kit.dispatcher().dispatch(&SliceRequest::new("GET", "/hello"));
//! assert_eq!(outcome.status(), 200);
//! ```

pub mod codec;
pub mod config;
pub mod descriptor;
pub mod discovery;
pub mod dispatch;
pub mod handler;
pub mod registry;
pub mod request;
pub mod scope;
pub mod validation;

pub use self::codec::{CodecError, JsonCodec};
pub use self::config::{BootError, SliceKit, SliceKitBuilder};
pub use self::descriptor::{HttpMethod, SliceDeclaration, SliceDescriptor};
pub use self::discovery::{DiscoveryError, SliceDiscovery};
pub use self::dispatch::{DispatchOutcome, Dispatcher};
pub use self::handler::{HandlerOperation, HandlerResult, UnitConstructor};
pub use self::registry::{LookupError, SliceRegistry};
pub use self::request::SliceRequest;
pub use self::scope::{
    ComponentDescriptor, ComponentScope, ResolutionError, ResolutionScope, ScopeError, ScopeGraph,
};
pub use self::validation::{Validate, ValidationError, Violation};
