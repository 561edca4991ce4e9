//! Type-erased handler and constructor bindings for feature units.
//!
//! Declarations are written against concrete types; this module erases them
//! into step functions the dispatch pipeline can drive without any runtime
//! type inspection. A [`HandlerOperation`] captures how to bind the single
//! optional argument, how to check it against declared constraints, and how
//! to invoke the handler; a [`UnitConstructor`] captures how to build the
//! unit instance from its resolution scope.

use std::any::Any;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::codec::{CodecError, JsonCodec};
use crate::request::SliceRequest;
use crate::scope::{ResolutionError, ResolutionScope};
use crate::validation::{Validate, Violation};

/// Tracing target for handler binding operations.
pub(crate) const HANDLER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::handler");

/// Result type returned by handler closures.
///
/// `Ok(None)` maps to a No Content response; any error is surfaced as an
/// internal server error with the original cause retained.
pub type HandlerResult<R> = Result<Option<R>, Box<dyn std::error::Error + Send + Sync>>;

/// Failures raised by the erased binding and invocation steps.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The request body could not be deserialized into the parameter type.
    #[error("failed to bind request body: {0}")]
    BindBody(#[source] CodecError),

    /// The handler itself returned an error.
    #[error("handler for {unit_type} failed: {source}")]
    Execution {
        /// The feature unit's type name.
        unit_type: &'static str,
        /// The original cause, retained for diagnostics.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The handler result could not be converted to JSON.
    #[error("failed to serialise result from {unit_type}: {source}")]
    SerializeResult {
        /// The feature unit's type name.
        unit_type: &'static str,
        /// Underlying conversion failure.
        #[source]
        source: serde_json::Error,
    },

    /// The supplied unit instance was not of the declared type.
    #[error("expected a unit of type {expected}")]
    UnitTypeMismatch {
        /// The declared unit type.
        expected: &'static str,
    },

    /// The bound argument did not match the declared parameter shape.
    #[error("bound argument does not match the declared handler parameter")]
    ArgumentMismatch,
}

/// Shape of a handler operation's single optional parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerParameter {
    /// The operation takes no arguments.
    None,
    /// The operation receives the [`SliceRequest`] wrapper unchanged.
    RawRequest,
    /// The operation receives a value deserialized from a JSON body.
    Body {
        /// The parameter's type name (for diagnostics).
        type_name: &'static str,
        /// Whether the bound value is checked against declared constraints.
        validated: bool,
    },
}

/// An argument produced by the bind step, ready for invocation.
pub enum BoundArgument {
    /// Zero-parameter handler: nothing to pass.
    Empty,
    /// The raw request wrapper.
    Request(SliceRequest),
    /// A deserialized body value.
    Value(Box<dyn Any + Send>),
    /// A body-typed parameter with no usable body; the handler receives an
    /// absent value rather than a rejection.
    Absent,
}

impl std::fmt::Debug for BoundArgument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Request(request) => f.debug_tuple("Request").field(request).finish(),
            Self::Value(_) => f.write_str("Value(..)"),
            Self::Absent => f.write_str("Absent"),
        }
    }
}

/// A type-erased feature unit instance.
pub struct UnitInstance {
    type_name: &'static str,
    inner: Box<dyn Any + Send>,
}

impl UnitInstance {
    /// Wraps a concrete unit.
    #[must_use]
    pub fn new<U: Any + Send>(unit: U) -> Self {
        Self {
            type_name: std::any::type_name::<U>(),
            inner: Box::new(unit),
        }
    }

    /// Returns the concrete type name of the wrapped unit.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn downcast_ref<U: Any>(&self) -> Option<&U> {
        self.inner.downcast_ref()
    }
}

impl std::fmt::Debug for UnitInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitInstance")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

type ConstructFn = dyn Fn(&ResolutionScope) -> Result<UnitInstance, ResolutionError> + Send + Sync;

/// Builds a feature unit instance from its resolution scope.
///
/// # Example
///
/// ```
/// use slicekit::UnitConstructor;
///
/// struct HelloWorld;
///
/// let constructor = UnitConstructor::zero_arg(|| HelloWorld);
/// assert!(constructor.type_name().contains("HelloWorld"));
/// ```
#[derive(Clone)]
pub struct UnitConstructor {
    type_name: &'static str,
    construct: Arc<ConstructFn>,
}

impl UnitConstructor {
    /// Declares a unit with no constructor parameters; an instance is
    /// created directly without consulting the scope.
    #[must_use]
    pub fn zero_arg<U, F>(make: F) -> Self
    where
        U: Any + Send,
        F: Fn() -> U + Send + Sync + 'static,
    {
        Self {
            type_name: std::any::type_name::<U>(),
            construct: Arc::new(move |_scope| Ok(UnitInstance::new(make()))),
        }
    }

    /// Declares a unit whose constructor resolves components from the
    /// slice's scope. Each `scope.resolve::<T>()?` inside the closure is one
    /// declared constructor parameter; an unsatisfiable parameter fails the
    /// construction with a [`ResolutionError`].
    #[must_use]
    pub fn resolving<U, F>(build: F) -> Self
    where
        U: Any + Send,
        F: Fn(&ResolutionScope) -> Result<U, ResolutionError> + Send + Sync + 'static,
    {
        Self {
            type_name: std::any::type_name::<U>(),
            construct: Arc::new(move |scope| Ok(UnitInstance::new(build(scope)?))),
        }
    }

    /// Returns the declared unit type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Builds an instance against the given scope.
    ///
    /// # Errors
    ///
    /// Propagates any [`ResolutionError`] from unresolved constructor
    /// parameters.
    pub fn construct(&self, scope: &ResolutionScope) -> Result<UnitInstance, ResolutionError> {
        (self.construct)(scope)
    }
}

impl std::fmt::Debug for UnitConstructor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitConstructor")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

type BindFn = dyn Fn(&SliceRequest, &JsonCodec) -> Result<BoundArgument, HandlerError> + Send + Sync;
type CheckFn = dyn Fn(&BoundArgument) -> Vec<Violation> + Send + Sync;
type InvokeFn =
    dyn Fn(&UnitInstance, BoundArgument) -> Result<Option<serde_json::Value>, HandlerError>
        + Send
        + Sync;

/// The single entry operation of a feature unit, with erased pipeline steps.
#[derive(Clone)]
pub struct HandlerOperation {
    parameter: HandlerParameter,
    bind: Arc<BindFn>,
    check: Arc<CheckFn>,
    invoke: Arc<InvokeFn>,
}

impl HandlerOperation {
    /// Declares a zero-parameter handler.
    #[must_use]
    pub fn nullary<U, R, F>(handler: F) -> Self
    where
        U: Any + Send,
        R: Serialize,
        F: Fn(&U) -> HandlerResult<R> + Send + Sync + 'static,
    {
        Self {
            parameter: HandlerParameter::None,
            bind: Arc::new(|_request, _codec| Ok(BoundArgument::Empty)),
            check: Arc::new(|_argument| Vec::new()),
            invoke: Arc::new(move |unit, argument| {
                let concrete = downcast_unit::<U>(unit)?;
                match argument {
                    BoundArgument::Empty => finish(unit.type_name(), handler(concrete)),
                    _ => Err(HandlerError::ArgumentMismatch),
                }
            }),
        }
    }

    /// Declares a handler that receives the raw request wrapper unchanged.
    #[must_use]
    pub fn raw_request<U, R, F>(handler: F) -> Self
    where
        U: Any + Send,
        R: Serialize,
        F: Fn(&U, &SliceRequest) -> HandlerResult<R> + Send + Sync + 'static,
    {
        Self {
            parameter: HandlerParameter::RawRequest,
            bind: Arc::new(|request, _codec| Ok(BoundArgument::Request(request.clone()))),
            check: Arc::new(|_argument| Vec::new()),
            invoke: Arc::new(move |unit, argument| {
                let concrete = downcast_unit::<U>(unit)?;
                match argument {
                    BoundArgument::Request(request) => {
                        finish(unit.type_name(), handler(concrete, &request))
                    }
                    _ => Err(HandlerError::ArgumentMismatch),
                }
            }),
        }
    }

    /// Declares a handler whose parameter is deserialized from a JSON body.
    ///
    /// When the request carries no JSON body the handler receives `None`.
    #[must_use]
    pub fn json_body<U, T, R, F>(handler: F) -> Self
    where
        U: Any + Send,
        T: DeserializeOwned + Any + Send,
        R: Serialize,
        F: Fn(&U, Option<T>) -> HandlerResult<R> + Send + Sync + 'static,
    {
        Self {
            parameter: HandlerParameter::Body {
                type_name: std::any::type_name::<T>(),
                validated: false,
            },
            bind: Arc::new(bind_body::<T>),
            check: Arc::new(|_argument| Vec::new()),
            invoke: Arc::new(move |unit, argument| invoke_body(unit, argument, &handler)),
        }
    }

    /// Like [`HandlerOperation::json_body`], with the bound value checked
    /// against its declared constraints before invocation.
    #[must_use]
    pub fn validated_json_body<U, T, R, F>(handler: F) -> Self
    where
        U: Any + Send,
        T: DeserializeOwned + Validate + Any + Send,
        R: Serialize,
        F: Fn(&U, Option<T>) -> HandlerResult<R> + Send + Sync + 'static,
    {
        Self {
            parameter: HandlerParameter::Body {
                type_name: std::any::type_name::<T>(),
                validated: true,
            },
            bind: Arc::new(bind_body::<T>),
            check: Arc::new(|argument| match argument {
                BoundArgument::Value(value) => value
                    .downcast_ref::<T>()
                    .map(Validate::validate)
                    .unwrap_or_default(),
                // Absent values are not validated.
                _ => Vec::new(),
            }),
            invoke: Arc::new(move |unit, argument| invoke_body(unit, argument, &handler)),
        }
    }

    /// Returns the declared parameter shape.
    #[must_use]
    pub fn parameter(&self) -> HandlerParameter {
        self.parameter
    }

    /// Binds the handler argument from the request.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::BindBody`] when a JSON body cannot be
    /// deserialized into the parameter type.
    pub fn bind(
        &self,
        request: &SliceRequest,
        codec: &JsonCodec,
    ) -> Result<BoundArgument, HandlerError> {
        (self.bind)(request, codec)
    }

    /// Checks the bound argument against declared constraints, returning
    /// every violation found.
    #[must_use]
    pub fn check(&self, argument: &BoundArgument) -> Vec<Violation> {
        (self.check)(argument)
    }

    /// Invokes the handler with the bound argument.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Execution`] when the handler fails, or
    /// [`HandlerError::SerializeResult`] when its result cannot be
    /// converted to JSON.
    pub fn invoke(
        &self,
        unit: &UnitInstance,
        argument: BoundArgument,
    ) -> Result<Option<serde_json::Value>, HandlerError> {
        (self.invoke)(unit, argument)
    }
}

impl std::fmt::Debug for HandlerOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerOperation")
            .field("parameter", &self.parameter)
            .finish_non_exhaustive()
    }
}

fn downcast_unit<U: Any>(unit: &UnitInstance) -> Result<&U, HandlerError> {
    unit.downcast_ref::<U>()
        .ok_or(HandlerError::UnitTypeMismatch {
            expected: std::any::type_name::<U>(),
        })
}

fn bind_body<T: DeserializeOwned + Any + Send>(
    request: &SliceRequest,
    codec: &JsonCodec,
) -> Result<BoundArgument, HandlerError> {
    if request.has_body() && request.is_json_content() {
        let value: T = codec
            .deserialize(request.body())
            .map_err(HandlerError::BindBody)?;
        Ok(BoundArgument::Value(Box::new(value)))
    } else {
        tracing::warn!(
            target: HANDLER_TARGET,
            parameter = std::any::type_name::<T>(),
            "handler expects a body parameter but the request has no JSON body; binding an absent value"
        );
        Ok(BoundArgument::Absent)
    }
}

fn invoke_body<U, T, R, F>(
    unit: &UnitInstance,
    argument: BoundArgument,
    handler: &F,
) -> Result<Option<serde_json::Value>, HandlerError>
where
    U: Any + Send,
    T: Any + Send,
    R: Serialize,
    F: Fn(&U, Option<T>) -> HandlerResult<R>,
{
    let concrete = downcast_unit::<U>(unit)?;
    match argument {
        BoundArgument::Value(value) => match value.downcast::<T>() {
            Ok(body) => finish(unit.type_name(), handler(concrete, Some(*body))),
            Err(_) => Err(HandlerError::ArgumentMismatch),
        },
        BoundArgument::Absent => finish(unit.type_name(), handler(concrete, None)),
        _ => Err(HandlerError::ArgumentMismatch),
    }
}

fn finish<R: Serialize>(
    unit_type: &'static str,
    result: HandlerResult<R>,
) -> Result<Option<serde_json::Value>, HandlerError> {
    match result {
        Ok(Some(value)) => serde_json::to_value(&value)
            .map(Some)
            .map_err(|source| HandlerError::SerializeResult { unit_type, source }),
        Ok(None) => Ok(None),
        Err(source) => Err(HandlerError::Execution { unit_type, source }),
    }
}

#[cfg(test)]
mod tests;
