//! Dispatch pipeline: routes a [`SliceRequest`] through its slice.
//!
//! The pipeline runs match, instantiate, bind, validate, invoke, and respond
//! in order, converting every failure into a [`DispatchOutcome`] at this
//! boundary. Nothing panics and no error escapes: the transport collaborator
//! always receives a status code and a JSON body.

use std::sync::Arc;

use crate::codec::JsonCodec;
use crate::descriptor::SliceDescriptor;
use crate::handler::BoundArgument;
use crate::registry::SliceRegistry;
use crate::request::SliceRequest;
use crate::scope::ScopeGraph;
use crate::validation::ValidationError;

mod outcome;

pub use self::outcome::{DispatchOutcome, JSON_CONTENT_TYPE};

/// Tracing target for dispatch operations.
const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Drives requests through the registered slices.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<SliceRegistry>,
    scopes: Arc<ScopeGraph>,
    codec: JsonCodec,
}

impl Dispatcher {
    /// Creates a dispatcher over a populated registry and scope graph. The
    /// codec is supplied explicitly; there is no process-wide default.
    #[must_use]
    pub fn new(registry: Arc<SliceRegistry>, scopes: Arc<ScopeGraph>, codec: JsonCodec) -> Self {
        Self {
            registry,
            scopes,
            codec,
        }
    }

    /// Dispatches one request, always producing an outcome.
    #[must_use]
    pub fn dispatch(&self, request: &SliceRequest) -> DispatchOutcome {
        let descriptor = match self.registry.find_by_route(request.method(), request.path()) {
            Ok(Some(descriptor)) => descriptor,
            Ok(None) => return self.miss(request),
            Err(error) => {
                tracing::error!(
                    target: DISPATCH_TARGET,
                    error = %error,
                    "request rejected before route matching"
                );
                return DispatchOutcome::internal_error(error.to_string());
            }
        };

        self.run(descriptor, request)
    }

    fn run(&self, descriptor: &SliceDescriptor, request: &SliceRequest) -> DispatchOutcome {
        let slice = descriptor.name();
        tracing::debug!(
            target: DISPATCH_TARGET,
            slice,
            route_key = %descriptor.route_key(),
            "dispatching request"
        );

        let scope = self.scopes.slice_scope(slice);
        let unit = match descriptor.constructor().construct(&scope) {
            Ok(unit) => unit,
            Err(error) => {
                tracing::error!(
                    target: DISPATCH_TARGET,
                    slice,
                    unit_type = descriptor.unit_type(),
                    error = %error,
                    "failed to construct the feature unit"
                );
                return DispatchOutcome::internal_error(format!(
                    "failed to construct {}: {error}",
                    descriptor.unit_type()
                ));
            }
        };

        let argument = match descriptor.operation().bind(request, &self.codec) {
            Ok(argument) => argument,
            Err(error) => {
                tracing::error!(
                    target: DISPATCH_TARGET,
                    slice,
                    error = %error,
                    "failed to bind the handler argument"
                );
                return DispatchOutcome::internal_error(error.to_string());
            }
        };

        if let Some(failure) = self.reject_invalid(slice, descriptor, &argument) {
            return failure;
        }

        match descriptor.operation().invoke(&unit, argument) {
            Ok(Some(value)) => self.respond(slice, &value),
            Ok(None) => DispatchOutcome::no_content(),
            Err(error) => {
                tracing::error!(
                    target: DISPATCH_TARGET,
                    slice,
                    error = %error,
                    "handler invocation failed"
                );
                DispatchOutcome::internal_error(error.to_string())
            }
        }
    }

    /// Checks declared constraints; the handler is never invoked when any
    /// violation is found.
    fn reject_invalid(
        &self,
        slice: &str,
        descriptor: &SliceDescriptor,
        argument: &BoundArgument,
    ) -> Option<DispatchOutcome> {
        let violations = descriptor.operation().check(argument);
        if violations.is_empty() {
            return None;
        }

        let error = ValidationError::new(violations);
        tracing::warn!(
            target: DISPATCH_TARGET,
            slice,
            violations = error.violation_count(),
            message = %error.formatted_message(),
            "request failed validation"
        );
        Some(DispatchOutcome::validation_failed(&error))
    }

    fn respond(&self, slice: &str, value: &serde_json::Value) -> DispatchOutcome {
        match self.codec.serialize(value) {
            Ok(body) => DispatchOutcome::ok(body),
            Err(error) => {
                tracing::error!(
                    target: DISPATCH_TARGET,
                    slice,
                    error = %error,
                    "failed to serialise the handler result"
                );
                DispatchOutcome::internal_error(error.to_string())
            }
        }
    }

    fn miss(&self, request: &SliceRequest) -> DispatchOutcome {
        let method = request.method().trim().to_ascii_uppercase();
        let path = request.path().trim();
        tracing::warn!(
            target: DISPATCH_TARGET,
            method = %method,
            path,
            "no slice registered for request"
        );
        DispatchOutcome::not_found(&method, path, self.registry.all_route_keys())
    }
}
