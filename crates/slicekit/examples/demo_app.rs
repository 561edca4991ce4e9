//! A small slicekit application: four slices, one owned component, and one
//! shared component, driven through the dispatcher without a transport.
//!
//! Run with `cargo run --example demo_app`; set `RUST_LOG=debug` to watch
//! discovery, registration, and dispatch at work.

use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::json;
use slicekit::{
    ComponentDescriptor, ComponentScope, HandlerOperation, HttpMethod, SliceDeclaration, SliceKit,
    SliceRequest, UnitConstructor, Validate, Violation,
    validation::{require_min, require_not_blank},
};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// Shared singleton recording when the process started.
struct StartClock {
    started: Instant,
}

/// Shared singleton standing in for an outbound mail gateway.
struct Mailer;

impl Mailer {
    fn send_confirmation(&self, customer: &str, order_id: u64) {
        tracing::info!(customer, order_id, "sending order confirmation");
    }
}

/// Data access owned by the create-order slice alone.
struct OrderStore {
    next_id: AtomicU64,
}

impl OrderStore {
    fn save(&self, order: &CreateOrder) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(customer = %order.customer, quantity = order.quantity, id, "order stored");
        id
    }
}

// ---------------------------------------------------------------------------
// Slices
// ---------------------------------------------------------------------------

struct HelloWorld;
struct EchoRequest;

struct HealthCheck {
    clock: Arc<StartClock>,
}

struct PlaceOrder {
    store: Arc<OrderStore>,
    mailer: Arc<Mailer>,
}

#[derive(Debug, Deserialize, Serialize)]
struct CreateOrder {
    customer: String,
    quantity: u32,
}

impl Validate for CreateOrder {
    fn validate(&self) -> Vec<Violation> {
        [
            require_not_blank("customer", &self.customer, "must not be blank"),
            require_min("quantity", self.quantity, 1, "must be at least 1"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

fn slices() -> Vec<SliceDeclaration> {
    vec![
        SliceDeclaration::new(
            "hello-world",
            "demo::greetings",
            HttpMethod::Get,
            "/hello",
            UnitConstructor::zero_arg(|| HelloWorld),
        )
        .with_description("Greets the caller")
        .with_operation(HandlerOperation::nullary(|_unit: &HelloWorld| {
            Ok(Some("Hello, World!".to_owned()))
        })),
        SliceDeclaration::new(
            "echo",
            "demo::diagnostics",
            HttpMethod::Post,
            "/echo",
            UnitConstructor::zero_arg(|| EchoRequest),
        )
        .with_operation(HandlerOperation::raw_request(
            |_unit: &EchoRequest, request| {
                Ok(Some(json!({
                    "method": request.method(),
                    "path": request.path(),
                    "body": request.body(),
                })))
            },
        )),
        SliceDeclaration::new(
            "health-check",
            "demo::diagnostics",
            HttpMethod::Get,
            "/health",
            UnitConstructor::resolving(|scope| {
                Ok(HealthCheck {
                    clock: scope.resolve::<StartClock>()?,
                })
            }),
        )
        .with_operation(HandlerOperation::nullary(|unit: &HealthCheck| {
            Ok(Some(json!({
                "status": "UP",
                "uptimeSeconds": unit.clock.started.elapsed().as_secs(),
            })))
        })),
        SliceDeclaration::new(
            "create-order",
            "demo::orders",
            HttpMethod::Post,
            "/orders",
            UnitConstructor::resolving(|scope| {
                Ok(PlaceOrder {
                    store: scope.resolve::<OrderStore>()?,
                    mailer: scope.resolve::<Mailer>()?,
                })
            }),
        )
        .with_operation(HandlerOperation::validated_json_body(
            |unit: &PlaceOrder, order: Option<CreateOrder>| match order {
                Some(order) => {
                    let id = unit.store.save(&order);
                    unit.mailer.send_confirmation(&order.customer, id);
                    Ok(Some(json!({ "orderId": id, "customer": order.customer })))
                }
                None => Ok(None),
            },
        )),
    ]
}

fn components() -> Vec<ComponentDescriptor> {
    vec![
        ComponentDescriptor::shared(ComponentScope::Singleton, || StartClock {
            started: Instant::now(),
        }),
        ComponentDescriptor::shared_with(["create-order"], ComponentScope::Singleton, || Mailer),
        ComponentDescriptor::owned_by("create-order", ComponentScope::Singleton, || OrderStore {
            next_id: AtomicU64::new(1),
        }),
    ]
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let mut kit = SliceKit::builder()
        .scan_scope("demo")
        .host("127.0.0.1")
        .port(8080);
    for slice in slices() {
        kit = kit.declare_slice(slice);
    }
    for component in components() {
        kit = kit.declare_component(component);
    }
    let kit = kit.build()?;

    let requests = [
        SliceRequest::new("GET", "/hello"),
        SliceRequest::new("GET", "/health"),
        SliceRequest::new("POST", "/echo").with_body("ping"),
        SliceRequest::new("POST", "/orders")
            .with_json_body(r#"{"customer":"ada","quantity":2}"#),
        SliceRequest::new("POST", "/orders")
            .with_json_body(r#"{"customer":"","quantity":0}"#),
        SliceRequest::new("GET", "/missing"),
    ];

    for request in &requests {
        let outcome = kit.dispatcher().dispatch(request);
        tracing::info!(
            method = request.method(),
            path = request.path(),
            status = outcome.status(),
            body = outcome.body(),
            "dispatched"
        );
    }

    Ok(())
}
