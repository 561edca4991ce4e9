use rstest::{fixture, rstest};
use serde::{Deserialize, Serialize};

use super::*;
use crate::scope::{ComponentDescriptor, ComponentScope, ScopeGraph};
use crate::validation::{require_min, require_not_blank};

struct Greeter {
    greeting: &'static str,
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
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

#[fixture]
fn codec() -> JsonCodec {
    JsonCodec::new()
}

fn greeter_instance() -> UnitInstance {
    UnitInstance::new(Greeter { greeting: "hello" })
}

fn json_request(body: &str) -> SliceRequest {
    SliceRequest::new("POST", "/orders").with_json_body(body)
}

// ---------------------------------------------------------------------------
// Binding
// ---------------------------------------------------------------------------

#[rstest]
fn nullary_operation_binds_an_empty_argument(codec: JsonCodec) {
    let operation =
        HandlerOperation::nullary(|unit: &Greeter| Ok(Some(unit.greeting.to_owned())));

    let argument = operation
        .bind(&SliceRequest::new("GET", "/hello"), &codec)
        .unwrap();

    assert!(matches!(argument, BoundArgument::Empty));
    assert_eq!(operation.parameter(), HandlerParameter::None);
}

#[rstest]
fn json_body_operation_deserialises_the_request_body(codec: JsonCodec) {
    let operation = HandlerOperation::json_body(|_unit: &Greeter, body: Option<CreateOrder>| {
        Ok(body.map(|order| order.customer))
    });

    let argument = operation
        .bind(&json_request(r#"{"customer":"ada","quantity":2}"#), &codec)
        .unwrap();

    assert!(matches!(argument, BoundArgument::Value(_)));
}

#[rstest]
#[case::no_body(SliceRequest::new("POST", "/orders"))]
#[case::blank_body(SliceRequest::new("POST", "/orders").with_json_body("   "))]
#[case::wrong_content_type(SliceRequest::new("POST", "/orders").with_body("{}"))]
fn json_body_operation_binds_absent_without_a_json_body(
    codec: JsonCodec,
    #[case] request: SliceRequest,
) {
    let operation = HandlerOperation::json_body(|_unit: &Greeter, body: Option<CreateOrder>| {
        Ok(body.map(|order| order.customer))
    });

    let argument = operation.bind(&request, &codec).unwrap();

    assert!(matches!(argument, BoundArgument::Absent));
}

#[rstest]
fn malformed_body_fails_the_bind_step(codec: JsonCodec) {
    let operation = HandlerOperation::json_body(|_unit: &Greeter, body: Option<CreateOrder>| {
        Ok(body.map(|order| order.customer))
    });

    let error = operation
        .bind(&json_request("{not json"), &codec)
        .unwrap_err();

    assert!(matches!(error, HandlerError::BindBody(_)));
}

// ---------------------------------------------------------------------------
// Constraint checks
// ---------------------------------------------------------------------------

#[rstest]
fn validated_operation_reports_every_violation(codec: JsonCodec) {
    let operation =
        HandlerOperation::validated_json_body(|_unit: &Greeter, body: Option<CreateOrder>| {
            Ok(body.map(|order| order.customer))
        });

    let argument = operation
        .bind(&json_request(r#"{"customer":"","quantity":0}"#), &codec)
        .unwrap();
    let violations = operation.check(&argument);

    assert_eq!(violations.len(), 2);
    assert_eq!(violations[0].path(), "customer");
    assert_eq!(violations[1].path(), "quantity");
}

#[rstest]
fn valid_body_passes_the_constraint_check(codec: JsonCodec) {
    let operation =
        HandlerOperation::validated_json_body(|_unit: &Greeter, body: Option<CreateOrder>| {
            Ok(body.map(|order| order.customer))
        });

    let argument = operation
        .bind(&json_request(r#"{"customer":"ada","quantity":2}"#), &codec)
        .unwrap();

    assert!(operation.check(&argument).is_empty());
}

#[rstest]
fn absent_argument_is_not_validated(codec: JsonCodec) {
    let operation =
        HandlerOperation::validated_json_body(|_unit: &Greeter, body: Option<CreateOrder>| {
            Ok(body.map(|order| order.customer))
        });

    let argument = operation
        .bind(&SliceRequest::new("POST", "/orders"), &codec)
        .unwrap();

    assert!(operation.check(&argument).is_empty());
}

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

#[rstest]
fn nullary_invocation_serialises_the_result() {
    let operation =
        HandlerOperation::nullary(|unit: &Greeter| Ok(Some(unit.greeting.to_owned())));

    let result = operation
        .invoke(&greeter_instance(), BoundArgument::Empty)
        .unwrap();

    assert_eq!(result, Some(serde_json::json!("hello")));
}

#[rstest]
fn empty_handler_result_yields_no_content() {
    let operation = HandlerOperation::nullary(|_unit: &Greeter| Ok(None::<String>));

    let result = operation
        .invoke(&greeter_instance(), BoundArgument::Empty)
        .unwrap();

    assert_eq!(result, None);
}

#[rstest]
fn raw_request_handler_sees_the_request(codec: JsonCodec) {
    let operation = HandlerOperation::raw_request(|_unit: &Greeter, request: &SliceRequest| {
        Ok(Some(request.path().to_owned()))
    });

    let request = SliceRequest::new("GET", "/echo");
    let argument = operation.bind(&request, &codec).unwrap();
    let result = operation.invoke(&greeter_instance(), argument).unwrap();

    assert_eq!(result, Some(serde_json::json!("/echo")));
}

#[rstest]
fn handler_failure_is_reported_as_an_execution_error() {
    let operation =
        HandlerOperation::nullary(|_unit: &Greeter| -> HandlerResult<String> {
            Err("downstream unavailable".into())
        });

    let error = operation
        .invoke(&greeter_instance(), BoundArgument::Empty)
        .unwrap_err();

    assert!(matches!(error, HandlerError::Execution { .. }));
    assert!(error.to_string().contains("downstream unavailable"));
}

#[rstest]
fn wrong_unit_type_is_rejected() {
    let operation =
        HandlerOperation::nullary(|unit: &Greeter| Ok(Some(unit.greeting.to_owned())));
    let wrong = UnitInstance::new(42_u8);

    let error = operation.invoke(&wrong, BoundArgument::Empty).unwrap_err();

    assert!(matches!(error, HandlerError::UnitTypeMismatch { .. }));
}

#[rstest]
fn mismatched_argument_shape_is_rejected() {
    let operation =
        HandlerOperation::nullary(|unit: &Greeter| Ok(Some(unit.greeting.to_owned())));

    let error = operation
        .invoke(
            &greeter_instance(),
            BoundArgument::Request(SliceRequest::new("GET", "/hello")),
        )
        .unwrap_err();

    assert!(matches!(error, HandlerError::ArgumentMismatch));
}

// ---------------------------------------------------------------------------
// Constructors
// ---------------------------------------------------------------------------

#[rstest]
fn zero_arg_constructor_builds_without_a_scope() {
    let graph = ScopeGraph::new(Vec::new()).unwrap();
    let constructor = UnitConstructor::zero_arg(|| Greeter { greeting: "hi" });

    let instance = constructor.construct(graph.shared_scope()).unwrap();

    assert!(instance.type_name().contains("Greeter"));
}

#[rstest]
fn resolving_constructor_pulls_components_from_the_scope() {
    struct Clock(&'static str);
    struct Dashboard {
        zone: &'static str,
    }

    let graph = ScopeGraph::new(vec![ComponentDescriptor::shared(
        ComponentScope::Singleton,
        || Clock("UTC"),
    )])
    .unwrap();
    let constructor = UnitConstructor::resolving(|scope| {
        let clock = scope.resolve::<Clock>()?;
        Ok(Dashboard { zone: clock.0 })
    });

    let instance = constructor.construct(graph.shared_scope()).unwrap();

    assert!(instance.type_name().contains("Dashboard"));
}

#[rstest]
fn unresolvable_constructor_parameter_fails_construction() {
    struct Missing;
    struct NeedsMissing;

    let graph = ScopeGraph::new(Vec::new()).unwrap();
    let constructor = UnitConstructor::resolving(|scope| {
        scope.resolve::<Missing>()?;
        Ok(NeedsMissing)
    });

    let error = constructor.construct(graph.shared_scope()).unwrap_err();

    assert!(matches!(error, ResolutionError::ComponentMissing { .. }));
}
