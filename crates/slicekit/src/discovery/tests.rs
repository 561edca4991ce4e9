use rstest::{fixture, rstest};

use super::*;
use crate::descriptor::HttpMethod;
use crate::handler::{HandlerOperation, UnitConstructor};

struct HelloWorld;
struct EchoRequest;

fn hello_operation() -> HandlerOperation {
    HandlerOperation::nullary(|_unit: &HelloWorld| Ok(Some("Hello, World!".to_owned())))
}

fn hello_declaration() -> SliceDeclaration {
    SliceDeclaration::new(
        "hello-world",
        "demo::greetings",
        HttpMethod::Get,
        "/hello",
        UnitConstructor::zero_arg(|| HelloWorld),
    )
    .with_operation(hello_operation())
}

fn echo_declaration() -> SliceDeclaration {
    SliceDeclaration::new(
        "echo",
        "demo::diagnostics",
        HttpMethod::Post,
        "/echo",
        UnitConstructor::zero_arg(|| EchoRequest),
    )
    .with_operation(HandlerOperation::nullary(|_unit: &EchoRequest| {
        Ok(Some("echo".to_owned()))
    }))
}

#[fixture]
fn discovery() -> SliceDiscovery {
    SliceDiscovery::new(vec!["demo".to_owned()])
}

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[rstest]
fn valid_candidates_are_keyed_by_route(discovery: SliceDiscovery) {
    let discovered = discovery
        .discover(&[hello_declaration(), echo_declaration()])
        .unwrap();

    assert_eq!(discovered.len(), 2);
    assert_eq!(discovered["GET /hello"].name(), "hello-world");
    assert_eq!(discovered["POST /echo"].name(), "echo");
}

#[rstest]
fn names_and_routes_are_trimmed(discovery: SliceDiscovery) {
    let candidate = SliceDeclaration::new(
        "  hello-world  ",
        "demo",
        HttpMethod::Get,
        "  /hello  ",
        UnitConstructor::zero_arg(|| HelloWorld),
    )
    .with_operation(hello_operation());

    let discovered = discovery.discover(&[candidate]).unwrap();

    assert_eq!(discovered["GET /hello"].name(), "hello-world");
}

#[rstest]
fn missing_version_defaults(discovery: SliceDiscovery) {
    let discovered = discovery.discover(&[hello_declaration()]).unwrap();
    assert_eq!(discovered["GET /hello"].version(), "1.0");
}

#[rstest]
fn no_candidates_yields_an_empty_map(discovery: SliceDiscovery) {
    assert!(discovery.discover(&[]).unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Scope filtering
// ---------------------------------------------------------------------------

#[rstest]
#[case::exact_scope("demo::greetings", true)]
#[case::nested_scope("demo::greetings::internal", true)]
#[case::scope_root("demo", false)]
#[case::sibling("demo::diagnostics", false)]
#[case::prefix_but_not_module_boundary("demo::greetingsextra", false)]
fn scope_filtering_respects_module_boundaries(#[case] module: &str, #[case] kept: bool) {
    let discovery = SliceDiscovery::new(vec!["demo::greetings".to_owned()]);
    let candidate = SliceDeclaration::new(
        "hello-world",
        module,
        HttpMethod::Get,
        "/hello",
        UnitConstructor::zero_arg(|| HelloWorld),
    )
    .with_operation(hello_operation());

    let discovered = discovery.discover(&[candidate]).unwrap();

    assert_eq!(discovered.len(), usize::from(kept));
}

// ---------------------------------------------------------------------------
// Fail-fast validation
// ---------------------------------------------------------------------------

#[rstest]
#[case::blank_name("   ", "/hello", "slice name must not be blank")]
#[case::blank_route("hello-world", "   ", "slice route must not be blank")]
#[case::route_without_slash("hello-world", "hello", "must start with '/'")]
fn malformed_declarations_abort_discovery(
    discovery: SliceDiscovery,
    #[case] name: &str,
    #[case] route: &str,
    #[case] reason: &str,
) {
    let candidate = SliceDeclaration::new(
        name,
        "demo",
        HttpMethod::Get,
        route,
        UnitConstructor::zero_arg(|| HelloWorld),
    )
    .with_operation(hello_operation());

    let error = discovery.discover(&[candidate]).unwrap_err();

    assert!(matches!(error, DiscoveryError::SliceConfiguration { .. }));
    assert!(error.to_string().contains(reason), "got: {error}");
    assert!(error.to_string().contains("HelloWorld"));
}

#[rstest]
#[case::no_operations(0)]
#[case::two_operations(2)]
fn handler_count_other_than_one_is_rejected(discovery: SliceDiscovery, #[case] count: usize) {
    let mut candidate = SliceDeclaration::new(
        "hello-world",
        "demo",
        HttpMethod::Get,
        "/hello",
        UnitConstructor::zero_arg(|| HelloWorld),
    );
    for _ in 0..count {
        candidate = candidate.with_operation(hello_operation());
    }

    let error = discovery.discover(&[candidate]).unwrap_err();

    assert!(error.to_string().contains("exactly one handler operation"));
}

#[rstest]
fn route_conflicts_name_both_units(discovery: SliceDiscovery) {
    let imposter = SliceDeclaration::new(
        "hello-again",
        "demo",
        HttpMethod::Get,
        "/hello",
        UnitConstructor::zero_arg(|| EchoRequest),
    )
    .with_operation(HandlerOperation::nullary(|_unit: &EchoRequest| {
        Ok(Some("again".to_owned()))
    }));

    let error = discovery
        .discover(&[hello_declaration(), imposter])
        .unwrap_err();

    match error {
        DiscoveryError::RouteConflict {
            route_key,
            first,
            second,
        } => {
            assert_eq!(route_key, "GET /hello");
            assert!(first.contains("HelloWorld"));
            assert!(second.contains("EchoRequest"));
        }
        other => panic!("expected a route conflict, got {other:?}"),
    }
}

#[rstest]
fn one_bad_candidate_discards_the_good_ones(discovery: SliceDiscovery) {
    let bad = SliceDeclaration::new(
        "",
        "demo",
        HttpMethod::Get,
        "/bad",
        UnitConstructor::zero_arg(|| EchoRequest),
    )
    .with_operation(HandlerOperation::nullary(|_unit: &EchoRequest| {
        Ok(Some("bad".to_owned()))
    }));

    let result = discovery.discover(&[hello_declaration(), bad]);

    assert!(result.is_err());
}
