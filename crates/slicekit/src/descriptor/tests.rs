use std::str::FromStr;

use rstest::rstest;

use super::*;
use crate::handler::HandlerOperation;

struct HelloWorld;

fn declaration() -> SliceDeclaration {
    SliceDeclaration::new(
        "hello-world",
        "demo::greetings",
        HttpMethod::Get,
        "/hello",
        UnitConstructor::zero_arg(|| HelloWorld),
    )
    .with_operation(HandlerOperation::nullary(|_unit: &HelloWorld| {
        Ok(Some("Hello, World!".to_owned()))
    }))
}

#[rstest]
#[case::canonical("GET", HttpMethod::Get)]
#[case::lower_case("post", HttpMethod::Post)]
#[case::mixed_case("DeLeTe", HttpMethod::Delete)]
#[case::padded("  put  ", HttpMethod::Put)]
fn methods_parse_case_insensitively(#[case] input: &str, #[case] expected: HttpMethod) {
    assert_eq!(HttpMethod::from_str(input), Ok(expected));
}

#[rstest]
fn unsupported_method_is_rejected() {
    let error = HttpMethod::from_str("TRACE").unwrap_err();
    assert_eq!(error.to_string(), "unknown HTTP method: TRACE");
}

#[rstest]
fn declarations_carry_their_unit_type() {
    let declaration = declaration();

    assert_eq!(declaration.name(), "hello-world");
    assert_eq!(declaration.module(), "demo::greetings");
    assert!(declaration.unit_type().contains("HelloWorld"));
    assert_eq!(declaration.operations().len(), 1);
}

#[rstest]
fn route_key_joins_method_and_route() {
    let descriptor = SliceDescriptor::new(
        "hello-world".to_owned(),
        HttpMethod::Get,
        "/hello".to_owned(),
        None,
        "1.0".to_owned(),
        UnitConstructor::zero_arg(|| HelloWorld),
        HandlerOperation::nullary(|_unit: &HelloWorld| Ok(Some("hi".to_owned()))),
    );

    assert_eq!(descriptor.route_key(), "GET /hello");
    assert_eq!(descriptor.version(), "1.0");
}
