//! Error formatting and serialization tests
//!
//! Binding errors are the only diagnostic a client receives, so their
//! messages and JSON shape are pinned here.

use crate::error::{
    BindingError, BindingErrorKind, ConfigurationError, NO_VALUE, ParameterRef, RegistryError,
    RestError,
};
use proptest::prelude::*;

/// Strategy to generate arbitrary BindingErrorKind values
fn arb_kind() -> impl Strategy<Value = BindingErrorKind> {
    prop_oneof![
        Just(BindingErrorKind::MissingArgument),
        Just(BindingErrorKind::InvalidArgument),
        Just(BindingErrorKind::ContextUnavailable),
        Just(BindingErrorKind::BeanUnavailable),
        Just(BindingErrorKind::ReaderUnavailable),
    ]
}

fn missing_count() -> BindingError {
    BindingError::new(
        BindingErrorKind::MissingArgument,
        ParameterRef::Described("query param 'count'".into()),
        "/items",
        "list",
        "int",
    )
}

// =============================================================================
// Messages
// =============================================================================

#[test]
fn test_missing_argument_message() {
    let err = missing_count();

    assert_eq!(err.provided, NO_VALUE);
    assert_eq!(
        err.message,
        "Missing query param 'count' for: /items in list(), expected: int, but: none was provided"
    );
    assert_eq!(err.to_string(), format!("[MISSING_ARGUMENT] {}", err.message));
}

#[test]
fn test_invalid_argument_message_with_cause() {
    let err = BindingError::new(
        BindingErrorKind::InvalidArgument,
        ParameterRef::Described("path param 'id'".into()),
        "/users/{id}",
        "get",
        "long",
    )
    .with_provided("String")
    .with_cause("invalid digit found in string");

    assert_eq!(
        err.message,
        "Invalid parameter type for: path param 'id' for: /users/{id} in get(), expected: long, but got: String -> invalid digit found in string"
    );
    assert!(err.cause().is_some());
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_matching_provided_type_is_not_repeated() {
    let err = BindingError::new(
        BindingErrorKind::InvalidArgument,
        ParameterRef::Position(0),
        "/notes",
        "add",
        "String",
    )
    .with_provided("String");

    assert_eq!(
        err.message,
        "Invalid parameter type for: argument 1 for: /notes in add(), expected: String"
    );
}

#[test]
fn test_parameter_position_is_one_based() {
    assert_eq!(ParameterRef::Position(0).to_string(), "argument 1");
    assert_eq!(ParameterRef::Position(4).to_string(), "argument 5");
    assert_eq!(
        ParameterRef::Described("body param (User)".into()).to_string(),
        "body param (User)"
    );
}

#[test]
fn test_configuration_error_location() {
    let type_level = ConfigurationError::new("Users", "Missing or empty route path");
    assert_eq!(type_level.to_string(), "Users - Missing or empty route path");
    assert!(std::error::Error::source(&type_level).is_none());

    let method_level = ConfigurationError::new("Users", "bad")
        .with_method("get")
        .with_source(RegistryError::UnknownReader("x".into()));
    assert_eq!(method_level.to_string(), "Users.get() - bad");
    assert_eq!(method_level.method.as_deref(), Some("get"));
    assert!(std::error::Error::source(&method_level).is_some());
}

#[test]
fn test_registry_error_messages() {
    assert_eq!(
        RegistryError::UnknownReader("csv".into()).to_string(),
        "No value reader registered under 'csv'"
    );
    assert_eq!(
        RegistryError::UnknownContextProvider("auth".into()).to_string(),
        "No context provider registered under 'auth'"
    );
    assert_eq!(
        RegistryError::UnknownBean("Filter".into()).to_string(),
        "No bean constructor registered for 'Filter'"
    );
}

#[test]
fn test_rest_error_is_transparent() {
    let err: RestError = missing_count().into();
    assert!(err.to_string().starts_with("[MISSING_ARGUMENT] Missing query param"));

    let err: RestError = ConfigurationError::new("Users", "bad").into();
    assert_eq!(err.to_string(), "Users - bad");
}

// =============================================================================
// Kinds
// =============================================================================

#[test]
fn test_kind_classification() {
    assert!(BindingErrorKind::MissingArgument.is_client_error());
    assert!(BindingErrorKind::InvalidArgument.is_client_error());
    assert!(BindingErrorKind::ContextUnavailable.is_client_error());
    assert!(BindingErrorKind::BeanUnavailable.is_client_error());
    assert!(BindingErrorKind::ReaderUnavailable.is_server_error());
}

proptest! {
    /// Property: a kind serializes to the same string as its as_str form
    #[test]
    fn prop_kind_serializes_as_code(kind in arb_kind()) {
        let json = serde_json::to_value(kind).unwrap();
        prop_assert_eq!(json, serde_json::Value::String(kind.as_str().to_string()));
        prop_assert!(kind.is_client_error() != kind.is_server_error());
    }

    /// Property: every binding error serializes its diagnostic fields
    #[test]
    fn prop_binding_error_details_complete(
        kind in arb_kind(),
        route in "/[a-z]{1,8}",
        method in "[a-z]{1,8}",
        cause in proptest::option::of("[a-z ]{1,16}"),
    ) {
        let mut err = BindingError::new(kind, ParameterRef::Position(0), route.clone(), method.clone(), "int");
        if let Some(ref cause) = cause {
            err = err.with_cause(cause.clone());
        }

        let details = err.to_details();
        prop_assert_eq!(&details["code"], kind.as_str());
        prop_assert_eq!(&details["route"], route.as_str());
        prop_assert_eq!(&details["method"], method.as_str());
        prop_assert_eq!(&details["parameter"], "argument 1");
        prop_assert_eq!(&details["expected"], "int");
        prop_assert_eq!(&details["provided"], NO_VALUE);
        prop_assert_eq!(&details["message"], err.message.as_str());
        prop_assert_eq!(details.get("cause").is_some(), cause.is_some());
    }
}
