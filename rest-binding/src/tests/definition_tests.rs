//! Route definition tests
//!
//! Path normalization, path templates, annotation layering and the
//! fill-only-unset merge.

use proptest::prelude::*;

use crate::definition::{RouteDefinition, join_paths, normalize_path};
use crate::descriptor::{Annotation, MethodDescriptor, ParamDescriptor};
use crate::parameter::MethodParameter;
use crate::types::{HttpMethod, ParameterKind, TypeRef};

fn definition(annotations: &[Annotation]) -> RouteDefinition {
    RouteDefinition::root(annotations).expect("valid annotations")
}

// =============================================================================
// Path Normalization
// =============================================================================

#[test]
fn test_normalize_adds_leading_and_trims_trailing_slash() {
    assert_eq!(normalize_path("echo").unwrap(), "/echo");
    assert_eq!(normalize_path("/echo/").unwrap(), "/echo");
    assert_eq!(normalize_path("//echo//").unwrap(), "/echo");
    assert_eq!(normalize_path("a/b").unwrap(), "/a/b");
}

#[test]
fn test_normalize_slashes_only_is_root() {
    assert_eq!(normalize_path("/").unwrap(), "/");
    assert_eq!(normalize_path("///").unwrap(), "/");
}

#[test]
fn test_normalize_rejects_blank() {
    assert!(normalize_path("").is_err());
    assert!(normalize_path("   ").is_err());
}

#[test]
fn test_join_paths() {
    assert_eq!(join_paths("/", "interface").unwrap(), "/interface");
    assert_eq!(join_paths("/interface", "echo").unwrap(), "/interface/echo");
    assert_eq!(join_paths("/interface", "/echo/").unwrap(), "/interface/echo");
    assert_eq!(join_paths("/interface", "/").unwrap(), "/interface");
    assert!(join_paths("/interface", " ").is_err());
}

proptest! {
    /// Property: Path normalization is idempotent
    /// *For any* non-blank path, normalizing the normalized path returns it
    /// unchanged. The result starts with exactly one `/` and ends with `/`
    /// only when it is the root.
    #[test]
    fn prop_normalize_idempotent(
        path in "[a-z/ ]{1,16}".prop_filter("non-blank", |s| !s.trim().is_empty())
    ) {
        let normalized = normalize_path(&path).unwrap();

        prop_assert_eq!(normalize_path(&normalized).unwrap(), normalized.clone());
        prop_assert!(normalized.starts_with('/'));
        prop_assert!(!normalized.starts_with("//"));
        prop_assert!(normalized == "/" || !normalized.ends_with('/'));
    }

    /// Property: Joining onto the root equals normalizing
    #[test]
    fn prop_join_onto_root_is_normalize(path in "[a-z/]{0,12}[a-z]") {
        prop_assert_eq!(join_paths("/", &path).unwrap(), normalize_path(&path).unwrap());
    }
}

// =============================================================================
// Path Templates
// =============================================================================

#[test]
fn test_named_template_is_not_regex() {
    let def = definition(&[Annotation::path("users/{id}/posts/:post")]);

    assert!(!def.path_is_regex());
    assert_eq!(def.path_params().len(), 2);
    assert_eq!(def.path_params()[0].name, "id");
    assert_eq!(def.path_params()[0].segment, 2);
    assert_eq!(def.path_params()[1].name, "post");
    assert_eq!(def.path_params()[1].segment, 4);
}

#[test]
fn test_regex_template_marks_route() {
    let def = definition(&[Annotation::path("users/{id:[0-9]+}")]);

    assert!(def.path_is_regex());
    assert_eq!(def.path_params()[0].pattern.as_deref(), Some("[0-9]+"));
}

#[test]
fn test_invalid_template_regex_rejected() {
    assert!(RouteDefinition::root(&[Annotation::path("users/{id:[0-9}")]).is_err());
    assert!(RouteDefinition::root(&[Annotation::path("users/{}")]).is_err());
}

// =============================================================================
// Annotation Layering
// =============================================================================

#[test]
fn test_derive_layers_method_over_type() {
    let root = definition(&[
        Annotation::path("interface"),
        Annotation::produces(["application/json"]),
    ]);
    let def = RouteDefinition::derive(
        &root,
        &[
            Annotation::Get,
            Annotation::path("echo"),
            Annotation::consumes(["application/json"]),
        ],
    )
    .unwrap();

    assert_eq!(def.path(), "/interface/echo");
    assert_eq!(def.http_method(), Some(HttpMethod::Get));
    assert_eq!(def.consumes().unwrap()[0].key(), "application/json");
    assert_eq!(def.produces().unwrap()[0].key(), "application/json");
    assert_eq!(def.to_string(), "GET /interface/echo");
}

#[test]
fn test_custom_http_method_by_name() {
    let def = definition(&[Annotation::HttpMethod("patch".into())]);
    assert_eq!(def.http_method(), Some(HttpMethod::Patch));

    let err = RouteDefinition::root(&[Annotation::HttpMethod("FETCH".into())]).unwrap_err();
    assert!(err.to_string().contains("FETCH"));
}

#[test]
fn test_trace_and_connect_markers() {
    assert_eq!(definition(&[Annotation::Trace]).http_method(), Some(HttpMethod::Trace));
    assert_eq!(definition(&[Annotation::Connect]).http_method(), Some(HttpMethod::Connect));
}

#[test]
fn test_empty_or_invalid_media_types_rejected() {
    let empty: [&str; 0] = [];
    assert!(RouteDefinition::root(&[Annotation::consumes(empty)]).is_err());
    assert!(RouteDefinition::root(&[Annotation::produces(empty)]).is_err());
    assert!(RouteDefinition::root(&[Annotation::consumes(["json"])]).is_err());
}

#[test]
fn test_display_without_method() {
    assert_eq!(RouteDefinition::default().to_string(), "* /");
}

// =============================================================================
// Parameters
// =============================================================================

#[test]
fn test_parameter_without_annotation_is_implicit_body() {
    let param = MethodParameter::from_descriptor(0, &ParamDescriptor::new(TypeRef::string())).unwrap();

    assert_eq!(param.kind(), ParameterKind::Body);
    assert!(!param.is_explicit());
    assert!(param.is_used_as_argument());
    assert_eq!(param.data_type(), &TypeRef::string());
}

#[test]
fn test_parameter_modifiers() {
    let descriptor = ParamDescriptor::new(TypeRef::string())
        .query("q")
        .raw()
        .default_value("x")
        .data_type(TypeRef::int())
        .reader("custom");
    let param = MethodParameter::from_descriptor(3, &descriptor).unwrap();

    assert_eq!(param.index(), 3);
    assert_eq!(param.name(), Some("q"));
    assert!(param.is_raw());
    assert_eq!(param.default_value(), Some("x"));
    assert_eq!(param.data_type(), &TypeRef::int());
    assert_eq!(param.reader(), Some("custom"));
    assert_eq!(param.to_string(), "query param 'q'");
}

#[test]
fn test_parameter_metadata_errors() {
    let two_kinds = ParamDescriptor::new(TypeRef::string()).query("a").header("b");
    assert!(MethodParameter::from_descriptor(0, &two_kinds).is_err());

    let blank_name = ParamDescriptor::new(TypeRef::string()).query(" ");
    assert!(MethodParameter::from_descriptor(0, &blank_name).is_err());
}

#[test]
fn test_descriptive_parameter_not_used_as_argument() {
    let descriptor = ParamDescriptor::new(TypeRef::string()).header("X-Doc").descriptive();
    let param = MethodParameter::from_descriptor(0, &descriptor).unwrap();
    assert!(!param.is_used_as_argument());
}

#[test]
fn test_path_index_resolved_from_template() {
    let mut def = definition(&[Annotation::path("users/{id:[0-9]+}")]);
    let method = MethodDescriptor::new("get").param(ParamDescriptor::new(TypeRef::long()).path("id"));
    def.set_arguments(&method).unwrap();

    assert_eq!(def.find_parameter(0).unwrap().path_index(), Some(2));
}

#[test]
fn test_explicit_path_index_wins() {
    let mut def = definition(&[Annotation::path("users/{id:[0-9]+}")]);
    let method = MethodDescriptor::new("get").param(
        ParamDescriptor::new(TypeRef::long())
            .path("id")
            .annotate(crate::descriptor::ParamAnnotation::PathIndex(1)),
    );
    def.set_arguments(&method).unwrap();

    assert_eq!(def.find_parameter(0).unwrap().path_index(), Some(1));
}

#[test]
fn test_has_matrix_params() {
    let mut def = definition(&[Annotation::path("cars/{make}")]);
    assert!(!def.has_matrix_params());

    let method = MethodDescriptor::new("cars")
        .param(ParamDescriptor::new(TypeRef::string()).path("make"))
        .param(ParamDescriptor::new(TypeRef::string()).matrix("color"));
    def.set_arguments(&method).unwrap();
    assert!(def.has_matrix_params());
}

// =============================================================================
// Merge
// =============================================================================

fn arb_method() -> impl Strategy<Value = Option<HttpMethod>> {
    proptest::option::of(proptest::sample::select(HttpMethod::ALL.to_vec()))
}

fn arb_media_type() -> impl Strategy<Value = Option<&'static str>> {
    proptest::option::of(proptest::sample::select(vec![
        "application/json",
        "text/plain",
        "application/xml",
    ]))
}

fn build(path: Option<String>, method: Option<HttpMethod>, consumes: Option<&str>) -> RouteDefinition {
    let mut def = RouteDefinition::default();
    if let Some(path) = path {
        def.add_path(&path).unwrap();
    }
    if let Some(method) = method {
        def.set_http_method(method);
    }
    if let Some(media_type) = consumes {
        def.set_consumes(&[media_type.to_string()]).unwrap();
    }
    def
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: Merge never overwrites a set field
    /// *For any* two definitions, every field set on the more specific one
    /// survives the merge and every unset field takes the less specific value.
    #[test]
    fn prop_merge_preserves_overrides(
        specific_path in proptest::option::of("[a-z]{1,8}"),
        general_path in proptest::option::of("[a-z]{1,8}"),
        specific_method in arb_method(),
        general_method in arb_method(),
        specific_consumes in arb_media_type(),
        general_consumes in arb_media_type(),
    ) {
        let specific = build(specific_path, specific_method, specific_consumes);
        let general = build(general_path, general_method, general_consumes);

        let mut merged = specific.clone();
        merged.join(&general);

        let expected_path = if specific.path() != "/" { specific.path() } else { general.path() };
        prop_assert_eq!(merged.path(), expected_path);
        prop_assert_eq!(merged.http_method(), specific.http_method().or(general.http_method()));
        prop_assert_eq!(merged.consumes(), specific.consumes().or(general.consumes()));
    }
}

#[test]
fn test_merge_replaces_implicit_parameter_only() {
    let mut specific = RouteDefinition::default();
    specific
        .set_arguments(
            &MethodDescriptor::new("find")
                .param(ParamDescriptor::new(TypeRef::string()))
                .param(ParamDescriptor::new(TypeRef::string()).header("X-Lang")),
        )
        .unwrap();

    let mut general = definition(&[Annotation::Get, Annotation::path("find")]);
    general
        .set_arguments(
            &MethodDescriptor::new("find")
                .param(ParamDescriptor::new(TypeRef::string()).query("q"))
                .param(ParamDescriptor::new(TypeRef::string()).query("lang")),
        )
        .unwrap();

    specific.join(&general);

    let first = specific.find_parameter(0).unwrap();
    assert_eq!(first.kind(), ParameterKind::Query);
    assert_eq!(first.name(), Some("q"));

    let second = specific.find_parameter(1).unwrap();
    assert_eq!(second.kind(), ParameterKind::Header);
    assert_eq!(second.name(), Some("X-Lang"));

    assert_eq!(specific.to_string(), "GET /find");
}

#[test]
fn test_merge_takes_regex_path_with_indexes() {
    let mut specific = RouteDefinition::default();
    specific
        .set_arguments(&MethodDescriptor::new("get").param(ParamDescriptor::new(TypeRef::long())))
        .unwrap();

    let mut general = definition(&[Annotation::path("users/{id:[0-9]+}")]);
    general
        .set_arguments(&MethodDescriptor::new("get").param(ParamDescriptor::new(TypeRef::long()).path("id")))
        .unwrap();

    specific.join(&general);

    assert!(specific.path_is_regex());
    assert_eq!(specific.find_parameter(0).unwrap().path_index(), Some(2));
}

#[test]
fn test_definition_serializes_set_fields() {
    let def = definition(&[Annotation::Get, Annotation::path("echo")]);
    let json = serde_json::to_value(&def).unwrap();

    assert_eq!(json["path"], "/echo");
    assert_eq!(json["method"], "GET");
    assert!(json.get("consumes").is_none());
}
