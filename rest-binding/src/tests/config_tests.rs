//! Configuration tests

use crate::config::{ConfigValidationError, RestConfig};

#[test]
fn test_defaults_are_valid() {
    let config = RestConfig::default();

    assert_eq!(config.context_key_prefix, "RestRouter-");
    assert_eq!(config.default_media_type, "*/*");
    assert_eq!(config.root_type_name, "Object");
    assert!(config.validate().is_ok());
    assert_eq!(RestConfig::new(), config);
}

#[test]
fn test_empty_prefix_rejected() {
    let config = RestConfig::new().with_context_key_prefix("");
    assert_eq!(config.validate(), Err(ConfigValidationError::EmptyContextKeyPrefix));
}

#[test]
fn test_blank_root_type_rejected() {
    let config = RestConfig::new().with_root_type_name("  ");
    assert_eq!(config.validate(), Err(ConfigValidationError::EmptyRootTypeName));
}

#[test]
fn test_malformed_default_media_type_rejected() {
    let config = RestConfig::new().with_default_media_type("json");

    let err = config.validate().unwrap_err();
    assert_eq!(err, ConfigValidationError::InvalidDefaultMediaType("json".into()));
    assert_eq!(err.to_string(), "default_media_type 'json' is not a media type");
}

#[test]
fn test_missing_fields_take_defaults() {
    let config: RestConfig =
        serde_json::from_str(r#"{ "root_type_name": "java.lang.Object" }"#).unwrap();

    assert_eq!(config.root_type_name, "java.lang.Object");
    assert_eq!(config.context_key_prefix, "RestRouter-");
    assert!(config.validate().is_ok());
}
