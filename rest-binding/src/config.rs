//! Configuration module for route collection and binding.
//!
//! This module provides the [`RestConfig`] struct shared by the collector and
//! the reference registries.
//!
//! # Example
//! ```rust,ignore
//! use rest_binding::RestConfig;
//!
//! let config = RestConfig::new()
//!     .with_context_key_prefix("App-")
//!     .with_root_type_name("java.lang.Object");
//! config.validate()?;
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error type for configuration validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigValidationError {
    /// context_key_prefix must not be empty
    EmptyContextKeyPrefix,
    /// root_type_name must not be empty
    EmptyRootTypeName,
    /// default_media_type must parse as a media type
    InvalidDefaultMediaType(String),
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyContextKeyPrefix => write!(f, "context_key_prefix cannot be empty"),
            Self::EmptyRootTypeName => write!(f, "root_type_name cannot be empty"),
            Self::InvalidDefaultMediaType(value) => {
                write!(f, "default_media_type '{}' is not a media type", value)
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Settings for collection and the reference registries.
///
/// # Fields
///
/// * `context_key_prefix` - Prefix of the request data key under which a
///   resolved context value is stored. Default: `"RestRouter-"`.
///
/// * `default_media_type` - Media type used to select a body reader when a
///   route declares no consumed types. Default: `"*/*"`.
///
/// * `root_type_name` - Name of the universal root type. Its methods never
///   become routes and the hierarchy walk stops there. Default: `"Object"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestConfig {
    /// Prefix for context keys in the request data store (default: "RestRouter-")
    pub context_key_prefix: String,
    /// Fallback media type for body reader selection (default: "*/*")
    pub default_media_type: String,
    /// Universal root type name (default: "Object")
    pub root_type_name: String,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            context_key_prefix: "RestRouter-".to_string(),
            default_media_type: crate::types::WILDCARD_MEDIA_TYPE.to_string(),
            root_type_name: "Object".to_string(),
        }
    }
}

impl RestConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.context_key_prefix.is_empty() {
            return Err(ConfigValidationError::EmptyContextKeyPrefix);
        }
        if self.root_type_name.trim().is_empty() {
            return Err(ConfigValidationError::EmptyRootTypeName);
        }
        if crate::types::MediaType::parse(&self.default_media_type).is_none() {
            return Err(ConfigValidationError::InvalidDefaultMediaType(
                self.default_media_type.clone(),
            ));
        }
        Ok(())
    }

    /// Set the context key prefix.
    #[must_use = "This method returns a new RestConfig and does not modify self"]
    pub fn with_context_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.context_key_prefix = prefix.into();
        self
    }

    /// Set the fallback media type for body readers.
    #[must_use = "This method returns a new RestConfig and does not modify self"]
    pub fn with_default_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.default_media_type = media_type.into();
        self
    }

    /// Set the universal root type name.
    #[must_use = "This method returns a new RestConfig and does not modify self"]
    pub fn with_root_type_name(mut self, name: impl Into<String>) -> Self {
        self.root_type_name = name.into();
        self
    }
}
