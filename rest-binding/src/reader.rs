//! Value readers
//!
//! A [`ValueReader`] converts the raw string extracted from a request into the
//! argument value of a target type. A [`ValueReaderRegistry`] selects the
//! reader for a parameter.
//!
//! [`ReaderFactory`] looks readers up in this order:
//!
//! 1. the reader named by the parameter override
//! 2. for body parameters, the reader of each consumed media type in order,
//!    then the reader of the configured default media type
//! 3. the reader registered for the parameter's data type
//! 4. [`GenericValueReader`]

use crate::config::RestConfig;
use crate::context::RequestContext;
use crate::error::{BoxError, RegistryError};
use crate::parameter::MethodParameter;
use crate::provider::InjectionProvider;
use crate::types::{MediaType, TypeRef};
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::trace;

/// Media type key of the built-in JSON body reader.
pub const APPLICATION_JSON: &str = "application/json";

// =============================================================================
// Traits
// =============================================================================

/// Converts a raw request value into an argument.
pub trait ValueReader: Send + Sync {
    /// `Ok(None)` means no value; primitive targets then fail the binding.
    fn read(&self, raw: Option<&str>, target: &TypeRef) -> Result<Option<Value>, BoxError>;
}

impl<F> ValueReader for F
where
    F: Fn(Option<&str>, &TypeRef) -> Result<Option<Value>, BoxError> + Send + Sync,
{
    fn read(&self, raw: Option<&str>, target: &TypeRef) -> Result<Option<Value>, BoxError> {
        (self)(raw, target)
    }
}

/// Selects the reader for a parameter.
pub trait ValueReaderRegistry: Send + Sync {
    /// `media_types` is the route's consumed list for body parameters and
    /// `None` for all others.
    fn get(
        &self,
        param: &MethodParameter,
        reader: Option<&str>,
        injection: &dyn InjectionProvider,
        request: &dyn RequestContext,
        media_types: Option<&[MediaType]>,
    ) -> Result<Arc<dyn ValueReader>, BoxError>;
}

// =============================================================================
// Built-in Readers
// =============================================================================

/// Conversion failure of the built-in readers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot convert '{value}' to {target}: {reason}")]
pub struct ConversionError {
    pub value: String,
    pub target: String,
    pub reason: String,
}

impl ConversionError {
    fn new(value: &str, target: &TypeRef, reason: String) -> Self {
        Self {
            value: value.to_string(),
            target: target.name().to_string(),
            reason,
        }
    }
}

/// Converts strings into booleans, integers, floats, characters and strings.
/// Unknown target types receive the string unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericValueReader;

impl GenericValueReader {
    fn convert(raw: &str, target: &TypeRef) -> Result<Value, ConversionError> {
        let trimmed = raw.trim();
        let fail = |reason: String| ConversionError::new(raw, target, reason);

        let value = match target.name() {
            "boolean" | "Boolean" | "bool" => match trimmed.to_ascii_lowercase().as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => return Err(fail("expected true or false".into())),
            },
            "byte" | "Byte" | "i8" => {
                Value::from(trimmed.parse::<i8>().map_err(|e| fail(e.to_string()))?)
            }
            "short" | "Short" | "i16" => {
                Value::from(trimmed.parse::<i16>().map_err(|e| fail(e.to_string()))?)
            }
            "int" | "Integer" | "i32" => {
                Value::from(trimmed.parse::<i32>().map_err(|e| fail(e.to_string()))?)
            }
            "long" | "Long" | "i64" => {
                Value::from(trimmed.parse::<i64>().map_err(|e| fail(e.to_string()))?)
            }
            "float" | "Float" | "double" | "Double" | "f32" | "f64" => {
                let number = trimmed.parse::<f64>().map_err(|e| fail(e.to_string()))?;
                serde_json::Number::from_f64(number)
                    .map(Value::Number)
                    .ok_or_else(|| fail("not a finite number".into()))?
            }
            "char" | "Character" => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Value::String(c.to_string()),
                    _ => return Err(fail("expected a single character".into())),
                }
            }
            _ => Value::String(raw.to_string()),
        };

        Ok(value)
    }
}

impl ValueReader for GenericValueReader {
    fn read(&self, raw: Option<&str>, target: &TypeRef) -> Result<Option<Value>, BoxError> {
        match raw {
            Some(raw) => Ok(Some(Self::convert(raw, target)?)),
            None => Ok(None),
        }
    }
}

/// Parses the raw value as JSON. Blank input is no value.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonValueReader;

impl ValueReader for JsonValueReader {
    fn read(&self, raw: Option<&str>, _target: &TypeRef) -> Result<Option<Value>, BoxError> {
        match raw {
            Some(raw) if !raw.trim().is_empty() => Ok(Some(serde_json::from_str(raw)?)),
            _ => Ok(None),
        }
    }
}

// =============================================================================
// Reader Factory
// =============================================================================

/// Reference [`ValueReaderRegistry`].
pub struct ReaderFactory {
    config: RestConfig,
    by_name: DashMap<String, Arc<dyn ValueReader>>,
    by_type: DashMap<String, Arc<dyn ValueReader>>,
    by_media_type: DashMap<String, Arc<dyn ValueReader>>,
    generic: Arc<dyn ValueReader>,
}

impl ReaderFactory {
    /// Create a factory with the JSON body reader registered.
    pub fn new(config: RestConfig) -> Self {
        let factory = Self {
            config,
            by_name: DashMap::new(),
            by_type: DashMap::new(),
            by_media_type: DashMap::new(),
            generic: Arc::new(GenericValueReader),
        };
        factory.register_for_media_type(APPLICATION_JSON, JsonValueReader);
        factory
    }

    /// Register a reader selected by name through a parameter override.
    pub fn register<R>(&self, name: impl Into<String>, reader: R)
    where
        R: ValueReader + 'static,
    {
        self.by_name.insert(name.into(), Arc::new(reader));
    }

    pub fn register_for_type<R>(&self, type_name: impl Into<String>, reader: R)
    where
        R: ValueReader + 'static,
    {
        self.by_type.insert(type_name.into(), Arc::new(reader));
    }

    /// Register a body reader. Parameters of the media type are ignored.
    pub fn register_for_media_type<R>(&self, media_type: &str, reader: R)
    where
        R: ValueReader + 'static,
    {
        self.by_media_type
            .insert(media_type_key(media_type), Arc::new(reader));
    }

    fn for_media_type(&self, key: &str) -> Option<Arc<dyn ValueReader>> {
        self.by_media_type
            .get(key)
            .map(|found| Arc::clone(found.value()))
    }
}

impl Default for ReaderFactory {
    fn default() -> Self {
        Self::new(RestConfig::default())
    }
}

fn media_type_key(media_type: &str) -> String {
    MediaType::parse(media_type)
        .map(|parsed| parsed.key())
        .unwrap_or_else(|| media_type.trim().to_ascii_lowercase())
}

impl ValueReaderRegistry for ReaderFactory {
    fn get(
        &self,
        param: &MethodParameter,
        reader: Option<&str>,
        _injection: &dyn InjectionProvider,
        _request: &dyn RequestContext,
        media_types: Option<&[MediaType]>,
    ) -> Result<Arc<dyn ValueReader>, BoxError> {
        if let Some(name) = reader {
            return self
                .by_name
                .get(name)
                .map(|found| Arc::clone(found.value()))
                .ok_or_else(|| RegistryError::UnknownReader(name.to_string()).into());
        }

        if param.is_body() {
            let consumed = media_types.unwrap_or_default().iter().map(MediaType::key);
            let fallback = media_type_key(&self.config.default_media_type);

            for key in consumed.chain(std::iter::once(fallback)) {
                if let Some(found) = self.for_media_type(&key) {
                    trace!(param = %param, media_type = %key, "Selected body reader");
                    return Ok(found);
                }
            }
        }

        if let Some(found) = self.by_type.get(param.data_type().name()) {
            return Ok(Arc::clone(found.value()));
        }

        Ok(Arc::clone(&self.generic))
    }
}
