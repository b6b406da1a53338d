//! Error types for route collection and argument binding
//!
//! Two kinds of failure exist:
//!
//! - [`ConfigurationError`] is raised at collection time when route metadata
//!   is malformed. It names the owning type and method.
//! - [`BindingError`] is raised per request when a method's arguments cannot
//!   be resolved. It carries the route, the parameter, the expected and the
//!   observed type, and the original cause as its `source()`.
//!
//! Binding errors are categorized by [`BindingErrorKind`], which serializes
//! to SCREAMING_SNAKE_CASE strings for client diagnostics.
//!
//! # Example
//! ```rust,ignore
//! use rest_binding::{BindingError, BindingErrorKind};
//!
//! match rest_binding::get_arguments(&method, &definition, &mut request, &readers, &providers, &beans) {
//!     Ok(args) => invoke(args),
//!     Err(e) if e.kind.is_client_error() => respond(400, e.to_details()),
//!     Err(e) => respond(500, e.to_details()),
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Boxed error returned by collaborators (readers, providers, factories).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Malformed or missing route metadata, detected while collecting routes.
#[derive(Debug, Error)]
#[error("{location} - {message}")]
pub struct ConfigurationError {
    /// Name of the type whose metadata was being collected
    pub type_name: String,
    /// Name of the offending method, if the failure is method-specific
    pub method: Option<String>,
    /// Human-readable error message
    pub message: String,
    location: String,
    #[source]
    source: Option<BoxError>,
}

impl ConfigurationError {
    /// Create a new error for the given type.
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self {
            location: type_name.clone(),
            type_name,
            method: None,
            message: message.into(),
            source: None,
        }
    }

    /// Name the offending method.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        let method = method.into();
        self.location = format!("{}.{}()", self.type_name, method);
        self.method = Some(method);
        self
    }

    /// Chain the underlying cause.
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Malformed annotation metadata, before it is attributed to a type and method.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct MetadataError(pub String);

impl MetadataError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

// =============================================================================
// Registry Errors
// =============================================================================

/// Lookup failures of the reference registries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RegistryError {
    #[error("No value reader registered under '{0}'")]
    UnknownReader(String),
    #[error("No context provider registered under '{0}'")]
    UnknownContextProvider(String),
    #[error("No bean constructor registered for '{0}'")]
    UnknownBean(String),
}

// =============================================================================
// Binding Errors
// =============================================================================

/// Categories of argument binding failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum BindingErrorKind {
    /// A primitive parameter received no value
    MissingArgument,
    /// A value reader failed to convert the extracted value
    InvalidArgument,
    /// A context provider failed or the context could not be read back
    ContextUnavailable,
    /// The injection provider could not construct a bean parameter
    BeanUnavailable,
    /// No value reader could be selected for the parameter
    ReaderUnavailable,
}

impl BindingErrorKind {
    /// Returns the string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingArgument => "MISSING_ARGUMENT",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::ContextUnavailable => "CONTEXT_UNAVAILABLE",
            Self::BeanUnavailable => "BEAN_UNAVAILABLE",
            Self::ReaderUnavailable => "READER_UNAVAILABLE",
        }
    }

    /// Returns true if the request itself is at fault (400-class response).
    pub fn is_client_error(&self) -> bool {
        !self.is_server_error()
    }

    /// Returns true if the failure is a server-side wiring problem.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ReaderUnavailable)
    }
}

impl fmt::Display for BindingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifies the parameter a binding error is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterRef {
    /// Description of the declared parameter, e.g. `query param 'name'`
    Described(String),
    /// Zero-based position of an undeclared parameter
    Position(usize),
}

impl fmt::Display for ParameterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Described(description) => f.write_str(description),
            Self::Position(index) => write!(f, "argument {}", index + 1),
        }
    }
}

/// Observed type name when nothing was extracted from the request.
pub const NO_VALUE: &str = "none";

/// Failure to resolve one argument of a route method.
#[derive(Debug, Error)]
#[error("[{kind}] {message}")]
pub struct BindingError {
    /// Failure category
    pub kind: BindingErrorKind,
    /// The parameter that could not be bound
    pub parameter: ParameterRef,
    /// Route path of the definition being bound
    pub route: String,
    /// Name of the target method
    pub method: String,
    /// Declared type of the argument
    pub expected: String,
    /// Runtime type of the extracted raw value, or [`NO_VALUE`]
    pub provided: String,
    /// Human-readable error message
    pub message: String,
    #[source]
    cause: Option<BoxError>,
}

impl BindingError {
    /// Create a new error. The message is derived from the other fields.
    pub fn new(
        kind: BindingErrorKind,
        parameter: ParameterRef,
        route: impl Into<String>,
        method: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        let mut error = Self {
            kind,
            parameter,
            route: route.into(),
            method: method.into(),
            expected: expected.into(),
            provided: NO_VALUE.to_string(),
            message: String::new(),
            cause: None,
        };
        error.message = error.compose_message();
        error
    }

    /// Record the runtime type of the extracted raw value.
    pub fn with_provided(mut self, provided: impl Into<String>) -> Self {
        self.provided = provided.into();
        self.message = self.compose_message();
        self
    }

    /// Chain the original cause.
    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self.message = self.compose_message();
        self
    }

    /// The chained cause, if any.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// JSON diagnostic for the dispatch layer.
    pub fn to_details(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    fn compose_message(&self) -> String {
        let mut message = match self.kind {
            BindingErrorKind::MissingArgument => format!(
                "Missing {} for: {} in {}(), expected: {}, but: none was provided",
                self.parameter, self.route, self.method, self.expected
            ),
            _ => format!(
                "Invalid parameter type for: {} for: {} in {}(), expected: {}",
                self.parameter, self.route, self.method, self.expected
            ),
        };

        if self.kind != BindingErrorKind::MissingArgument && self.provided != self.expected {
            message.push_str(&format!(", but got: {}", self.provided));
        }

        if let Some(cause) = &self.cause {
            message.push_str(&format!(" -> {}", cause));
        }

        message
    }
}

impl Serialize for BindingError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("BindingError", 8)?;
        state.serialize_field("code", &self.kind)?;
        state.serialize_field("message", &self.message)?;
        state.serialize_field("parameter", &self.parameter.to_string())?;
        state.serialize_field("route", &self.route)?;
        state.serialize_field("method", &self.method)?;
        state.serialize_field("expected", &self.expected)?;
        state.serialize_field("provided", &self.provided)?;

        if let Some(ref cause) = self.cause {
            state.serialize_field("cause", &cause.to_string())?;
        }

        state.end()
    }
}

// =============================================================================
// Umbrella Error
// =============================================================================

/// Any error produced by this crate.
#[derive(Debug, Error)]
pub enum RestError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Binding(#[from] BindingError),
}

/// Result type alias for collection and binding operations.
pub type RestResult<T> = Result<T, RestError>;
