//! Common types for route metadata
//!
//! These are the shared vocabulary of the descriptor table, the route
//! definitions and the binding engine: type references, HTTP methods,
//! media types and parameter kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Type References
// =============================================================================

/// Reference to a declared parameter or target type.
///
/// Types are compared by name. A primitive type cannot represent absence, so
/// an unresolved argument of a primitive type is a binding error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    name: String,
    primitive: bool,
}

impl TypeRef {
    /// A non-primitive (nullable) type with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primitive: false,
        }
    }

    /// A primitive type with the given name (`int`, `boolean`, ...).
    pub fn primitive(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primitive: true,
        }
    }

    pub fn string() -> Self {
        Self::named("String")
    }

    pub fn int() -> Self {
        Self::primitive("int")
    }

    pub fn long() -> Self {
        Self::primitive("long")
    }

    pub fn boolean() -> Self {
        Self::primitive("boolean")
    }

    pub fn double() -> Self {
        Self::primitive("double")
    }

    /// Boxed integer, accepts absence.
    pub fn integer() -> Self {
        Self::named("Integer")
    }

    /// The type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if this type cannot represent absence.
    pub fn is_primitive(&self) -> bool {
        self.primitive
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// =============================================================================
// HTTP Methods
// =============================================================================

/// HTTP method a route responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Trace,
    Connect,
}

impl HttpMethod {
    /// All known methods, in declaration order.
    pub const ALL: [HttpMethod; 9] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Delete,
        Self::Patch,
        Self::Head,
        Self::Options,
        Self::Trace,
        Self::Connect,
    ];

    /// Returns the string representation of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
            Self::Connect => "CONNECT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    /// Case-insensitive lookup by method name.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| format!("Unknown HTTP method '{}'", value))
    }
}

// =============================================================================
// Media Types
// =============================================================================

/// Parsed media type such as `application/json;charset=UTF-8`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaType {
    kind: String,
    subtype: String,
    params: Vec<(String, String)>,
}

/// Key used when no media type is given.
pub const WILDCARD_MEDIA_TYPE: &str = "*/*";

impl MediaType {
    /// Parse a media type, returning `None` for blank or malformed input.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        let mut parts = value.split(';');
        let essence = parts.next()?.trim();
        let (kind, subtype) = essence.split_once('/')?;
        let (kind, subtype) = (kind.trim(), subtype.trim());
        if kind.is_empty() || subtype.is_empty() || kind.contains(' ') || subtype.contains(' ') {
            return None;
        }

        let params = parts
            .filter_map(|param| {
                let (name, value) = param.split_once('=')?;
                let name = name.trim();
                let value = value.trim().trim_matches('"');
                (!name.is_empty()).then(|| (name.to_ascii_lowercase(), value.to_string()))
            })
            .collect();

        Some(Self {
            kind: kind.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            params,
        })
    }

    /// Registry key for an optional media type: `type/subtype` or `*/*`.
    pub fn key_of(media_type: Option<&MediaType>) -> String {
        media_type
            .map(MediaType::key)
            .unwrap_or_else(|| WILDCARD_MEDIA_TYPE.to_string())
    }

    /// The `type/subtype` essence, without parameters.
    pub fn key(&self) -> String {
        format!("{}/{}", self.kind, self.subtype)
    }

    /// Value of a parameter such as `charset`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_wildcard(&self) -> bool {
        self.kind == "*" && self.subtype == "*"
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.subtype)?;
        for (name, value) in &self.params {
            write!(f, ";{}={}", name, value)?;
        }
        Ok(())
    }
}

impl Serialize for MediaType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MediaType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        MediaType::parse(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid media type '{}'", value)))
    }
}

// =============================================================================
// Parameter Kinds
// =============================================================================

/// Where a method parameter takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    Path,
    Query,
    Header,
    Cookie,
    Form,
    Matrix,
    Body,
    Bean,
    Context,
}

impl ParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Cookie => "cookie",
            Self::Form => "form",
            Self::Matrix => "matrix",
            Self::Body => "body",
            Self::Bean => "bean",
            Self::Context => "context",
        }
    }

    /// Returns true if values of this kind are looked up by an external name.
    pub fn is_named(&self) -> bool {
        !matches!(self, Self::Body | Self::Bean | Self::Context)
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
