//! Route definitions
//!
//! A [`RouteDefinition`] is the normalized route metadata of one method
//! signature: path, HTTP method, consumed and produced media types, and the
//! binding metadata of every parameter. It is built by layering method-level
//! annotations over a type-level root definition, then merged with the
//! definitions of matching methods further up the type hierarchy.
//!
//! # Paths
//!
//! Paths always start with exactly one `/` and never end with one, except
//! for the root path `/`. Joining a sub-path onto the root replaces it;
//! joining onto any other path appends. Path segments may be templates:
//!
//! - `{name}` and `:name` bind a named path parameter
//! - `{name:regex}` binds a parameter constrained by a regular expression;
//!   a route with at least one of these is a regular-expression route and
//!   its path parameters are read by position
//!
//! # Merge
//!
//! [`RouteDefinition::join`] fills only unset fields. A path is unset when
//! it is `/`, the method and media types when absent, and a parameter when it
//! was derived without any binding annotation.

use crate::descriptor::{Annotation, MethodDescriptor};
use crate::error::MetadataError;
use crate::parameter::MethodParameter;
use crate::types::{HttpMethod, MediaType, ParameterKind};
use serde::Serialize;
use std::fmt;
use tracing::trace;

/// Path separator and root path.
pub const DELIMITER: &str = "/";

// =============================================================================
// Path Helpers
// =============================================================================

/// Normalize a declared path.
///
/// Adds a missing leading `/`, collapses repeated leading slashes and trims
/// trailing ones. A path made only of slashes is the root `/`. Blank input is
/// rejected.
pub fn normalize_path(path: &str) -> Result<String, MetadataError> {
    if path.trim().is_empty() {
        return Err(MetadataError::new("Missing or empty route path"));
    }

    let inner = path.trim_matches('/');
    if inner.trim().is_empty() {
        return Ok(DELIMITER.to_string());
    }

    Ok(format!("{}{}", DELIMITER, inner))
}

/// Join a sub-path onto a normalized base path.
pub fn join_paths(base: &str, sub_path: &str) -> Result<String, MetadataError> {
    let sub_path = normalize_path(sub_path)?;
    if sub_path == DELIMITER {
        return Ok(base.to_string());
    }
    if base == DELIMITER {
        return Ok(sub_path);
    }
    Ok(format!("{}{}", base, sub_path))
}

/// A template segment of a route path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathParam {
    /// Parameter name as declared in the template
    pub name: String,
    /// Regular expression constraining the segment, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Position of the segment when the path is split on `/`
    pub segment: usize,
}

/// Extract the template parameters of a normalized path.
fn parse_path_params(path: &str) -> Result<Vec<PathParam>, MetadataError> {
    let mut params = Vec::new();

    for (segment, item) in path.split('/').enumerate() {
        let template = match item.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(inner) => Some(inner),
            None => item.strip_prefix(':'),
        };
        let Some(template) = template else {
            continue;
        };

        let (name, pattern) = match template.split_once(':') {
            Some((name, pattern)) if item.starts_with('{') => (name.trim(), Some(pattern.trim())),
            _ => (template.trim(), None),
        };

        if name.is_empty() {
            return Err(MetadataError::new(format!(
                "Path parameter without a name in '{}'",
                path
            )));
        }

        if let Some(pattern) = pattern
            && let Err(e) = regex::Regex::new(pattern)
        {
            return Err(MetadataError::new(format!(
                "Invalid regular expression '{}' for path parameter '{}': {}",
                pattern, name, e
            )));
        }

        params.push(PathParam {
            name: name.to_string(),
            pattern: pattern.map(str::to_string),
            segment,
        });
    }

    Ok(params)
}

// =============================================================================
// Route Definition
// =============================================================================

/// Merged, normalized route metadata for one method signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDefinition {
    path: String,
    #[serde(rename = "method", skip_serializing_if = "Option::is_none")]
    http_method: Option<HttpMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    consumes: Option<Vec<MediaType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    produces: Option<Vec<MediaType>>,
    parameters: Vec<MethodParameter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    path_params: Vec<PathParam>,
    path_is_regex: bool,
}

impl Default for RouteDefinition {
    fn default() -> Self {
        Self {
            path: DELIMITER.to_string(),
            http_method: None,
            consumes: None,
            produces: None,
            parameters: Vec::new(),
            path_params: Vec::new(),
            path_is_regex: false,
        }
    }
}

impl RouteDefinition {
    /// Build a root definition from type-level annotations.
    pub fn root(annotations: &[Annotation]) -> Result<Self, MetadataError> {
        let mut definition = Self::default();
        definition.apply(annotations)?;
        Ok(definition)
    }

    /// Layer method-level annotations over a root definition. Parameters are
    /// not inherited from the base.
    pub fn derive(base: &RouteDefinition, annotations: &[Annotation]) -> Result<Self, MetadataError> {
        let mut definition = Self {
            parameters: Vec::new(),
            ..base.clone()
        };
        definition.apply(annotations)?;
        Ok(definition)
    }

    /// Apply route annotations in declaration order. Later annotations of the
    /// same sort override earlier ones, except paths, which are appended.
    pub fn apply(&mut self, annotations: &[Annotation]) -> Result<(), MetadataError> {
        for annotation in annotations {
            match annotation {
                Annotation::Path(path) => self.add_path(path)?,
                Annotation::Consumes(values) => self.set_consumes(values)?,
                Annotation::Produces(values) => self.set_produces(values)?,
                Annotation::HttpMethod(name) => {
                    let method = name.parse::<HttpMethod>().map_err(MetadataError::new)?;
                    self.http_method = Some(method);
                }
                Annotation::Marker(_) => {}
                other => {
                    if let Some(method) = other.http_method() {
                        self.http_method = Some(method);
                    }
                }
            }
        }
        Ok(())
    }

    /// Append a sub-path. A sub-path of only slashes leaves the path as is.
    pub fn add_path(&mut self, sub_path: &str) -> Result<(), MetadataError> {
        let path = join_paths(&self.path, sub_path)?;
        self.set_path(path)
    }

    fn set_path(&mut self, path: String) -> Result<(), MetadataError> {
        self.path_params = parse_path_params(&path)?;
        self.path_is_regex = self.path_params.iter().any(|p| p.pattern.is_some());
        self.path = path;
        Ok(())
    }

    pub fn set_consumes(&mut self, values: &[String]) -> Result<(), MetadataError> {
        self.consumes = Some(parse_media_types(values, "consumed")?);
        Ok(())
    }

    pub fn set_produces(&mut self, values: &[String]) -> Result<(), MetadataError> {
        self.produces = Some(parse_media_types(values, "produced")?);
        Ok(())
    }

    pub fn set_http_method(&mut self, method: HttpMethod) {
        self.http_method = Some(method);
    }

    /// Convert the full parameter list of a method.
    pub fn set_arguments(&mut self, method: &MethodDescriptor) -> Result<(), MetadataError> {
        self.parameters = method
            .params
            .iter()
            .enumerate()
            .map(|(index, param)| MethodParameter::from_descriptor(index, param))
            .collect::<Result<_, _>>()?;
        self.resolve_path_indexes();
        Ok(())
    }

    /// Merge a less specific definition into this one. Only unset fields are
    /// filled; everything already set here is kept.
    pub fn join(&mut self, other: &RouteDefinition) {
        trace!(route = %self, from = %other, "Merging route definition");

        if self.path == DELIMITER && other.path != DELIMITER {
            self.path = other.path.clone();
            self.path_params = other.path_params.clone();
            self.path_is_regex = other.path_is_regex;
        }

        if self.http_method.is_none() {
            self.http_method = other.http_method;
        }

        if self.consumes.is_none() {
            self.consumes = other.consumes.clone();
        }

        if self.produces.is_none() {
            self.produces = other.produces.clone();
        }

        for parameter in &other.parameters {
            if !parameter.is_explicit() {
                continue;
            }
            match self.parameters.get_mut(parameter.index()) {
                Some(existing) if !existing.is_explicit() => *existing = parameter.clone(),
                Some(_) => {}
                None => self.parameters.push(parameter.clone()),
            }
        }
        self.parameters.sort_by_key(MethodParameter::index);

        self.resolve_path_indexes();
    }

    /// Fill the positional index of path parameters from the path template.
    pub fn resolve_path_indexes(&mut self) {
        let path_params = &self.path_params;
        for parameter in &mut self.parameters {
            if parameter.kind() != ParameterKind::Path {
                continue;
            }
            let segment = parameter.name().and_then(|name| {
                path_params
                    .iter()
                    .find(|p| p.name == name)
                    .map(|p| p.segment)
            });
            parameter.resolve_path_index(segment);
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn http_method(&self) -> Option<HttpMethod> {
        self.http_method
    }

    pub fn consumes(&self) -> Option<&[MediaType]> {
        self.consumes.as_deref()
    }

    pub fn produces(&self) -> Option<&[MediaType]> {
        self.produces.as_deref()
    }

    pub fn parameters(&self) -> &[MethodParameter] {
        &self.parameters
    }

    pub fn path_params(&self) -> &[PathParam] {
        &self.path_params
    }

    /// Returns true if path parameters are addressed by position.
    pub fn path_is_regex(&self) -> bool {
        self.path_is_regex
    }

    /// Returns true if an HTTP method is declared, i.e. the route is dispatchable.
    pub fn is_routable(&self) -> bool {
        self.http_method.is_some()
    }

    /// Returns true if any parameter binds a matrix parameter.
    pub fn has_matrix_params(&self) -> bool {
        self.parameters
            .iter()
            .any(|p| p.kind() == ParameterKind::Matrix)
    }

    /// The parameter bound at the given argument position.
    pub fn find_parameter(&self, index: usize) -> Option<&MethodParameter> {
        self.parameters.iter().find(|p| p.index() == index)
    }
}

fn parse_media_types(values: &[String], what: &str) -> Result<Vec<MediaType>, MetadataError> {
    if values.is_empty() {
        return Err(MetadataError::new(format!(
            "Missing {} media type definition",
            what
        )));
    }

    values
        .iter()
        .map(|value| {
            MediaType::parse(value).ok_or_else(|| {
                MetadataError::new(format!("Invalid {} media type '{}'", what, value))
            })
        })
        .collect()
}

impl fmt::Display for RouteDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.http_method {
            Some(method) => write!(f, "{} {}", method, self.path),
            None => write!(f, "* {}", self.path),
        }
    }
}
