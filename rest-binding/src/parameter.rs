//! Per-parameter binding metadata

use crate::descriptor::{ParamAnnotation, ParamDescriptor};
use crate::error::MetadataError;
use crate::types::{ParameterKind, TypeRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binding metadata for one argument of a route method.
///
/// Built once from a [`ParamDescriptor`] while routes are collected and never
/// changed afterwards. A parameter without any kind annotation binds the
/// request body and is not `explicit`: a less specific hierarchy level may
/// replace it during the merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodParameter {
    index: usize,
    kind: ParameterKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    data_type: TypeRef,
    raw: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    path_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reader: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context_provider: Option<String>,
    used_as_argument: bool,
    explicit: bool,
}

impl MethodParameter {
    /// Create a parameter of the given kind. The data type defaults to the
    /// declared type.
    pub fn new(index: usize, kind: ParameterKind, declared_type: TypeRef) -> Self {
        Self {
            index,
            kind,
            name: None,
            data_type: declared_type,
            raw: false,
            path_index: None,
            default_value: None,
            reader: None,
            context_provider: None,
            used_as_argument: true,
            explicit: true,
        }
    }

    /// Convert the `index`-th declared parameter of a method.
    pub fn from_descriptor(index: usize, param: &ParamDescriptor) -> Result<Self, MetadataError> {
        let kinds: Vec<_> = param.annotations.iter().filter_map(binding_source).collect();
        if kinds.len() > 1 {
            return Err(MetadataError::new(format!(
                "Parameter {} declares more than one binding source",
                index + 1
            )));
        }

        let (kind, name) = kinds.first().copied().unwrap_or((ParameterKind::Body, None));

        if let Some(name) = name
            && name.trim().is_empty()
        {
            return Err(MetadataError::new(format!(
                "Missing name for {} parameter {}",
                kind,
                index + 1
            )));
        }

        let mut parameter = Self::new(index, kind, param.declared_type.clone());
        parameter.name = name.map(|n| n.trim().to_string());
        parameter.explicit = !kinds.is_empty();

        for annotation in &param.annotations {
            match annotation {
                ParamAnnotation::Raw => parameter.raw = true,
                ParamAnnotation::DefaultValue(value) => {
                    parameter.default_value = Some(value.clone())
                }
                ParamAnnotation::PathIndex(path_index) => parameter.path_index = Some(*path_index),
                ParamAnnotation::DataType(data_type) => parameter.data_type = data_type.clone(),
                ParamAnnotation::Reader(reader) => parameter.reader = Some(reader.clone()),
                ParamAnnotation::ContextProvider(provider) => {
                    parameter.context_provider = Some(provider.clone())
                }
                ParamAnnotation::Descriptive => parameter.used_as_argument = false,
                _ => {}
            }
        }

        Ok(parameter)
    }

    /// Set the positional index used on regular-expression paths, unless one
    /// was declared explicitly.
    pub(crate) fn resolve_path_index(&mut self, path_index: Option<usize>) {
        if self.path_index.is_none() {
            self.path_index = path_index;
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn data_type(&self) -> &TypeRef {
        &self.data_type
    }

    pub fn is_raw(&self) -> bool {
        self.raw
    }

    pub fn path_index(&self) -> Option<usize> {
        self.path_index
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn reader(&self) -> Option<&str> {
        self.reader.as_deref()
    }

    pub fn context_provider(&self) -> Option<&str> {
        self.context_provider.as_deref()
    }

    pub fn is_used_as_argument(&self) -> bool {
        self.used_as_argument
    }

    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    pub fn is_body(&self) -> bool {
        self.kind == ParameterKind::Body
    }
}

/// Kind and external name selected by a parameter annotation.
fn binding_source(annotation: &ParamAnnotation) -> Option<(ParameterKind, Option<&String>)> {
    match annotation {
        ParamAnnotation::Path(name) => Some((ParameterKind::Path, Some(name))),
        ParamAnnotation::Query(name) => Some((ParameterKind::Query, Some(name))),
        ParamAnnotation::Header(name) => Some((ParameterKind::Header, Some(name))),
        ParamAnnotation::Cookie(name) => Some((ParameterKind::Cookie, Some(name))),
        ParamAnnotation::Form(name) => Some((ParameterKind::Form, Some(name))),
        ParamAnnotation::Matrix(name) => Some((ParameterKind::Matrix, Some(name))),
        ParamAnnotation::Body => Some((ParameterKind::Body, None)),
        ParamAnnotation::Bean => Some((ParameterKind::Bean, None)),
        ParamAnnotation::Context => Some((ParameterKind::Context, None)),
        _ => None,
    }
}

impl fmt::Display for MethodParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} param '{}'", self.kind, name),
            None => write!(f, "{} param ({})", self.kind, self.data_type),
        }
    }
}
