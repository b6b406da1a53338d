//! Raw value extraction from a request
//!
//! Each parameter kind reads its raw string from a different part of the
//! request. Values are returned undecoded except for query values, which are
//! percent-decoded unless the parameter is marked raw.

use crate::context::RequestContext;
use crate::definition::RouteDefinition;
use crate::parameter::MethodParameter;
use crate::types::ParameterKind;
use percent_encoding::percent_decode_str;
use std::collections::HashMap;
use tracing::warn;

/// Prefix of positional path parameter names on regular-expression routes.
pub const POSITIONAL_PARAM_PREFIX: &str = "param";

/// Raw value of a parameter, or its default value when the request has none.
pub fn extract_value(
    definition: &RouteDefinition,
    param: &MethodParameter,
    request: &dyn RequestContext,
) -> Option<String> {
    extract_raw(definition, param, request).or_else(|| param.default_value().map(str::to_string))
}

fn extract_raw(
    definition: &RouteDefinition,
    param: &MethodParameter,
    request: &dyn RequestContext,
) -> Option<String> {
    let name = param.name().unwrap_or_default();

    match param.kind() {
        ParameterKind::Path => {
            let value = if definition.path_is_regex() {
                param
                    .path_index()
                    .and_then(|index| positional_param(request, index))
            } else {
                request.path_param(name).map(str::to_string)
            };
            value.map(|value| remove_matrix_from_path(value, definition))
        }
        ParameterKind::Query => {
            let value = parse_query(request.query()?).remove(name)?;
            if param.is_raw() {
                return Some(value);
            }
            Some(decode_query_value(value))
        }
        ParameterKind::Cookie => request.cookie(name).map(str::to_string),
        ParameterKind::Form => request.form_attribute(name).map(str::to_string),
        ParameterKind::Matrix => matrix_param(request.uri(), name),
        ParameterKind::Header => request.header(name).map(str::to_string),
        ParameterKind::Body => request.body_as_string().map(str::to_string),
        ParameterKind::Bean | ParameterKind::Context => None,
    }
}

/// Positional path parameter: the `param{index}` path parameter if the
/// dispatcher provided one, else segment `index` of the request path below
/// the mount point.
fn positional_param(request: &dyn RequestContext, index: usize) -> Option<String> {
    let key = format!("{}{}", POSITIONAL_PARAM_PREFIX, index);
    if let Some(value) = request.path_param(&key) {
        return Some(value.to_string());
    }

    let path = remove_mount_point(request.mount_point(), request.path());
    path.split('/').nth(index).map(str::to_string)
}

fn remove_mount_point<'a>(mount_point: Option<&str>, path: &'a str) -> &'a str {
    match mount_point {
        Some(mount) if !mount.trim().is_empty() => path.strip_prefix(mount).unwrap_or(path),
        _ => path,
    }
}

/// Drop matrix parameters from a path value when the route declares any.
fn remove_matrix_from_path(value: String, definition: &RouteDefinition) -> String {
    if !definition.has_matrix_params() {
        return value;
    }

    match value.find(';') {
        Some(index) if index > 0 => value[..index].to_string(),
        _ => value,
    }
}

/// Split a raw query string into name/value pairs. Later duplicates replace
/// earlier ones; names and values are left encoded.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) => (name.to_string(), value.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

/// Percent-decode a query value as UTF-8, with `+` as space. Blank values and
/// values that do not decode are returned as given.
pub fn decode_query_value(value: String) -> String {
    if value.trim().is_empty() {
        return value;
    }

    let plus_decoded = value.replace('+', " ");
    match percent_decode_str(&plus_decoded).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            warn!(value = %value, error = %e, "Failed to decode query value");
            value
        }
    }
}

/// First `;name=value` pair of the URI with the given name. Trailing `=`
/// separators are ignored, so `;name=value=` still yields `value`.
pub fn matrix_param(uri: &str, name: &str) -> Option<String> {
    uri.split(';').find_map(|item| {
        let mut parts: Vec<&str> = item.split('=').collect();
        while parts.last().is_some_and(|part| part.is_empty()) {
            parts.pop();
        }

        match parts.as_slice() {
            [key, value] if *key == name => Some(value.to_string()),
            _ => None,
        }
    })
}
