//! Per-request argument binding
//!
//! [`get_arguments`] resolves the call arguments of a route method from a
//! request. For every bound parameter a raw string is extracted from the
//! request (see [`crate::extract`]) and converted:
//!
//! - bean parameters are constructed by the [`InjectionProvider`]
//! - context parameters are computed by a [`ContextProvider`], stored in the
//!   request data store and read back from there
//! - all other parameters are converted by the [`ValueReader`] the registry
//!   selects for them
//!
//! A position left without a value is an error when its declared type is
//! primitive.
//!
//! # Example
//! ```rust,ignore
//! let entry = table.find_by_name("echo").unwrap();
//! let mut request = HttpRequest::get("/interface/echo?name=world");
//!
//! let args = get_arguments(
//!     &entry.method,
//!     &entry.definition,
//!     &mut request,
//!     &readers,
//!     &providers,
//!     &beans,
//! )?;
//! assert_eq!(args, vec![Some(json!("world"))]);
//! ```
//!
//! [`ContextProvider`]: crate::provider::ContextProvider
//! [`ValueReader`]: crate::reader::ValueReader

use crate::context::RequestContext;
use crate::definition::RouteDefinition;
use crate::descriptor::MethodDescriptor;
use crate::error::{BindingError, BindingErrorKind, BoxError, NO_VALUE, ParameterRef};
use crate::extract::extract_value;
use crate::parameter::MethodParameter;
use crate::provider::{ContextProviderRegistry, InjectionProvider};
use crate::reader::ValueReaderRegistry;
use crate::types::{ParameterKind, TypeRef};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug_span, trace};

/// Runtime type reported for an extracted raw value.
const RAW_VALUE_TYPE: &str = "String";

/// Resolve the arguments of `method` from `request`.
///
/// The result has one entry per declared parameter. Zero-parameter methods
/// get an empty vector without touching the request.
pub fn get_arguments(
    method: &MethodDescriptor,
    definition: &RouteDefinition,
    request: &mut dyn RequestContext,
    readers: &dyn ValueReaderRegistry,
    providers: &dyn ContextProviderRegistry,
    injection: &dyn InjectionProvider,
) -> Result<Vec<Option<Value>>, BindingError> {
    let arity = method.arity();
    if arity == 0 {
        return Ok(Vec::new());
    }

    let request_id = request
        .request_id()
        .map(|id| id.to_string())
        .unwrap_or_default();
    let span = debug_span!(
        "get_arguments",
        method = %method.name,
        route = %definition,
        request_id = %request_id
    );
    let _enter = span.enter();

    let mut binder = ArgumentBinder {
        method,
        definition,
        readers,
        providers,
        injection,
        resolved: HashMap::new(),
    };

    let mut args = vec![None; arity];
    for param in definition.parameters() {
        if !param.is_used_as_argument() || param.index() >= arity {
            continue;
        }

        let value = binder.bind(param, request)?;
        trace!(param = %param, bound = value.is_some(), "Bound argument");
        args[param.index()] = value.filter(|v| !v.is_null());
    }

    for (index, (arg, declared)) in args.iter().zip(method.param_types()).enumerate() {
        if arg.is_none() && declared.is_primitive() {
            let parameter = definition
                .find_parameter(index)
                .map(|p| ParameterRef::Described(p.to_string()))
                .unwrap_or(ParameterRef::Position(index));

            return Err(BindingError::new(
                BindingErrorKind::MissingArgument,
                parameter,
                definition.path(),
                &method.name,
                declared.name(),
            ));
        }
    }

    Ok(args)
}

/// State of one binding pass.
struct ArgumentBinder<'a> {
    method: &'a MethodDescriptor,
    definition: &'a RouteDefinition,
    readers: &'a dyn ValueReaderRegistry,
    providers: &'a dyn ContextProviderRegistry,
    injection: &'a dyn InjectionProvider,
    /// Context values computed in this pass, by context key
    resolved: HashMap<String, Value>,
}

impl ArgumentBinder<'_> {
    fn bind(
        &mut self,
        param: &MethodParameter,
        request: &mut dyn RequestContext,
    ) -> Result<Option<Value>, BindingError> {
        let target = param.data_type();

        match param.kind() {
            ParameterKind::Bean => self
                .injection
                .new_instance(target, &*request)
                .map(Some)
                .map_err(|e| self.error(BindingErrorKind::BeanUnavailable, param, None, e)),
            ParameterKind::Context => self.bind_context(param, request),
            _ => {
                let value = extract_value(self.definition, param, &*request);
                self.read(param, value.as_deref(), &*request)
            }
        }
    }

    fn bind_context(
        &mut self,
        param: &MethodParameter,
        request: &mut dyn RequestContext,
    ) -> Result<Option<Value>, BindingError> {
        let target = param.data_type();
        let provider = self
            .providers
            .get(target, param.context_provider(), self.injection, &*request)
            .map_err(|e| self.unavailable(param, e))?;

        if let Some(provider) = provider {
            let key = self.providers.context_key(target);
            if !self.resolved.contains_key(&key) {
                let result = provider
                    .provide(&*request)
                    .map_err(|e| self.unavailable(param, e))?;
                if let Some(result) = result {
                    trace!(key = %key, "Resolved context value");
                    request.put_data(&key, result.clone());
                    self.resolved.insert(key, result);
                }
            }
        }

        self.providers
            .provide_context(self.declared_type(param), param.default_value(), &*request)
            .map_err(|e| self.unavailable(param, e))
    }

    fn unavailable(&self, param: &MethodParameter, cause: BoxError) -> BindingError {
        self.error(BindingErrorKind::ContextUnavailable, param, None, cause)
    }

    fn read(
        &self,
        param: &MethodParameter,
        value: Option<&str>,
        request: &dyn RequestContext,
    ) -> Result<Option<Value>, BindingError> {
        let media_types = if param.is_body() {
            self.definition.consumes()
        } else {
            None
        };

        let reader = self
            .readers
            .get(param, param.reader(), self.injection, request, media_types)
            .map_err(|e| self.error(BindingErrorKind::ReaderUnavailable, param, value, e))?;

        reader
            .read(value, param.data_type())
            .map_err(|e| self.error(BindingErrorKind::InvalidArgument, param, value, e))
    }

    fn declared_type<'p>(&'p self, param: &'p MethodParameter) -> &'p TypeRef {
        self.method
            .params
            .get(param.index())
            .map(|p| &p.declared_type)
            .unwrap_or_else(|| param.data_type())
    }

    fn error(
        &self,
        kind: BindingErrorKind,
        param: &MethodParameter,
        value: Option<&str>,
        cause: BoxError,
    ) -> BindingError {
        let parameter = self
            .definition
            .find_parameter(param.index())
            .map(|p| ParameterRef::Described(p.to_string()))
            .unwrap_or(ParameterRef::Position(param.index()));
        let provided = if value.is_some() {
            RAW_VALUE_TYPE
        } else {
            NO_VALUE
        };

        BindingError::new(
            kind,
            parameter,
            self.definition.path(),
            &self.method.name,
            self.declared_type(param).name(),
        )
        .with_provided(provided)
        .with_cause(cause)
    }
}
