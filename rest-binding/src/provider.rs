//! Context providers and bean injection
//!
//! Context parameters receive values that are not read from the request
//! itself but derived from it, such as an authenticated user or the request
//! id. A [`ContextProvider`] computes such a value once per binding pass; the
//! value is stored in the request data store under the key returned by
//! [`ContextProviderRegistry::context_key`] and read back from there.
//!
//! Bean parameters are constructed whole by an [`InjectionProvider`].
//!
//! Closures implement both provider traits:
//!
//! ```rust,ignore
//! let providers = ContextProviderFactory::new(RestConfig::default());
//! providers.register_for_type("User", |request: &dyn RequestContext| -> Result<_, BoxError> {
//!     Ok(request.header("X-User").map(|name| json!({ "name": name })))
//! });
//! ```

use crate::config::RestConfig;
use crate::context::RequestContext;
use crate::error::{BoxError, RegistryError};
use crate::types::TypeRef;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::trace;

/// Type name of the built-in request id context.
pub const REQUEST_ID_TYPE: &str = "RequestId";

// =============================================================================
// Traits
// =============================================================================

/// Computes a context value from the request.
pub trait ContextProvider: Send + Sync {
    fn provide(&self, request: &dyn RequestContext) -> Result<Option<Value>, BoxError>;
}

impl<F> ContextProvider for F
where
    F: Fn(&dyn RequestContext) -> Result<Option<Value>, BoxError> + Send + Sync,
{
    fn provide(&self, request: &dyn RequestContext) -> Result<Option<Value>, BoxError> {
        (self)(request)
    }
}

/// Lookup of context providers and of stored context values.
pub trait ContextProviderRegistry: Send + Sync {
    /// The provider for a target type, or the named override. `None` when
    /// the type has no provider; the value may still be in the data store.
    fn get(
        &self,
        target: &TypeRef,
        provider: Option<&str>,
        injection: &dyn InjectionProvider,
        request: &dyn RequestContext,
    ) -> Result<Option<Arc<dyn ContextProvider>>, BoxError>;

    /// Request data store key of a context value.
    fn context_key(&self, target: &TypeRef) -> String;

    /// Read a context value back from the request, falling back to the
    /// parameter default.
    fn provide_context(
        &self,
        target: &TypeRef,
        default_value: Option<&str>,
        request: &dyn RequestContext,
    ) -> Result<Option<Value>, BoxError>;
}

/// Constructs bean parameters.
pub trait InjectionProvider: Send + Sync {
    fn new_instance(&self, target: &TypeRef, request: &dyn RequestContext) -> Result<Value, BoxError>;
}

/// Constructs one bean type.
pub trait BeanConstructor: Send + Sync {
    fn construct(&self, request: &dyn RequestContext) -> Result<Value, BoxError>;
}

impl<F> BeanConstructor for F
where
    F: Fn(&dyn RequestContext) -> Result<Value, BoxError> + Send + Sync,
{
    fn construct(&self, request: &dyn RequestContext) -> Result<Value, BoxError> {
        (self)(request)
    }
}

// =============================================================================
// Context Provider Factory
// =============================================================================

/// Reference [`ContextProviderRegistry`]: providers registered by target type
/// name and by override name.
pub struct ContextProviderFactory {
    config: RestConfig,
    by_type: DashMap<String, Arc<dyn ContextProvider>>,
    by_name: DashMap<String, Arc<dyn ContextProvider>>,
}

impl ContextProviderFactory {
    /// Create a factory with the built-in request id provider.
    pub fn new(config: RestConfig) -> Self {
        let factory = Self {
            config,
            by_type: DashMap::new(),
            by_name: DashMap::new(),
        };
        factory.register_for_type(
            REQUEST_ID_TYPE,
            |request: &dyn RequestContext| -> Result<Option<Value>, BoxError> {
                Ok(request.request_id().map(|id| Value::String(id.to_string())))
            },
        );
        factory
    }

    pub fn register_for_type<P>(&self, type_name: impl Into<String>, provider: P)
    where
        P: ContextProvider + 'static,
    {
        self.by_type.insert(type_name.into(), Arc::new(provider));
    }

    /// Register a provider selected by name through a parameter override.
    pub fn register<P>(&self, name: impl Into<String>, provider: P)
    where
        P: ContextProvider + 'static,
    {
        self.by_name.insert(name.into(), Arc::new(provider));
    }
}

impl Default for ContextProviderFactory {
    fn default() -> Self {
        Self::new(RestConfig::default())
    }
}

impl ContextProviderRegistry for ContextProviderFactory {
    fn get(
        &self,
        target: &TypeRef,
        provider: Option<&str>,
        _injection: &dyn InjectionProvider,
        _request: &dyn RequestContext,
    ) -> Result<Option<Arc<dyn ContextProvider>>, BoxError> {
        if let Some(name) = provider {
            return match self.by_name.get(name) {
                Some(found) => Ok(Some(Arc::clone(found.value()))),
                None => Err(RegistryError::UnknownContextProvider(name.to_string()).into()),
            };
        }

        Ok(self
            .by_type
            .get(target.name())
            .map(|found| Arc::clone(found.value())))
    }

    fn context_key(&self, target: &TypeRef) -> String {
        format!("{}{}", self.config.context_key_prefix, target.name())
    }

    fn provide_context(
        &self,
        target: &TypeRef,
        default_value: Option<&str>,
        request: &dyn RequestContext,
    ) -> Result<Option<Value>, BoxError> {
        let key = self.context_key(target);
        if let Some(value) = request.data(&key) {
            return Ok(Some(value.clone()));
        }

        trace!(key = %key, "No stored context value, using default");
        Ok(default_value.map(|value| Value::String(value.to_string())))
    }
}

// =============================================================================
// Bean Factory
// =============================================================================

/// Reference [`InjectionProvider`]: constructors registered by type name.
#[derive(Default)]
pub struct BeanFactory {
    constructors: DashMap<String, Arc<dyn BeanConstructor>>,
}

impl BeanFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<C>(&self, type_name: impl Into<String>, constructor: C)
    where
        C: BeanConstructor + 'static,
    {
        self.constructors.insert(type_name.into(), Arc::new(constructor));
    }
}

impl InjectionProvider for BeanFactory {
    fn new_instance(&self, target: &TypeRef, request: &dyn RequestContext) -> Result<Value, BoxError> {
        let constructor = self
            .constructors
            .get(target.name())
            .map(|found| Arc::clone(found.value()))
            .ok_or_else(|| RegistryError::UnknownBean(target.name().to_string()))?;

        constructor.construct(request)
    }
}
