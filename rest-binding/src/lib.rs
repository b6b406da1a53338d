//! # REST Binding
//!
//! Route metadata collection and per-request argument binding for annotated
//! REST endpoint types.
//!
//! ## Overview
//!
//! The crate works in two stages:
//! - **Collection** runs once per endpoint type at startup. The type's
//!   annotations and those of its interfaces and superclasses are merged into
//!   one normalized [`RouteDefinition`] per method signature.
//! - **Binding** runs once per request, after a dispatcher has selected the
//!   route. [`get_arguments`] resolves the call arguments of the target method
//!   from the request through pluggable readers and providers.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐   collect    ┌──────────────────────────────┐
//! │ TypeDescriptor table │ ───────────▶ │ RouteTable                   │
//! │ (annotations, types) │              │ RouteDefinition → method     │
//! └──────────────────────┘              └──────────────┬───────────────┘
//!                                                      │ per request
//!                                                      ▼
//! ┌──────────────────────┐              ┌──────────────────────────────┐
//! │ RequestContext       │ ───────────▶ │ get_arguments                │
//! └──────────────────────┘              │  extract → read / provide    │
//!                                       └──────────────┬───────────────┘
//!                                                      ▼
//!                                          Vec<Option<serde_json::Value>>
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rest_binding::prelude::*;
//!
//! let api = TypeDescriptor::interface("InterfaceRest")
//!     .annotate(Annotation::path("interface"))
//!     .method(
//!         MethodDescriptor::new("echo")
//!             .annotate(Annotation::Get)
//!             .annotate(Annotation::path("echo"))
//!             .param(ParamDescriptor::new(TypeRef::string()).query("name")),
//!     )
//!     .build();
//!
//! let table = collect(&api)?;
//! let entry = table.find_by_name("echo").unwrap();
//!
//! let config = RestConfig::default();
//! let readers = ReaderFactory::new(config.clone());
//! let providers = ContextProviderFactory::new(config);
//! let beans = BeanFactory::new();
//!
//! let mut request = HttpRequest::get("/interface/echo?name=world");
//! let args = get_arguments(
//!     &entry.method,
//!     &entry.definition,
//!     &mut request,
//!     &readers,
//!     &providers,
//!     &beans,
//! )?;
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` events and spans but installs no subscriber.

pub mod binding;
pub mod collector;
mod config;
pub mod context;
pub mod definition;
pub mod descriptor;
mod error;
pub mod extract;
pub mod parameter;
pub mod provider;
pub mod reader;
pub mod signature;
pub mod types;

#[cfg(test)]
mod tests;

// Public API
pub use binding::get_arguments;
pub use collector::{
    RouteEntry, RouteMetadataCollector, RouteTable, collect, get_class_with_annotation,
};
pub use config::{ConfigValidationError, RestConfig};
pub use context::{HttpRequest, RequestContext, RequestId};
pub use definition::{PathParam, RouteDefinition};
pub use descriptor::{
    Annotation, MethodDescriptor, Modifiers, ParamAnnotation, ParamDescriptor, TypeDescriptor,
    TypeKind,
};
pub use error::{
    BindingError, BindingErrorKind, BoxError, ConfigurationError, MetadataError, ParameterRef,
    RegistryError, RestError, RestResult,
};
pub use parameter::MethodParameter;
pub use provider::{
    BeanConstructor, BeanFactory, ContextProvider, ContextProviderFactory,
    ContextProviderRegistry, InjectionProvider,
};
pub use reader::{
    ConversionError, GenericValueReader, JsonValueReader, ReaderFactory, ValueReader,
    ValueReaderRegistry,
};
pub use signature::{MethodSignature, is_matching};
pub use types::{HttpMethod, MediaType, ParameterKind, TypeRef};

/// Prelude module for convenient imports
///
/// ```rust,ignore
/// use rest_binding::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Descriptors
        Annotation,
        // Registries
        BeanFactory,
        // Errors
        BindingError,
        BindingErrorKind,
        BoxError,
        ConfigurationError,
        ContextProviderFactory,
        ContextProviderRegistry,
        // Request
        HttpMethod,
        HttpRequest,
        InjectionProvider,
        MethodDescriptor,
        ParamDescriptor,
        ReaderFactory,
        RequestContext,
        // Configuration
        RestConfig,
        RestError,
        RestResult,
        // Routes
        RouteDefinition,
        RouteMetadataCollector,
        RouteTable,
        TypeDescriptor,
        TypeRef,
        ValueReaderRegistry,
        // Functions
        collect,
        get_arguments,
    };
}
