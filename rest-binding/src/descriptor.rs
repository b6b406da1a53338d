//! Endpoint descriptor table
//!
//! Endpoint types are described once at startup with a builder API instead
//! of being discovered by introspection. A [`TypeDescriptor`] carries its
//! type-level annotations, its declared methods, the interfaces it implements
//! and its superclass. The collector walks this table.
//!
//! # Example
//!
//! ```rust,ignore
//! use rest_binding::descriptor::*;
//! use rest_binding::TypeRef;
//!
//! let echo_api = TypeDescriptor::interface("InterfaceRest")
//!     .annotate(Annotation::path("interface"))
//!     .annotate(Annotation::produces(["application/json"]))
//!     .method(
//!         MethodDescriptor::new("echo")
//!             .returns(TypeRef::string())
//!             .annotate(Annotation::Get)
//!             .annotate(Annotation::path("echo"))
//!             .annotate(Annotation::consumes(["application/json"]))
//!             .param(ParamDescriptor::new(TypeRef::string()).query("name")),
//!     )
//!     .build();
//!
//! let echo_impl = TypeDescriptor::class("InterfaceRestImpl")
//!     .implements(echo_api)
//!     .method(MethodDescriptor::new("echo").param(ParamDescriptor::new(TypeRef::string())))
//!     .build();
//! ```

use crate::types::{HttpMethod, TypeRef};
use std::sync::Arc;

// =============================================================================
// Annotations
// =============================================================================

/// Type- or method-level route annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// Path or sub-path of the route
    Path(String),
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Trace,
    Connect,
    /// Method given by name, resolved when the route is built
    HttpMethod(String),
    /// Media types the route accepts
    Consumes(Vec<String>),
    /// Media types the route produces
    Produces(Vec<String>),
    /// Free-form marker looked up by `get_class_with_annotation`
    Marker(String),
}

impl Annotation {
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }

    pub fn consumes<I, S>(media_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Consumes(media_types.into_iter().map(Into::into).collect())
    }

    pub fn produces<I, S>(media_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Produces(media_types.into_iter().map(Into::into).collect())
    }

    pub fn marker(name: impl Into<String>) -> Self {
        Self::Marker(name.into())
    }

    /// The HTTP method this annotation declares, for the fixed method markers.
    pub fn http_method(&self) -> Option<HttpMethod> {
        match self {
            Self::Get => Some(HttpMethod::Get),
            Self::Post => Some(HttpMethod::Post),
            Self::Put => Some(HttpMethod::Put),
            Self::Delete => Some(HttpMethod::Delete),
            Self::Patch => Some(HttpMethod::Patch),
            Self::Head => Some(HttpMethod::Head),
            Self::Options => Some(HttpMethod::Options),
            Self::Trace => Some(HttpMethod::Trace),
            Self::Connect => Some(HttpMethod::Connect),
            _ => None,
        }
    }
}

/// Parameter-level binding annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamAnnotation {
    Path(String),
    Query(String),
    Header(String),
    Cookie(String),
    Form(String),
    Matrix(String),
    Body,
    Bean,
    Context,
    /// Skip percent-decoding of query values
    Raw,
    /// Value used when the request carries none
    DefaultValue(String),
    /// Explicit positional index for regular-expression paths
    PathIndex(usize),
    /// Convert into this type instead of the declared one
    DataType(TypeRef),
    /// Named value reader override
    Reader(String),
    /// Named context provider override
    ContextProvider(String),
    /// Metadata only, never bound as an argument
    Descriptive,
}

impl ParamAnnotation {
    /// Returns true if this annotation selects the parameter kind.
    pub fn is_kind(&self) -> bool {
        matches!(
            self,
            Self::Path(_)
                | Self::Query(_)
                | Self::Header(_)
                | Self::Cookie(_)
                | Self::Form(_)
                | Self::Matrix(_)
                | Self::Body
                | Self::Bean
                | Self::Context
        )
    }
}

// =============================================================================
// Descriptors
// =============================================================================

/// Shape of a described type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    AbstractClass,
    Interface,
}

/// Method modifiers relevant to route eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modifiers {
    pub public: bool,
    pub is_final: bool,
    pub native: bool,
    pub is_abstract: bool,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            public: true,
            is_final: false,
            native: false,
            is_abstract: false,
        }
    }
}

/// One declared parameter of a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDescriptor {
    pub declared_type: TypeRef,
    pub annotations: Vec<ParamAnnotation>,
}

impl ParamDescriptor {
    pub fn new(declared_type: TypeRef) -> Self {
        Self {
            declared_type,
            annotations: Vec::new(),
        }
    }

    pub fn annotate(mut self, annotation: ParamAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn path(self, name: impl Into<String>) -> Self {
        self.annotate(ParamAnnotation::Path(name.into()))
    }

    pub fn query(self, name: impl Into<String>) -> Self {
        self.annotate(ParamAnnotation::Query(name.into()))
    }

    pub fn header(self, name: impl Into<String>) -> Self {
        self.annotate(ParamAnnotation::Header(name.into()))
    }

    pub fn cookie(self, name: impl Into<String>) -> Self {
        self.annotate(ParamAnnotation::Cookie(name.into()))
    }

    pub fn form(self, name: impl Into<String>) -> Self {
        self.annotate(ParamAnnotation::Form(name.into()))
    }

    pub fn matrix(self, name: impl Into<String>) -> Self {
        self.annotate(ParamAnnotation::Matrix(name.into()))
    }

    pub fn body(self) -> Self {
        self.annotate(ParamAnnotation::Body)
    }

    pub fn bean(self) -> Self {
        self.annotate(ParamAnnotation::Bean)
    }

    pub fn context(self) -> Self {
        self.annotate(ParamAnnotation::Context)
    }

    pub fn raw(self) -> Self {
        self.annotate(ParamAnnotation::Raw)
    }

    pub fn default_value(self, value: impl Into<String>) -> Self {
        self.annotate(ParamAnnotation::DefaultValue(value.into()))
    }

    pub fn data_type(self, data_type: TypeRef) -> Self {
        self.annotate(ParamAnnotation::DataType(data_type))
    }

    pub fn reader(self, name: impl Into<String>) -> Self {
        self.annotate(ParamAnnotation::Reader(name.into()))
    }

    pub fn context_provider(self, name: impl Into<String>) -> Self {
        self.annotate(ParamAnnotation::ContextProvider(name.into()))
    }

    pub fn descriptive(self) -> Self {
        self.annotate(ParamAnnotation::Descriptive)
    }
}

/// A method of an endpoint type.
///
/// `declaring_type` and `in_interface` are filled in by the owning
/// [`TypeBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
    pub declaring_type: String,
    pub in_interface: bool,
    pub modifiers: Modifiers,
    pub params: Vec<ParamDescriptor>,
    pub return_type: Option<TypeRef>,
    pub annotations: Vec<Annotation>,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declaring_type: String::new(),
            in_interface: false,
            modifiers: Modifiers::default(),
            params: Vec::new(),
            return_type: None,
            annotations: Vec::new(),
        }
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn param(mut self, param: ParamDescriptor) -> Self {
        self.params.push(param);
        self
    }

    pub fn returns(mut self, return_type: TypeRef) -> Self {
        self.return_type = Some(return_type);
        self
    }

    pub fn modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn mark_private(mut self) -> Self {
        self.modifiers.public = false;
        self
    }

    pub fn mark_final(mut self) -> Self {
        self.modifiers.is_final = true;
        self
    }

    pub fn mark_native(mut self) -> Self {
        self.modifiers.native = true;
        self
    }

    pub fn mark_abstract(mut self) -> Self {
        self.modifiers.is_abstract = true;
        self
    }

    /// Declared parameter types, in order.
    pub fn param_types(&self) -> impl Iterator<Item = &TypeRef> {
        self.params.iter().map(|p| &p.declared_type)
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// A described endpoint type: class, abstract class or interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub name: String,
    pub kind: TypeKind,
    pub annotations: Vec<Annotation>,
    pub interfaces: Vec<Arc<TypeDescriptor>>,
    pub superclass: Option<Arc<TypeDescriptor>>,
    pub methods: Vec<Arc<MethodDescriptor>>,
}

impl TypeDescriptor {
    pub fn class(name: impl Into<String>) -> TypeBuilder {
        TypeBuilder::new(name, TypeKind::Class)
    }

    pub fn abstract_class(name: impl Into<String>) -> TypeBuilder {
        TypeBuilder::new(name, TypeKind::AbstractClass)
    }

    pub fn interface(name: impl Into<String>) -> TypeBuilder {
        TypeBuilder::new(name, TypeKind::Interface)
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    /// Returns true if a marker annotation with this name is present.
    pub fn has_marker(&self, marker: &str) -> bool {
        self.annotations
            .iter()
            .any(|a| matches!(a, Annotation::Marker(name) if name == marker))
    }
}

/// Builder for [`TypeDescriptor`].
#[derive(Debug)]
pub struct TypeBuilder {
    inner: TypeDescriptor,
}

impl TypeBuilder {
    fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            inner: TypeDescriptor {
                name: name.into(),
                kind,
                annotations: Vec::new(),
                interfaces: Vec::new(),
                superclass: None,
                methods: Vec::new(),
            },
        }
    }

    #[must_use = "This method returns a new TypeBuilder and does not modify self"]
    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.inner.annotations.push(annotation);
        self
    }

    /// Add a directly implemented interface. Declaration order is kept.
    #[must_use = "This method returns a new TypeBuilder and does not modify self"]
    pub fn implements(mut self, interface: Arc<TypeDescriptor>) -> Self {
        self.inner.interfaces.push(interface);
        self
    }

    #[must_use = "This method returns a new TypeBuilder and does not modify self"]
    pub fn extends(mut self, superclass: Arc<TypeDescriptor>) -> Self {
        self.inner.superclass = Some(superclass);
        self
    }

    /// Declare a method. Methods declared by an interface are abstract.
    #[must_use = "This method returns a new TypeBuilder and does not modify self"]
    pub fn method(mut self, mut method: MethodDescriptor) -> Self {
        method.declaring_type = self.inner.name.clone();
        method.in_interface = self.inner.kind == TypeKind::Interface;
        if method.in_interface {
            method.modifiers.is_abstract = true;
        }
        self.inner.methods.push(Arc::new(method));
        self
    }

    pub fn build(self) -> Arc<TypeDescriptor> {
        Arc::new(self.inner)
    }
}
