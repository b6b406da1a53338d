//! Route metadata collection
//!
//! [`RouteMetadataCollector`] turns a described endpoint type into a
//! [`RouteTable`]: one [`RouteDefinition`] per eligible method signature,
//! merged across the implemented interfaces and the superclass chain.
//!
//! The type's own visible methods are collected first. Each directly
//! implemented interface, in declaration order, and then the superclass are
//! collected recursively and merged in. The more specific definition always
//! wins; a less specific one only fills its unset fields.
//!
//! # Example
//! ```rust,ignore
//! use rest_binding::{RestConfig, RouteMetadataCollector};
//!
//! let collector = RouteMetadataCollector::new(RestConfig::default());
//! let table = collector.collect(&echo_impl)?;
//!
//! for entry in table.routable() {
//!     println!("{} -> {}", entry.definition, entry.method.name);
//! }
//! ```

use crate::config::RestConfig;
use crate::definition::RouteDefinition;
use crate::descriptor::{MethodDescriptor, TypeDescriptor};
use crate::error::{ConfigurationError, MetadataError};
use crate::signature::{MethodSignature, is_matching};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace};

// =============================================================================
// Route Table
// =============================================================================

/// A collected route and the method it invokes.
#[derive(Debug, Clone, Serialize)]
pub struct RouteEntry {
    pub definition: RouteDefinition,
    #[serde(serialize_with = "serialize_method_name")]
    pub method: Arc<MethodDescriptor>,
}

fn serialize_method_name<S>(method: &Arc<MethodDescriptor>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&method.name)
}

/// Ordered, immutable result of collecting one endpoint type.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.iter()
    }

    /// Entries with an HTTP method set. Methods carrying only a path or no
    /// route annotation at all are skipped.
    pub fn routable(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.iter().filter(|e| e.definition.is_routable())
    }

    /// The entry collected for a method with the same signature.
    pub fn find(&self, method: &MethodDescriptor) -> Option<&RouteEntry> {
        self.entries.iter().find(|e| is_matching(&e.method, method))
    }

    /// The entry for a method by name. First match for overloaded names.
    pub fn find_by_name(&self, name: &str) -> Option<&RouteEntry> {
        self.entries.iter().find(|e| e.method.name == name)
    }

    /// Fill unset fields of every entry from its matching entry in `other`.
    /// Entries of `other` without a match are dropped.
    fn merge(&mut self, other: &RouteTable) {
        for entry in &mut self.entries {
            if let Some(additional) = other.find(&entry.method) {
                entry.definition.join(&additional.definition);
            }
        }
    }
}

impl IntoIterator for RouteTable {
    type Item = RouteEntry;
    type IntoIter = std::vec::IntoIter<RouteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a RouteTable {
    type Item = &'a RouteEntry;
    type IntoIter = std::slice::Iter<'a, RouteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// =============================================================================
// Collector
// =============================================================================

/// Collects route definitions from described endpoint types.
#[derive(Debug, Clone, Default)]
pub struct RouteMetadataCollector {
    config: RestConfig,
}

impl RouteMetadataCollector {
    pub fn new(config: RestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    /// Collect the route definitions of a type and its whole hierarchy.
    pub fn collect(&self, ty: &TypeDescriptor) -> Result<RouteTable, ConfigurationError> {
        let mut table = self.collect_own(ty)?;

        for interface in &ty.interfaces {
            let found = self.collect(interface)?;
            table.merge(&found);
        }

        if let Some(superclass) = self.superclass_of(ty) {
            let found = self.collect(superclass)?;
            table.merge(&found);
        }

        Ok(table)
    }

    /// Find the type carrying a marker annotation: the type itself, one of
    /// its directly implemented interfaces, or a type up the superclass chain.
    pub fn get_class_with_annotation(
        &self,
        ty: &Arc<TypeDescriptor>,
        marker: &str,
    ) -> Option<Arc<TypeDescriptor>> {
        if ty.has_marker(marker) {
            return Some(Arc::clone(ty));
        }

        if let Some(interface) = ty.interfaces.iter().find(|i| i.has_marker(marker)) {
            return Some(Arc::clone(interface));
        }

        self.superclass_of(ty)
            .and_then(|superclass| self.get_class_with_annotation(superclass, marker))
    }

    /// Returns true if a method may become a route.
    pub fn is_rest_compatible(&self, method: &MethodDescriptor) -> bool {
        let modifiers = &method.modifiers;
        method.declaring_type != self.config.root_type_name
            && !modifiers.native
            && !modifiers.is_final
            && (modifiers.public || method.in_interface || modifiers.is_abstract)
    }

    /// Definitions of the methods visible on the type itself, before merging.
    fn collect_own(&self, ty: &TypeDescriptor) -> Result<RouteTable, ConfigurationError> {
        let root = RouteDefinition::root(&ty.annotations)
            .map_err(|e| self.configuration_error(ty, None, e))?;

        let mut table = RouteTable::default();
        for method in self.visible_methods(ty) {
            if !self.is_rest_compatible(&method) {
                trace!(type_name = %ty.name, method = %method.name, "Skipping ineligible method");
                continue;
            }

            let definition = Self::build_definition(&root, &method)
                .map_err(|e| self.configuration_error(ty, Some(&method), e))?;

            debug!(
                type_name = %ty.name,
                method = %method.name,
                route = %definition,
                "Collected route definition"
            );

            table.entries.push(RouteEntry { definition, method });
        }

        Ok(table)
    }

    fn build_definition(
        root: &RouteDefinition,
        method: &MethodDescriptor,
    ) -> Result<RouteDefinition, MetadataError> {
        let mut definition = RouteDefinition::derive(root, &method.annotations)?;
        definition.set_arguments(method)?;
        Ok(definition)
    }

    /// Declared methods first, then inherited ones whose signature is not yet
    /// present, most specific type first.
    fn visible_methods(&self, ty: &TypeDescriptor) -> Vec<Arc<MethodDescriptor>> {
        let mut seen = HashSet::new();
        let mut methods = Vec::new();
        self.gather_methods(ty, &mut seen, &mut methods);
        methods
    }

    fn gather_methods(
        &self,
        ty: &TypeDescriptor,
        seen: &mut HashSet<MethodSignature>,
        methods: &mut Vec<Arc<MethodDescriptor>>,
    ) {
        for method in &ty.methods {
            if seen.insert(MethodSignature::of(method)) {
                methods.push(Arc::clone(method));
            }
        }

        for interface in &ty.interfaces {
            self.gather_methods(interface, seen, methods);
        }

        if let Some(superclass) = &ty.superclass {
            self.gather_methods(superclass, seen, methods);
        }
    }

    fn superclass_of<'a>(&self, ty: &'a TypeDescriptor) -> Option<&'a Arc<TypeDescriptor>> {
        ty.superclass
            .as_ref()
            .filter(|superclass| superclass.name != self.config.root_type_name)
    }

    fn configuration_error(
        &self,
        ty: &TypeDescriptor,
        method: Option<&MethodDescriptor>,
        cause: MetadataError,
    ) -> ConfigurationError {
        let mut error = ConfigurationError::new(&ty.name, cause.to_string());
        if let Some(method) = method {
            error = error.with_method(&method.name);
        }

        debug!(error = %error, "Invalid route metadata");
        error.with_source(cause)
    }
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Collect the route definitions of a type with the default configuration.
pub fn collect(ty: &TypeDescriptor) -> Result<RouteTable, ConfigurationError> {
    RouteMetadataCollector::default().collect(ty)
}

/// Find the type carrying a marker annotation with the default configuration.
pub fn get_class_with_annotation(
    ty: &Arc<TypeDescriptor>,
    marker: &str,
) -> Option<Arc<TypeDescriptor>> {
    RouteMetadataCollector::default().get_class_with_annotation(ty, marker)
}
