//! Method signature matching across hierarchy levels
//!
//! Two methods are the same for merge purposes when their names are equal
//! and their parameter types are equal position by position. Return types,
//! declared errors and annotations are not compared, so an accidental
//! same-name, same-parameter method on an unrelated interface matches too.

use crate::descriptor::MethodDescriptor;
use crate::types::TypeRef;
use std::fmt;

/// Name and ordered parameter types of a method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<TypeRef>,
}

impl MethodSignature {
    pub fn of(method: &MethodDescriptor) -> Self {
        Self {
            name: method.name.clone(),
            params: method.param_types().cloned().collect(),
        }
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<_> = self.params.iter().map(TypeRef::name).collect();
        write!(f, "{}({})", self.name, params.join(", "))
    }
}

/// Returns true if both methods have the same name and parameter types.
pub fn is_matching(base: &MethodDescriptor, compare: &MethodDescriptor) -> bool {
    base.name == compare.name
        && base.arity() == compare.arity()
        && base
            .param_types()
            .zip(compare.param_types())
            .all(|(left, right)| left == right)
}
