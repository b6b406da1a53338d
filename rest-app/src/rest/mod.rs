//! App REST - Endpoints, Types, and Context

mod context;
mod endpoints;
mod types;

pub use context::*;
pub use endpoints::*;
pub use types::*;

// Re-export binding utilities
pub use rest_binding::{
    BindingError, ConfigurationError, HttpMethod, HttpRequest, RequestContext, RestConfig,
    RouteTable,
};
