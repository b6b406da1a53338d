//! Demo REST application
//!
//! Describes a few endpoint types, collects their routes at startup and
//! dispatches in-memory requests to handler closures with arguments bound by
//! `rest_binding`.

pub mod rest;

pub use rest::{AppError, RestApp, create_app};
