//! Test module for rest-binding
//!
//! Unit and property-based tests for route collection, definition merging,
//! raw value extraction and argument binding.

#[cfg(test)]
pub mod definition_tests;




#[cfg(test)]
pub mod error_tests;

#[cfg(test)]
pub mod config_tests;
