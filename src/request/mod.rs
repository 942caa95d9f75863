//! Request Model and its normalization rules
//!
//! The model is built once by [`crate::import::parse`], normalized, and then
//! handed read-only to the code generators.

mod model;

pub use model::*;
