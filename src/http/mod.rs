//! HTTP protocol types and constants

mod method;

pub use method::*;
