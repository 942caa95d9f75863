//! Command-line interface

pub mod args;

pub use args::{Args, Emit, LogFormat, Shell};
