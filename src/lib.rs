//! curlgenie library interface
//!
//! Turns a curl command line into HTTP client source code: the command is
//! tokenized, parsed into a [`request::RequestModel`] and handed to a style
//! backend that builds and renders a small syntax tree.
//!
//! # Module Organization
//!
//! - [`import`] - Tokenizer, curl flag table and command parser
//! - [`request`] - The Request Model
//! - [`codegen`] - Generated-code AST, renderer and style backends
//! - [`convert`] - One-call pipeline facade ([`convert()`])
//! - [`errors`] - Error types (CurlgenieError, Result)
//! - [`core`] - Command-line host

pub mod cli;
pub mod codegen;
pub mod config;
pub mod context;
pub mod convert;
pub mod core;
pub mod errors;
pub mod http;
pub mod import;
pub mod logging;
pub mod request;
pub mod status;
pub mod strings;

pub use codegen::Style;
pub use convert::{convert, Conversion};
pub use errors::{CurlgenieError, ErrorKind, Result};
