//! curl command import
//!
//! Turns a raw curl command line into a [`crate::request::RequestModel`]:
//! shell-aware tokenizing, a static flag table, and the argument parser
//! that resolves flag interactions.

pub mod flags;
pub mod parser;
pub mod tokenizer;

pub use flags::{lookup, Arity, FlagSpec, Slot};
pub use parser::{parse, Parsed};
pub use tokenizer::{render, tokenize, Token, TokenKind};
