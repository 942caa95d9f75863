//! Pipeline facade
//!
//! Chains tokenizer, parser and code generator for hosts that hand over a
//! raw command string.

use crate::codegen::{self, Style};
use crate::errors::Result;
use crate::import::{self, Parsed};
use crate::request::{RequestModel, Warning};
use serde::Serialize;
use tracing::{debug, warn};

/// Generated code together with the model it came from
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    pub code: String,
    #[serde(skip)]
    pub model: RequestModel,
    pub warnings: Vec<Warning>,
}

/// Tokenize and parse a raw curl command
pub fn import(raw: &str) -> Result<Parsed> {
    let tokens = import::tokenize(raw)?;
    debug!(tokens = tokens.len(), "Tokenized command");

    let parsed = import::parse(&tokens)?;
    for warning in &parsed.warnings {
        warn!(offset = ?warning.offset, "{}", warning.message);
    }
    Ok(parsed)
}

/// Convert a raw curl command into client code in the given style
pub fn convert(raw: &str, style: Style) -> Result<Conversion> {
    let Parsed { model, warnings } = import(raw)?;
    let code = codegen::generate(&model, style)?;
    Ok(Conversion { code, model, warnings })
}
