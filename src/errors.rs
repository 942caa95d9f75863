//! Error types for curlgenie
//!
//! Each pipeline stage has its own error enum so callers can match on the
//! exact failure. [`CurlgenieError`] wraps all of them for the facade and the
//! command-line host.

use serde::Serialize;
use thiserror::Error;

/// Errors raised while splitting the raw command into shell tokens
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("Unterminated {quote} quote starting at offset {offset}")]
    UnterminatedQuote { quote: char, offset: usize },

    #[error("Dangling escape at end of input (offset {offset})")]
    DanglingEscape { offset: usize },

    #[error("Invalid escape sequence at offset {offset}: {reason}")]
    InvalidEscape { offset: usize, reason: String },
}

/// Errors raised while interpreting tokens as curl arguments
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unrecognized flag: {flag}")]
    UnrecognizedFlag { flag: String, offset: usize },

    #[error("Flag {flag} requires an argument")]
    MissingFlagArgument { flag: String, offset: usize },

    #[error("Invalid argument for {flag}: {reason}")]
    InvalidFlagArgument {
        flag: String,
        reason: String,
        offset: usize,
    },

    #[error("{flag} cannot be combined with {previous}")]
    ConflictingBodyFlags {
        flag: String,
        previous: String,
        offset: usize,
    },

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        url: String,
        reason: String,
        offset: usize,
    },

    #[error("No URL given")]
    MissingUrl,

    #[error("Unexpected argument '{value}' (a URL was already given)")]
    UnexpectedArgument { value: String, offset: usize },

    #[error("Empty command")]
    EmptyCommand,
}

/// Errors raised while generating code for a style
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("{feature} is not supported by the {style} style")]
    UnsupportedFeatureForStyle {
        feature: String,
        style: &'static str,
    },

    #[error("Unknown style '{0}'")]
    UnknownStyle(String),
}

/// Main error type for curlgenie
#[derive(Error, Debug)]
pub enum CurlgenieError {
    #[error("Tokenize error: {0}")]
    Tokenize(#[from] TokenizeError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Flat error classification handed to hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    UnterminatedQuote,
    DanglingEscape,
    InvalidEscape,
    UnrecognizedFlag,
    MissingFlagArgument,
    InvalidFlagArgument,
    ConflictingBodyFlags,
    InvalidUrl,
    MissingUrl,
    UnexpectedArgument,
    EmptyCommand,
    UnsupportedFeatureForStyle,
    UnknownStyle,
    Config,
    Io,
}

impl TokenizeError {
    pub fn offset(&self) -> usize {
        match self {
            TokenizeError::UnterminatedQuote { offset, .. }
            | TokenizeError::DanglingEscape { offset }
            | TokenizeError::InvalidEscape { offset, .. } => *offset,
        }
    }
}

impl ParseError {
    /// Character offset of the offending token, if the error has one
    pub fn offset(&self) -> Option<usize> {
        match self {
            ParseError::UnrecognizedFlag { offset, .. }
            | ParseError::MissingFlagArgument { offset, .. }
            | ParseError::InvalidFlagArgument { offset, .. }
            | ParseError::ConflictingBodyFlags { offset, .. }
            | ParseError::InvalidUrl { offset, .. }
            | ParseError::UnexpectedArgument { offset, .. } => Some(*offset),
            ParseError::MissingUrl | ParseError::EmptyCommand => None,
        }
    }
}

impl CurlgenieError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CurlgenieError::Tokenize(e) => match e {
                TokenizeError::UnterminatedQuote { .. } => ErrorKind::UnterminatedQuote,
                TokenizeError::DanglingEscape { .. } => ErrorKind::DanglingEscape,
                TokenizeError::InvalidEscape { .. } => ErrorKind::InvalidEscape,
            },
            CurlgenieError::Parse(e) => match e {
                ParseError::UnrecognizedFlag { .. } => ErrorKind::UnrecognizedFlag,
                ParseError::MissingFlagArgument { .. } => ErrorKind::MissingFlagArgument,
                ParseError::InvalidFlagArgument { .. } => ErrorKind::InvalidFlagArgument,
                ParseError::ConflictingBodyFlags { .. } => ErrorKind::ConflictingBodyFlags,
                ParseError::InvalidUrl { .. } => ErrorKind::InvalidUrl,
                ParseError::MissingUrl => ErrorKind::MissingUrl,
                ParseError::UnexpectedArgument { .. } => ErrorKind::UnexpectedArgument,
                ParseError::EmptyCommand => ErrorKind::EmptyCommand,
            },
            CurlgenieError::Generation(e) => match e {
                GenerationError::UnsupportedFeatureForStyle { .. } => {
                    ErrorKind::UnsupportedFeatureForStyle
                }
                GenerationError::UnknownStyle(_) => ErrorKind::UnknownStyle,
            },
            CurlgenieError::Config(_) => ErrorKind::Config,
            CurlgenieError::Io(_) => ErrorKind::Io,
        }
    }

    /// Character offset into the raw command, for caller-side highlighting
    pub fn offset(&self) -> Option<usize> {
        match self {
            CurlgenieError::Tokenize(e) => Some(e.offset()),
            CurlgenieError::Parse(e) => e.offset(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CurlgenieError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ParseError::UnrecognizedFlag { flag: "--frobnicate".to_string(), offset: 5 }.to_string(),
            "Unrecognized flag: --frobnicate"
        );
        assert_eq!(
            ParseError::MissingFlagArgument { flag: "-H".to_string(), offset: 5 }.to_string(),
            "Flag -H requires an argument"
        );
        assert_eq!(
            GenerationError::UnsupportedFeatureForStyle {
                feature: "multipart body".to_string(),
                style: "java-httpclient",
            }
            .to_string(),
            "multipart body is not supported by the java-httpclient style"
        );
    }

    #[test]
    fn test_kind_and_offset() {
        let err: CurlgenieError = TokenizeError::UnterminatedQuote { quote: '\'', offset: 8 }.into();
        assert_eq!(err.kind(), ErrorKind::UnterminatedQuote);
        assert_eq!(err.offset(), Some(8));

        let err: CurlgenieError = ParseError::EmptyCommand.into();
        assert_eq!(err.kind(), ErrorKind::EmptyCommand);
        assert_eq!(err.offset(), None);
    }
}
