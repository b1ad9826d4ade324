//! Protocol-level errors for TYTX decoding
//!
//! Three policies coexist and the error types mirror them: forward-tolerant
//! paths never construct an error (unknown codes and references degrade to
//! the untyped literal), structural problems raise `CodecError`
//! immediately, and the decimal-to-float fallback is logged, not raised.

use thiserror::Error;
use tytx_types::{ScalarError, SchemaError};

/// Fatal structural errors raised while decoding TYTX payloads
#[derive(Debug, Error)]
pub enum CodecError {
    /// Envelope omitted a required field; registration side effects would
    /// be ambiguous if it were silently defaulted
    #[error("Malformed envelope: required field '{field}' is missing")]
    MissingField { field: &'static str },

    /// Payload text under a TYTX/XTYTX prefix is not valid JSON
    #[error("Invalid payload JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Hydration recursed past the configured depth limit
    #[error("Hydration depth limit {limit} exceeded")]
    DepthExceeded { limit: usize },

    /// XML document failed to parse
    #[error("Invalid XML document: {reason}")]
    Xml { reason: String },

    /// Ext-42 body was not valid UTF-8
    #[error("MessagePack extension body is not UTF-8: {reason}")]
    ExtBodyEncoding { reason: String },

    #[error(transparent)]
    Scalar(#[from] ScalarError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl CodecError {
    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    pub fn xml(reason: impl Into<String>) -> Self {
        Self::Xml {
            reason: reason.into(),
        }
    }
}

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised by the validation-expression engine
///
/// A missing rule is a configuration bug, not a failed validation; it must
/// surface as an error and never as a silent `false`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Rule name resolved in none of the local/global/registry tiers
    #[error("Unknown validation rule '{name}' (searched local, global and registry tiers)")]
    UnknownRule { name: String },

    /// Rule pattern failed to compile
    #[error("Invalid pattern '{pattern}' in rule '{rule}': {reason}")]
    BadPattern {
        rule: String,
        pattern: String,
        reason: String,
    },

    /// Expression reduced to an empty operand
    #[error("Empty validation expression")]
    EmptyExpression,
}

/// Errors raised by the metadata mini-grammar
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MetadataError {
    /// A quoted value never saw its closing quote
    #[error("Unterminated quoted value starting at byte {offset}")]
    UnterminatedQuote { offset: usize },

    /// Entry has no key/value separator
    #[error("Missing ':' separator in metadata entry '{entry}'")]
    MissingColon { entry: String },

    /// Keys are lowercase identifiers
    #[error("Invalid metadata key '{key}'")]
    InvalidKey { key: String },

    /// Document exceeds the configured size limit
    #[error("Metadata document of {len} bytes exceeds limit {max}")]
    TooLong { len: usize, max: usize },
}
