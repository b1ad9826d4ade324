//! Error types for scalar parsing and schema normalization
//!
//! Scalar errors carry the offending literal and type code so callers can
//! decide between failing fast and degrading to the untyped literal.

use thiserror::Error;

/// Errors raised while parsing or serializing scalar literals
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScalarError {
    /// Literal text does not conform to the canonical form of the type
    #[error("Invalid {code} literal '{input}': {reason}")]
    InvalidLiteral {
        code: String,
        input: String,
        reason: String,
    },

    /// Lookup by code, name or alias found no registered type
    #[error("Unknown type code or alias '{code}'")]
    UnknownCode { code: String },

    /// Value variant cannot be serialized by the requested type
    #[error("Value of kind {kind} cannot be serialized as {code}")]
    KindMismatch { kind: &'static str, code: String },
}

impl ScalarError {
    /// Create an InvalidLiteral error with owned context
    pub fn invalid_literal(
        code: impl Into<String>,
        input: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidLiteral {
            code: code.into(),
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for scalar operations
pub type ScalarResult<T> = Result<T, ScalarError>;

/// Errors raised while normalizing a struct-schema document
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaError {
    /// Delimited schemas must be all-named or all-unnamed
    #[error("Delimited schema '{schema}' mixes named and unnamed fields")]
    MixedNaming { schema: String },

    /// A schema with no fields cannot hydrate anything
    #[error("Schema '{schema}' declares no fields")]
    Empty { schema: String },

    /// Schema document is neither a list, a map nor a delimited string
    #[error("Unsupported schema document: {reason}")]
    UnsupportedShape { reason: String },
}
