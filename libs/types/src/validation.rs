//! Named validation rule definitions
//!
//! A `ValidationDef` is pure data: the expression engine in `tytx-codec`
//! compiles the pattern and applies the constraints. All constraints
//! present on one definition are ANDed; a definition with no constraints
//! always passes.

use serde::{Deserialize, Serialize};

/// Declarative validation rule combining a pattern with length bounds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationDef {
    /// Regular expression the whole value must match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Exact length in characters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub len: Option<usize>,
    /// Minimum length in characters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,
    /// Maximum length in characters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
    /// Human-readable failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Machine-readable failure code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ValidationDef {
    /// Rule with only a pattern constraint
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            ..Self::default()
        }
    }

    /// Rule with only an exact-length constraint
    pub fn exact_len(len: usize) -> Self {
        Self {
            len: Some(len),
            ..Self::default()
        }
    }

    /// True when no constraint is declared
    pub fn is_unconstrained(&self) -> bool {
        self.pattern.is_none() && self.len.is_none() && self.min.is_none() && self.max.is_none()
    }
}
