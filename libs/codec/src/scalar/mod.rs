//! # Scalar Type Registry - TYTX Type Code System
//!
//! ## Purpose
//!
//! Central registry and codec for the TYTX scalar type set. Every type is
//! a `TypeDefinition` keyed by its canonical short code (L, R, N, B, T, D,
//! DHZ, DH, H, JS, NN) with case-insensitive alias resolution, canonical
//! text parsing/serialization and a detection predicate used for
//! auto-tagging values on encode.
//!
//! ## Invariants
//!
//! - Codes are unique; registering a duplicate overwrites (last write wins)
//! - `parse(serialize(v)) == v` for every canonical value of every type
//! - Detection consults definitions in registration order, so decimal
//!   definitions are registered ahead of the generic number types
//! - Unknown codes never panic or error at the grammar layer; callers that
//!   need strictness use [`ScalarCodec::from_text`] and get a typed error

pub mod builtin;

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use tytx_types::{ScalarError, ScalarResult, TytxValue};

/// One registered scalar type: code, aliases and codec behavior
pub trait TypeDefinition: Send + Sync {
    /// Canonical short code, e.g. `"N"`
    fn code(&self) -> &str;

    /// Long name, resolvable like an alias, e.g. `"decimal"`
    fn name(&self) -> &str;

    /// Additional lookup aliases (case-insensitive)
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// Parse canonical text into a value
    fn parse(&self, text: &str) -> ScalarResult<TytxValue>;

    /// Serialize a value this definition matches; `None` for foreign kinds
    /// and for parse-only definitions
    fn serialize(&self, value: &TytxValue) -> Option<String>;

    /// Detection predicate: does this definition own the value's kind?
    fn matches(&self, value: &TytxValue) -> bool;
}

/// Registry of scalar type definitions with alias lookup and detection
#[derive(Clone)]
pub struct ScalarCodec {
    /// Detection order: first match wins
    detection: Vec<Arc<dyn TypeDefinition>>,
    /// Lowercased code/name/alias -> definition
    by_key: HashMap<String, Arc<dyn TypeDefinition>>,
}

impl ScalarCodec {
    /// Empty registry; most callers want [`ScalarCodec::with_builtins`]
    pub fn new() -> Self {
        Self {
            detection: Vec::new(),
            by_key: HashMap::new(),
        }
    }

    /// Registry pre-loaded with the canonical TYTX type set
    pub fn with_builtins() -> Self {
        let mut codec = Self::new();
        for def in builtin::builtin_types() {
            codec.register(def);
        }
        codec
    }

    /// Register a type definition, overwriting any prior owner of its code
    pub fn register(&mut self, def: Arc<dyn TypeDefinition>) {
        let code = def.code().to_string();
        if let Some(pos) = self
            .detection
            .iter()
            .position(|d| d.code().eq_ignore_ascii_case(&code))
        {
            warn!(code = %code, "overwriting scalar type registration");
            self.detection.remove(pos);
        }
        self.by_key.insert(code.to_lowercase(), Arc::clone(&def));
        self.by_key
            .insert(def.name().to_lowercase(), Arc::clone(&def));
        for alias in def.aliases() {
            self.by_key.insert(alias.to_lowercase(), Arc::clone(&def));
        }
        self.detection.push(def);
    }

    /// Look up a definition by code, name or alias (case-insensitive)
    pub fn get(&self, key: &str) -> Option<&Arc<dyn TypeDefinition>> {
        self.by_key.get(&key.trim().to_lowercase())
    }

    /// True when the key resolves to a registered definition
    pub fn is_known_code(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Find the definition owning a value's kind, in registration order
    pub fn detect(&self, value: &TytxValue) -> Option<&Arc<dyn TypeDefinition>> {
        self.detection.iter().find(|d| d.matches(value))
    }

    /// Parse text under an explicit type code
    ///
    /// Strict variant: unknown codes and malformed literals are errors.
    /// Decode paths that must stay forward-tolerant use
    /// [`ScalarCodec::from_text_lenient`] instead.
    pub fn from_text(&self, text: &str, code: &str) -> ScalarResult<TytxValue> {
        let def = self.get(code).ok_or_else(|| ScalarError::UnknownCode {
            code: code.to_string(),
        })?;
        def.parse(text)
    }

    /// Parse text under a type code, degrading to the untyped literal
    ///
    /// This is the decode-path behavior: a literal that does not parse
    /// under its declared code is version skew, not a reason to fail the
    /// whole payload.
    pub fn from_text_lenient(&self, text: &str, code: &str) -> TytxValue {
        match self.from_text(text, code) {
            Ok(value) => value,
            Err(e) => {
                debug!(code = %code, "scalar parse degraded to literal: {e}");
                TytxValue::Str(text.to_string())
            }
        }
    }

    /// Serialize a value to its canonical untyped text
    pub fn as_text(&self, value: &TytxValue) -> String {
        self.detect(value)
            .and_then(|d| d.serialize(value))
            .unwrap_or_default()
    }

    /// Serialize a value to `"literal::CODE"` typed text
    pub fn as_typed_text(&self, value: &TytxValue) -> String {
        match self.detect(value) {
            Some(def) => match def.serialize(value) {
                Some(text) => format!("{}::{}", text, def.code()),
                None => String::new(),
            },
            None => String::new(),
        }
    }

    /// Code of the definition that owns the value's kind
    pub fn detect_code(&self, value: &TytxValue) -> Option<&str> {
        self.detect(value).map(|d| d.code())
    }
}

impl Default for ScalarCodec {
    fn default() -> Self {
        Self::with_builtins()
    }
}
