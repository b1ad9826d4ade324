//! TYTX suffix grammar
//!
//! The grammar splits `"literal::SUFFIX"` tokens at the **last** `::` so
//! literals that legitimately contain `::` (URLs, windows paths inside
//! metadata) are never misparsed. Four suffix shapes exist:
//!
//! - `::CODE` - scalar, code must be registered
//! - `::@NAME` - struct-qualified literal
//! - `::#CODE` - homogeneous typed array
//! - `::#@NAME` - batch: apply struct NAME to each element
//!
//! A trailing segment that matches none of these leaves the whole string
//! untyped; forward tolerance means an old registry reads new payloads as
//! plain text instead of failing.

use crate::scalar::ScalarCodec;
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;
use tytx_types::TytxValue;

use crate::format::json::{to_typed_json, value_from_json};

/// Classified suffix of a typed-text token
#[derive(Debug, Clone, PartialEq)]
pub enum Suffix {
    /// Registered scalar code
    Code(String),
    /// `@NAME` struct reference
    Struct(String),
    /// `#CODE` homogeneous array
    ArrayCode(String),
    /// `#@NAME` batch struct application
    ArrayStruct(String),
}

fn is_struct_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Split typed text at the last `::`, classifying the trailing segment
///
/// Returns the literal and the recognized suffix, or `(text, None)` when
/// the string carries no recognizable suffix.
pub fn split_suffix<'a>(text: &'a str, codec: &ScalarCodec) -> (&'a str, Option<Suffix>) {
    let Some(pos) = text.rfind("::") else {
        return (text, None);
    };
    let literal = &text[..pos];
    let tail = text[pos + 2..].trim();
    let suffix = if let Some(name) = tail.strip_prefix("#@") {
        is_struct_name(name).then(|| Suffix::ArrayStruct(name.to_string()))
    } else if let Some(name) = tail.strip_prefix('@') {
        is_struct_name(name).then(|| Suffix::Struct(name.to_string()))
    } else if let Some(code) = tail.strip_prefix('#') {
        codec
            .is_known_code(code)
            .then(|| Suffix::ArrayCode(code.trim().to_string()))
    } else {
        codec
            .is_known_code(tail)
            .then(|| Suffix::Code(tail.to_string()))
    };
    match suffix {
        Some(s) => (literal, Some(s)),
        None => (text, None),
    }
}

/// Build a `"literal::CODE"` token
pub fn typed_token(literal: &str, code: &str) -> String {
    format!("{literal}::{code}")
}

/// Apply a scalar code to a JSON fragment, recursing through arrays
///
/// String leaves parse under the code (degrading to the literal), other
/// JSON-native leaves are re-parsed through the code from their textual
/// form so `10` under code N becomes an exact decimal, not an int.
pub fn apply_code_to_json(json: &JsonValue, code: &str, codec: &ScalarCodec) -> TytxValue {
    match json {
        JsonValue::Array(items) => TytxValue::List(
            items
                .iter()
                .map(|item| apply_code_to_json(item, code, codec))
                .collect(),
        ),
        JsonValue::Null => TytxValue::None,
        JsonValue::String(s) => codec.from_text_lenient(s, code),
        JsonValue::Number(n) => codec
            .from_text(&n.to_string(), code)
            .unwrap_or_else(|_| value_from_json(json)),
        JsonValue::Bool(b) => codec
            .from_text(&b.to_string(), code)
            .unwrap_or_else(|_| value_from_json(json)),
        JsonValue::Object(_) => value_from_json(json),
    }
}

/// Collect the set of leaf codes a list would need, recursing through
/// nested lists. `None` marks a leaf no registered type detects.
fn collect_leaf_codes(list: &[TytxValue], codec: &ScalarCodec, codes: &mut BTreeSet<Option<String>>) {
    for item in list {
        match item {
            TytxValue::List(inner) => collect_leaf_codes(inner, codec, codes),
            // A map leaf can only travel as typed-JSON text, which the
            // compact form cannot express
            TytxValue::Map(_) => {
                codes.insert(None);
            }
            leaf => {
                codes.insert(codec.detect_code(leaf).map(|c| c.to_string()));
            }
        }
    }
}

fn compact_leaf(value: &TytxValue, codec: &ScalarCodec) -> JsonValue {
    match value {
        TytxValue::List(items) => {
            JsonValue::Array(items.iter().map(|i| compact_leaf(i, codec)).collect())
        }
        TytxValue::Int(n) => JsonValue::from(*n),
        TytxValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(f.to_string())),
        TytxValue::Bool(b) => JsonValue::Bool(*b),
        other => JsonValue::String(codec.as_text(other)),
    }
}

fn tag_each(value: &TytxValue, codec: &ScalarCodec) -> JsonValue {
    match value {
        TytxValue::List(items) => {
            JsonValue::Array(items.iter().map(|i| tag_each(i, codec)).collect())
        }
        map @ TytxValue::Map(_) => JsonValue::String(typed_token(
            &to_typed_json(map, codec).to_string(),
            "JS",
        )),
        leaf => JsonValue::String(codec.as_typed_text(leaf)),
    }
}

/// Encode a list as typed text
///
/// The compact form `"[...]::C"` is legal only when every leaf resolves to
/// exactly one type code; a compact array cannot represent mixed element
/// types, so on ambiguity the encoder must fall back to a JSON array of
/// individually-typed strings, carried under the `JS` wrapper so a
/// text-only consumer knows to parse the token as JSON first.
pub fn encode_list(items: &[TytxValue], codec: &ScalarCodec) -> String {
    let mut codes = BTreeSet::new();
    collect_leaf_codes(items, codec, &mut codes);
    if codes.len() == 1 {
        if let Some(Some(code)) = codes.into_iter().next() {
            let body = JsonValue::Array(
                items.iter().map(|i| compact_leaf(i, codec)).collect(),
            );
            return typed_token(&body.to_string(), &code);
        }
    }
    let body = JsonValue::Array(items.iter().map(|i| tag_each(i, codec)).collect());
    typed_token(&body.to_string(), "JS")
}
