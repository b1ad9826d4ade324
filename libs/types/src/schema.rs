//! Struct-schema shapes for composite hydration
//!
//! A schema arrives over the wire in one of three documents: a JSON list
//! (positional), a JSON map (keyed) or a delimited string. The shape is
//! normalized exactly once, here, when the document is parsed; the
//! hydration engine dispatches on the normalized tag and never re-sniffs
//! the document.

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Reference to a field's type inside a struct schema
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRef {
    /// Bare scalar type code, e.g. `"L"`
    Code(String),
    /// Reference to a named struct schema, e.g. `"@customer"`
    StructRef(String),
    /// Homogeneous array of a scalar code, e.g. `"#N"`
    ArrayCode(String),
    /// Batch of named-struct elements, e.g. `"#@customer"`
    ArrayStructRef(String),
    /// Full field definition with carried metadata
    Field(FieldDef),
}

impl FieldRef {
    /// Normalize a field-reference token
    ///
    /// `#@` and `@` prefixes are grammar, not type codes; whether the bare
    /// remainder is a registered code is the codec's concern at hydrate
    /// time (unknown codes degrade to pass-through there).
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        if let Some(name) = token.strip_prefix("#@") {
            FieldRef::ArrayStructRef(name.to_string())
        } else if let Some(name) = token.strip_prefix('@') {
            FieldRef::StructRef(name.to_string())
        } else if let Some(code) = token.strip_prefix('#') {
            FieldRef::ArrayCode(code.to_string())
        } else {
            FieldRef::Code(token.to_string())
        }
    }

    /// The scalar code this reference applies to leaves, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            FieldRef::Code(c) | FieldRef::ArrayCode(c) => Some(c.as_str()),
            FieldRef::Field(def) => Some(def.type_code.as_str()),
            _ => None,
        }
    }
}

/// Field definition carrying validation and UI metadata
///
/// Only `type` participates in hydration; `validate` and `ui` travel with
/// the schema for consumers that render forms or run field validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    #[serde(rename = "type")]
    pub type_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validate: Option<FieldValidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui: Option<JsonValue>,
}

/// Declarative field constraints, carried but not enforced during decode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldValidate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonValue>,
}

/// Normalized delimited schema: `"name:code,..."` or `"code,code"`
///
/// Invariant: either every field is named or none is; `from_delimited`
/// rejects mixed documents at normalization time.
#[derive(Debug, Clone, PartialEq)]
pub struct DelimitedSchema {
    /// Original document, kept for diagnostics and re-encoding
    pub source: String,
    pub fields: Vec<(Option<String>, String)>,
}

impl DelimitedSchema {
    /// True when fields carry names (hydrates to a keyed map)
    pub fn is_named(&self) -> bool {
        self.fields.first().map(|(n, _)| n.is_some()).unwrap_or(false)
    }
}

/// A named struct schema in one of its three normalized shapes
#[derive(Debug, Clone, PartialEq)]
pub enum StructSchema {
    /// Ordered list of field references; length 1 means homogeneous
    Positional(Vec<FieldRef>),
    /// Ordered key -> field reference pairs
    Keyed(Vec<(String, FieldRef)>),
    Delimited(DelimitedSchema),
}

impl StructSchema {
    /// Normalize a wire schema document into its shape
    pub fn from_json(doc: &JsonValue) -> Result<Self, SchemaError> {
        match doc {
            JsonValue::String(s) => Self::from_delimited(s),
            JsonValue::Array(items) => {
                let fields = items
                    .iter()
                    .map(field_ref_from_json)
                    .collect::<Result<Vec<_>, _>>()?;
                if fields.is_empty() {
                    return Err(SchemaError::Empty {
                        schema: doc.to_string(),
                    });
                }
                Ok(StructSchema::Positional(fields))
            }
            JsonValue::Object(map) => {
                let fields = map
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), field_ref_from_json(v)?)))
                    .collect::<Result<Vec<_>, SchemaError>>()?;
                if fields.is_empty() {
                    return Err(SchemaError::Empty {
                        schema: doc.to_string(),
                    });
                }
                Ok(StructSchema::Keyed(fields))
            }
            other => Err(SchemaError::UnsupportedShape {
                reason: format!("expected string, list or map, got {other}"),
            }),
        }
    }

    /// Normalize a delimited schema string
    ///
    /// `"name:code,name:code"` hydrates to a keyed map in declared order;
    /// `"code,code"` hydrates to a positional array. A single name
    /// segment anywhere forces the named form for every field.
    pub fn from_delimited(source: &str) -> Result<Self, SchemaError> {
        let mut fields = Vec::new();
        let mut named = 0usize;
        for part in source.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match part.split_once(':') {
                Some((name, code)) => {
                    named += 1;
                    fields.push((Some(name.trim().to_string()), code.trim().to_string()));
                }
                None => fields.push((None, part.to_string())),
            }
        }
        if fields.is_empty() {
            return Err(SchemaError::Empty {
                schema: source.to_string(),
            });
        }
        if named != 0 && named != fields.len() {
            return Err(SchemaError::MixedNaming {
                schema: source.to_string(),
            });
        }
        Ok(StructSchema::Delimited(DelimitedSchema {
            source: source.to_string(),
            fields,
        }))
    }

    /// Field count of the normalized shape
    pub fn len(&self) -> usize {
        match self {
            StructSchema::Positional(f) => f.len(),
            StructSchema::Keyed(f) => f.len(),
            StructSchema::Delimited(d) => d.fields.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn field_ref_from_json(doc: &JsonValue) -> Result<FieldRef, SchemaError> {
    match doc {
        JsonValue::String(s) => Ok(FieldRef::parse(s)),
        JsonValue::Object(_) => {
            let def: FieldDef =
                serde_json::from_value(doc.clone()).map_err(|e| SchemaError::UnsupportedShape {
                    reason: format!("bad field definition: {e}"),
                })?;
            Ok(FieldRef::Field(def))
        }
        other => Err(SchemaError::UnsupportedShape {
            reason: format!("field reference must be string or map, got {other}"),
        }),
    }
}
