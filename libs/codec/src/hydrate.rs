//! # Struct-Schema Hydration Engine
//!
//! ## Purpose
//!
//! Applies a named struct schema to a composite JSON payload, turning
//! marked and schema-qualified text back into native typed values. The
//! decode direction implemented here is the authoritative one; the encode
//! direction ([`dehydrate_struct`]) is generic best-effort serialization.
//!
//! ## Dispatch rules
//!
//! | shape | rule |
//! |-------|------|
//! | Keyed | apply code per key present in both schema and data; unknown keys pass through; missing keys are never inserted |
//! | Positional, len>1 | `schema[i]` to `data[i]`; list-of-lists data means batch mode, implied by shape alone |
//! | Positional, len==1 | the single code applies to every leaf through nested arrays |
//! | Delimited | named fields hydrate to an ordered keyed map, unnamed to a positional array |
//! | FieldDef | `type` supplies the code; validate/ui metadata is carried, not enforced |
//! | `@NAME` | recurse into the named schema; unknown references pass through untransformed |
//!
//! Schema resolution overlays the envelope's local structs on the shared
//! registry: local wins, and local entries never leak past the decode
//! call that carried them.

use crate::config::CODEC_CONFIG;
use crate::error::{CodecError, CodecResult};
use crate::registry::TytxRegistry;
use crate::scalar::ScalarCodec;
use crate::suffix::{apply_code_to_json, split_suffix, Suffix};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tracing::debug;
use tytx_types::{DelimitedSchema, FieldRef, StructSchema, TytxValue};

/// Resolution context for one decode call
///
/// `local` is the envelope-scoped overlay; it is consulted before the
/// shared registry and discarded with the context.
pub struct HydrateContext<'a> {
    pub registry: &'a TytxRegistry,
    pub local_structs: Option<&'a HashMap<String, StructSchema>>,
}

impl<'a> HydrateContext<'a> {
    pub fn new(registry: &'a TytxRegistry) -> Self {
        Self {
            registry,
            local_structs: None,
        }
    }

    pub fn with_locals(
        registry: &'a TytxRegistry,
        local_structs: &'a HashMap<String, StructSchema>,
    ) -> Self {
        Self {
            registry,
            local_structs: Some(local_structs),
        }
    }

    /// Resolve a struct name: local overlay first, then the registry
    pub fn resolve_struct(&self, name: &str) -> Option<StructSchema> {
        if let Some(locals) = self.local_structs {
            if let Some(schema) = locals.get(name) {
                return Some(schema.clone());
            }
        }
        self.registry.get_struct(name)
    }
}

fn check_depth(depth: usize) -> CodecResult<()> {
    let limit = CODEC_CONFIG.max_depth;
    if depth > limit {
        return Err(CodecError::DepthExceeded { limit });
    }
    Ok(())
}

/// Hydrate a typed-JSON fragment: every string leaf runs through the
/// suffix grammar, containers recurse
pub fn from_typed_json(
    json: &JsonValue,
    ctx: &HydrateContext<'_>,
    depth: usize,
) -> CodecResult<TytxValue> {
    check_depth(depth)?;
    match json {
        JsonValue::Null => Ok(TytxValue::None),
        JsonValue::Bool(b) => Ok(TytxValue::Bool(*b)),
        JsonValue::Number(n) => Ok(number_value(n)),
        JsonValue::String(s) => hydrate_typed_string(s, ctx, depth),
        JsonValue::Array(items) => Ok(TytxValue::List(
            items
                .iter()
                .map(|item| from_typed_json(item, ctx, depth + 1))
                .collect::<CodecResult<Vec<_>>>()?,
        )),
        JsonValue::Object(map) => Ok(TytxValue::Map(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), from_typed_json(v, ctx, depth + 1)?)))
                .collect::<CodecResult<Vec<_>>>()?,
        )),
    }
}

fn number_value(n: &serde_json::Number) -> TytxValue {
    if let Some(i) = n.as_i64() {
        TytxValue::Int(i)
    } else {
        TytxValue::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Hydrate one typed-text string through the suffix grammar
pub fn hydrate_typed_string(
    text: &str,
    ctx: &HydrateContext<'_>,
    depth: usize,
) -> CodecResult<TytxValue> {
    check_depth(depth)?;
    let scalars = ctx.registry.scalars();
    let (literal, suffix) = split_suffix(text, &scalars);
    match suffix {
        None => Ok(TytxValue::Str(text.to_string())),
        Some(Suffix::Code(code)) => {
            // ::JS wraps typed-JSON text whose own string leaves may carry
            // markers; hydrate them instead of embedding untyped
            if scalars.get(&code).map(|d| d.code()) == Some("JS") {
                drop(scalars);
                return match serde_json::from_str::<JsonValue>(literal) {
                    Ok(json) => from_typed_json(&json, ctx, depth + 1),
                    Err(_) => Ok(TytxValue::Str(text.to_string())),
                };
            }
            // Compact array form: an array literal under a plain code
            // applies the code to every leaf
            if literal.trim_start().starts_with('[') {
                if let Ok(json @ JsonValue::Array(_)) = serde_json::from_str::<JsonValue>(literal)
                {
                    return Ok(apply_code_to_json(&json, &code, &scalars));
                }
            }
            Ok(scalars.from_text_lenient(literal, &code))
        }
        Some(Suffix::ArrayCode(code)) => match serde_json::from_str::<JsonValue>(literal) {
            Ok(json) => Ok(apply_code_to_json(&json, &code, &scalars)),
            Err(_) => Ok(TytxValue::Str(text.to_string())),
        },
        Some(Suffix::Struct(name)) => {
            let Some(schema) = ctx.resolve_struct(&name) else {
                debug!(name = %name, "unknown struct reference, passing literal through");
                return Ok(TytxValue::Str(text.to_string()));
            };
            drop(scalars);
            match serde_json::from_str::<JsonValue>(literal) {
                Ok(json) => hydrate_struct(&schema, &json, ctx, depth + 1),
                Err(_) => Ok(TytxValue::Str(text.to_string())),
            }
        }
        Some(Suffix::ArrayStruct(name)) => {
            let Some(schema) = ctx.resolve_struct(&name) else {
                debug!(name = %name, "unknown struct reference, passing literal through");
                return Ok(TytxValue::Str(text.to_string()));
            };
            drop(scalars);
            match serde_json::from_str::<JsonValue>(literal) {
                Ok(JsonValue::Array(items)) => Ok(TytxValue::List(
                    items
                        .iter()
                        .map(|item| hydrate_struct(&schema, item, ctx, depth + 1))
                        .collect::<CodecResult<Vec<_>>>()?,
                )),
                Ok(json) => hydrate_struct(&schema, &json, ctx, depth + 1),
                Err(_) => Ok(TytxValue::Str(text.to_string())),
            }
        }
    }
}

/// Apply a struct schema to a JSON payload
pub fn hydrate_struct(
    schema: &StructSchema,
    data: &JsonValue,
    ctx: &HydrateContext<'_>,
    depth: usize,
) -> CodecResult<TytxValue> {
    check_depth(depth)?;
    match schema {
        StructSchema::Keyed(fields) => hydrate_keyed(fields, data, ctx, depth),
        StructSchema::Positional(fields) if fields.len() == 1 => {
            apply_homogeneous(&fields[0], data, ctx, depth)
        }
        StructSchema::Positional(fields) => hydrate_positional(fields, data, ctx, depth),
        StructSchema::Delimited(d) => hydrate_delimited(d, data, ctx, depth),
    }
}

fn hydrate_keyed(
    fields: &[(String, FieldRef)],
    data: &JsonValue,
    ctx: &HydrateContext<'_>,
    depth: usize,
) -> CodecResult<TytxValue> {
    match data {
        JsonValue::Object(map) => {
            let mut out = Vec::with_capacity(map.len());
            for (key, value) in map {
                let hydrated = match fields.iter().find(|(name, _)| name == key) {
                    Some((_, fref)) => apply_field_ref(fref, value, ctx, depth + 1)?,
                    // Unknown keys pass through generic hydration
                    None => from_typed_json(value, ctx, depth + 1)?,
                };
                out.push((key.clone(), hydrated));
            }
            // Keys in the schema but absent from the data are skipped,
            // never inserted
            Ok(TytxValue::Map(out))
        }
        // Batch: apply the schema to each element
        JsonValue::Array(items) => Ok(TytxValue::List(
            items
                .iter()
                .map(|item| hydrate_keyed(fields, item, ctx, depth + 1))
                .collect::<CodecResult<Vec<_>>>()?,
        )),
        other => from_typed_json(other, ctx, depth),
    }
}

fn hydrate_positional(
    fields: &[FieldRef],
    data: &JsonValue,
    ctx: &HydrateContext<'_>,
    depth: usize,
) -> CodecResult<TytxValue> {
    let JsonValue::Array(items) = data else {
        return from_typed_json(data, ctx, depth);
    };
    // Batch mode is implied by data shape, not a flag
    let batch = !items.is_empty() && items.iter().all(JsonValue::is_array);
    if batch {
        return Ok(TytxValue::List(
            items
                .iter()
                .map(|row| hydrate_positional_row(fields, row, ctx, depth + 1))
                .collect::<CodecResult<Vec<_>>>()?,
        ));
    }
    hydrate_positional_row(fields, data, ctx, depth)
}

fn hydrate_positional_row(
    fields: &[FieldRef],
    row: &JsonValue,
    ctx: &HydrateContext<'_>,
    depth: usize,
) -> CodecResult<TytxValue> {
    let JsonValue::Array(items) = row else {
        return from_typed_json(row, ctx, depth);
    };
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let hydrated = match fields.get(i) {
            Some(fref) => apply_field_ref(fref, item, ctx, depth + 1)?,
            // Data longer than the schema passes through untransformed
            None => from_typed_json(item, ctx, depth + 1)?,
        };
        out.push(hydrated);
    }
    Ok(TytxValue::List(out))
}

fn hydrate_delimited(
    schema: &DelimitedSchema,
    data: &JsonValue,
    ctx: &HydrateContext<'_>,
    depth: usize,
) -> CodecResult<TytxValue> {
    check_depth(depth)?;
    match data {
        // Delimited text rows split on the same separator as the schema
        JsonValue::String(s) => {
            let scalars = ctx.registry.scalars();
            let values: Vec<TytxValue> = s
                .split(',')
                .zip(schema.fields.iter())
                .map(|(part, (_, code))| scalars.from_text_lenient(part.trim(), code))
                .collect();
            Ok(assemble_delimited(schema, values))
        }
        JsonValue::Array(items) => {
            let batch = !items.is_empty() && items.iter().all(JsonValue::is_array);
            if batch {
                return Ok(TytxValue::List(
                    items
                        .iter()
                        .map(|row| hydrate_delimited(schema, row, ctx, depth + 1))
                        .collect::<CodecResult<Vec<_>>>()?,
                ));
            }
            let scalars = ctx.registry.scalars();
            let values: Vec<TytxValue> = items
                .iter()
                .zip(schema.fields.iter())
                .map(|(item, (_, code))| apply_code_to_json(item, code, &scalars))
                .collect();
            Ok(assemble_delimited(schema, values))
        }
        other => from_typed_json(other, ctx, depth),
    }
}

fn assemble_delimited(schema: &DelimitedSchema, values: Vec<TytxValue>) -> TytxValue {
    if schema.is_named() {
        // Named fields hydrate to a keyed map in declared order
        TytxValue::Map(
            schema
                .fields
                .iter()
                .zip(values)
                .map(|((name, _), value)| {
                    (name.clone().unwrap_or_default(), value)
                })
                .collect(),
        )
    } else {
        TytxValue::List(values)
    }
}

fn apply_field_ref(
    fref: &FieldRef,
    data: &JsonValue,
    ctx: &HydrateContext<'_>,
    depth: usize,
) -> CodecResult<TytxValue> {
    check_depth(depth)?;
    match fref {
        FieldRef::Code(code) | FieldRef::ArrayCode(code) => {
            let scalars = ctx.registry.scalars();
            if scalars.is_known_code(code) {
                Ok(apply_code_to_json(data, code, &scalars))
            } else {
                // Unknown code: forward tolerance, no transformation
                drop(scalars);
                from_typed_json(data, ctx, depth)
            }
        }
        FieldRef::Field(def) => {
            let scalars = ctx.registry.scalars();
            if scalars.is_known_code(&def.type_code) {
                Ok(apply_code_to_json(data, &def.type_code, &scalars))
            } else {
                drop(scalars);
                from_typed_json(data, ctx, depth)
            }
        }
        FieldRef::StructRef(name) => match ctx.resolve_struct(name) {
            Some(schema) => hydrate_struct(&schema, data, ctx, depth + 1),
            None => {
                debug!(name = %name, "unknown struct reference in field, passing through");
                from_typed_json(data, ctx, depth)
            }
        },
        FieldRef::ArrayStructRef(name) => match ctx.resolve_struct(name) {
            Some(schema) => match data {
                JsonValue::Array(items) => Ok(TytxValue::List(
                    items
                        .iter()
                        .map(|item| hydrate_struct(&schema, item, ctx, depth + 1))
                        .collect::<CodecResult<Vec<_>>>()?,
                )),
                other => hydrate_struct(&schema, other, ctx, depth + 1),
            },
            None => from_typed_json(data, ctx, depth),
        },
    }
}

fn apply_homogeneous(
    fref: &FieldRef,
    data: &JsonValue,
    ctx: &HydrateContext<'_>,
    depth: usize,
) -> CodecResult<TytxValue> {
    check_depth(depth)?;
    match data {
        JsonValue::Array(items) => Ok(TytxValue::List(
            items
                .iter()
                .map(|item| apply_homogeneous(fref, item, ctx, depth + 1))
                .collect::<CodecResult<Vec<_>>>()?,
        )),
        leaf => apply_field_ref(fref, leaf, ctx, depth),
    }
}

/// Generic best-effort dehydration of a hydrated value under a schema
///
/// Leaves covered by the schema serialize untyped (the schema carries the
/// code); everything else falls back to typed-JSON leaf marking.
pub fn dehydrate_struct(
    schema: &StructSchema,
    value: &TytxValue,
    ctx: &HydrateContext<'_>,
) -> JsonValue {
    let scalars = ctx.registry.scalars();
    match (schema, value) {
        (StructSchema::Keyed(fields), TytxValue::Map(pairs)) => JsonValue::Object(
            pairs
                .iter()
                .map(|(k, v)| {
                    let known = fields.iter().any(|(name, _)| name == k);
                    (k.clone(), dehydrate_leaf(v, known, &scalars))
                })
                .collect(),
        ),
        (_, TytxValue::List(items)) => JsonValue::Array(
            items
                .iter()
                .map(|item| dehydrate_struct(schema, item, ctx))
                .collect(),
        ),
        (_, leaf) => dehydrate_leaf(leaf, true, &scalars),
    }
}

fn dehydrate_leaf(value: &TytxValue, schema_covered: bool, scalars: &ScalarCodec) -> JsonValue {
    match value {
        TytxValue::None => JsonValue::Null,
        TytxValue::Bool(b) => JsonValue::Bool(*b),
        TytxValue::Int(n) => JsonValue::from(*n),
        TytxValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        TytxValue::Str(s) => JsonValue::String(s.clone()),
        TytxValue::List(items) => JsonValue::Array(
            items
                .iter()
                .map(|i| dehydrate_leaf(i, schema_covered, scalars))
                .collect(),
        ),
        TytxValue::Map(pairs) => JsonValue::Object(
            pairs
                .iter()
                .map(|(k, v)| (k.clone(), dehydrate_leaf(v, false, scalars)))
                .collect(),
        ),
        lossy => {
            if schema_covered {
                JsonValue::String(scalars.as_text(lossy))
            } else {
                JsonValue::String(scalars.as_typed_text(lossy))
            }
        }
    }
}
