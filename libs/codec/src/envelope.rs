//! # XTYTX Envelope Protocol
//!
//! ## Purpose
//!
//! Envelopes are the schema-distribution channel. Decoding is two-phase:
//!
//! 1. **REGISTER** - every entry in `gstruct`, `gvalidation` and
//!    `gschema` is written to the shared registry, overwriting any prior
//!    holder of the name. This is a deliberate global side effect: later
//!    decodes, on unrelated payloads, resolve these names.
//! 2. **HYDRATE** - `data` (TYTX-prefixed typed text, possibly empty)
//!    decodes against a resolution context that overlays `lstruct` on
//!    the just-updated registry. Local sections are never registered;
//!    they are returned to the caller for document-scoped reuse and die
//!    with the call.
//!
//! `gstruct`, `lstruct` and `data` are required; a malformed envelope is
//! rejected before any registration runs, so a structural error never
//! leaves the registry half-updated.

use crate::error::{CodecError, CodecResult};
use crate::hydrate::{from_typed_json, HydrateContext};
use crate::registry::TytxRegistry;
use crate::suffix::{split_suffix, Suffix};
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::collections::HashMap;
use tracing::debug;
use tytx_types::{StructSchema, TytxValue, ValidationDef, XtytxEnvelope};

/// Prefix of a bare typed-JSON payload
pub const TYTX_PREFIX: &str = "TYTX://";
/// Prefix of an envelope document
pub const XTYTX_PREFIX: &str = "XTYTX://";

/// Result of one envelope decode: the hydrated payload plus the local
/// overlays, which the caller may reuse for further document-scoped work
#[derive(Debug)]
pub struct DecodedEnvelope {
    pub data: TytxValue,
    pub lstruct: HashMap<String, StructSchema>,
    pub lvalidation: HashMap<String, ValidationDef>,
    pub lschema: HashMap<String, JsonValue>,
}

/// Envelope codec bound to one registry
#[derive(Clone)]
pub struct EnvelopeCodec {
    registry: TytxRegistry,
}

impl EnvelopeCodec {
    /// Codec over an explicit registry (isolated tenants, tests)
    pub fn new(registry: TytxRegistry) -> Self {
        Self { registry }
    }

    /// Codec over the process-wide registry
    pub fn with_global() -> Self {
        Self::new(TytxRegistry::global().clone())
    }

    pub fn registry(&self) -> &TytxRegistry {
        &self.registry
    }

    /// Decode a bare `TYTX://` payload with no local overlays
    pub fn decode_data(&self, text: &str) -> CodecResult<TytxValue> {
        self.decode_data_with(text, None)
    }

    fn decode_data_with(
        &self,
        text: &str,
        locals: Option<&HashMap<String, StructSchema>>,
    ) -> CodecResult<TytxValue> {
        let body = text.strip_prefix(TYTX_PREFIX).unwrap_or(text).trim();
        // Empty data is the documented schema-only envelope, not an error
        if body.is_empty() {
            return Ok(TytxValue::None);
        }
        // A bare-scalar payload arrives wrapped: `<json>::JS`
        let json_text = {
            let scalars = self.registry.scalars();
            match split_suffix(body, &scalars) {
                (literal, Some(Suffix::Code(code))) if code.eq_ignore_ascii_case("JS") => literal,
                _ => body,
            }
        };
        let json: JsonValue = serde_json::from_str(json_text)?;
        let ctx = match locals {
            Some(locals) => HydrateContext::with_locals(&self.registry, locals),
            None => HydrateContext::new(&self.registry),
        };
        from_typed_json(&json, &ctx, 0)
    }

    /// Encode a value as a `TYTX://` payload
    ///
    /// Container roots serialize as typed JSON directly; a bare scalar
    /// root forces the `::JS` wrapper so the receiver knows to parse the
    /// payload as JSON before hydrating.
    pub fn encode_data(&self, value: &TytxValue) -> String {
        let json = crate::format::json::to_typed_json(value, &self.registry.scalars());
        let wrap = !matches!(json, JsonValue::Array(_) | JsonValue::Object(_));
        if wrap {
            format!("{TYTX_PREFIX}{}::JS", json)
        } else {
            format!("{TYTX_PREFIX}{json}")
        }
    }

    /// Decode an `XTYTX://` envelope document
    pub fn decode(&self, text: &str) -> CodecResult<DecodedEnvelope> {
        let body = text.strip_prefix(XTYTX_PREFIX).unwrap_or(text);
        let envelope: XtytxEnvelope = serde_json::from_str(body)?;
        self.decode_envelope(&envelope)
    }

    /// Decode an already-parsed envelope document
    pub fn decode_envelope(&self, envelope: &XtytxEnvelope) -> CodecResult<DecodedEnvelope> {
        // Structural check runs before any registration so a malformed
        // envelope cannot leave the registry half-updated
        if let Some(field) = envelope.missing_fields().first().copied() {
            return Err(CodecError::missing_field(field));
        }

        // REGISTER phase: global sections overwrite, last write wins
        let gstruct = envelope.gstruct.as_ref().expect("checked above");
        for (name, doc) in gstruct {
            let schema = StructSchema::from_json(doc)?;
            self.registry.register_struct(name.clone(), schema);
        }
        if let Some(gvalidation) = &envelope.gvalidation {
            for (name, doc) in gvalidation {
                let def: ValidationDef = serde_json::from_value(doc.clone())?;
                self.registry.register_validation(name.clone(), def);
            }
        }
        if let Some(gschema) = &envelope.gschema {
            for (name, doc) in gschema {
                self.registry.register_schema(name.clone(), doc.clone());
            }
        }

        // Local sections become the ephemeral overlay for this call only
        let lstruct = envelope
            .lstruct
            .as_ref()
            .expect("checked above")
            .iter()
            .map(|(name, doc)| Ok((name.clone(), StructSchema::from_json(doc)?)))
            .collect::<CodecResult<HashMap<_, _>>>()?;
        let lvalidation = envelope
            .lvalidation
            .as_ref()
            .map(|map| {
                map.iter()
                    .map(|(name, doc)| {
                        Ok((name.clone(), serde_json::from_value(doc.clone())?))
                    })
                    .collect::<CodecResult<HashMap<String, ValidationDef>>>()
            })
            .transpose()?
            .unwrap_or_default();
        let lschema = envelope
            .lschema
            .as_ref()
            .map(|map| {
                map.iter()
                    .map(|(name, doc)| (name.clone(), doc.clone()))
                    .collect::<HashMap<String, JsonValue>>()
            })
            .unwrap_or_default();

        debug!(
            gstruct = gstruct.len(),
            lstruct = lstruct.len(),
            "envelope registered, hydrating payload"
        );

        // HYDRATE phase: reads the registry snapshot updated above
        let data_text = envelope.data.as_ref().expect("checked above");
        let data = self.decode_data_with(data_text, Some(&lstruct))?;

        Ok(DecodedEnvelope {
            data,
            lstruct,
            lvalidation,
            lschema,
        })
    }

    /// Encode an envelope document with its prefix
    pub fn encode_envelope(&self, envelope: &XtytxEnvelope) -> CodecResult<String> {
        Ok(format!(
            "{XTYTX_PREFIX}{}",
            serde_json::to_string(envelope)?
        ))
    }
}

/// Builder assembling an envelope from parts
#[derive(Debug, Default)]
pub struct EnvelopeBuilder {
    envelope: XtytxEnvelope,
}

impl EnvelopeBuilder {
    pub fn new() -> Self {
        Self {
            envelope: XtytxEnvelope::empty(),
        }
    }

    pub fn global_struct(mut self, name: impl Into<String>, doc: JsonValue) -> Self {
        self.envelope
            .gstruct
            .get_or_insert_with(JsonMap::new)
            .insert(name.into(), doc);
        self
    }

    pub fn local_struct(mut self, name: impl Into<String>, doc: JsonValue) -> Self {
        self.envelope
            .lstruct
            .get_or_insert_with(JsonMap::new)
            .insert(name.into(), doc);
        self
    }

    pub fn global_validation(mut self, name: impl Into<String>, def: &ValidationDef) -> Self {
        let doc = serde_json::to_value(def).expect("validation defs serialize");
        self.envelope
            .gvalidation
            .get_or_insert_with(JsonMap::new)
            .insert(name.into(), doc);
        self
    }

    pub fn local_validation(mut self, name: impl Into<String>, def: &ValidationDef) -> Self {
        let doc = serde_json::to_value(def).expect("validation defs serialize");
        self.envelope
            .lvalidation
            .get_or_insert_with(JsonMap::new)
            .insert(name.into(), doc);
        self
    }

    pub fn global_schema(mut self, name: impl Into<String>, doc: JsonValue) -> Self {
        self.envelope
            .gschema
            .get_or_insert_with(JsonMap::new)
            .insert(name.into(), doc);
        self
    }

    pub fn local_schema(mut self, name: impl Into<String>, doc: JsonValue) -> Self {
        self.envelope
            .lschema
            .get_or_insert_with(JsonMap::new)
            .insert(name.into(), doc);
        self
    }

    /// Set the payload from a value, encoding it as TYTX typed text
    pub fn data(mut self, value: &TytxValue, codec: &EnvelopeCodec) -> Self {
        self.envelope.data = Some(codec.encode_data(value));
        self
    }

    /// Set the payload text verbatim
    pub fn data_text(mut self, text: impl Into<String>) -> Self {
        self.envelope.data = Some(text.into());
        self
    }

    pub fn build(self) -> XtytxEnvelope {
        self.envelope
    }
}
