//! XTYTX envelope document
//!
//! The envelope is the schema-distribution channel: `g*` sections mutate
//! the process-wide registry when decoded, `l*` sections exist only for
//! the one decode call that carried them. `gstruct`, `lstruct` and `data`
//! are required on the wire; decoding surfaces their absence as a fatal
//! structural error rather than defaulting, because the registration side
//! effects of a silently-defaulted envelope would be ambiguous.

use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

/// Wire document of the XTYTX envelope protocol
///
/// Required fields are still `Option` here: serde fills what the wire
/// carried and `missing_fields` reports the gap, so the codec can raise
/// one precise structural error instead of a generic deserialize failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XtytxEnvelope {
    /// Struct schemas to register globally (required, may be empty)
    pub gstruct: Option<JsonMap<String, JsonValue>>,
    /// Struct schemas scoped to this decode call (required, may be empty)
    pub lstruct: Option<JsonMap<String, JsonValue>>,
    /// Validation rules to register globally
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gvalidation: Option<JsonMap<String, JsonValue>>,
    /// Validation rules scoped to this decode call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lvalidation: Option<JsonMap<String, JsonValue>>,
    /// Opaque schema documents to register globally
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gschema: Option<JsonMap<String, JsonValue>>,
    /// Opaque schema documents scoped to this decode call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lschema: Option<JsonMap<String, JsonValue>>,
    /// TYTX-prefixed typed text; empty string means schema-only envelope
    pub data: Option<String>,
}

impl XtytxEnvelope {
    /// Envelope with empty required sections and no payload
    pub fn empty() -> Self {
        Self {
            gstruct: Some(JsonMap::new()),
            lstruct: Some(JsonMap::new()),
            data: Some(String::new()),
            ..Self::default()
        }
    }

    /// Names of required fields the wire document omitted
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.gstruct.is_none() {
            missing.push("gstruct");
        }
        if self.lstruct.is_none() {
            missing.push("lstruct");
        }
        if self.data.is_none() {
            missing.push("data");
        }
        missing
    }
}
