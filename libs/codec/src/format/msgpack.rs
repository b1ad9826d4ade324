//! MessagePack extension decision layer
//!
//! MessagePack represents ints, floats, bools, strings, nil, arrays and
//! maps natively; those pass unwrapped. A payload containing a leaf
//! MessagePack would lose (Decimal, Date, Time, DateTime) is carried as
//! extension type 42 whose body is UTF-8 typed-JSON text. This module
//! only decides *when* to wrap and produces/consumes the extension body;
//! the framing itself belongs to the host's MessagePack library.

use crate::error::{CodecError, CodecResult};
use crate::format::json::{from_typed_json, to_typed_json};
use crate::hydrate::HydrateContext;
use tytx_types::TytxValue;

/// Extension type tag for TYTX typed payloads
pub const MSGPACK_EXT_TYPE: i8 = 42;

/// True when the value tree contains a leaf MessagePack cannot represent
/// natively, i.e. the payload must travel as extension 42
pub fn needs_ext(value: &TytxValue) -> bool {
    match value {
        TytxValue::List(items) => items.iter().any(needs_ext),
        TytxValue::Map(pairs) => pairs.iter().any(|(_, v)| needs_ext(v)),
        leaf => leaf.is_lossy_leaf(),
    }
}

/// Encode the extension body: UTF-8 typed-JSON text
pub fn ext_body(value: &TytxValue, ctx: &HydrateContext<'_>) -> Vec<u8> {
    to_typed_json(value, &ctx.registry.scalars())
        .to_string()
        .into_bytes()
}

/// Decode an extension-42 body back into a value
pub fn from_ext_body(body: &[u8], ctx: &HydrateContext<'_>) -> CodecResult<TytxValue> {
    let text = std::str::from_utf8(body).map_err(|e| CodecError::ExtBodyEncoding {
        reason: e.to_string(),
    })?;
    let json: serde_json::Value = serde_json::from_str(text)?;
    from_typed_json(&json, ctx)
}
