//! Plain-text boundary adapter
//!
//! A text-only target has no native types at all, so every scalar carries
//! its marker here, including strings and integers that a JSON container
//! would pass unmarked. Containers serialize through the compact-array
//! form when homogeneous, or to typed-JSON text under a `::JS` marker.

use crate::error::CodecResult;
use crate::format::json::to_typed_json;
use crate::hydrate::{hydrate_typed_string, HydrateContext};
use crate::suffix::{encode_list, typed_token};
use tytx_types::TytxValue;

/// Serialize any value for a text-only target
pub fn to_typed_text(value: &TytxValue, ctx: &HydrateContext<'_>) -> String {
    let scalars = ctx.registry.scalars();
    match value {
        TytxValue::List(items) => encode_list(items, &scalars),
        TytxValue::Map(_) => {
            typed_token(&to_typed_json(value, &scalars).to_string(), "JS")
        }
        scalar => scalars.as_typed_text(scalar),
    }
}

/// Hydrate a single typed-text token
pub fn from_typed_text(text: &str, ctx: &HydrateContext<'_>) -> CodecResult<TytxValue> {
    hydrate_typed_string(text, ctx, 0)
}
