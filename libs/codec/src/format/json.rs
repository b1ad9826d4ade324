//! Typed-JSON boundary adapter
//!
//! JSON-native scalars (int, float, bool, string, null) pass through
//! containers unmarked; only the leaves JSON cannot represent exactly
//! (Decimal, Date, Time, DateTime) carry suffix markers. Decoding runs
//! every string leaf through the suffix grammar, so a payload produced by
//! any schema version hydrates as far as the local registry allows.

use crate::error::CodecResult;
use crate::hydrate::{from_typed_json as hydrate_json, HydrateContext};
use crate::scalar::ScalarCodec;
use serde_json::Value as JsonValue;
use tytx_types::TytxValue;

/// Untyped JSON -> value bridge: no suffix interpretation at all
///
/// Used where a payload is known to be plain JSON (the JS scalar type) or
/// as the degradation target for forward-tolerant paths.
pub fn value_from_json(json: &JsonValue) -> TytxValue {
    match json {
        JsonValue::Null => TytxValue::None,
        JsonValue::Bool(b) => TytxValue::Bool(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                TytxValue::Int(i)
            } else {
                TytxValue::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        JsonValue::String(s) => TytxValue::Str(s.clone()),
        JsonValue::Array(items) => TytxValue::List(items.iter().map(value_from_json).collect()),
        JsonValue::Object(map) => TytxValue::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), value_from_json(v)))
                .collect(),
        ),
    }
}

/// Value -> plain JSON with no markers; lossy leaves degrade to their
/// canonical untyped text
pub fn value_to_plain_json(value: &TytxValue) -> JsonValue {
    match value {
        TytxValue::None => JsonValue::Null,
        TytxValue::Bool(b) => JsonValue::Bool(*b),
        TytxValue::Int(n) => JsonValue::from(*n),
        TytxValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        TytxValue::Str(s) => JsonValue::String(s.clone()),
        TytxValue::Decimal(d) => JsonValue::String(d.to_string()),
        TytxValue::Date(d) => JsonValue::String(d.format("%Y-%m-%d").to_string()),
        TytxValue::Time(t) => JsonValue::String(t.format("%H:%M:%S").to_string()),
        TytxValue::DateTime(dt) => {
            JsonValue::String(dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        }
        TytxValue::List(items) => {
            JsonValue::Array(items.iter().map(value_to_plain_json).collect())
        }
        TytxValue::Map(pairs) => JsonValue::Object(
            pairs
                .iter()
                .map(|(k, v)| (k.clone(), value_to_plain_json(v)))
                .collect(),
        ),
    }
}

/// Value -> typed JSON: lossy leaves carry suffix markers, the rest pass
/// through natively
pub fn to_typed_json(value: &TytxValue, scalars: &ScalarCodec) -> JsonValue {
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
                .map(|item| to_typed_json(item, scalars))
                .collect(),
        ),
        TytxValue::Map(pairs) => JsonValue::Object(
            pairs
                .iter()
                .map(|(k, v)| (k.clone(), to_typed_json(v, scalars)))
                .collect(),
        ),
        lossy => JsonValue::String(scalars.as_typed_text(lossy)),
    }
}

/// Hydrate a typed-JSON document
pub fn from_typed_json(json: &JsonValue, ctx: &HydrateContext<'_>) -> CodecResult<TytxValue> {
    hydrate_json(json, ctx, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TytxRegistry;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_native_scalars_pass_unmarked() {
        let scalars = ScalarCodec::with_builtins();
        let value = TytxValue::Map(vec![
            ("n".to_string(), TytxValue::Int(5)),
            ("f".to_string(), TytxValue::Float(1.5)),
            ("b".to_string(), TytxValue::Bool(true)),
            ("s".to_string(), TytxValue::Str("plain".to_string())),
            ("gone".to_string(), TytxValue::None),
        ]);
        assert_eq!(
            to_typed_json(&value, &scalars),
            json!({"n": 5, "f": 1.5, "b": true, "s": "plain", "gone": null})
        );
    }

    #[test]
    fn test_lossy_leaves_carry_markers() {
        let scalars = ScalarCodec::with_builtins();
        let value = TytxValue::Map(vec![
            ("price".to_string(), TytxValue::Decimal(dec!(100.50))),
            (
                "day".to_string(),
                TytxValue::Date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()),
            ),
        ]);
        assert_eq!(
            to_typed_json(&value, &scalars),
            json!({"price": "100.50::N", "day": "2024-03-15::D"})
        );
    }

    #[test]
    fn test_typed_json_round_trip() {
        let registry = TytxRegistry::new();
        let value = TytxValue::Map(vec![
            ("qty".to_string(), TytxValue::Int(3)),
            ("price".to_string(), TytxValue::Decimal(dec!(9.99))),
            (
                "items".to_string(),
                TytxValue::List(vec![TytxValue::Str("a".to_string()), TytxValue::Int(1)]),
            ),
        ]);
        let json = to_typed_json(&value, &registry.scalars());
        let back = from_typed_json(&json, &HydrateContext::new(&registry)).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_suffix_precedence_on_url() {
        let registry = TytxRegistry::new();
        let back = from_typed_json(
            &json!("http://example.com::T"),
            &HydrateContext::new(&registry),
        )
        .unwrap();
        assert_eq!(back, TytxValue::Str("http://example.com".to_string()));
    }
}
