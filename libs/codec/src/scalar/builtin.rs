//! Builtin TYTX scalar type definitions
//!
//! Canonical text forms:
//!
//! | code | value | canonical text |
//! |------|-------|----------------|
//! | L | Int | decimal digits, optional sign |
//! | R | Float | shortest float repr |
//! | N | Decimal | `rust_decimal` string, scale preserved |
//! | B | Bool | `true` / `false` |
//! | T | Str | verbatim |
//! | D | Date | `YYYY-MM-DD` |
//! | H | Time | `HH:MM:SS` (`.mmm` only when nonzero) |
//! | DHZ | DateTime | `YYYY-MM-DDTHH:MM:SSZ`, second precision |
//! | DH | DateTime | deprecated naive form, parse-only |
//! | JS | List/Map | embedded JSON text |
//! | NN | None | empty literal |
//!
//! DHZ emission is fixed at second precision; millisecond input and the
//! naive DH form are accepted on parse only, so every port emits one
//! canonical instant form.

use super::TypeDefinition;
use crate::format::json::{value_from_json, value_to_plain_json};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};
use tytx_types::{ScalarError, ScalarResult, TytxValue};

/// All builtin definitions in canonical detection order
pub fn builtin_types() -> Vec<Arc<dyn TypeDefinition>> {
    vec![
        Arc::new(DecimalType),
        Arc::new(IntegerType),
        Arc::new(RealType),
        Arc::new(BooleanType),
        Arc::new(TextType),
        Arc::new(DateType),
        Arc::new(TimeType),
        Arc::new(DateTimeType),
        Arc::new(NaiveDateTimeType),
        Arc::new(JsonType),
        Arc::new(NoneType),
    ]
}

pub struct IntegerType;

impl TypeDefinition for IntegerType {
    fn code(&self) -> &str {
        "L"
    }
    fn name(&self) -> &str {
        "integer"
    }
    fn aliases(&self) -> &[&str] {
        &["int", "long"]
    }
    fn parse(&self, text: &str) -> ScalarResult<TytxValue> {
        i64::from_str(text.trim())
            .map(TytxValue::Int)
            .map_err(|e| ScalarError::invalid_literal("L", text, e.to_string()))
    }
    fn serialize(&self, value: &TytxValue) -> Option<String> {
        match value {
            TytxValue::Int(n) => Some(n.to_string()),
            _ => None,
        }
    }
    fn matches(&self, value: &TytxValue) -> bool {
        matches!(value, TytxValue::Int(_))
    }
}

pub struct RealType;

impl TypeDefinition for RealType {
    fn code(&self) -> &str {
        "R"
    }
    fn name(&self) -> &str {
        "real"
    }
    fn aliases(&self) -> &[&str] {
        &["float", "double"]
    }
    fn parse(&self, text: &str) -> ScalarResult<TytxValue> {
        f64::from_str(text.trim())
            .map(TytxValue::Float)
            .map_err(|e| ScalarError::invalid_literal("R", text, e.to_string()))
    }
    fn serialize(&self, value: &TytxValue) -> Option<String> {
        match value {
            TytxValue::Float(f) => Some(f.to_string()),
            _ => None,
        }
    }
    fn matches(&self, value: &TytxValue) -> bool {
        matches!(value, TytxValue::Float(_))
    }
}

/// Arbitrary-precision decimal with a documented float fallback
///
/// Text that `rust_decimal` cannot represent (out of range) degrades to a
/// float parse with a debug log. Precision loss on that path is the
/// documented trade-off, never a crash.
pub struct DecimalType;

impl TypeDefinition for DecimalType {
    fn code(&self) -> &str {
        "N"
    }
    fn name(&self) -> &str {
        "decimal"
    }
    fn aliases(&self) -> &[&str] {
        &["numeric", "number"]
    }
    fn parse(&self, text: &str) -> ScalarResult<TytxValue> {
        let trimmed = text.trim();
        if let Ok(d) = Decimal::from_str(trimmed) {
            return Ok(TytxValue::Decimal(d));
        }
        if let Ok(d) = Decimal::from_scientific(trimmed) {
            return Ok(TytxValue::Decimal(d));
        }
        match f64::from_str(trimmed) {
            Ok(f) => {
                debug!(input = %trimmed, "decimal out of range, falling back to float");
                Ok(TytxValue::Float(f))
            }
            Err(e) => Err(ScalarError::invalid_literal("N", text, e.to_string())),
        }
    }
    fn serialize(&self, value: &TytxValue) -> Option<String> {
        match value {
            TytxValue::Decimal(d) => Some(d.to_string()),
            _ => None,
        }
    }
    fn matches(&self, value: &TytxValue) -> bool {
        matches!(value, TytxValue::Decimal(_))
    }
}

pub struct BooleanType;

impl TypeDefinition for BooleanType {
    fn code(&self) -> &str {
        "B"
    }
    fn name(&self) -> &str {
        "boolean"
    }
    fn aliases(&self) -> &[&str] {
        &["bool"]
    }
    fn parse(&self, text: &str) -> ScalarResult<TytxValue> {
        match text.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" | "y" | "t" => Ok(TytxValue::Bool(true)),
            "false" | "0" | "no" | "off" | "n" | "f" => Ok(TytxValue::Bool(false)),
            _ => Err(ScalarError::invalid_literal(
                "B",
                text,
                "not a recognized boolean literal",
            )),
        }
    }
    fn serialize(&self, value: &TytxValue) -> Option<String> {
        match value {
            TytxValue::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
    fn matches(&self, value: &TytxValue) -> bool {
        matches!(value, TytxValue::Bool(_))
    }
}

pub struct TextType;

impl TypeDefinition for TextType {
    fn code(&self) -> &str {
        "T"
    }
    fn name(&self) -> &str {
        "text"
    }
    fn aliases(&self) -> &[&str] {
        &["str", "string"]
    }
    fn parse(&self, text: &str) -> ScalarResult<TytxValue> {
        // Verbatim: leading/trailing whitespace is content
        Ok(TytxValue::Str(text.to_string()))
    }
    fn serialize(&self, value: &TytxValue) -> Option<String> {
        match value {
            TytxValue::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
    fn matches(&self, value: &TytxValue) -> bool {
        matches!(value, TytxValue::Str(_))
    }
}

pub struct DateType;

impl TypeDefinition for DateType {
    fn code(&self) -> &str {
        "D"
    }
    fn name(&self) -> &str {
        "date"
    }
    fn parse(&self, text: &str) -> ScalarResult<TytxValue> {
        NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .map(TytxValue::Date)
            .map_err(|e| ScalarError::invalid_literal("D", text, e.to_string()))
    }
    fn serialize(&self, value: &TytxValue) -> Option<String> {
        match value {
            TytxValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            _ => None,
        }
    }
    fn matches(&self, value: &TytxValue) -> bool {
        matches!(value, TytxValue::Date(_))
    }
}

pub struct TimeType;

impl TypeDefinition for TimeType {
    fn code(&self) -> &str {
        "H"
    }
    fn name(&self) -> &str {
        "hour"
    }
    fn aliases(&self) -> &[&str] {
        &["time"]
    }
    fn parse(&self, text: &str) -> ScalarResult<TytxValue> {
        let trimmed = text.trim();
        NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
            .map(TytxValue::Time)
            .map_err(|e| ScalarError::invalid_literal("H", text, e.to_string()))
    }
    fn serialize(&self, value: &TytxValue) -> Option<String> {
        match value {
            TytxValue::Time(t) => {
                if t.nanosecond() == 0 {
                    Some(t.format("%H:%M:%S").to_string())
                } else {
                    Some(t.format("%H:%M:%S%.3f").to_string())
                }
            }
            _ => None,
        }
    }
    fn matches(&self, value: &TytxValue) -> bool {
        matches!(value, TytxValue::Time(_))
    }
}

/// Timezone-aware datetime, always normalized to UTC
pub struct DateTimeType;

impl TypeDefinition for DateTimeType {
    fn code(&self) -> &str {
        "DHZ"
    }
    fn name(&self) -> &str {
        "datetime"
    }
    fn parse(&self, text: &str) -> ScalarResult<TytxValue> {
        DateTime::parse_from_rfc3339(text.trim())
            .map(|dt| TytxValue::DateTime(dt.with_timezone(&Utc)))
            .map_err(|e| ScalarError::invalid_literal("DHZ", text, e.to_string()))
    }
    fn serialize(&self, value: &TytxValue) -> Option<String> {
        match value {
            // Second-precision emission is canonical; finer input is
            // accepted on parse only
            TytxValue::DateTime(dt) => Some(dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
            _ => None,
        }
    }
    fn matches(&self, value: &TytxValue) -> bool {
        matches!(value, TytxValue::DateTime(_))
    }
}

/// Deprecated naive datetime form; parse-only, interpreted as UTC
pub struct NaiveDateTimeType;

impl TypeDefinition for NaiveDateTimeType {
    fn code(&self) -> &str {
        "DH"
    }
    fn name(&self) -> &str {
        "datetime_naive"
    }
    fn parse(&self, text: &str) -> ScalarResult<TytxValue> {
        warn!(input = %text, "DH is deprecated; emit DHZ instead");
        let trimmed = text.trim();
        NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f"))
            .map(|dt| TytxValue::DateTime(dt.and_utc()))
            .map_err(|e| ScalarError::invalid_literal("DH", text, e.to_string()))
    }
    fn serialize(&self, _value: &TytxValue) -> Option<String> {
        // Parse-only: DHZ owns emission for datetime values
        None
    }
    fn matches(&self, _value: &TytxValue) -> bool {
        false
    }
}

/// Embedded JSON document, hydrated without suffix interpretation
pub struct JsonType;

impl TypeDefinition for JsonType {
    fn code(&self) -> &str {
        "JS"
    }
    fn name(&self) -> &str {
        "json"
    }
    fn parse(&self, text: &str) -> ScalarResult<TytxValue> {
        serde_json::from_str(text)
            .map(|doc| value_from_json(&doc))
            .map_err(|e| ScalarError::invalid_literal("JS", text, e.to_string()))
    }
    fn serialize(&self, value: &TytxValue) -> Option<String> {
        match value {
            TytxValue::List(_) | TytxValue::Map(_) => {
                Some(value_to_plain_json(value).to_string())
            }
            _ => None,
        }
    }
    fn matches(&self, value: &TytxValue) -> bool {
        matches!(value, TytxValue::List(_) | TytxValue::Map(_))
    }
}

/// Explicit no-value marker
///
/// The literal is empty and any literal parses to None; the marker exists
/// so absence survives text targets without colliding with the string
/// "null".
pub struct NoneType;

impl TypeDefinition for NoneType {
    fn code(&self) -> &str {
        "NN"
    }
    fn name(&self) -> &str {
        "none"
    }
    fn aliases(&self) -> &[&str] {
        &["null"]
    }
    fn parse(&self, _text: &str) -> ScalarResult<TytxValue> {
        Ok(TytxValue::None)
    }
    fn serialize(&self, value: &TytxValue) -> Option<String> {
        match value {
            TytxValue::None => Some(String::new()),
            _ => None,
        }
    }
    fn matches(&self, value: &TytxValue) -> bool {
        matches!(value, TytxValue::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_boolean_parse_aliases() {
        for literal in ["true", "1", "yes", "on", "Y", "T"] {
            assert_eq!(
                BooleanType.parse(literal).unwrap(),
                TytxValue::Bool(true),
                "{literal}"
            );
        }
        for literal in ["false", "0", "no", "off", "N", "F"] {
            assert_eq!(
                BooleanType.parse(literal).unwrap(),
                TytxValue::Bool(false),
                "{literal}"
            );
        }
        assert!(BooleanType.parse("maybe").is_err());
    }

    #[test]
    fn test_decimal_scientific_and_fallback() {
        assert_eq!(
            DecimalType.parse("1.5e3").unwrap(),
            TytxValue::Decimal(dec!(1500))
        );
        // Beyond Decimal's range: documented float fallback, not an error
        match DecimalType.parse("1e300").unwrap() {
            TytxValue::Float(f) => assert_eq!(f, 1e300),
            other => panic!("expected float fallback, got {other:?}"),
        }
        assert!(DecimalType.parse("abc").is_err());
    }

    #[test]
    fn test_dhz_accepts_millis_emits_seconds() {
        let parsed = DateTimeType.parse("2024-03-15T09:30:01.250Z").unwrap();
        let text = DateTimeType.serialize(&parsed).unwrap();
        assert_eq!(text, "2024-03-15T09:30:01Z");
    }

    #[test]
    fn test_dhz_normalizes_offsets_to_utc() {
        let parsed = DateTimeType.parse("2024-03-15T10:30:01+01:00").unwrap();
        assert_eq!(
            DateTimeType.serialize(&parsed).unwrap(),
            "2024-03-15T09:30:01Z"
        );
    }

    #[test]
    fn test_dh_is_parse_only() {
        let parsed = NaiveDateTimeType.parse("2024-03-15T09:30:01").unwrap();
        match &parsed {
            TytxValue::DateTime(_) => {}
            other => panic!("expected datetime, got {other:?}"),
        }
        assert!(NaiveDateTimeType.serialize(&parsed).is_none());
        assert!(!NaiveDateTimeType.matches(&parsed));
    }

    #[test]
    fn test_time_millis_emitted_only_when_nonzero() {
        let plain = TimeType.parse("09:30:00").unwrap();
        assert_eq!(TimeType.serialize(&plain).unwrap(), "09:30:00");
        let fractional = TimeType.parse("09:30:00.125").unwrap();
        assert_eq!(TimeType.serialize(&fractional).unwrap(), "09:30:00.125");
    }

    #[test]
    fn test_text_preserves_whitespace() {
        assert_eq!(
            TextType.parse("  padded  ").unwrap(),
            TytxValue::Str("  padded  ".to_string())
        );
    }

    #[test]
    fn test_json_type_round_trip() {
        let value = TytxValue::Map(vec![
            ("a".to_string(), TytxValue::Int(1)),
            ("b".to_string(), TytxValue::Str("x".to_string())),
        ]);
        let text = JsonType.serialize(&value).unwrap();
        assert_eq!(JsonType.parse(&text).unwrap(), value);
    }
}
