//! Envelope lifecycle scenarios: registration side effects, isolation
//! and validation distribution across decode calls.

use rust_decimal_macros::dec;
use serde_json::json;
use tytx_codec::{CodecError, RuleTiers, TytxValue, ValidationError};
use tytx_e2e::{init_tracing, isolated_codec, order_line_envelope};

#[test]
fn global_registration_survives_into_later_decodes() {
    init_tracing();
    let codec = isolated_codec();

    // First envelope only distributes the schema
    let first = order_line_envelope("");
    let decoded = codec.decode(&first).unwrap();
    assert_eq!(decoded.data, TytxValue::None);

    // Second envelope references it without redefining
    let second = format!(
        "XTYTX://{}",
        json!({
            "gstruct": {},
            "lstruct": {},
            "data": r#"TYTX://{"line": "{\"sku\": \"A-1\", \"qty\": \"2\", \"price\": \"10.50\"}::@order_line"}"#
        })
    );
    let decoded = codec.decode(&second).unwrap();
    let line = decoded.data.get("line").unwrap();
    assert_eq!(line.get("sku"), Some(&TytxValue::Str("A-1".to_string())));
    assert_eq!(line.get("qty"), Some(&TytxValue::Int(2)));
    assert_eq!(line.get("price"), Some(&TytxValue::Decimal(dec!(10.50))));
}

#[test]
fn local_structs_never_leak_between_decodes() {
    let codec = isolated_codec();

    let with_local = format!(
        "XTYTX://{}",
        json!({
            "gstruct": {},
            "lstruct": {"temp": {"x": "L"}},
            "data": r#"TYTX://{"v": "{\"x\": \"7\"}::@temp"}"#
        })
    );
    let decoded = codec.decode(&with_local).unwrap();
    assert_eq!(
        decoded.data.get("v").unwrap().get("x"),
        Some(&TytxValue::Int(7))
    );
    // The overlay is returned for document-scoped reuse
    assert!(decoded.lstruct.contains_key("temp"));

    // An unrelated later decode cannot resolve it: forward tolerance
    // leaves the literal untouched
    let without_local = format!(
        "XTYTX://{}",
        json!({
            "gstruct": {},
            "lstruct": {},
            "data": r#"TYTX://{"v": "{\"x\": \"7\"}::@temp"}"#
        })
    );
    let decoded = codec.decode(&without_local).unwrap();
    assert_eq!(
        decoded.data.get("v"),
        Some(&TytxValue::Str(r#"{"x": "7"}::@temp"#.to_string()))
    );
}

#[test]
fn local_struct_shadows_global_for_one_call() {
    let codec = isolated_codec();
    codec.decode(&order_line_envelope("")).unwrap();

    // Same name, different field typing, local only
    let shadowing = format!(
        "XTYTX://{}",
        json!({
            "gstruct": {},
            "lstruct": {"order_line": {"sku": "T", "qty": "T", "price": "T"}},
            "data": r#"TYTX://{"line": "{\"qty\": \"2\"}::@order_line"}"#
        })
    );
    let decoded = codec.decode(&shadowing).unwrap();
    assert_eq!(
        decoded.data.get("line").unwrap().get("qty"),
        Some(&TytxValue::Str("2".to_string()))
    );

    // The global registration is untouched
    let plain = format!(
        "XTYTX://{}",
        json!({
            "gstruct": {},
            "lstruct": {},
            "data": r#"TYTX://{"line": "{\"qty\": \"2\"}::@order_line"}"#
        })
    );
    let decoded = codec.decode(&plain).unwrap();
    assert_eq!(
        decoded.data.get("line").unwrap().get("qty"),
        Some(&TytxValue::Int(2))
    );
}

#[test]
fn registration_overwrites_on_name_collision() {
    let codec = isolated_codec();
    codec.decode(&order_line_envelope("")).unwrap();

    let redefined = format!(
        "XTYTX://{}",
        json!({
            "gstruct": {"order_line": {"sku": "T", "qty": "N", "price": "N"}},
            "lstruct": {},
            "data": r#"TYTX://{"line": "{\"qty\": \"2\"}::@order_line"}"#
        })
    );
    let decoded = codec.decode(&redefined).unwrap();
    // qty now hydrates under the overwritten definition
    assert_eq!(
        decoded.data.get("line").unwrap().get("qty"),
        Some(&TytxValue::Decimal(dec!(2)))
    );
}

#[test]
fn gvalidation_distributes_rules_for_later_calls() {
    let codec = isolated_codec();
    let envelope = format!(
        "XTYTX://{}",
        json!({
            "gstruct": {},
            "lstruct": {},
            "gvalidation": {
                "upper": {"pattern": "^[A-Z]+$"},
                "len3": {"len": 3}
            },
            "data": ""
        })
    );
    codec.decode(&envelope).unwrap();

    let registry = codec.registry();
    assert!(
        tytx_codec::validate_expression(registry, "ABC", "upper&len3", RuleTiers::default())
            .unwrap()
    );
    assert!(
        !tytx_codec::validate_expression(registry, "ABCD", "upper&len3", RuleTiers::default())
            .unwrap()
    );
}

#[test]
fn lvalidation_overrides_without_mutating_shared_rules() {
    let codec = isolated_codec();
    let envelope = format!(
        "XTYTX://{}",
        json!({
            "gstruct": {},
            "lstruct": {},
            "gvalidation": {"code": {"pattern": "^[A-Z]+$"}},
            "lvalidation": {"code": {"pattern": "^[0-9]+$"}},
            "data": ""
        })
    );
    let decoded = codec.decode(&envelope).unwrap();

    let registry = codec.registry();
    let tiers = RuleTiers {
        local: Some(&decoded.lvalidation),
        global: None,
    };
    // Document-scoped override wins for this call
    assert!(tytx_codec::validate(registry, "123", "code", tiers).unwrap());
    assert!(!tytx_codec::validate(registry, "ABC", "code", tiers).unwrap());
    // Shared rule is unchanged
    assert!(tytx_codec::validate(registry, "ABC", "code", RuleTiers::default()).unwrap());
}

#[test]
fn unknown_validation_rule_raises() {
    let codec = isolated_codec();
    match tytx_codec::validate(codec.registry(), "x", "ghost", RuleTiers::default()) {
        Err(ValidationError::UnknownRule { name }) => assert_eq!(name, "ghost"),
        other => panic!("expected UnknownRule, got {other:?}"),
    }
}

#[test]
fn malformed_envelope_is_fatal_before_side_effects() {
    let codec = isolated_codec();
    let missing_data = format!(
        "XTYTX://{}",
        json!({
            "gstruct": {"late": {"x": "L"}},
            "lstruct": {}
        })
    );
    match codec.decode(&missing_data) {
        Err(CodecError::MissingField { field }) => assert_eq!(field, "data"),
        other => panic!("expected MissingField, got {other:?}"),
    }
    assert!(codec.registry().get_struct("late").is_none());
}

#[test]
fn gschema_documents_are_stored_verbatim() {
    let codec = isolated_codec();
    let envelope = format!(
        "XTYTX://{}",
        json!({
            "gstruct": {},
            "lstruct": {},
            "gschema": {"order_form": {"title": "Order", "fields": ["sku", "qty"]}},
            "data": ""
        })
    );
    codec.decode(&envelope).unwrap();
    let doc = codec.registry().get_schema("order_form").unwrap();
    assert_eq!(doc["title"], "Order");
}
