//! Cross-format round trips: the same value tree must survive the JSON,
//! text, XML and MessagePack boundaries with types intact.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal_macros::dec;
use serde_json::json;
use tytx_codec::format::{json as json_fmt, msgpack, text, xml};
use tytx_codec::{HydrateContext, StructSchema, TytxRegistry, TytxValue};
use tytx_e2e::isolated_codec;

fn sample_order() -> TytxValue {
    TytxValue::Map(vec![
        ("sku".to_string(), TytxValue::Str("A-1".to_string())),
        ("qty".to_string(), TytxValue::Int(2)),
        ("price".to_string(), TytxValue::Decimal(dec!(100.50))),
        (
            "shipped".to_string(),
            TytxValue::Date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()),
        ),
        (
            "created".to_string(),
            TytxValue::DateTime(Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 1).unwrap()),
        ),
        (
            "cutoff".to_string(),
            TytxValue::Time(NaiveTime::from_hms_opt(17, 0, 0).unwrap()),
        ),
        ("note".to_string(), TytxValue::None),
    ])
}

#[test]
fn typed_json_round_trip_preserves_all_kinds() {
    let registry = TytxRegistry::new();
    let value = sample_order();
    let doc = json_fmt::to_typed_json(&value, &registry.scalars());
    let back = json_fmt::from_typed_json(&doc, &HydrateContext::new(&registry)).unwrap();
    assert_eq!(back, value);
}

#[test]
fn tytx_payload_round_trip() {
    let codec = isolated_codec();
    let value = sample_order();
    let wire = codec.encode_data(&value);
    assert_eq!(codec.decode_data(&wire).unwrap(), value);
}

#[test]
fn text_target_marks_everything() {
    let registry = TytxRegistry::new();
    let ctx = HydrateContext::new(&registry);
    for (value, expected) in [
        (TytxValue::Int(5), "5::L"),
        (TytxValue::Str("x".to_string()), "x::T"),
        (TytxValue::Bool(false), "false::B"),
        (TytxValue::Decimal(dec!(1.5)), "1.5::N"),
        (TytxValue::None, "::NN"),
    ] {
        assert_eq!(text::to_typed_text(&value, &ctx), expected);
        assert_eq!(text::from_typed_text(expected, &ctx).unwrap(), value);
    }
}

#[test]
fn suffix_precedence_keeps_urls_whole() {
    let registry = TytxRegistry::new();
    let ctx = HydrateContext::new(&registry);
    assert_eq!(
        text::from_typed_text("http://example.com::T", &ctx).unwrap(),
        TytxValue::Str("http://example.com".to_string())
    );
    // Unrecognized trailing segment: the whole string stays untyped
    assert_eq!(
        text::from_typed_text("http://example.com", &ctx).unwrap(),
        TytxValue::Str("http://example.com".to_string())
    );
}

#[test]
fn xml_document_round_trip() {
    let registry = TytxRegistry::new();
    let ctx = HydrateContext::new(&registry);
    let source = concat!(
        r#"<order id="42::L" created="2024-03-15T09:30:01Z::DHZ">"#,
        "<line><sku>A-1::T</sku><price>10.50::N</price></line>",
        "<line><sku>B-2::T</sku><price>3.25::N</price></line>",
        "</order>"
    );
    let (tag, root) = xml::parse_document(source, &ctx).unwrap();
    assert_eq!(tag, "order");
    assert_eq!(root.attr("id"), Some(&TytxValue::Int(42)));
    assert_eq!(
        root.attr("created"),
        Some(&TytxValue::DateTime(
            Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 1).unwrap()
        ))
    );
    let lines = root.children("line");
    assert_eq!(lines.len(), 2);

    // Emit and re-parse: same element tree
    let emitted = xml::emit_document(&tag, &root, &ctx);
    let (_, reparsed) = xml::parse_document(&emitted, &ctx).unwrap();
    assert_eq!(reparsed, root);
}

#[test]
fn msgpack_wrapper_decision_and_body() {
    let registry = TytxRegistry::new();
    let ctx = HydrateContext::new(&registry);

    let native = TytxValue::Map(vec![
        ("a".to_string(), TytxValue::Int(1)),
        ("b".to_string(), TytxValue::Str("x".to_string())),
    ]);
    assert!(!msgpack::needs_ext(&native));

    let typed = sample_order();
    assert!(msgpack::needs_ext(&typed));
    let body = msgpack::ext_body(&typed, &ctx);
    assert_eq!(msgpack::from_ext_body(&body, &ctx).unwrap(), typed);
}

#[test]
fn homogeneous_schema_passes_every_leaf() {
    let registry = TytxRegistry::new();
    let schema = StructSchema::from_json(&json!(["L"])).unwrap();
    let data = json!([1, 2, [3, 4]]);
    let value =
        tytx_codec::hydrate_struct(&schema, &data, &HydrateContext::new(&registry), 0).unwrap();
    assert_eq!(
        value,
        TytxValue::List(vec![
            TytxValue::Int(1),
            TytxValue::Int(2),
            TytxValue::List(vec![TytxValue::Int(3), TytxValue::Int(4)]),
        ])
    );
}

#[test]
fn positional_batch_hydrates_rows() {
    let registry = TytxRegistry::new();
    let schema = StructSchema::from_json(&json!(["T", "L", "N"])).unwrap();
    let data = json!([["A", 1, "10"], ["B", 2, "20"]]);
    let value =
        tytx_codec::hydrate_struct(&schema, &data, &HydrateContext::new(&registry), 0).unwrap();
    match value {
        TytxValue::List(rows) => {
            assert_eq!(rows.len(), 2);
            assert_eq!(
                rows[0],
                TytxValue::List(vec![
                    TytxValue::Str("A".to_string()),
                    TytxValue::Int(1),
                    TytxValue::Decimal(dec!(10)),
                ])
            );
        }
        other => panic!("expected rows, got {other:?}"),
    }
}
