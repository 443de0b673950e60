//! Tests for the name table through the context

use std::collections::HashSet;

use super::create_test_context;
use shapejs::{Context, ContextConfig, JsValue, NameTable};

#[test]
fn test_narrow_and_wide_forms_share_handle() {
    let mut ctx = create_test_context();
    let narrow = ctx.intern_narrow(b"hello");
    let wide_units: Vec<u16> = "hello".encode_utf16().collect();
    let wide = ctx.intern_wide(&wide_units);
    let text = ctx.intern("hello");

    assert!(narrow.ptr_eq(&wide));
    assert!(narrow.ptr_eq(&text));
    assert!(narrow.is_narrow());
    assert_eq!(narrow.precomputed_hash(), wide.precomputed_hash());
}

#[test]
fn test_latin1_narrow_matches_utf8_text() {
    let mut ctx = create_test_context();
    let latin1 = ctx.intern_narrow(&[b'c', b'a', b'f', 0xE9]);
    let text = ctx.intern("café");
    let wide_units: Vec<u16> = "café".encode_utf16().collect();
    let wide = ctx.intern_wide(&wide_units);

    assert!(latin1.ptr_eq(&text));
    assert!(latin1.ptr_eq(&wide));
    assert!(!latin1.is_narrow());
    assert_eq!(latin1.len(), 4);
    assert!(latin1.eq_str("café"));
}

#[test]
fn test_lone_surrogates_intern() {
    let mut ctx = create_test_context();
    let first = ctx.intern_wide(&[0x61, 0xD800]);
    let second = ctx.intern_wide(&[0x61, 0xD800]);
    let other = ctx.intern_wide(&[0x61, 0xDC00]);

    assert!(first.ptr_eq(&second));
    assert!(!first.ptr_eq(&other));
    assert_eq!(first.to_utf16(), vec![0x61, 0xD800]);
}

#[test]
fn test_ten_thousand_distinct_names() {
    let mut ctx = create_test_context();
    let names: Vec<_> = (0..10_000)
        .map(|i| ctx.intern(&format!("name_{}", i)))
        .collect();

    let unique: HashSet<_> = names.iter().cloned().collect();
    assert_eq!(unique.len(), 10_000);

    for (i, name) in names.iter().enumerate() {
        let again = ctx.intern(&format!("name_{}", i));
        assert!(again.ptr_eq(name));
    }
}

#[test]
fn test_equal_content_gives_equal_keys() {
    let mut ctx = create_test_context();
    let obj = ctx.create_object();
    let from_str = ctx.key("shared");
    let units: Vec<u16> = "shared".encode_utf16().collect();
    let from_wide = shapejs::PropertyKey::String(ctx.intern_wide(&units));

    obj.create_data_property(&mut ctx, &from_str, JsValue::Number(1.0))
        .unwrap();
    assert!(obj.has_own_property(&from_wide));
}

#[test]
fn test_common_names_preinterned() {
    let with = Context::new();
    assert!(with.name_table().get("prototype").is_some());
    assert!(with.name_table().get("toString").is_some());

    let without = Context::with_config(ContextConfig {
        preintern_common_names: false,
        ..ContextConfig::default()
    });
    assert!(without.name_table().get("toString").is_none());
    // Names the object model reads are always present
    assert!(without.name_table().get("length").is_some());
    assert!(with.name_table().len() > without.name_table().len());
}

#[test]
fn test_standalone_table() {
    let mut table = NameTable::new();
    assert!(table.is_empty());
    let a = table.intern("a");
    let b = table.intern("b");
    assert!(!a.ptr_eq(&b));
    assert_eq!(table.len(), 2);
    assert!(table.get("a").is_some_and(|n| n.ptr_eq(&a)));
    assert!(table.get("c").is_none());
}
