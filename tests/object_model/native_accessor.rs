//! Tests for data properties backed by host callbacks

use super::{accessor, assert_invariants, create_test_context, data, insertion_order, key};
use shapejs::{
    Context, JsError, JsObjectRef, JsValue, NativeAccessorData, ObjectPropertyDescriptor,
    PresentAttributes as P, PropertyAttributes,
};

fn backing_key(ctx: &mut Context) -> shapejs::PropertyKey {
    ctx.key("__backing")
}

fn read_backing(ctx: &mut Context, this: &JsObjectRef) -> Result<JsValue, JsError> {
    let backing = backing_key(ctx);
    let raw = this.get(ctx, &backing)?.to_number();
    Ok(JsValue::Number(if raw.is_nan() { 0.0 } else { raw * 10.0 }))
}

fn write_backing(ctx: &mut Context, this: &JsObjectRef, value: JsValue) -> Result<bool, JsError> {
    let n = value.to_number();
    if n < 0.0 {
        return Err(JsError::range_error("Invalid value"));
    }
    let backing = backing_key(ctx);
    this.create_data_property(ctx, &backing, JsValue::Number(n / 10.0))
}

static SCALED: NativeAccessorData = NativeAccessorData {
    getter: read_backing,
    setter: Some(write_backing),
};

static READ_ONLY: NativeAccessorData = NativeAccessorData {
    getter: read_backing,
    setter: None,
};

fn getter_fn(_ctx: &mut Context, _this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    Ok(JsValue::from("accessor"))
}

#[test]
fn test_native_accessor_reads_through_getter() {
    let mut ctx = create_test_context();
    let obj = ctx.create_object();
    let scaled = key(&mut ctx, "scaled");
    assert!(obj
        .define_native_accessor_property(&mut ctx, &scaled, &SCALED, PropertyAttributes::ALL)
        .unwrap());

    assert_eq!(obj.get(&mut ctx, &scaled).unwrap(), JsValue::Number(0.0));
    let desc = obj.get_own_property(&mut ctx, &scaled).unwrap();
    assert!(desc.is_data_property());
    assert!(desc.is_writable());
    assert!(obj.borrow().structure().iter().any(|item| item.descriptor.is_native_accessor()));
}

#[test]
fn test_native_accessor_writes_through_setter() {
    let mut ctx = create_test_context();
    let obj = ctx.create_object();
    let scaled = key(&mut ctx, "scaled");
    obj.define_native_accessor_property(&mut ctx, &scaled, &SCALED, PropertyAttributes::ALL)
        .unwrap();

    assert!(obj.put(&mut ctx, &scaled, JsValue::Number(50.0)).unwrap());
    assert_eq!(obj.get(&mut ctx, &scaled).unwrap(), JsValue::Number(50.0));
    let backing = key(&mut ctx, "__backing");
    assert_eq!(obj.get(&mut ctx, &backing).unwrap(), JsValue::Number(5.0));
    assert_invariants(&obj);
}

#[test]
fn test_native_setter_error_propagates() {
    let mut ctx = create_test_context();
    let obj = ctx.create_object();
    let scaled = key(&mut ctx, "scaled");
    obj.define_native_accessor_property(&mut ctx, &scaled, &SCALED, PropertyAttributes::ALL)
        .unwrap();

    let err = obj.put(&mut ctx, &scaled, JsValue::Number(-1.0)).unwrap_err();
    assert!(matches!(err, JsError::RangeError { .. }));
}

#[test]
fn test_native_accessor_without_setter_rejects_value() {
    let mut ctx = create_test_context();
    let obj = ctx.create_object();
    let fixed = key(&mut ctx, "fixed");
    obj.define_native_accessor_property(&mut ctx, &fixed, &READ_ONLY, PropertyAttributes::ALL)
        .unwrap();

    assert!(!obj.put(&mut ctx, &fixed, JsValue::Number(1.0)).unwrap());
    assert!(!obj.define_own_property(&mut ctx, &fixed, data(1, P::empty())).unwrap());
}

#[test]
fn test_non_writable_native_accessor_blocks_put() {
    let mut ctx = create_test_context();
    let obj = ctx.create_object();
    let scaled = key(&mut ctx, "scaled");
    obj.define_native_accessor_property(
        &mut ctx,
        &scaled,
        &SCALED,
        PropertyAttributes::ENUMERABLE | PropertyAttributes::CONFIGURABLE,
    )
    .unwrap();

    assert!(!obj.put(&mut ctx, &scaled, JsValue::Number(10.0)).unwrap());
    let backing = key(&mut ctx, "__backing");
    assert!(!obj.has_own_property(&backing));
}

#[test]
fn test_native_accessor_attribute_change_keeps_callbacks() {
    let mut ctx = create_test_context();
    let obj = ctx.create_object();
    let scaled = key(&mut ctx, "scaled");
    let other = key(&mut ctx, "other");
    obj.define_native_accessor_property(&mut ctx, &scaled, &SCALED, PropertyAttributes::ALL)
        .unwrap();
    obj.create_data_property(&mut ctx, &other, JsValue::Null)
        .unwrap();

    let hide = ObjectPropertyDescriptor::generic(P::NON_ENUMERABLE);
    assert!(obj.define_own_property(&mut ctx, &scaled, hide).unwrap());
    assert_eq!(insertion_order(&obj), vec!["other", "scaled"]);
    assert!(!obj.get_own_property(&mut ctx, &scaled).unwrap().is_enumerable());

    assert!(obj.define_own_property(&mut ctx, &scaled, data(70, P::empty())).unwrap());
    assert_eq!(obj.get(&mut ctx, &scaled).unwrap(), JsValue::Number(70.0));
    assert_invariants(&obj);
}

#[test]
fn test_native_accessor_converts_to_accessor() {
    let mut ctx = create_test_context();
    let obj = ctx.create_object();
    let scaled = key(&mut ctx, "scaled");
    obj.define_native_accessor_property(&mut ctx, &scaled, &SCALED, PropertyAttributes::ALL)
        .unwrap();

    let getter = ctx.create_native_function("get", getter_fn, 0);
    assert!(obj
        .define_own_property(&mut ctx, &scaled, accessor(Some(getter), None, P::empty()))
        .unwrap());
    assert!(obj.get_own_property(&mut ctx, &scaled).unwrap().is_accessor_property());
    assert_eq!(obj.get(&mut ctx, &scaled).unwrap(), JsValue::from("accessor"));
    assert_invariants(&obj);
}

#[test]
fn test_non_configurable_native_accessor_cannot_be_replaced() {
    let mut ctx = create_test_context();
    let obj = ctx.create_object();
    let fixed = key(&mut ctx, "fixed");
    obj.define_native_accessor_property(
        &mut ctx,
        &fixed,
        &READ_ONLY,
        PropertyAttributes::WRITABLE,
    )
    .unwrap();

    assert!(!obj
        .define_native_accessor_property(&mut ctx, &fixed, &SCALED, PropertyAttributes::ALL)
        .unwrap());
    assert!(!obj.delete_own_property(&fixed));
}
