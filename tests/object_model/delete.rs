//! Tests for property deletion

use super::{assert_invariants, create_test_context, data, insertion_order, key};
use shapejs::{JsValue, PresentAttributes as P};

#[test]
fn test_delete_configurable_shifts_later_ordinals() {
    let mut ctx = create_test_context();
    let obj = ctx.create_object();
    let a = key(&mut ctx, "a");
    let b = key(&mut ctx, "b");
    let c = key(&mut ctx, "c");
    for (k, n) in [(&a, 1.0), (&b, 2.0), (&c, 3.0)] {
        obj.create_data_property(&mut ctx, k, JsValue::Number(n))
            .unwrap();
    }

    assert!(obj.delete_own_property(&a));
    assert!(!obj.has_own_property(&a));
    {
        let borrowed = obj.borrow();
        assert_eq!(borrowed.structure().find_property(&b), Some(0));
        assert_eq!(borrowed.structure().find_property(&c), Some(1));
        assert_eq!(borrowed.storage().len(), 2);
        assert!(!borrowed.structure().is_cacheable());
    }
    assert_eq!(obj.get(&mut ctx, &b).unwrap(), JsValue::Number(2.0));
    assert_eq!(obj.get(&mut ctx, &c).unwrap(), JsValue::Number(3.0));
    assert_eq!(insertion_order(&obj), vec!["b", "c"]);
    assert_invariants(&obj);
}

#[test]
fn test_delete_non_configurable_fails() {
    let mut ctx = create_test_context();
    let obj = ctx.create_object();
    let x = key(&mut ctx, "x");
    obj.define_own_property(&mut ctx, &x, data(1, P::WRITABLE | P::NON_CONFIGURABLE))
        .unwrap();

    assert!(!obj.delete_own_property(&x));
    assert!(obj.has_own_property(&x));
    assert!(!obj.delete_throws_exception_when_strict_mode(&ctx, &x).unwrap());

    ctx.set_strict_mode(true);
    let err = obj
        .delete_throws_exception_when_strict_mode(&ctx, &x)
        .unwrap_err();
    assert!(err.to_string().contains("Cannot delete property 'x' of object"));
}

#[test]
fn test_delete_missing_returns_false() {
    let mut ctx = create_test_context();
    ctx.set_strict_mode(true);
    let obj = ctx.create_object();
    let x = key(&mut ctx, "x");

    assert!(!obj.delete_own_property(&x));
    // Missing properties never throw
    assert!(!obj.delete_throws_exception_when_strict_mode(&ctx, &x).unwrap());
}

#[test]
fn test_delete_does_not_touch_prototype() {
    let mut ctx = create_test_context();
    let proto = ctx.create_object();
    let child = ctx.create_object();
    child.set_prototype(&mut ctx, Some(proto.clone()));
    let x = key(&mut ctx, "x");
    proto
        .create_data_property(&mut ctx, &x, JsValue::Number(1.0))
        .unwrap();

    assert!(!child.delete_own_property(&x));
    assert_eq!(child.get(&mut ctx, &x).unwrap(), JsValue::Number(1.0));
}

#[test]
fn test_readd_after_delete_goes_last() {
    let mut ctx = create_test_context();
    let obj = ctx.create_object();
    let a = key(&mut ctx, "a");
    let b = key(&mut ctx, "b");
    obj.create_data_property(&mut ctx, &a, JsValue::Number(1.0))
        .unwrap();
    obj.create_data_property(&mut ctx, &b, JsValue::Number(2.0))
        .unwrap();

    obj.delete_own_property(&a);
    obj.create_data_property(&mut ctx, &a, JsValue::Number(3.0))
        .unwrap();
    assert_eq!(insertion_order(&obj), vec!["b", "a"]);
    assert_eq!(obj.get(&mut ctx, &a).unwrap(), JsValue::Number(3.0));
    assert_invariants(&obj);
}

#[test]
fn test_delete_index_property() {
    let mut ctx = create_test_context();
    let obj = ctx.create_object();
    let zero = ctx.index_key(0);
    let one = ctx.index_key(1);
    obj.create_data_property(&mut ctx, &zero, JsValue::from("a"))
        .unwrap();
    obj.create_data_property(&mut ctx, &one, JsValue::from("b"))
        .unwrap();

    assert!(obj.delete_own_property(&zero));
    assert!(!obj.has_own_property(&zero));
    assert_eq!(obj.get(&mut ctx, &one).unwrap(), JsValue::from("b"));
    assert!(obj.borrow().structure().has_index_property_name());

    assert!(obj.delete_own_property(&one));
    assert!(!obj.borrow().structure().has_index_property_name());
}
