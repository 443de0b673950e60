//! Tests for sparse index scanning and in-place sort

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use super::{assert_invariants, create_test_context, data};
use shapejs::indexed::{compare_with_function, default_compare};
use shapejs::{Context, JsError, JsObjectRef, JsValue, PresentAttributes as P, PropertyKey};

fn array_like(ctx: &mut Context, entries: &[(u32, JsValue)], length: u32) -> JsObjectRef {
    let obj = ctx.create_object();
    for (idx, value) in entries {
        obj.create_data_property(ctx, &PropertyKey::Index(*idx), value.clone())
            .unwrap();
    }
    let length_key = ctx.names().length.clone();
    obj.create_data_property(ctx, &length_key, JsValue::from(length))
        .unwrap();
    obj
}

fn own_indices(obj: &JsObjectRef) -> Vec<u32> {
    obj.own_property_keys()
        .iter()
        .filter_map(PropertyKey::as_index)
        .collect()
}

fn subtract(_ctx: &mut Context, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let a = args.first().map(JsValue::to_number).unwrap_or(f64::NAN);
    let b = args.get(1).map(JsValue::to_number).unwrap_or(f64::NAN);
    Ok(JsValue::Number(a - b))
}

#[test]
fn test_sparse_sort_compacts_and_removes_holes() {
    let mut ctx = create_test_context();
    let obj = array_like(
        &mut ctx,
        &[
            (0, JsValue::from("b")),
            (2, JsValue::from("a")),
            (5, JsValue::from("c")),
        ],
        6,
    );

    obj.sort(&mut ctx, default_compare).unwrap();

    assert_eq!(own_indices(&obj), vec![0, 1, 2]);
    assert_eq!(obj.get(&mut ctx, &PropertyKey::Index(0)).unwrap(), JsValue::from("a"));
    assert_eq!(obj.get(&mut ctx, &PropertyKey::Index(1)).unwrap(), JsValue::from("b"));
    assert_eq!(obj.get(&mut ctx, &PropertyKey::Index(2)).unwrap(), JsValue::from("c"));
    assert_eq!(obj.length(&mut ctx).unwrap(), 6);
    assert_invariants(&obj);
}

#[test]
fn test_sort_keeps_non_enumerable_indices() {
    let mut ctx = create_test_context();
    let obj = array_like(&mut ctx, &[(0, JsValue::from("b"))], 2);
    obj.define_own_property(
        &mut ctx,
        &PropertyKey::Index(1),
        data("a", P::WRITABLE | P::NON_ENUMERABLE | P::CONFIGURABLE),
    )
    .unwrap();
    // The scanner itself only reports enumerable indices
    assert_eq!(obj.next_index_forward(&mut ctx, 0.0, 2.0, false).unwrap(), 2.0);

    obj.sort(&mut ctx, default_compare).unwrap();

    assert_eq!(own_indices(&obj), vec![0, 1]);
    assert_eq!(obj.get(&mut ctx, &PropertyKey::Index(0)).unwrap(), JsValue::from("a"));
    assert_eq!(obj.get(&mut ctx, &PropertyKey::Index(1)).unwrap(), JsValue::from("b"));
    let desc = obj.get_own_property(&mut ctx, &PropertyKey::Index(1)).unwrap();
    assert!(!desc.is_enumerable());
    assert_invariants(&obj);
}

#[test]
fn test_sort_collects_prototype_indices() {
    let mut ctx = create_test_context();
    let proto = ctx.create_object();
    proto
        .create_data_property(&mut ctx, &PropertyKey::Index(1), JsValue::from("a"))
        .unwrap();
    let obj = array_like(&mut ctx, &[(2, JsValue::from("c")), (3, JsValue::from("b"))], 4);
    obj.set_prototype(&mut ctx, Some(proto.clone()));

    obj.sort(&mut ctx, default_compare).unwrap();

    assert_eq!(own_indices(&obj), vec![0, 1, 2]);
    assert_eq!(obj.get(&mut ctx, &PropertyKey::Index(0)).unwrap(), JsValue::from("a"));
    assert_eq!(obj.get(&mut ctx, &PropertyKey::Index(1)).unwrap(), JsValue::from("b"));
    assert_eq!(obj.get(&mut ctx, &PropertyKey::Index(2)).unwrap(), JsValue::from("c"));
    assert_eq!(proto.get(&mut ctx, &PropertyKey::Index(1)).unwrap(), JsValue::from("a"));
}

#[test]
fn test_large_dense_sort_is_not_quadratic() {
    let mut ctx = create_test_context();
    let count: u32 = 30_000;
    let entries: Vec<(u32, JsValue)> = (0..count)
        .map(|i| (i, JsValue::from((i * 7919) % count)))
        .collect();
    let obj = array_like(&mut ctx, &entries, count);

    let start = Instant::now();
    obj.sort(&mut ctx, |_: &mut Context, a: &JsValue, b: &JsValue| -> Result<Ordering, JsError> {
        Ok(a.to_number().total_cmp(&b.to_number()))
    })
    .unwrap();
    let elapsed = start.elapsed();

    assert!(
        elapsed < Duration::from_secs(10),
        "sorting {} values took {:?}",
        count,
        elapsed
    );
    assert_eq!(own_indices(&obj).len(), count as usize);
    assert_eq!(obj.get(&mut ctx, &PropertyKey::Index(0)).unwrap(), JsValue::from(0u32));
    assert_eq!(
        obj.get(&mut ctx, &PropertyKey::Index(count - 1)).unwrap(),
        JsValue::from(count - 1)
    );
}

#[test]
fn test_default_compare_uses_string_order() {
    let mut ctx = create_test_context();
    let obj = array_like(
        &mut ctx,
        &[
            (0, JsValue::Number(10.0)),
            (1, JsValue::Number(9.0)),
            (2, JsValue::Number(1.0)),
        ],
        3,
    );

    obj.sort(&mut ctx, default_compare).unwrap();
    let values: Vec<JsValue> = (0..3)
        .map(|i| obj.get(&mut ctx, &PropertyKey::Index(i)).unwrap())
        .collect();
    assert_eq!(
        values,
        vec![JsValue::Number(1.0), JsValue::Number(10.0), JsValue::Number(9.0)]
    );
}

#[test]
fn test_sort_with_script_comparator() {
    let mut ctx = create_test_context();
    let obj = array_like(
        &mut ctx,
        &[
            (0, JsValue::Number(10.0)),
            (1, JsValue::Number(9.0)),
            (2, JsValue::Number(1.0)),
        ],
        3,
    );
    let compare = ctx.create_native_function("compare", subtract, 2);

    obj.sort(&mut ctx, compare_with_function(compare)).unwrap();
    let values: Vec<JsValue> = (0..3)
        .map(|i| obj.get(&mut ctx, &PropertyKey::Index(i)).unwrap())
        .collect();
    assert_eq!(
        values,
        vec![JsValue::Number(1.0), JsValue::Number(9.0), JsValue::Number(10.0)]
    );
}

#[test]
fn test_undefined_sorts_after_values() {
    let mut ctx = create_test_context();
    let obj = array_like(
        &mut ctx,
        &[
            (0, JsValue::Undefined),
            (1, JsValue::from("z")),
            (3, JsValue::from("m")),
        ],
        5,
    );

    let mut seen_undefined = false;
    obj.sort(&mut ctx, |ctx: &mut Context, a: &JsValue, b: &JsValue| -> Result<Ordering, JsError> {
        seen_undefined |= a.is_undefined() || b.is_undefined();
        default_compare(ctx, a, b)
    })
    .unwrap();

    assert!(!seen_undefined);
    assert_eq!(own_indices(&obj), vec![0, 1, 2]);
    assert_eq!(obj.get(&mut ctx, &PropertyKey::Index(0)).unwrap(), JsValue::from("m"));
    assert_eq!(obj.get(&mut ctx, &PropertyKey::Index(1)).unwrap(), JsValue::from("z"));
    assert_eq!(obj.get(&mut ctx, &PropertyKey::Index(2)).unwrap(), JsValue::Undefined);
    assert!(obj.has_own_property(&PropertyKey::Index(2)));
}

#[test]
fn test_comparator_error_stops_sort() {
    let mut ctx = create_test_context();
    let obj = array_like(
        &mut ctx,
        &[(0, JsValue::Number(2.0)), (1, JsValue::Number(1.0))],
        2,
    );

    let err = obj
        .sort(
            &mut ctx,
            |_: &mut Context, _: &JsValue, _: &JsValue| -> Result<Ordering, JsError> {
                Err(JsError::thrown(JsValue::from("stop")))
            },
        )
        .unwrap_err();
    assert_eq!(err.to_value(), JsValue::from("stop"));
    // Nothing was written back
    assert_eq!(obj.get(&mut ctx, &PropertyKey::Index(0)).unwrap(), JsValue::Number(2.0));
}

#[test]
fn test_inconsistent_comparator_terminates() {
    let mut ctx = create_test_context();
    let entries: Vec<(u32, JsValue)> = (0..50).map(|i| (i, JsValue::from(i))).collect();
    let obj = array_like(&mut ctx, &entries, 50);

    let mut flip = false;
    obj.sort(&mut ctx, |_: &mut Context, _: &JsValue, _: &JsValue| -> Result<Ordering, JsError> {
        flip = !flip;
        Ok(if flip { Ordering::Less } else { Ordering::Greater })
    })
    .unwrap();
    assert_eq!(own_indices(&obj).len(), 50);
}

#[test]
fn test_next_index_scans_prototype_chain() {
    let mut ctx = create_test_context();
    let proto = ctx.create_object();
    let obj = ctx.create_object();
    obj.set_prototype(&mut ctx, Some(proto.clone()));
    proto
        .create_data_property(&mut ctx, &PropertyKey::Index(3), JsValue::from("p"))
        .unwrap();
    obj.create_data_property(&mut ctx, &PropertyKey::Index(1), JsValue::Undefined)
        .unwrap();
    obj.create_data_property(&mut ctx, &PropertyKey::Index(5), JsValue::from("o"))
        .unwrap();

    let mut forward = Vec::new();
    let mut cursor = -1.0;
    loop {
        let next = obj.next_index_forward(&mut ctx, cursor, 10.0, false).unwrap();
        if next >= 10.0 {
            break;
        }
        forward.push(next);
        cursor = next;
    }
    assert_eq!(forward, vec![1.0, 3.0, 5.0]);

    assert_eq!(obj.next_index_backward(&mut ctx, 10.0, -1.0, false).unwrap(), 5.0);
    assert_eq!(obj.next_index_backward(&mut ctx, 5.0, -1.0, false).unwrap(), 3.0);
    assert_eq!(obj.next_index_backward(&mut ctx, 1.0, -1.0, false).unwrap(), -1.0);

    // Undefined values can be skipped
    assert_eq!(obj.next_index_forward(&mut ctx, -1.0, 10.0, true).unwrap(), 3.0);
    // The end bound is exclusive
    assert_eq!(obj.next_index_forward(&mut ctx, 3.0, 5.0, false).unwrap(), 5.0);
}
