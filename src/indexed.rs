//! Helpers for array-like objects: sparse index scanning and sort.

use std::cmp::Ordering;

use crate::context::Context;
use crate::error::JsError;
use crate::object::JsObjectRef;
use crate::value::{CheapClone, JsValue, PropertyKey};

/// Comparator used by [`JsObjectRef::sort`]
pub trait SortComparator: FnMut(&mut Context, &JsValue, &JsValue) -> Result<Ordering, JsError> {}

impl<F> SortComparator for F where
    F: FnMut(&mut Context, &JsValue, &JsValue) -> Result<Ordering, JsError>
{
}

/// Default sort order: compare the string forms
pub fn default_compare(
    _ctx: &mut Context,
    a: &JsValue,
    b: &JsValue,
) -> Result<Ordering, JsError> {
    Ok(a.to_js_string().as_str().cmp(b.to_js_string().as_str()))
}

/// Comparator backed by a script function returning a number
pub fn compare_with_function(
    function: JsObjectRef,
) -> impl FnMut(&mut Context, &JsValue, &JsValue) -> Result<Ordering, JsError> {
    move |ctx, a, b| {
        let result = ctx.call(&function, JsValue::Undefined, &[a.clone(), b.clone()])?;
        let n = result.to_number();
        Ok(if n < 0.0 {
            Ordering::Less
        } else if n > 0.0 {
            Ordering::Greater
        } else {
            Ordering::Equal
        })
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Backward,
}

impl JsObjectRef {
    /// Nearest enumerable index strictly greater than `current` on this object
    /// or its prototypes, or `end` when there is none below `end`.
    pub fn next_index_forward(
        &self,
        ctx: &mut Context,
        current: f64,
        end: f64,
        skip_undefined: bool,
    ) -> Result<f64, JsError> {
        self.next_index(ctx, current, end, skip_undefined, Direction::Forward)
    }

    /// Nearest enumerable index strictly less than `current` on this object
    /// or its prototypes, or `end` when there is none above `end`.
    pub fn next_index_backward(
        &self,
        ctx: &mut Context,
        current: f64,
        end: f64,
        skip_undefined: bool,
    ) -> Result<f64, JsError> {
        self.next_index(ctx, current, end, skip_undefined, Direction::Backward)
    }

    fn next_index(
        &self,
        ctx: &mut Context,
        current: f64,
        end: f64,
        skip_undefined: bool,
        direction: Direction,
    ) -> Result<f64, JsError> {
        let (lower, upper) = match direction {
            Direction::Forward => (current, end),
            Direction::Backward => (end, current),
        };
        let mut candidates = self.chain_indices(lower, upper, true);
        if let Direction::Backward = direction {
            candidates.reverse();
        }

        for (idx, holder) in candidates {
            if !skip_undefined {
                return Ok(f64::from(idx));
            }
            let key = PropertyKey::Index(idx);
            let value = holder
                .get_own_property(ctx, &key)?
                .value(ctx, self)?;
            if !value.is_undefined() {
                return Ok(f64::from(idx));
            }
        }
        Ok(end)
    }

    /// Ascending, deduplicated indices strictly between `lower` and `upper`
    /// on this object and its prototypes, each paired with the nearest holder.
    fn chain_indices(
        &self,
        lower: f64,
        upper: f64,
        enumerable_only: bool,
    ) -> Vec<(u32, JsObjectRef)> {
        let mut candidates: Vec<(u32, JsObjectRef)> = Vec::new();
        let mut cursor = Some(self.cheap_clone());
        while let Some(obj) = cursor {
            obj.enumeration(|key, descriptor| {
                if let Some(idx) = key.as_index() {
                    let idx_f = f64::from(idx);
                    let visible = !enumerable_only || descriptor.is_enumerable();
                    if visible && idx_f > lower && idx_f < upper {
                        candidates.push((idx, obj.cheap_clone()));
                    }
                }
                true
            });
            cursor = obj.get_prototype();
        }

        // Own entries come first, so a stable sort keeps the shadowing holder first
        candidates.sort_by_key(|(idx, _)| *idx);
        candidates.dedup_by_key(|(idx, _)| *idx);
        candidates
    }

    /// Sort the indexed values below `length` in place.
    ///
    /// Every present index on the object or its prototypes is collected,
    /// enumerable or not. Values are sorted with a stable merge sort and
    /// written back from index 0. `undefined` values sort after every other
    /// value without reaching the comparator, and own indices past the sorted
    /// count are deleted so holes end up at the end.
    pub fn sort<F: SortComparator>(&self, ctx: &mut Context, mut comparator: F) -> Result<(), JsError> {
        let length = self.length(ctx)?;

        let present = self.chain_indices(-1.0, f64::from(length), false);
        let mut values = Vec::with_capacity(present.len());
        let mut undefined_count: u32 = 0;
        for (idx, _) in present {
            let key = PropertyKey::Index(idx);
            // A getter read earlier may have removed it
            if !self.has_property(&key) {
                continue;
            }
            let value = self.get(ctx, &key)?;
            if value.is_undefined() {
                undefined_count += 1;
            } else {
                values.push(value);
            }
        }
        log::trace!(
            "sorting {} values ({} undefined) of length {}",
            values.len(),
            undefined_count,
            length
        );

        let sorted = merge_sort(ctx, values, &mut comparator)?;
        let mut index: u32 = 0;
        for value in sorted
            .into_iter()
            .chain(std::iter::repeat_n(JsValue::Undefined, undefined_count as usize))
        {
            self.set_throws_exception(ctx, &PropertyKey::Index(index), value, self)?;
            index += 1;
        }

        let trailing: Vec<PropertyKey> = self
            .own_property_keys()
            .into_iter()
            .filter(|key| key.as_index().is_some_and(|i| i >= index && i < length))
            .collect();
        for key in trailing {
            if !self.delete_own_property(&key) {
                return Err(JsError::type_error(format!(
                    "Cannot delete property '{}' of object",
                    key
                )));
            }
        }
        Ok(())
    }
}

/// Stable, fallible merge sort. Stops at the first comparator error.
///
/// Inconsistent comparators still terminate; the order is then unspecified.
fn merge_sort<F: SortComparator>(
    ctx: &mut Context,
    mut values: Vec<JsValue>,
    comparator: &mut F,
) -> Result<Vec<JsValue>, JsError> {
    if values.len() <= 1 {
        return Ok(values);
    }
    let right = values.split_off(values.len() / 2);
    let left = merge_sort(ctx, values, comparator)?;
    let right = merge_sort(ctx, right, comparator)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => comparator(ctx, l, r)? == Ordering::Greater,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        merged.extend(if take_right { right.next() } else { left.next() });
    }
    Ok(merged)
}
