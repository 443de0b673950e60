//! Conversion between `serde_json` values and objects.
//!
//! JSON arrays become array-like objects: index properties plus a writable,
//! non-enumerable, non-configurable `length`.

use rustc_hash::FxHashSet;

use crate::context::Context;
use crate::descriptor::{ObjectPropertyDescriptor, PresentAttributes};
use crate::error::JsError;
use crate::object::JsObjectRef;
use crate::value::{CheapClone, JsString, JsValue, PropertyKey};

impl Context {
    /// Parse JSON text into objects owned by this context
    pub fn parse_json(&mut self, text: &str) -> Result<JsValue, JsError> {
        let json: serde_json::Value =
            serde_json::from_str(text).map_err(|e| JsError::syntax_error(e.to_string()))?;
        self.value_from_json(&json)
    }

    pub fn value_from_json(&mut self, json: &serde_json::Value) -> Result<JsValue, JsError> {
        Ok(match json {
            serde_json::Value::Null => JsValue::Null,
            serde_json::Value::Bool(b) => JsValue::Boolean(*b),
            serde_json::Value::Number(n) => JsValue::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => JsValue::String(JsString::from(s.as_str())),
            serde_json::Value::Array(items) => {
                let array = self.create_object_with(items.len() + 1, true);
                for (i, item) in items.iter().enumerate() {
                    let value = self.value_from_json(item)?;
                    let idx = u32::try_from(i)
                        .map_err(|_| JsError::range_error("Invalid array length"))?;
                    let key = self.index_key(idx);
                    array.create_data_property(self, &key, value)?;
                }
                let length = self.names().length.cheap_clone();
                array.define_own_property_throws_exception(
                    self,
                    &length,
                    ObjectPropertyDescriptor::data(
                        JsValue::Number(items.len() as f64),
                        PresentAttributes::WRITABLE
                            | PresentAttributes::NON_ENUMERABLE
                            | PresentAttributes::NON_CONFIGURABLE,
                    ),
                )?;
                JsValue::Object(array)
            }
            serde_json::Value::Object(map) => {
                let obj = self.create_object_with(map.len(), true);
                for (name, value) in map {
                    let value = self.value_from_json(value)?;
                    let key = self.key(name);
                    obj.create_data_property(self, &key, value)?;
                }
                JsValue::Object(obj)
            }
        })
    }

    /// Serialize like `JSON.stringify`: enumerable own string keys, getters
    /// evaluated, `undefined`/functions/symbols dropped from objects and
    /// written as `null` inside arrays.
    pub fn value_to_json(&mut self, value: &JsValue) -> Result<serde_json::Value, JsError> {
        let mut visited = FxHashSet::default();
        Ok(self
            .value_to_json_with_visited(value, &mut visited)?
            .unwrap_or(serde_json::Value::Null))
    }

    fn value_to_json_with_visited(
        &mut self,
        value: &JsValue,
        visited: &mut FxHashSet<usize>,
    ) -> Result<Option<serde_json::Value>, JsError> {
        Ok(Some(match value {
            JsValue::Undefined | JsValue::Symbol(_) => return Ok(None),
            JsValue::Null => serde_json::Value::Null,
            JsValue::Boolean(b) => serde_json::Value::Bool(*b),
            JsValue::Number(n) => number_to_json(*n),
            JsValue::String(s) => serde_json::Value::String(s.to_string()),
            JsValue::Object(obj) if obj.is_callable() => return Ok(None),
            JsValue::Object(obj) => {
                let id = obj.id();
                if !visited.insert(id) {
                    return Err(JsError::type_error("Converting circular structure to JSON"));
                }
                let result = if self.is_array_like(obj) {
                    self.array_to_json(obj, visited)?
                } else {
                    self.object_to_json(obj, visited)?
                };
                visited.remove(&id);
                result
            }
        }))
    }

    fn is_array_like(&self, obj: &JsObjectRef) -> bool {
        let length = self.names().length.cheap_clone();
        let mut length_hidden = false;
        let mut only_indices = true;
        obj.enumeration(|key, descriptor| {
            if *key == length {
                length_hidden = descriptor.is_data_property() && !descriptor.is_enumerable();
            } else if descriptor.is_enumerable() && !key.is_index() {
                only_indices = false;
            }
            true
        });
        length_hidden && only_indices
    }

    fn array_to_json(
        &mut self,
        obj: &JsObjectRef,
        visited: &mut FxHashSet<usize>,
    ) -> Result<serde_json::Value, JsError> {
        let length = obj.length(self)?;
        let mut items = Vec::with_capacity(length.min(1024) as usize);
        for i in 0..length {
            let element = obj.get(self, &PropertyKey::Index(i))?;
            let json = self.value_to_json_with_visited(&element, visited)?;
            items.push(json.unwrap_or(serde_json::Value::Null));
        }
        Ok(serde_json::Value::Array(items))
    }

    fn object_to_json(
        &mut self,
        obj: &JsObjectRef,
        visited: &mut FxHashSet<usize>,
    ) -> Result<serde_json::Value, JsError> {
        let mut keys = Vec::new();
        obj.enumeration(|key, descriptor| {
            if descriptor.is_enumerable() && !key.is_symbol() {
                keys.push(key.cheap_clone());
            }
            true
        });
        // Same order as own_property_keys: indices ascending, then names
        keys.sort_by_key(|key| match key.as_index() {
            Some(idx) => (0, idx),
            None => (1, 0),
        });

        let mut map = serde_json::Map::new();
        for key in keys {
            let value = obj.get(self, &key)?;
            if let Some(json) = self.value_to_json_with_visited(&value, visited)? {
                map.insert(key.to_string(), json);
            }
        }
        Ok(serde_json::Value::Object(map))
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if !n.is_finite() {
        return serde_json::Value::Null;
    }
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        serde_json::Value::Number(serde_json::Number::from(n as i64))
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}
