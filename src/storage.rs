//! Per-object property storage, positionally aligned with the structure.

use crate::descriptor::{GetterSetter, NativeAccessorData};
use crate::value::JsValue;

/// Value held at one ordinal
#[derive(Debug, Clone)]
pub enum PropertySlot {
    Value(JsValue),
    /// Callbacks for a native accessor property
    Native(&'static NativeAccessorData),
    Accessor(GetterSetter),
}

#[derive(Debug, Default)]
pub struct ObjectStorage {
    slots: Vec<PropertySlot>,
}

impl ObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn push(&mut self, slot: PropertySlot) {
        self.slots.push(slot);
    }

    pub fn get(&self, ordinal: usize) -> Option<&PropertySlot> {
        self.slots.get(ordinal)
    }

    pub fn get_mut(&mut self, ordinal: usize) -> Option<&mut PropertySlot> {
        self.slots.get_mut(ordinal)
    }

    /// Overwrite the slot at `ordinal`. Returns false if out of range.
    pub fn set(&mut self, ordinal: usize, slot: PropertySlot) -> bool {
        match self.slots.get_mut(ordinal) {
            Some(existing) => {
                *existing = slot;
                true
            }
            None => false,
        }
    }

    /// Remove and re-pack. Returns the removed slot.
    pub fn remove(&mut self, ordinal: usize) -> Option<PropertySlot> {
        (ordinal < self.slots.len()).then(|| self.slots.remove(ordinal))
    }
}
