//! Objects and the property access protocol.
//!
//! An object is a structure reference plus a storage vector holding one slot
//! per structure entry. Every operation that can call back into script code
//! (getters, setters, native accessors) is a method on [`JsObjectRef`] and
//! takes the context; no `RefCell` borrow of the object is held across such a
//! callout, and ordinals are re-resolved afterwards.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::context::Context;
use crate::descriptor::{
    GetterSetter, NativeAccessorData, ObjectGetResult, ObjectPropertyDescriptor,
    PresentAttributes, PropertyAttributes, PropertyKind, StructurePropertyDescriptor,
};
use crate::error::{INVALID_DESCRIPTOR, JsError};
use crate::storage::{ObjectStorage, PropertySlot};
use crate::structure::StructureRef;
use crate::value::{CheapClone, JsString, JsValue, PropertyKey};

/// Native function signature
pub type NativeFn = fn(&mut Context, JsValue, &[JsValue]) -> Result<JsValue, JsError>;

/// Closure-backed function supplied by the embedder
pub type HostFn = Rc<dyn Fn(&mut Context, JsValue, &[JsValue]) -> Result<JsValue, JsError>>;

/// Native function wrapper
#[derive(Clone)]
pub struct NativeFunction {
    pub name: JsString,
    pub func: NativeFn,
    pub arity: usize,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

#[derive(Clone)]
pub struct HostFunction {
    pub name: JsString,
    pub func: HostFn,
    pub arity: usize,
}

impl fmt::Debug for HostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

/// Function representation
#[derive(Debug, Clone)]
pub enum JsFunction {
    Native(NativeFunction),
    Host(HostFunction),
}

impl JsFunction {
    pub fn name(&self) -> &str {
        match self {
            JsFunction::Native(f) => f.name.as_str(),
            JsFunction::Host(f) => f.name.as_str(),
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            JsFunction::Native(f) => f.arity,
            JsFunction::Host(f) => f.arity,
        }
    }
}

/// Kind-specific payload of an object
#[derive(Debug, Default)]
pub enum ExoticObject {
    #[default]
    Ordinary,
    Function(JsFunction),
}

/// Flags most objects never change, allocated on first use
#[derive(Debug, Clone)]
pub struct ObjectRareData {
    pub is_extensible: bool,
    pub is_ever_set_as_prototype: bool,
}

impl Default for ObjectRareData {
    fn default() -> Self {
        Self {
            is_extensible: true,
            is_ever_set_as_prototype: false,
        }
    }
}

#[derive(Debug)]
pub struct JsObject {
    structure: StructureRef,
    storage: ObjectStorage,
    prototype: Option<JsObjectRef>,
    rare_data: Option<Box<ObjectRareData>>,
    plain: bool,
    pub exotic: ExoticObject,
}

/// Snapshot of an own entry taken while the object was borrowed
struct OwnEntry {
    ordinal: usize,
    descriptor: StructurePropertyDescriptor,
    slot: PropertySlot,
}

impl JsObject {
    pub(crate) fn new(
        structure: StructureRef,
        prototype: Option<JsObjectRef>,
        capacity: usize,
        plain: bool,
        exotic: ExoticObject,
    ) -> Self {
        Self {
            structure,
            storage: ObjectStorage::with_capacity(capacity),
            prototype,
            rare_data: None,
            plain,
            exotic,
        }
    }

    /// Fill the slot for the next entry of a prebuilt structure
    pub(crate) fn push_initial_value(&mut self, value: JsValue) {
        self.storage.push(PropertySlot::Value(value));
    }

    pub fn structure(&self) -> &StructureRef {
        &self.structure
    }

    pub fn storage(&self) -> &ObjectStorage {
        &self.storage
    }

    pub fn prototype(&self) -> Option<&JsObjectRef> {
        self.prototype.as_ref()
    }

    pub fn rare_data(&self) -> Option<&ObjectRareData> {
        self.rare_data.as_deref()
    }

    pub fn is_extensible(&self) -> bool {
        self.rare_data.as_ref().is_none_or(|rare| rare.is_extensible)
    }

    pub fn is_ever_set_as_prototype(&self) -> bool {
        self.rare_data
            .as_ref()
            .is_some_and(|rare| rare.is_ever_set_as_prototype)
    }

    pub fn is_plain_object(&self) -> bool {
        self.plain
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.exotic, ExoticObject::Function(_))
    }

    pub fn property_count(&self) -> usize {
        self.structure.property_count()
    }

    fn rare_data_mut(&mut self) -> &mut ObjectRareData {
        self.rare_data.get_or_insert_with(Default::default)
    }

    fn own_ordinal(&self, key: &PropertyKey) -> Option<(usize, StructurePropertyDescriptor)> {
        if key.is_index() && !self.structure.has_index_property_name() {
            return None;
        }
        let ordinal = self.structure.find_property(key)?;
        let item = self.structure.read_property(ordinal)?;
        Some((ordinal, item.descriptor))
    }

    fn own_entry(&self, key: &PropertyKey) -> Option<OwnEntry> {
        let (ordinal, descriptor) = self.own_ordinal(key)?;
        let slot = self.storage.get(ordinal)?.clone();
        Some(OwnEntry {
            ordinal,
            descriptor,
            slot,
        })
    }

    fn append(
        &mut self,
        key: PropertyKey,
        descriptor: StructurePropertyDescriptor,
        slot: PropertySlot,
    ) {
        self.structure = self.structure.add_property(key, descriptor);
        self.storage.push(slot);
    }

    fn remove_at(&mut self, ordinal: usize) -> Result<(), JsError> {
        if self.storage.remove(ordinal).is_none() {
            return Err(JsError::internal_error(format!(
                "no storage slot at ordinal {} (structure has {} entries)",
                ordinal,
                self.structure.property_count()
            )));
        }
        self.structure = self.structure.remove_property(ordinal);
        Ok(())
    }

    /// Delete-then-redefine: the entry moves to the end of the insertion order.
    fn replace_property(
        &mut self,
        ordinal: usize,
        key: &PropertyKey,
        descriptor: StructurePropertyDescriptor,
        slot: PropertySlot,
    ) -> Result<(), JsError> {
        self.remove_at(ordinal)?;
        self.append(key.cheap_clone(), descriptor, slot);
        Ok(())
    }

    fn write_slot(&mut self, ordinal: usize, slot: PropertySlot) -> Result<(), JsError> {
        if self.storage.set(ordinal, slot) {
            Ok(())
        } else {
            Err(JsError::internal_error(format!(
                "no storage slot at ordinal {}",
                ordinal
            )))
        }
    }

    /// Check that storage matches the structure slot for slot.
    pub fn check_invariants(&self) -> Result<(), JsError> {
        if self.structure.property_count() != self.storage.len() {
            return Err(JsError::internal_error(format!(
                "structure has {} entries but storage has {}",
                self.structure.property_count(),
                self.storage.len()
            )));
        }
        for (ordinal, item) in self.structure.iter().enumerate() {
            let matches = match (item.descriptor.kind(), self.storage.get(ordinal)) {
                (PropertyKind::Data, Some(PropertySlot::Value(_))) => true,
                (PropertyKind::NativeAccessor, Some(PropertySlot::Native(_))) => true,
                (PropertyKind::Accessor, Some(PropertySlot::Accessor(pair))) => {
                    item.descriptor.attributes()
                        & (PropertyAttributes::HAS_GETTER | PropertyAttributes::HAS_SETTER)
                        == pair.presence()
                }
                _ => false,
            };
            if !matches {
                return Err(JsError::internal_error(format!(
                    "slot {} does not match descriptor of '{}'",
                    ordinal, item.key
                )));
            }
        }
        Ok(())
    }
}

/// Target found by the [[Set]] walk, captured without invoking any callback
enum SetTarget {
    Data { writable: bool },
    Accessor { setter: Option<JsObjectRef> },
}

/// Shared handle to an object.
///
/// Object graphs may be cyclic; handles are reference counted and compare by
/// identity.
#[derive(Clone)]
pub struct JsObjectRef(Rc<RefCell<JsObject>>);

impl CheapClone for JsObjectRef {}

impl JsObjectRef {
    pub(crate) fn new(object: JsObject) -> Self {
        JsObjectRef(Rc::new(RefCell::new(object)))
    }

    pub fn borrow(&self) -> Ref<'_, JsObject> {
        self.0.borrow()
    }

    pub(crate) fn borrow_mut(&self) -> RefMut<'_, JsObject> {
        self.0.borrow_mut()
    }

    pub fn try_borrow(&self) -> Option<Ref<'_, JsObject>> {
        self.0.try_borrow().ok()
    }

    /// Identity of the object, stable for its lifetime
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &JsObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn is_callable(&self) -> bool {
        self.try_borrow().is_some_and(|obj| obj.is_callable())
    }

    pub fn is_extensible(&self) -> bool {
        self.borrow().is_extensible()
    }

    pub fn prevent_extensions(&self) -> bool {
        self.borrow_mut().rare_data_mut().is_extensible = false;
        true
    }

    pub fn get_prototype(&self) -> Option<JsObjectRef> {
        self.borrow().prototype.clone()
    }

    /// Ordinary [[SetPrototypeOf]]. Fails on non-extensible objects and on cycles.
    pub fn set_prototype(&self, ctx: &mut Context, prototype: Option<JsObjectRef>) -> bool {
        let current = self.get_prototype();
        let unchanged = match (&current, &prototype) {
            (None, None) => true,
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        };
        if unchanged {
            return true;
        }
        if !self.is_extensible() {
            return false;
        }
        if let Some(proto) = &prototype {
            let mut cursor = Some(proto.cheap_clone());
            while let Some(link) = cursor {
                if link.ptr_eq(self) {
                    log::debug!("rejected prototype cycle through object {:#x}", self.id());
                    return false;
                }
                cursor = link.get_prototype();
            }
            proto.mark_as_prototype(ctx);
        }
        self.borrow_mut().prototype = prototype;
        true
    }

    pub fn set_prototype_throws_exception(
        &self,
        ctx: &mut Context,
        prototype: Option<JsObjectRef>,
    ) -> Result<(), JsError> {
        if self.set_prototype(ctx, prototype) {
            Ok(())
        } else {
            Err(JsError::type_error("Cannot set prototype of object"))
        }
    }

    pub(crate) fn mark_as_prototype(&self, ctx: &mut Context) {
        let has_indices = {
            let mut obj = self.borrow_mut();
            if obj.is_ever_set_as_prototype() {
                return;
            }
            obj.rare_data_mut().is_ever_set_as_prototype = true;
            obj.structure.has_index_property_name()
        };
        if has_indices {
            ctx.bump_prototype_index_epoch();
        }
    }

    /// Objects used as prototypes leave shared structures before gaining an
    /// index property, and the context epoch records the change.
    fn prepare_for_index_property(&self, ctx: &mut Context) {
        let switched = {
            let mut obj = self.borrow_mut();
            if !obj.is_ever_set_as_prototype() || obj.structure.is_dictionary() {
                false
            } else {
                obj.structure = obj.structure.to_dictionary();
                true
            }
        };
        if switched {
            ctx.bump_prototype_index_epoch();
            log::debug!(
                "prototype object {:#x} received an index property; switched to dictionary mode",
                self.id()
            );
        }
    }

    pub fn has_own_property(&self, key: &PropertyKey) -> bool {
        self.borrow().own_ordinal(key).is_some()
    }

    pub fn has_property(&self, key: &PropertyKey) -> bool {
        let mut cursor = Some(self.cheap_clone());
        while let Some(obj) = cursor {
            if obj.has_own_property(key) {
                return true;
            }
            cursor = obj.get_prototype();
        }
        false
    }

    /// [[GetOwnProperty]]. Native accessors are read through their getter;
    /// accessor pairs are returned without calling the getter.
    pub fn get_own_property(
        &self,
        ctx: &mut Context,
        key: &PropertyKey,
    ) -> Result<ObjectGetResult, JsError> {
        let entry = self.borrow().own_entry(key);
        let Some(entry) = entry else {
            return Ok(ObjectGetResult::NotFound);
        };
        let attributes = entry.descriptor.attributes();
        match entry.slot {
            PropertySlot::Value(value) => Ok(ObjectGetResult::Data { value, attributes }),
            PropertySlot::Native(data) => {
                let value = (data.getter)(ctx, self)?;
                Ok(ObjectGetResult::Data { value, attributes })
            }
            PropertySlot::Accessor(pair) => Ok(ObjectGetResult::Accessor { pair, attributes }),
        }
    }

    /// Own lookup followed by the prototype chain
    pub fn get_property(
        &self,
        ctx: &mut Context,
        key: &PropertyKey,
    ) -> Result<ObjectGetResult, JsError> {
        let mut current = self.cheap_clone();
        loop {
            let result = current.get_own_property(ctx, key)?;
            if result.has_value() {
                return Ok(result);
            }
            match current.get_prototype() {
                Some(next) => current = next,
                None => return Ok(ObjectGetResult::NotFound),
            }
        }
    }

    pub fn get(&self, ctx: &mut Context, key: &PropertyKey) -> Result<JsValue, JsError> {
        self.get_with_receiver(ctx, key, self)
    }

    /// [[Get]] with an explicit receiver used as `this` for getters
    pub fn get_with_receiver(
        &self,
        ctx: &mut Context,
        key: &PropertyKey,
        receiver: &JsObjectRef,
    ) -> Result<JsValue, JsError> {
        let result = self.get_property(ctx, key)?;
        result.value(ctx, receiver)
    }

    fn set_target(&self, key: &PropertyKey) -> Option<SetTarget> {
        let obj = self.borrow();
        let (ordinal, descriptor) = obj.own_ordinal(key)?;
        match obj.storage.get(ordinal)? {
            PropertySlot::Accessor(pair) => Some(SetTarget::Accessor {
                setter: pair.setter.clone(),
            }),
            PropertySlot::Value(_) | PropertySlot::Native(_) => Some(SetTarget::Data {
                writable: descriptor.is_writable(),
            }),
        }
    }

    /// Ordinary [[Set]]. Returns false when the assignment is rejected.
    pub fn set(
        &self,
        ctx: &mut Context,
        key: &PropertyKey,
        value: JsValue,
        receiver: &JsObjectRef,
    ) -> Result<bool, JsError> {
        let mut holder = self.cheap_clone();
        let target = loop {
            if let Some(target) = holder.set_target(key) {
                break target;
            }
            match holder.get_prototype() {
                Some(next) => holder = next,
                None => break SetTarget::Data { writable: true },
            }
        };

        match target {
            SetTarget::Data { writable: false } => Ok(false),
            SetTarget::Data { writable: true } => receiver.set_on_receiver(ctx, key, value),
            SetTarget::Accessor { setter: None } => Ok(false),
            SetTarget::Accessor {
                setter: Some(setter),
            } => {
                ctx.call(&setter, JsValue::Object(receiver.cheap_clone()), &[value])?;
                Ok(true)
            }
        }
    }

    fn set_on_receiver(
        &self,
        ctx: &mut Context,
        key: &PropertyKey,
        value: JsValue,
    ) -> Result<bool, JsError> {
        match self.set_target(key) {
            Some(SetTarget::Accessor { .. }) => Ok(false),
            Some(SetTarget::Data { writable: false }) => Ok(false),
            Some(SetTarget::Data { writable: true }) => self.define_own_property(
                ctx,
                key,
                ObjectPropertyDescriptor::data(value, PresentAttributes::empty()),
            ),
            None => self.create_data_property(ctx, key, value),
        }
    }

    /// `set` with `self` as the receiver
    pub fn put(&self, ctx: &mut Context, key: &PropertyKey, value: JsValue) -> Result<bool, JsError> {
        self.set(ctx, key, value, self)
    }

    pub fn set_throws_exception(
        &self,
        ctx: &mut Context,
        key: &PropertyKey,
        value: JsValue,
        receiver: &JsObjectRef,
    ) -> Result<(), JsError> {
        if self.set(ctx, key, value, receiver)? {
            Ok(())
        } else {
            Err(JsError::type_error(format!(
                "Cannot assign to read only property '{}' of object",
                key
            )))
        }
    }

    /// Silent rejection outside strict mode, TypeError inside it
    pub fn set_throws_exception_when_strict_mode(
        &self,
        ctx: &mut Context,
        key: &PropertyKey,
        value: JsValue,
        receiver: &JsObjectRef,
    ) -> Result<bool, JsError> {
        if ctx.in_strict_mode() {
            self.set_throws_exception(ctx, key, value, receiver)?;
            Ok(true)
        } else {
            self.set(ctx, key, value, receiver)
        }
    }

    /// CreateDataProperty: writable, enumerable and configurable
    pub fn create_data_property(
        &self,
        ctx: &mut Context,
        key: &PropertyKey,
        value: JsValue,
    ) -> Result<bool, JsError> {
        self.define_own_property(
            ctx,
            key,
            ObjectPropertyDescriptor::data(value, PresentAttributes::ALL_PRESENT),
        )
    }

    /// ValidateAndApplyPropertyDescriptor for an ordinary object.
    pub fn define_own_property(
        &self,
        ctx: &mut Context,
        key: &PropertyKey,
        desc: ObjectPropertyDescriptor,
    ) -> Result<bool, JsError> {
        if desc.is_data_descriptor() && desc.is_accessor_descriptor() {
            return Err(JsError::type_error(INVALID_DESCRIPTOR));
        }
        if key.is_index() {
            self.prepare_for_index_property(ctx);
        }

        let entry = self.borrow().own_entry(key);
        let Some(current) = entry else {
            if !self.is_extensible() {
                return Ok(false);
            }
            let (descriptor, slot) = new_property(&desc);
            self.borrow_mut().append(key.cheap_clone(), descriptor, slot);
            return Ok(true);
        };

        if desc.is_empty() {
            return Ok(true);
        }

        let configurable = current.descriptor.is_configurable();
        if !configurable {
            if desc.configurable == Some(true) {
                return Ok(false);
            }
            if desc
                .enumerable
                .is_some_and(|e| e != current.descriptor.is_enumerable())
            {
                return Ok(false);
            }
        }

        if !desc.is_generic_descriptor() {
            let current_is_data = current.descriptor.is_data_property();
            if desc.is_data_descriptor() != current_is_data {
                if !configurable {
                    return Ok(false);
                }
                return self.convert_property_kind(key, current, &desc);
            }

            if !configurable {
                if current_is_data {
                    if !current.descriptor.is_writable() {
                        if desc.writable == Some(true) {
                            return Ok(false);
                        }
                        if let Some(value) = &desc.value {
                            let current_value = self.read_slot(ctx, &current.slot)?;
                            if !value.same_value(&current_value) {
                                return Ok(false);
                            }
                        }
                        return Ok(true);
                    }
                } else {
                    if let PropertySlot::Accessor(pair) = &current.slot {
                        if desc.getter.as_ref().is_some_and(|g| *g != pair.getter)
                            || desc.setter.as_ref().is_some_and(|s| *s != pair.setter)
                        {
                            return Ok(false);
                        }
                    }
                    return Ok(true);
                }
            }
        }

        self.apply_property_update(ctx, key, current, desc)
    }

    pub fn define_own_property_throws_exception(
        &self,
        ctx: &mut Context,
        key: &PropertyKey,
        desc: ObjectPropertyDescriptor,
    ) -> Result<(), JsError> {
        if self.define_own_property(ctx, key, desc)? {
            Ok(())
        } else {
            Err(JsError::type_error(format!(
                "Cannot redefine property: {}",
                key
            )))
        }
    }

    fn read_slot(&self, ctx: &mut Context, slot: &PropertySlot) -> Result<JsValue, JsError> {
        match slot {
            PropertySlot::Value(value) => Ok(value.clone()),
            PropertySlot::Native(data) => (data.getter)(ctx, self),
            PropertySlot::Accessor(_) => Ok(JsValue::Undefined),
        }
    }

    /// Replace a data property with an accessor or vice versa, keeping
    /// enumerable/configurable unless the request overrides them.
    fn convert_property_kind(
        &self,
        key: &PropertyKey,
        current: OwnEntry,
        desc: &ObjectPropertyDescriptor,
    ) -> Result<bool, JsError> {
        let kept = current.descriptor.attributes()
            & (PropertyAttributes::ENUMERABLE | PropertyAttributes::CONFIGURABLE);
        let mut attributes = overlay_common_attributes(kept, desc);

        let (descriptor, slot) = if desc.is_accessor_descriptor() {
            let pair = GetterSetter::new(
                desc.getter.clone().flatten(),
                desc.setter.clone().flatten(),
            );
            attributes |= pair.presence();
            (
                StructurePropertyDescriptor::accessor(attributes),
                PropertySlot::Accessor(pair),
            )
        } else {
            attributes.set(PropertyAttributes::WRITABLE, desc.writable == Some(true));
            (
                StructurePropertyDescriptor::data(attributes),
                PropertySlot::Value(desc.value.clone().unwrap_or_default()),
            )
        };

        log::debug!(
            "converting '{}' to {} property",
            key,
            if descriptor.is_data_property() {
                "data"
            } else {
                "accessor"
            }
        );
        self.borrow_mut()
            .replace_property(current.ordinal, key, descriptor, slot)?;
        Ok(true)
    }

    /// Apply a validated request to an existing property of the same kind.
    ///
    /// Attribute changes go through delete-then-redefine; a value-only change
    /// is written in place.
    fn apply_property_update(
        &self,
        ctx: &mut Context,
        key: &PropertyKey,
        current: OwnEntry,
        desc: ObjectPropertyDescriptor,
    ) -> Result<bool, JsError> {
        let mut attributes = overlay_common_attributes(current.descriptor.attributes(), &desc);
        if let Some(writable) = desc.writable {
            attributes.set(PropertyAttributes::WRITABLE, writable);
        }

        match current.slot {
            PropertySlot::Value(current_value) => {
                let descriptor = StructurePropertyDescriptor::data(attributes);
                let slot = PropertySlot::Value(desc.value.unwrap_or(current_value));
                let mut obj = self.borrow_mut();
                if descriptor == current.descriptor {
                    obj.write_slot(current.ordinal, slot)?;
                } else {
                    log::debug!("redefining '{}' with new attributes", key);
                    obj.replace_property(current.ordinal, key, descriptor, slot)?;
                }
                Ok(true)
            }
            PropertySlot::Native(data) => {
                let descriptor = StructurePropertyDescriptor::native_accessor(attributes);
                if descriptor != current.descriptor {
                    log::debug!("redefining native accessor '{}' with new attributes", key);
                    self.borrow_mut().replace_property(
                        current.ordinal,
                        key,
                        descriptor,
                        PropertySlot::Native(data),
                    )?;
                }
                match (desc.value, data.setter) {
                    (None, _) => Ok(true),
                    (Some(value), Some(setter)) => setter(ctx, self, value),
                    (Some(_), None) => Ok(false),
                }
            }
            PropertySlot::Accessor(mut pair) => {
                if let Some(getter) = desc.getter {
                    pair.getter = getter;
                }
                if let Some(setter) = desc.setter {
                    pair.setter = setter;
                }
                attributes.remove(PropertyAttributes::HAS_GETTER | PropertyAttributes::HAS_SETTER);
                attributes |= pair.presence();
                let descriptor = StructurePropertyDescriptor::accessor(attributes);
                let mut obj = self.borrow_mut();
                if descriptor == current.descriptor {
                    obj.write_slot(current.ordinal, PropertySlot::Accessor(pair))?;
                } else {
                    log::debug!("redefining accessor '{}' with new attributes", key);
                    obj.replace_property(
                        current.ordinal,
                        key,
                        descriptor,
                        PropertySlot::Accessor(pair),
                    )?;
                }
                Ok(true)
            }
        }
    }

    /// Install a data property whose reads and writes go through host callbacks.
    pub fn define_native_accessor_property(
        &self,
        ctx: &mut Context,
        key: &PropertyKey,
        data: &'static NativeAccessorData,
        attributes: PropertyAttributes,
    ) -> Result<bool, JsError> {
        if key.is_index() {
            self.prepare_for_index_property(ctx);
        }
        let descriptor = StructurePropertyDescriptor::native_accessor(attributes);
        let existing = self.borrow().own_ordinal(key);
        let mut obj = self.borrow_mut();
        match existing {
            Some((_, current)) if !current.is_configurable() => Ok(false),
            Some((ordinal, _)) => {
                obj.replace_property(ordinal, key, descriptor, PropertySlot::Native(data))?;
                Ok(true)
            }
            None if !obj.is_extensible() => Ok(false),
            None => {
                obj.append(key.cheap_clone(), descriptor, PropertySlot::Native(data));
                Ok(true)
            }
        }
    }

    /// Remove an own property if it exists and is configurable.
    pub fn delete_own_property(&self, key: &PropertyKey) -> bool {
        let mut obj = self.borrow_mut();
        let Some((ordinal, descriptor)) = obj.own_ordinal(key) else {
            return false;
        };
        if !descriptor.is_configurable() {
            return false;
        }
        obj.remove_at(ordinal).is_ok()
    }

    /// Strict-mode `delete`: a non-configurable own property raises a TypeError.
    pub fn delete_throws_exception_when_strict_mode(
        &self,
        ctx: &Context,
        key: &PropertyKey,
    ) -> Result<bool, JsError> {
        if self.delete_own_property(key) {
            return Ok(true);
        }
        if ctx.in_strict_mode() && self.has_own_property(key) {
            return Err(JsError::type_error(format!(
                "Cannot delete property '{}' of object",
                key
            )));
        }
        Ok(false)
    }

    /// Visit own properties in insertion order until the visitor returns false.
    ///
    /// Iterates a snapshot, so the visitor may mutate the object.
    pub fn enumeration<F>(&self, mut visitor: F)
    where
        F: FnMut(&PropertyKey, &StructurePropertyDescriptor) -> bool,
    {
        let structure = self.borrow().structure.cheap_clone();
        for item in structure.iter() {
            if !visitor(&item.key, &item.descriptor) {
                break;
            }
        }
    }

    /// [[OwnPropertyKeys]]: indices ascending, then names, then symbols,
    /// each group in insertion order.
    pub fn own_property_keys(&self) -> Vec<PropertyKey> {
        let structure = self.borrow().structure.cheap_clone();
        let mut indices: Vec<u32> = structure.iter().filter_map(|i| i.key.as_index()).collect();
        indices.sort_unstable();

        let mut keys: Vec<PropertyKey> = indices.into_iter().map(PropertyKey::Index).collect();
        keys.extend(
            structure
                .iter()
                .filter(|i| matches!(i.key, PropertyKey::String(_)))
                .map(|i| i.key.cheap_clone()),
        );
        keys.extend(
            structure
                .iter()
                .filter(|i| i.key.is_symbol())
                .map(|i| i.key.cheap_clone()),
        );
        keys
    }

    /// `length` read through [[Get]] and coerced with ToUint32
    pub fn length(&self, ctx: &mut Context) -> Result<u32, JsError> {
        let key = ctx.names().length.cheap_clone();
        Ok(self.get(ctx, &key)?.to_uint32())
    }
}

/// Structure descriptor and initial slot for a property that does not exist
/// yet. Absent attributes default to false and absent values to undefined.
fn new_property(desc: &ObjectPropertyDescriptor) -> (StructurePropertyDescriptor, PropertySlot) {
    let mut attributes = overlay_common_attributes(PropertyAttributes::empty(), desc);
    if desc.is_accessor_descriptor() {
        let pair = GetterSetter::new(
            desc.getter.clone().flatten(),
            desc.setter.clone().flatten(),
        );
        attributes |= pair.presence();
        (
            StructurePropertyDescriptor::accessor(attributes),
            PropertySlot::Accessor(pair),
        )
    } else {
        attributes.set(PropertyAttributes::WRITABLE, desc.writable == Some(true));
        (
            StructurePropertyDescriptor::data(attributes),
            PropertySlot::Value(desc.value.clone().unwrap_or_default()),
        )
    }
}

fn overlay_common_attributes(
    mut attributes: PropertyAttributes,
    desc: &ObjectPropertyDescriptor,
) -> PropertyAttributes {
    if let Some(enumerable) = desc.enumerable {
        attributes.set(PropertyAttributes::ENUMERABLE, enumerable);
    }
    if let Some(configurable) = desc.configurable {
        attributes.set(PropertyAttributes::CONFIGURABLE, configurable);
    }
    attributes
}

impl PartialEq for JsObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for JsObjectRef {}

impl Hash for JsObjectRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for JsObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsObjectRef({:#x})", self.id())
    }
}
