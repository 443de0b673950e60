//! Property descriptors: the attribute bits stored in a structure, the
//! transient request passed to `define_own_property`, and the result of an
//! own-property lookup.

use std::fmt;

use bitflags::bitflags;

use crate::context::Context;
use crate::error::{INVALID_DESCRIPTOR, JsError};
use crate::object::JsObjectRef;
use crate::value::{CheapClone, JsValue};

bitflags! {
    /// Attribute bits of a stored property.
    ///
    /// Data properties use `WRITABLE`, `ENUMERABLE` and `CONFIGURABLE`.
    /// Accessor properties use `ENUMERABLE`, `CONFIGURABLE`, `HAS_GETTER`
    /// and `HAS_SETTER`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PropertyAttributes: u8 {
        const WRITABLE = 1 << 0;
        const ENUMERABLE = 1 << 1;
        const CONFIGURABLE = 1 << 2;
        const HAS_GETTER = 1 << 3;
        const HAS_SETTER = 1 << 4;

        const ALL = Self::WRITABLE.bits() | Self::ENUMERABLE.bits() | Self::CONFIGURABLE.bits();
    }
}

bitflags! {
    /// Attributes explicitly specified in a define request, with their value.
    ///
    /// Each attribute has a "true" and a "false" bit; when neither is set the
    /// attribute is absent from the request.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PresentAttributes: u8 {
        const WRITABLE = 1 << 0;
        const NON_WRITABLE = 1 << 1;
        const ENUMERABLE = 1 << 2;
        const NON_ENUMERABLE = 1 << 3;
        const CONFIGURABLE = 1 << 4;
        const NON_CONFIGURABLE = 1 << 5;

        const ALL_PRESENT = Self::WRITABLE.bits() | Self::ENUMERABLE.bits() | Self::CONFIGURABLE.bits();
        const ALL_PRESENT_FALSE = Self::NON_WRITABLE.bits()
            | Self::NON_ENUMERABLE.bits()
            | Self::NON_CONFIGURABLE.bits();
    }
}

impl PresentAttributes {
    fn flag(self, yes: PresentAttributes, no: PresentAttributes) -> Option<bool> {
        if self.contains(yes) {
            Some(true)
        } else if self.contains(no) {
            Some(false)
        } else {
            None
        }
    }
}

/// What kind of slot a structure entry describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Data,
    /// Data property whose value is produced and consumed by host callbacks
    NativeAccessor,
    Accessor,
}

/// Descriptor stored in a structure entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StructurePropertyDescriptor {
    attributes: PropertyAttributes,
    kind: PropertyKind,
}

impl StructurePropertyDescriptor {
    pub fn data(attributes: PropertyAttributes) -> Self {
        Self {
            attributes: attributes
                & (PropertyAttributes::WRITABLE
                    | PropertyAttributes::ENUMERABLE
                    | PropertyAttributes::CONFIGURABLE),
            kind: PropertyKind::Data,
        }
    }

    pub fn native_accessor(attributes: PropertyAttributes) -> Self {
        Self {
            kind: PropertyKind::NativeAccessor,
            ..Self::data(attributes)
        }
    }

    pub fn accessor(attributes: PropertyAttributes) -> Self {
        Self {
            attributes: attributes - PropertyAttributes::WRITABLE,
            kind: PropertyKind::Accessor,
        }
    }

    pub fn attributes(&self) -> PropertyAttributes {
        self.attributes
    }

    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    pub fn is_data_property(&self) -> bool {
        !matches!(self.kind, PropertyKind::Accessor)
    }

    pub fn is_native_accessor(&self) -> bool {
        matches!(self.kind, PropertyKind::NativeAccessor)
    }

    pub fn is_writable(&self) -> bool {
        self.attributes.contains(PropertyAttributes::WRITABLE)
    }

    pub fn is_enumerable(&self) -> bool {
        self.attributes.contains(PropertyAttributes::ENUMERABLE)
    }

    pub fn is_configurable(&self) -> bool {
        self.attributes.contains(PropertyAttributes::CONFIGURABLE)
    }
}

/// Host getter for a native accessor property
pub type NativeGetter = fn(&mut Context, &JsObjectRef) -> Result<JsValue, JsError>;
/// Host setter for a native accessor property; `false` rejects the write
pub type NativeSetter = fn(&mut Context, &JsObjectRef, JsValue) -> Result<bool, JsError>;

/// Callbacks behind a native accessor property
pub struct NativeAccessorData {
    pub getter: NativeGetter,
    pub setter: Option<NativeSetter>,
}

impl fmt::Debug for NativeAccessorData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeAccessorData")
            .field("has_setter", &self.setter.is_some())
            .finish()
    }
}

/// Getter/setter pair stored for an accessor property
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetterSetter {
    pub getter: Option<JsObjectRef>,
    pub setter: Option<JsObjectRef>,
}

impl GetterSetter {
    pub fn new(getter: Option<JsObjectRef>, setter: Option<JsObjectRef>) -> Self {
        Self { getter, setter }
    }

    pub(crate) fn presence(&self) -> PropertyAttributes {
        let mut attrs = PropertyAttributes::empty();
        attrs.set(PropertyAttributes::HAS_GETTER, self.getter.is_some());
        attrs.set(PropertyAttributes::HAS_SETTER, self.setter.is_some());
        attrs
    }
}

/// A `defineProperty` request. Absent fields are `None`.
///
/// `getter`/`setter` use `Some(None)` for an explicit `undefined`.
#[derive(Debug, Clone, Default)]
pub struct ObjectPropertyDescriptor {
    pub value: Option<JsValue>,
    pub writable: Option<bool>,
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
    pub getter: Option<Option<JsObjectRef>>,
    pub setter: Option<Option<JsObjectRef>>,
}

impl ObjectPropertyDescriptor {
    /// Data request. `writable` in `present` is honored; the value is always present.
    pub fn data(value: JsValue, present: PresentAttributes) -> Self {
        Self {
            value: Some(value),
            writable: present.flag(PresentAttributes::WRITABLE, PresentAttributes::NON_WRITABLE),
            ..Self::generic(present)
        }
    }

    /// Accessor request. Both getter and setter are present (possibly undefined).
    pub fn accessor(
        getter: Option<JsObjectRef>,
        setter: Option<JsObjectRef>,
        present: PresentAttributes,
    ) -> Self {
        Self {
            getter: Some(getter),
            setter: Some(setter),
            ..Self::generic(present)
        }
    }

    /// Request carrying only enumerable/configurable changes
    pub fn generic(present: PresentAttributes) -> Self {
        Self {
            value: None,
            writable: None,
            enumerable: present
                .flag(PresentAttributes::ENUMERABLE, PresentAttributes::NON_ENUMERABLE),
            configurable: present.flag(
                PresentAttributes::CONFIGURABLE,
                PresentAttributes::NON_CONFIGURABLE,
            ),
            getter: None,
            setter: None,
        }
    }

    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    pub fn is_accessor_descriptor(&self) -> bool {
        self.getter.is_some() || self.setter.is_some()
    }

    pub fn is_generic_descriptor(&self) -> bool {
        !self.is_data_descriptor() && !self.is_accessor_descriptor()
    }

    /// No field present at all
    pub fn is_empty(&self) -> bool {
        self.is_generic_descriptor() && self.enumerable.is_none() && self.configurable.is_none()
    }

    /// ToPropertyDescriptor: read a descriptor out of a script object.
    pub fn from_object(ctx: &mut Context, obj: &JsObjectRef) -> Result<Self, JsError> {
        let mut desc = ObjectPropertyDescriptor::default();
        let names = ctx.names().cheap_clone();

        if obj.has_property(&names.enumerable) {
            desc.enumerable = Some(obj.get(ctx, &names.enumerable)?.to_boolean());
        }
        if obj.has_property(&names.configurable) {
            desc.configurable = Some(obj.get(ctx, &names.configurable)?.to_boolean());
        }
        if obj.has_property(&names.value) {
            desc.value = Some(obj.get(ctx, &names.value)?);
        }
        if obj.has_property(&names.writable) {
            desc.writable = Some(obj.get(ctx, &names.writable)?.to_boolean());
        }
        if obj.has_property(&names.get) {
            let getter = obj.get(ctx, &names.get)?;
            desc.getter = Some(callable_or_undefined(getter, "Getter must be a function")?);
        }
        if obj.has_property(&names.set) {
            let setter = obj.get(ctx, &names.set)?;
            desc.setter = Some(callable_or_undefined(setter, "Setter must be a function")?);
        }

        if desc.is_accessor_descriptor() && desc.is_data_descriptor() {
            return Err(JsError::type_error(INVALID_DESCRIPTOR));
        }
        Ok(desc)
    }
}

fn callable_or_undefined(value: JsValue, message: &str) -> Result<Option<JsObjectRef>, JsError> {
    match value {
        JsValue::Undefined => Ok(None),
        JsValue::Object(obj) if obj.is_callable() => Ok(Some(obj)),
        _ => Err(JsError::type_error(message)),
    }
}

/// Result of an own-property or prototype-chain lookup
#[derive(Debug, Clone, Default)]
pub enum ObjectGetResult {
    #[default]
    NotFound,
    Data {
        value: JsValue,
        attributes: PropertyAttributes,
    },
    Accessor {
        pair: GetterSetter,
        attributes: PropertyAttributes,
    },
}

impl ObjectGetResult {
    pub fn has_value(&self) -> bool {
        !matches!(self, ObjectGetResult::NotFound)
    }

    pub fn is_data_property(&self) -> bool {
        matches!(self, ObjectGetResult::Data { .. })
    }

    pub fn is_accessor_property(&self) -> bool {
        matches!(self, ObjectGetResult::Accessor { .. })
    }

    pub fn attributes(&self) -> PropertyAttributes {
        match self {
            ObjectGetResult::NotFound => PropertyAttributes::empty(),
            ObjectGetResult::Data { attributes, .. }
            | ObjectGetResult::Accessor { attributes, .. } => *attributes,
        }
    }

    pub fn is_writable(&self) -> bool {
        self.attributes().contains(PropertyAttributes::WRITABLE)
    }

    pub fn is_enumerable(&self) -> bool {
        self.attributes().contains(PropertyAttributes::ENUMERABLE)
    }

    pub fn is_configurable(&self) -> bool {
        self.attributes().contains(PropertyAttributes::CONFIGURABLE)
    }

    /// Resolve to a value, calling the getter with `receiver` as `this`.
    /// Missing properties and getter-less accessors read as `undefined`.
    pub fn value(&self, ctx: &mut Context, receiver: &JsObjectRef) -> Result<JsValue, JsError> {
        match self {
            ObjectGetResult::NotFound => Ok(JsValue::Undefined),
            ObjectGetResult::Data { value, .. } => Ok(value.clone()),
            ObjectGetResult::Accessor { pair, .. } => match &pair.getter {
                Some(getter) => ctx.call(getter, JsValue::Object(receiver.cheap_clone()), &[]),
                None => Ok(JsValue::Undefined),
            },
        }
    }

    /// FromPropertyDescriptor: build the descriptor object script code sees.
    pub fn to_descriptor_object(&self, ctx: &mut Context) -> Result<JsValue, JsError> {
        let attributes = self.attributes();
        let (first, second) = match self {
            ObjectGetResult::NotFound => return Ok(JsValue::Undefined),
            ObjectGetResult::Data { value, .. } => (
                value.clone(),
                JsValue::Boolean(attributes.contains(PropertyAttributes::WRITABLE)),
            ),
            ObjectGetResult::Accessor { pair, .. } => (
                pair.getter.clone().map_or(JsValue::Undefined, JsValue::Object),
                pair.setter.clone().map_or(JsValue::Undefined, JsValue::Object),
            ),
        };
        let names = ctx.names().cheap_clone();
        let (first_key, second_key) = if self.is_data_property() {
            (&names.value, &names.writable)
        } else {
            (&names.get, &names.set)
        };

        let obj = ctx.create_object();
        obj.create_data_property(ctx, first_key, first)?;
        obj.create_data_property(ctx, second_key, second)?;
        obj.create_data_property(
            ctx,
            &names.enumerable,
            JsValue::Boolean(attributes.contains(PropertyAttributes::ENUMERABLE)),
        )?;
        obj.create_data_property(
            ctx,
            &names.configurable,
            JsValue::Boolean(attributes.contains(PropertyAttributes::CONFIGURABLE)),
        )?;
        Ok(JsValue::Object(obj))
    }
}
