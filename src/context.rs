//! Runtime context: owns the name table, the shared root structures and the
//! built-in prototype objects every new object links to.

use std::rc::Rc;

use crate::config::ContextConfig;
use crate::descriptor::{PropertyAttributes, StructurePropertyDescriptor};
use crate::error::JsError;
use crate::name_table::{InternedName, NameTable};
use crate::object::{
    ExoticObject, HostFn, HostFunction, JsFunction, JsObject, JsObjectRef, NativeFn,
    NativeFunction,
};
use crate::structure::{Structure, StructureRef};
use crate::value::{CheapClone, JsString, JsSymbol, JsValue, PropertyKey, parse_array_index};

/// Keys the object model itself reads, interned once per context
#[derive(Debug)]
pub struct StaticNames {
    pub length: PropertyKey,
    pub prototype: PropertyKey,
    pub constructor: PropertyKey,
    pub name: PropertyKey,
    pub value: PropertyKey,
    pub writable: PropertyKey,
    pub enumerable: PropertyKey,
    pub configurable: PropertyKey,
    pub get: PropertyKey,
    pub set: PropertyKey,
}

impl StaticNames {
    fn new(table: &mut NameTable) -> Self {
        let mut key = |s: &str| PropertyKey::String(table.intern(s));
        Self {
            length: key("length"),
            prototype: key("prototype"),
            constructor: key("constructor"),
            name: key("name"),
            value: key("value"),
            writable: key("writable"),
            enumerable: key("enumerable"),
            configurable: key("configurable"),
            get: key("get"),
            set: key("set"),
        }
    }
}

/// Owner of every object created through it.
///
/// Single-threaded: objects and names are `Rc`-based and cannot leave the
/// thread the context lives on.
pub struct Context {
    names: NameTable,
    static_names: Rc<StaticNames>,
    config: ContextConfig,
    next_symbol_id: u64,
    root_structure: StructureRef,
    function_prototype_structure: StructureRef,
    /// `length` then `name`, both non-writable, non-enumerable, configurable
    function_structure: StructureRef,
    object_prototype: JsObjectRef,
    strict: bool,
    prototype_index_epoch: u64,
}

impl Context {
    pub fn new() -> Self {
        Self::with_config(ContextConfig::default())
    }

    pub fn with_config(config: ContextConfig) -> Self {
        let mut names = if config.preintern_common_names {
            NameTable::with_common_names()
        } else {
            NameTable::new()
        };
        let static_names = Rc::new(StaticNames::new(&mut names));
        let root_structure = Structure::root(config.structure_index_threshold);
        let function_prototype_structure = root_structure.add_property(
            static_names.constructor.cheap_clone(),
            StructurePropertyDescriptor::data(
                PropertyAttributes::WRITABLE | PropertyAttributes::CONFIGURABLE,
            ),
        );
        let readonly = StructurePropertyDescriptor::data(PropertyAttributes::CONFIGURABLE);
        let function_structure = root_structure
            .add_property(static_names.length.cheap_clone(), readonly)
            .add_property(static_names.name.cheap_clone(), readonly);
        let object_prototype = JsObjectRef::new(JsObject::new(
            root_structure.cheap_clone(),
            None,
            0,
            false,
            ExoticObject::Ordinary,
        ));

        let mut ctx = Self {
            names,
            static_names,
            strict: config.strict_mode,
            config,
            next_symbol_id: 1,
            root_structure,
            function_prototype_structure,
            function_structure,
            object_prototype,
            prototype_index_epoch: 0,
        };
        let object_prototype = ctx.object_prototype.cheap_clone();
        object_prototype.mark_as_prototype(&mut ctx);
        log::debug!(
            "context created (index threshold {}, strict {})",
            ctx.config.structure_index_threshold,
            ctx.strict
        );
        ctx
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn names(&self) -> &Rc<StaticNames> {
        &self.static_names
    }

    pub fn name_table(&self) -> &NameTable {
        &self.names
    }

    pub fn intern(&mut self, s: &str) -> InternedName {
        self.names.intern(s)
    }

    pub fn intern_narrow(&mut self, bytes: &[u8]) -> InternedName {
        self.names.intern_narrow(bytes)
    }

    pub fn intern_wide(&mut self, units: &[u16]) -> InternedName {
        self.names.intern_wide(units)
    }

    /// Canonical key for `s`: array-index text becomes `Index`
    pub fn key(&mut self, s: &str) -> PropertyKey {
        match parse_array_index(s) {
            Some(idx) => PropertyKey::Index(idx),
            None => PropertyKey::String(self.names.intern(s)),
        }
    }

    /// Key for a numeric index; 2^32 - 1 is not an array index and is interned as a name
    pub fn index_key(&mut self, idx: u32) -> PropertyKey {
        if idx == u32::MAX {
            PropertyKey::String(self.names.intern(&idx.to_string()))
        } else {
            PropertyKey::Index(idx)
        }
    }

    /// ToPropertyKey for primitive values
    pub fn key_from_value(&mut self, value: &JsValue) -> PropertyKey {
        match value {
            JsValue::Symbol(symbol) => PropertyKey::Symbol(symbol.clone()),
            JsValue::String(s) => self.key(s.as_str()),
            other => {
                let text = other.to_js_string();
                self.key(text.as_str())
            }
        }
    }

    pub fn new_symbol(&mut self, description: Option<&str>) -> JsSymbol {
        let id = self.next_symbol_id;
        self.next_symbol_id += 1;
        JsSymbol::new(id, description.map(str::to_string))
    }

    pub fn in_strict_mode(&self) -> bool {
        self.strict
    }

    pub fn set_strict_mode(&mut self, strict: bool) {
        self.strict = strict;
    }

    /// Bumped whenever an object used as a prototype gains index properties
    pub fn prototype_index_epoch(&self) -> u64 {
        self.prototype_index_epoch
    }

    pub(crate) fn bump_prototype_index_epoch(&mut self) {
        self.prototype_index_epoch += 1;
    }

    pub fn object_prototype(&self) -> &JsObjectRef {
        &self.object_prototype
    }

    pub fn root_structure(&self) -> &StructureRef {
        &self.root_structure
    }

    /// Plain object linked to `Object.prototype`
    pub fn create_object(&mut self) -> JsObjectRef {
        self.create_object_with(0, true)
    }

    /// Object with `capacity` reserved slots. `init_plain_object` selects the
    /// plain-object layout with `Object.prototype` as prototype; otherwise the
    /// prototype is null.
    pub fn create_object_with(&mut self, capacity: usize, init_plain_object: bool) -> JsObjectRef {
        let prototype = init_plain_object.then(|| self.object_prototype.cheap_clone());
        JsObjectRef::new(JsObject::new(
            self.root_structure.cheap_clone(),
            prototype,
            capacity,
            init_plain_object,
            ExoticObject::Ordinary,
        ))
    }

    /// Prototype object for a built-in: empty and with a null prototype
    pub fn create_builtin_object_prototype(&mut self) -> JsObjectRef {
        let proto = self.create_object_with(0, false);
        proto.mark_as_prototype(self);
        proto
    }

    /// `F.prototype` for a constructor: a plain object whose only property is
    /// a writable, non-enumerable, configurable `constructor`.
    pub fn create_function_prototype_object(&mut self, function: &JsObjectRef) -> JsObjectRef {
        let mut object = JsObject::new(
            self.function_prototype_structure.cheap_clone(),
            Some(self.object_prototype.cheap_clone()),
            1,
            true,
            ExoticObject::Ordinary,
        );
        object.push_initial_value(JsValue::Object(function.cheap_clone()));
        JsObjectRef::new(object)
    }

    pub fn create_native_function(&mut self, name: &str, func: NativeFn, arity: usize) -> JsObjectRef {
        let function = JsFunction::Native(NativeFunction {
            name: JsString::from(name),
            func,
            arity,
        });
        self.create_function_object(function)
    }

    pub fn create_host_function(&mut self, name: &str, func: HostFn, arity: usize) -> JsObjectRef {
        let function = JsFunction::Host(HostFunction {
            name: JsString::from(name),
            func,
            arity,
        });
        self.create_function_object(function)
    }

    fn create_function_object(&mut self, function: JsFunction) -> JsObjectRef {
        let name = JsValue::from(function.name());
        let arity = JsValue::Number(function.arity() as f64);
        let mut object = JsObject::new(
            self.function_structure.cheap_clone(),
            Some(self.object_prototype.cheap_clone()),
            2,
            false,
            ExoticObject::Function(function),
        );
        object.push_initial_value(arity);
        object.push_initial_value(name);
        JsObjectRef::new(object)
    }

    /// Call a function object. Non-callable targets raise a TypeError.
    pub fn call(
        &mut self,
        func: &JsObjectRef,
        this: JsValue,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        let function = match &func.borrow().exotic {
            ExoticObject::Function(f) => f.clone(),
            ExoticObject::Ordinary => {
                return Err(JsError::type_error("object is not a function"));
            }
        };
        match function {
            JsFunction::Native(f) => (f.func)(self, this, args),
            JsFunction::Host(f) => (f.func)(self, this, args),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
