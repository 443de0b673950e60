//! Object property model for a prototype-based script runtime
//!
//! Objects describe their properties with shared, immutable structures
//! (shapes) and keep values in a storage vector aligned with the structure.
//! Property definition follows ValidateAndApplyPropertyDescriptor, and
//! get/set walk the prototype chain with an explicit receiver.
//!
//! # Example
//!
//! ```
//! use shapejs::{Context, JsValue};
//!
//! let mut ctx = Context::new();
//! let proto = ctx.create_object();
//! let child = ctx.create_object();
//! child.set_prototype(&mut ctx, Some(proto.clone()));
//!
//! let greeting = ctx.key("greeting");
//! proto.create_data_property(&mut ctx, &greeting, JsValue::from("hello")).unwrap();
//! assert_eq!(child.get(&mut ctx, &greeting).unwrap(), JsValue::from("hello"));
//!
//! // Assignment through the chain creates an own property on the child
//! child.put(&mut ctx, &greeting, JsValue::from("hi")).unwrap();
//! assert!(child.has_own_property(&greeting));
//! assert_eq!(proto.get(&mut ctx, &greeting).unwrap(), JsValue::from("hello"));
//! ```

pub mod config;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod indexed;
pub mod json;
pub mod name_table;
pub mod object;
pub mod storage;
pub mod structure;
pub mod value;

pub use config::ContextConfig;
pub use context::Context;
pub use descriptor::{
    GetterSetter, NativeAccessorData, ObjectGetResult, ObjectPropertyDescriptor,
    PresentAttributes, PropertyAttributes, StructurePropertyDescriptor,
};
pub use error::JsError;
pub use name_table::{InternedName, NameTable};
pub use object::{JsObject, JsObjectRef};
pub use structure::{Structure, StructureRef};
pub use value::CheapClone;
pub use value::JsString;
pub use value::JsValue;
pub use value::PropertyKey;
