//! The host object model contracts are attached to.
//!
//! Classes are built once through [`ClassBuilder`], from their own methods,
//! inherited parents and composed roles. A built [`Class`] is an immutable
//! dispatch table shared by every [`Object`] of that class.

mod builder;
mod class;
mod method;
mod object;

pub use builder::ClassBuilder;
pub use class::{Class, Role, META_METHOD};
pub use method::{CallContext, MethodBody, MethodDef, MethodInfo, Returned, Visibility};
pub use object::Object;
