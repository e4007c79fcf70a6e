//! Type descriptors and validation.
//!
//! This module provides:
//! - Named and structural value-shape descriptors
//! - A validator exposing `validate(value) -> Ok | Err(reason)`
//! - A registry resolving names like `Int`, `ArrayRef[Str]` or `Int|Undef`

mod descriptor;
mod parser;
mod registry;

pub use descriptor::{MessageFn, TypeDescriptor, TypePredicate, TypeValidator};
pub use parser::{parse as parse_type_name, TypeExpr};
pub use registry::{global_registry, TypeRegistry, TypeResolver, TypeSpec};

#[cfg(test)]
pub(crate) use registry::MockTypeResolver;
