//! # Covenant
//!
//! Design-by-contract enforcement for object methods.
//!
//! Covenant attaches precondition checks (over call arguments), postcondition
//! checks (over return values) and class-wide invariant checks (over object
//! state) to methods, and evaluates them around every call:
//!
//! - **Type validation**: named and structural value-shape descriptors
//! - **Check combinators**: `check`, `assert`, `accepts`/`returns`, `void`
//! - **Contract attachment**: by method name, name list or regex pattern
//! - **Invariant expansion**: one declaration covers every public method
//! - **Calling context**: void, scalar and list calls keep their shape
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use covenant::prelude::*;
//!
//! struct Counter { value: i64 }
//!
//! let class = ClassBuilder::new("Counter", &EnforcementConfig::from_env())
//!     .method(MethodDef::procedure("decrement", |c: &mut Counter, _| {
//!         c.value -= 1;
//!         Ok(())
//!     }))?
//!     .invariant([Term::Check(assert(|c: &Counter, _| Ok(c.value >= 0), "value >= 0"))])?
//!     .contract("decrement", [accepts_void(), returns_void()].concat())?
//!     .build();
//!
//! let mut counter = Object::new(&Arc::new(class), Counter { value: 0 });
//! assert!(counter.call_void("decrement", &[]).is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod checks;
pub mod config;
pub mod contracts;
pub mod errors;
pub mod interceptors;
pub mod meta;
pub mod observability;
pub mod testing;
pub mod types;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::checks::{
        assert_check, identity_check, sequence_check, void_check, Check, CheckFailure,
        SequenceKind,
    };
    pub use crate::config::EnforcementConfig;
    pub use crate::contracts::{
        accepts, accepts_void, assert, assert_default, check, invar, post, pre, returns,
        returns_void, void, ContractBundle, ContractKind, MethodSelector, Term,
    };
    pub use crate::errors::{
        CallError, ContractViolation, CovenantError, SetupError, ViolationKind,
    };
    pub use crate::meta::{
        CallContext, Class, ClassBuilder, MethodDef, MethodInfo, Object, Returned, Role,
        Visibility,
    };
    pub use crate::types::{
        global_registry, TypeDescriptor, TypeRegistry, TypeResolver, TypeSpec, TypeValidator,
    };
    pub use serde_json::{json, Value};
    pub use std::sync::Arc;
}
