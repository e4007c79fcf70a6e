//! Contract declaration and attachment.
//!
//! This module provides:
//! - Contract bundles and the flat term sequences they are parsed from
//! - Method selectors (name, list, pattern)
//! - The per-class registry that attaches bundles to methods
//! - Invariant expansion over a class's public methods
//! - Declaration helpers (`accepts`, `returns`, `assert`, ...)

mod bundle;
mod dsl;
mod invariant;
mod registry;
mod selector;

pub use bundle::{ContractBundle, ContractKind, Term};
pub use dsl::{
    accepts, accepts_void, accepts_with, assert, assert_default, check, invar, post, pre, returns,
    returns_void, returns_with, void,
};
pub use registry::{ContractRegistry, ContractSummary};
pub use selector::MethodSelector;
