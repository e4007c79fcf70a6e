//! Declaration helpers producing flat clause terms.
//!
//! Each helper returns the terms for one clause, so a declaration reads as
//! `[accepts(["Int"])?, returns_void()].concat()`.

use super::bundle::{ContractKind, Term};
use crate::checks::{
    assert_check, identity_check, sequence_check, void_check, Check, SequenceKind,
    DEFAULT_ASSERT_MESSAGE,
};
use crate::errors::SetupError;
use crate::types::{global_registry, TypeResolver, TypeSpec};
use serde_json::Value;

fn clause<T>(kind: ContractKind, check: Check<T>) -> Vec<Term<T>> {
    vec![Term::kind(kind.as_str()), Term::Check(check)]
}

/// A `pre` clause.
pub fn pre<T>(check: Check<T>) -> Vec<Term<T>> {
    clause(ContractKind::Pre, check)
}

/// A `post` clause.
pub fn post<T>(check: Check<T>) -> Vec<Term<T>> {
    clause(ContractKind::Post, check)
}

/// An `invar` clause.
pub fn invar<T>(check: Check<T>) -> Vec<Term<T>> {
    clause(ContractKind::Invar, check)
}

/// A `pre` clause validating arguments positionally, using the global registry.
pub fn accepts<T, I, S>(types: I) -> Result<Vec<Term<T>>, SetupError>
where
    T: 'static,
    I: IntoIterator<Item = S>,
    S: Into<TypeSpec>,
{
    accepts_with(types, &*global_registry())
}

/// A `pre` clause validating arguments positionally.
pub fn accepts_with<T, I, S>(types: I, resolver: &dyn TypeResolver) -> Result<Vec<Term<T>>, SetupError>
where
    T: 'static,
    I: IntoIterator<Item = S>,
    S: Into<TypeSpec>,
{
    Ok(pre(sequence_check(SequenceKind::Accepts, types, resolver)?))
}

/// A `pre` clause requiring no arguments.
pub fn accepts_void<T: 'static>() -> Vec<Term<T>> {
    pre(void_check())
}

/// A `post` clause validating return values positionally, using the global registry.
pub fn returns<T, I, S>(types: I) -> Result<Vec<Term<T>>, SetupError>
where
    T: 'static,
    I: IntoIterator<Item = S>,
    S: Into<TypeSpec>,
{
    returns_with(types, &*global_registry())
}

/// A `post` clause validating return values positionally.
pub fn returns_with<T, I, S>(types: I, resolver: &dyn TypeResolver) -> Result<Vec<Term<T>>, SetupError>
where
    T: 'static,
    I: IntoIterator<Item = S>,
    S: Into<TypeSpec>,
{
    Ok(post(sequence_check(SequenceKind::Returns, types, resolver)?))
}

/// A `post` clause requiring no return values.
pub fn returns_void<T: 'static>() -> Vec<Term<T>> {
    post(void_check())
}

/// A raw predicate check; see [`identity_check`].
pub fn check<T, F>(predicate: F) -> Check<T>
where
    T: 'static,
    F: Fn(&T, &[Value]) -> Result<bool, String> + Send + Sync + 'static,
{
    identity_check(predicate)
}

/// An assertion with a failure message; see [`assert_check`].
pub fn assert<T, F>(predicate: F, message: impl Into<String>) -> Check<T>
where
    T: 'static,
    F: Fn(&T, &[Value]) -> Result<bool, String> + Send + Sync + 'static,
{
    assert_check(predicate, message)
}

/// An assertion failing with `"assertion failed"`.
pub fn assert_default<T, F>(predicate: F) -> Check<T>
where
    T: 'static,
    F: Fn(&T, &[Value]) -> Result<bool, String> + Send + Sync + 'static,
{
    assert_check(predicate, DEFAULT_ASSERT_MESSAGE)
}

/// The zero-values check; see [`void_check`].
pub fn void<T: 'static>() -> Check<T> {
    void_check()
}
