//! Combinators producing reusable checks.

use super::check::{Check, CheckFailure};
use crate::errors::SetupError;
use crate::types::{TypeDescriptor, TypeResolver, TypeSpec};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Message used by [`assert_check`] when none is given.
pub const DEFAULT_ASSERT_MESSAGE: &str = "assertion failed";

/// Message used by [`identity_check`] when the predicate answers `false`.
pub const GENERIC_CHECK_MESSAGE: &str = "check failed";

/// Which side of a call a sequence check validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceKind {
    /// Call arguments.
    Accepts,
    /// Return values.
    Returns,
}

impl SequenceKind {
    /// The prefix used in failure reasons.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accepts => "accepts",
            Self::Returns => "returns",
        }
    }
}

impl fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wraps a predicate; `false` fails with [`GENERIC_CHECK_MESSAGE`].
///
/// An `Err` from the predicate is forwarded verbatim as
/// [`CheckFailure::Errored`].
pub fn identity_check<T, F>(predicate: F) -> Check<T>
where
    T: 'static,
    F: Fn(&T, &[Value]) -> Result<bool, String> + Send + Sync + 'static,
{
    predicate_check("check", predicate, GENERIC_CHECK_MESSAGE.to_string())
}

/// Wraps a predicate; `false` fails with `message`.
///
/// An `Err` from the predicate is forwarded verbatim and never replaced by
/// `message`.
pub fn assert_check<T, F>(predicate: F, message: impl Into<String>) -> Check<T>
where
    T: 'static,
    F: Fn(&T, &[Value]) -> Result<bool, String> + Send + Sync + 'static,
{
    let message = message.into();
    predicate_check(format!("assert({message})"), predicate, message)
}

fn predicate_check<T, F>(label: impl Into<String>, predicate: F, message: String) -> Check<T>
where
    T: 'static,
    F: Fn(&T, &[Value]) -> Result<bool, String> + Send + Sync + 'static,
{
    Check::new(label, move |receiver: &T, values: &[Value]| {
        match predicate(receiver, values) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CheckFailure::Violated(message.clone())),
            Err(reason) => Err(CheckFailure::Errored(reason)),
        }
    })
}

/// Builds a positional type check over a value sequence.
///
/// Names are resolved now, once each; an unknown name is a setup error.
/// At call time the check fails if fewer values than types are supplied,
/// then validates left to right and stops at the first failure. Extra
/// trailing values are ignored.
pub fn sequence_check<T, I, S>(
    kind: SequenceKind,
    specs: I,
    resolver: &dyn TypeResolver,
) -> Result<Check<T>, SetupError>
where
    T: 'static,
    I: IntoIterator<Item = S>,
    S: Into<TypeSpec>,
{
    let mut cache: HashMap<String, Arc<TypeDescriptor>> = HashMap::new();
    let mut descriptors = Vec::new();

    for spec in specs {
        let descriptor = match spec.into() {
            TypeSpec::Name(name) => {
                if let Some(hit) = cache.get(&name) {
                    Arc::clone(hit)
                } else {
                    let resolved = resolver.resolve(&name)?;
                    cache.insert(name, Arc::clone(&resolved));
                    resolved
                }
            }
            TypeSpec::Descriptor(descriptor) => descriptor,
        };
        descriptors.push(descriptor);
    }

    let names: Vec<&str> = descriptors.iter().map(|d| d.name()).collect();
    let label = format!("{kind} [{}]", names.join(", "));

    Ok(Check::new(label, move |_: &T, values: &[Value]| {
        if values.len() < descriptors.len() {
            return Err(CheckFailure::Violated(format!(
                "expected at least {} value(s), got {}",
                descriptors.len(),
                values.len()
            ))
            .prefixed(kind.as_str()));
        }
        for (descriptor, value) in descriptors.iter().zip(values) {
            descriptor
                .validate(value)
                .map_err(|reason| CheckFailure::Violated(reason).prefixed(kind.as_str()))?;
        }
        Ok(())
    }))
}

/// A check passing only when no values are supplied.
pub fn void_check<T: 'static>() -> Check<T> {
    Check::new("void", |_: &T, values: &[Value]| {
        if values.is_empty() {
            Ok(())
        } else {
            Err(CheckFailure::Violated(format!(
                "expected no values, got {}",
                values.len()
            )))
        }
    })
}
