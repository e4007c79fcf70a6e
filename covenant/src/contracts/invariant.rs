//! Invariant expansion: one declaration, every public method.

use super::bundle::{ContractBundle, ContractKind, Term};
use crate::errors::SetupError;
use crate::meta::{MethodInfo, Visibility, META_METHOD};

/// The methods an invariant covers and the bundle attached to each.
pub(crate) struct InvariantPlan<T> {
    pub(crate) methods: Vec<String>,
    pub(crate) bundle: ContractBundle<T>,
}

impl<T> std::fmt::Debug for InvariantPlan<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvariantPlan")
            .field("methods", &self.methods)
            .field("bundle", &self.bundle)
            .finish()
    }
}

/// Splits invariant terms and resolves the methods they cover.
///
/// Checks become `invar` entries. `Class` terms name roles or classes whose
/// methods are covered alongside the class's own. Only public methods count,
/// and the `meta` accessor is always skipped.
pub(crate) fn expand<T, I>(
    class: &str,
    methods: &[MethodInfo],
    composed: &[String],
    terms: I,
) -> Result<InvariantPlan<T>, SetupError>
where
    I: IntoIterator<Item = Term<T>>,
{
    let mut bundle = ContractBundle::new();
    let mut contributors = vec![class.to_string()];

    for term in terms {
        match term {
            Term::Check(check) => bundle.push(ContractKind::Invar, check),
            Term::Class(name) => {
                if !composed.contains(&name) && name != class {
                    return Err(SetupError::UnknownClass {
                        class: class.to_string(),
                        name,
                    });
                }
                contributors.push(name);
            }
            other => {
                return Err(SetupError::malformed(format!(
                    "invariant expects checks or class names, found {other:?}"
                )));
            }
        }
    }

    let methods = methods
        .iter()
        .filter(|m| m.name != META_METHOD)
        .filter(|m| m.visibility == Visibility::Public)
        .filter(|m| contributors.contains(&m.declaring_class))
        .map(|m| m.name.clone())
        .collect();

    Ok(InvariantPlan { methods, bundle })
}
