//! Per-class contract registry: the attacher.
//!
//! A registry is the mutable contract table of a class under construction.
//! Declarations accumulate into it; the class builder turns it into the
//! immutable dispatch table once, when the class is built.

use super::bundle::{ContractBundle, Term};
use super::invariant;
use super::selector::MethodSelector;
use crate::config::EnforcementConfig;
use crate::errors::SetupError;
use crate::meta::MethodInfo;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Check counts for one contracted method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSummary {
    /// Method name.
    pub method: String,
    /// Number of preconditions.
    pub pre: usize,
    /// Number of postconditions.
    pub post: usize,
    /// Number of invariants.
    pub invar: usize,
}

/// Accumulates contract declarations for one class.
pub struct ContractRegistry<T> {
    class: String,
    config: EnforcementConfig,
    entries: HashMap<String, ContractBundle<T>>,
    order: Vec<String>,
}

impl<T> ContractRegistry<T> {
    /// Creates an empty registry for `class`.
    #[must_use]
    pub fn new(class: impl Into<String>, config: EnforcementConfig) -> Self {
        Self {
            class: class.into(),
            config,
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// True when declarations will be installed.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    /// Parses a flat clause sequence and attaches it.
    ///
    /// Returns immediately, validating nothing, when enforcement is off.
    pub fn attach_terms<'a, I, K>(
        &mut self,
        selector: &MethodSelector,
        terms: I,
        known: K,
    ) -> Result<Vec<String>, SetupError>
    where
        I: IntoIterator<Item = Term<T>>,
        K: IntoIterator<Item = &'a str>,
    {
        if !self.is_enabled() {
            debug!(class = %self.class, selector = %selector, "Contracts disabled, skipping declaration");
            return Ok(Vec::new());
        }
        let bundle = ContractBundle::from_terms(terms)?;
        self.attach(selector, &bundle, known)
    }

    /// Attaches a bundle to every method the selector resolves to.
    ///
    /// Checks are appended after any already attached to the same method.
    pub fn attach<'a, K>(
        &mut self,
        selector: &MethodSelector,
        bundle: &ContractBundle<T>,
        known: K,
    ) -> Result<Vec<String>, SetupError>
    where
        K: IntoIterator<Item = &'a str>,
    {
        if !self.is_enabled() {
            debug!(class = %self.class, selector = %selector, "Contracts disabled, skipping declaration");
            return Ok(Vec::new());
        }

        let methods = selector.resolve(&self.class, known)?;
        if methods.is_empty() {
            warn!(class = %self.class, selector = %selector, "Contract selector matched no methods");
            return Ok(methods);
        }

        for method in &methods {
            if !self.entries.contains_key(method) {
                self.order.push(method.clone());
            }
            self.entries.entry(method.clone()).or_default().extend(bundle);
            debug!(
                class = %self.class,
                method = %method,
                pre = bundle.pre().len(),
                post = bundle.post().len(),
                invar = bundle.invar().len(),
                "Attached contract"
            );
        }
        Ok(methods)
    }

    /// Attaches invariant checks to every public method of the class.
    ///
    /// `methods` is the class's current method set and `composed` the names
    /// of the roles and classes it was built from.
    pub fn attach_invariant<I>(
        &mut self,
        methods: &[MethodInfo],
        composed: &[String],
        terms: I,
    ) -> Result<Vec<String>, SetupError>
    where
        I: IntoIterator<Item = Term<T>>,
    {
        if !self.is_enabled() {
            debug!(class = %self.class, "Contracts disabled, skipping invariant");
            return Ok(Vec::new());
        }

        let plan = invariant::expand(&self.class, methods, composed, terms)?;
        if plan.bundle.is_empty() {
            return Ok(Vec::new());
        }
        let selector = MethodSelector::Names(plan.methods);
        let known: Vec<&str> = methods.iter().map(|m| m.name.as_str()).collect();
        self.attach(&selector, &plan.bundle, known)
    }

    /// The checks attached so far to `method`.
    #[must_use]
    pub fn bundle_for(&self, method: &str) -> Option<&ContractBundle<T>> {
        self.entries.get(method)
    }

    /// Check counts per method, in first-attachment order.
    #[must_use]
    pub fn summaries(&self) -> Vec<ContractSummary> {
        self.order
            .iter()
            .filter_map(|method| {
                self.entries.get(method).map(|bundle| ContractSummary {
                    method: method.clone(),
                    pre: bundle.pre().len(),
                    post: bundle.post().len(),
                    invar: bundle.invar().len(),
                })
            })
            .collect()
    }

    /// Returns the number of contracted methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no method is contracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the registry, yielding the per-method bundles.
    pub fn into_table(self) -> HashMap<String, ContractBundle<T>> {
        self.entries
    }
}

impl<T> std::fmt::Debug for ContractRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractRegistry")
            .field("class", &self.class)
            .field("enabled", &self.config.enabled)
            .field("contracted_methods", &self.order)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::Check;
    use crate::meta::Visibility;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    const KNOWN: [&str; 3] = ["deposit", "withdraw", "balance"];

    fn labelled(label: &str) -> Check<()> {
        Check::new(label, |_: &(), _: &[Value]| Ok(()))
    }

    fn info(name: &str, declaring: &str) -> MethodInfo {
        MethodInfo {
            name: name.to_string(),
            declaring_class: declaring.to_string(),
            visibility: Visibility::from_name(name),
        }
    }

    #[test]
    fn test_attach_accumulates_in_order() {
        let mut registry = ContractRegistry::new("Account", EnforcementConfig::enabled());
        let selector = MethodSelector::from("deposit");
        registry
            .attach(&selector, &ContractBundle::new().with_pre(labelled("a")), KNOWN)
            .unwrap();
        registry
            .attach(&selector, &ContractBundle::new().with_pre(labelled("b")), KNOWN)
            .unwrap();

        let bundle = registry.bundle_for("deposit").unwrap();
        let labels: Vec<&str> = bundle.pre().iter().map(Check::label).collect();
        assert_eq!(labels, vec!["a", "b"]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_attach_terms_validates() {
        let mut registry: ContractRegistry<()> =
            ContractRegistry::new("Account", EnforcementConfig::enabled());
        let err = registry
            .attach_terms(
                &MethodSelector::from("deposit"),
                [Term::kind("pre"), Term::Value(json!("not a check"))],
                KNOWN,
            )
            .unwrap_err();
        assert!(matches!(err, SetupError::NotExecutable { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_disabled_registry_installs_and_validates_nothing() {
        let mut registry: ContractRegistry<()> =
            ContractRegistry::new("Account", EnforcementConfig::disabled());
        let installed = registry
            .attach_terms(
                &MethodSelector::from("no_such_method"),
                [Term::kind("bogus")],
                KNOWN,
            )
            .unwrap();
        assert!(installed.is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_attach_unknown_method() {
        let mut registry = ContractRegistry::new("Account", EnforcementConfig::enabled());
        let err = registry
            .attach(
                &MethodSelector::from("close"),
                &ContractBundle::new().with_pre(labelled("a")),
                KNOWN,
            )
            .unwrap_err();
        assert!(matches!(err, SetupError::UnknownMethod { .. }));
    }

    #[test]
    fn test_summaries() {
        let mut registry = ContractRegistry::new("Account", EnforcementConfig::enabled());
        registry
            .attach(
                &MethodSelector::pattern("^(deposit|withdraw)$").unwrap(),
                &ContractBundle::new()
                    .with_pre(labelled("a"))
                    .with_post(labelled("b")),
                KNOWN,
            )
            .unwrap();

        let summaries = registry.summaries();
        assert_eq!(
            summaries,
            vec![
                ContractSummary {
                    method: "deposit".to_string(),
                    pre: 1,
                    post: 1,
                    invar: 0
                },
                ContractSummary {
                    method: "withdraw".to_string(),
                    pre: 1,
                    post: 1,
                    invar: 0
                },
            ]
        );
    }

    #[test]
    fn test_attach_invariant_covers_public_methods() {
        let methods = vec![
            info("deposit", "Account"),
            info("_audit", "Account"),
            info("describe", "Base"),
            info("log", "Logging"),
        ];
        let composed = vec!["Base".to_string(), "Logging".to_string()];
        let mut registry = ContractRegistry::new("Account", EnforcementConfig::enabled());

        let covered = registry
            .attach_invariant(
                &methods,
                &composed,
                [Term::Check(labelled("inv")), Term::class("Logging")],
            )
            .unwrap();
        assert_eq!(covered, vec!["deposit", "log"]);
        assert_eq!(registry.bundle_for("log").unwrap().invar().len(), 1);
        assert!(registry.bundle_for("describe").is_none());
        assert!(registry.bundle_for("_audit").is_none());
    }
}
