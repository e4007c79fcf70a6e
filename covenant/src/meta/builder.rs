//! Class builder with fluent API.
//!
//! The builder is the class under construction: methods are defined or
//! composed in, contracts are declared against them, and `build` freezes
//! the result into a dispatch table.

use super::class::{describe_entries, Class, MethodEntry, Role, META_METHOD};
use super::method::{MethodDef, MethodInfo};
use crate::config::EnforcementConfig;
use crate::contracts::{ContractBundle, ContractRegistry, ContractSummary, MethodSelector, Term};
use crate::errors::SetupError;
use std::collections::HashMap;
use tracing::debug;

/// Where a method in the class under construction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Own,
    Role,
    Inherited,
}

struct Pending<T> {
    def: MethodDef<T>,
    origin: Origin,
    inherited: Option<ContractBundle<T>>,
}

/// Builder for creating classes.
pub struct ClassBuilder<T> {
    name: String,
    config: EnforcementConfig,
    methods: Vec<Pending<T>>,
    index: HashMap<String, usize>,
    composed: Vec<String>,
    contracts: ContractRegistry<T>,
}

impl<T: 'static> ClassBuilder<T> {
    /// Starts a class named `name`.
    ///
    /// The enforcement switch is read here, once: declarations made on this
    /// builder are dropped when it is off.
    #[must_use]
    pub fn new(name: impl Into<String>, config: &EnforcementConfig) -> Self {
        let name = name.into();
        Self {
            contracts: ContractRegistry::new(name.clone(), *config),
            name,
            config: *config,
            methods: Vec::new(),
            index: HashMap::new(),
            composed: Vec::new(),
        }
    }

    /// Inherits every method of `parent` along with its installed contracts.
    ///
    /// Methods already defined on this class take precedence.
    #[must_use]
    pub fn extends(mut self, parent: &Class<T>) -> Self {
        self.compose(parent.name());
        for name in parent.composed() {
            self.compose(name);
        }

        for info in parent.list_methods() {
            if info.name == META_METHOD || self.index.contains_key(&info.name) {
                continue;
            }
            if let Some(def) = parent.method(&info.name) {
                self.insert(Pending {
                    def: def.clone(),
                    origin: Origin::Inherited,
                    inherited: parent.contract_for(&info.name).cloned(),
                });
            }
        }
        debug!(class = %self.name, parent = parent.name(), "Inherited from parent class");
        self
    }

    /// Composes a role's methods into the class.
    ///
    /// Two roles providing the same method conflict. A method the class
    /// defines itself wins over a role's.
    pub fn with_role(mut self, role: &Role<T>) -> Result<Self, SetupError> {
        self.compose(role.name());
        for def in role.methods() {
            match self.slot(def.name()).map(|pending| pending.origin) {
                Some(Origin::Own) => continue,
                Some(Origin::Role) => {
                    return Err(SetupError::DuplicateMethod {
                        class: self.name.clone(),
                        method: def.name().to_string(),
                    });
                }
                Some(Origin::Inherited) | None => self.insert(Pending {
                    def: def.clone(),
                    origin: Origin::Role,
                    inherited: None,
                }),
            }
        }
        debug!(class = %self.name, role = role.name(), "Composed role");
        Ok(self)
    }

    /// Defines a method on the class.
    ///
    /// Overriding an inherited or role method drops whatever contract came
    /// with it.
    pub fn method(mut self, def: MethodDef<T>) -> Result<Self, SetupError> {
        if def.name() == META_METHOD {
            return Err(SetupError::ReservedMethod {
                class: self.name.clone(),
                method: def.name().to_string(),
            });
        }
        if self.slot(def.name()).is_some_and(|pending| pending.origin == Origin::Own) {
            return Err(SetupError::DuplicateMethod {
                class: self.name.clone(),
                method: def.name().to_string(),
            });
        }

        let def = def.declared_by(&self.name);
        debug!(class = %self.name, method = def.name(), "Defined method");
        self.insert(Pending {
            def,
            origin: Origin::Own,
            inherited: None,
        });
        Ok(self)
    }

    /// Attaches a contract given as a flat clause sequence.
    pub fn contract<I>(
        mut self,
        selector: impl Into<MethodSelector>,
        terms: I,
    ) -> Result<Self, SetupError>
    where
        I: IntoIterator<Item = Term<T>>,
    {
        let selector = selector.into();
        let known: Vec<&str> = self.methods.iter().map(|p| p.def.name()).collect();
        self.contracts.attach_terms(&selector, terms, known)?;
        Ok(self)
    }

    /// Attaches an already assembled bundle.
    pub fn contract_bundle(
        mut self,
        selector: impl Into<MethodSelector>,
        bundle: &ContractBundle<T>,
    ) -> Result<Self, SetupError> {
        let selector = selector.into();
        let known: Vec<&str> = self.methods.iter().map(|p| p.def.name()).collect();
        self.contracts.attach(&selector, bundle, known)?;
        Ok(self)
    }

    /// Attaches invariant checks to every public method.
    ///
    /// Covers the methods the class declares itself, plus those of any role
    /// or parent named with a `Term::Class` entry. Only methods present when
    /// this is called are covered.
    pub fn invariant<I>(mut self, terms: I) -> Result<Self, SetupError>
    where
        I: IntoIterator<Item = Term<T>>,
    {
        let methods = self.list_methods();
        self.contracts
            .attach_invariant(&methods, &self.composed, terms)?;
        Ok(self)
    }

    /// The methods defined so far.
    #[must_use]
    pub fn list_methods(&self) -> Vec<MethodInfo> {
        self.methods.iter().map(|p| p.def.info()).collect()
    }

    /// Check counts of the contracts declared on this builder so far.
    #[must_use]
    pub fn summaries(&self) -> Vec<ContractSummary> {
        self.contracts.summaries()
    }

    /// Freezes the class.
    ///
    /// Each contracted method gets exactly one wrapper holding its inherited
    /// checks followed by its own. The `meta` accessor is installed last.
    #[must_use]
    pub fn build(self) -> Class<T> {
        let enforced = self.config.is_enabled();
        let mut table = self.contracts.into_table();

        let mut entries: Vec<MethodEntry<T>> = self
            .methods
            .into_iter()
            .map(|pending| {
                let own = table.remove(pending.def.name());
                let contract = match (pending.inherited, own) {
                    (Some(mut inherited), Some(own)) => {
                        inherited.extend(&own);
                        Some(inherited)
                    }
                    (inherited, own) => inherited.or(own),
                };
                MethodEntry::new(&self.name, pending.def, contract)
            })
            .collect();

        let description = describe_entries(&self.name, &self.composed, &entries);
        let meta = MethodDef::scalar(META_METHOD, move |_: &mut T, _| Ok(description.clone()))
            .declared_by(&self.name);
        entries.push(MethodEntry::new(&self.name, meta, None));

        let contracted = entries.iter().filter(|e| e.wrapper.is_some()).count();
        debug!(
            class = %self.name,
            methods = entries.len(),
            contracted,
            enforced,
            "Built class"
        );
        Class::from_entries(self.name, entries, self.composed, enforced)
    }

    fn compose(&mut self, name: &str) {
        if !self.composed.iter().any(|c| c == name) {
            self.composed.push(name.to_string());
        }
    }

    fn slot(&self, name: &str) -> Option<&Pending<T>> {
        self.index.get(name).map(|&i| &self.methods[i])
    }

    fn insert(&mut self, pending: Pending<T>) {
        match self.index.get(pending.def.name()) {
            Some(&i) => self.methods[i] = pending,
            None => {
                self.index
                    .insert(pending.def.name().to_string(), self.methods.len());
                self.methods.push(pending);
            }
        }
    }
}

impl<T> std::fmt::Debug for ClassBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassBuilder")
            .field("name", &self.name)
            .field("methods", &self.methods.iter().map(|p| p.def.name()).collect::<Vec<_>>())
            .field("composed", &self.composed)
            .field("contracts", &self.contracts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::Check;
    use crate::meta::{CallContext, Visibility};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    #[derive(Debug, Default)]
    struct Cell {
        value: i64,
    }

    fn getter(name: &str) -> MethodDef<Cell> {
        MethodDef::scalar(name, |c: &mut Cell, _| Ok(json!(c.value)))
    }

    fn passing(label: &str) -> Check<Cell> {
        Check::new(label, |_: &Cell, _: &[Value]| Ok(()))
    }

    fn enabled() -> EnforcementConfig {
        EnforcementConfig::enabled()
    }

    #[test]
    fn test_builder_duplicate_method() {
        let err = ClassBuilder::new("Cell", &enabled())
            .method(getter("get"))
            .unwrap()
            .method(getter("get"))
            .unwrap_err();
        assert_eq!(
            err,
            SetupError::DuplicateMethod {
                class: "Cell".to_string(),
                method: "get".to_string()
            }
        );
    }

    #[test]
    fn test_builder_reserved_meta() {
        let err = ClassBuilder::new("Cell", &enabled())
            .method(getter("meta"))
            .unwrap_err();
        assert!(matches!(err, SetupError::ReservedMethod { .. }));
    }

    #[test]
    fn test_builder_role_conflict() {
        let left = Role::new("Left").method(getter("get"));
        let right = Role::new("Right").method(getter("get"));
        let err = ClassBuilder::new("Cell", &enabled())
            .with_role(&left)
            .unwrap()
            .with_role(&right)
            .unwrap_err();
        assert!(matches!(err, SetupError::DuplicateMethod { .. }));
    }

    #[test]
    fn test_own_method_beats_role() {
        let role = Role::new("Getter").method(getter("get"));
        let builder = ClassBuilder::new("Cell", &enabled())
            .method(getter("get"))
            .unwrap()
            .with_role(&role)
            .unwrap();
        assert_eq!(
            builder.list_methods(),
            vec![MethodInfo {
                name: "get".to_string(),
                declaring_class: "Cell".to_string(),
                visibility: Visibility::Public,
            }]
        );
    }

    #[test]
    fn test_contract_unknown_method() {
        let err = ClassBuilder::new("Cell", &enabled())
            .method(getter("get"))
            .unwrap()
            .contract("set", [Term::kind("pre"), Term::Check(passing("a"))])
            .unwrap_err();
        assert!(matches!(err, SetupError::UnknownMethod { .. }));
    }

    #[test]
    fn test_build_installs_meta_and_wrappers() {
        let class = ClassBuilder::new("Cell", &enabled())
            .method(getter("get"))
            .unwrap()
            .method(getter("peek"))
            .unwrap()
            .contract("get", [Term::kind("post"), Term::Check(passing("a"))])
            .unwrap()
            .build();

        assert!(class.is_enforced());
        assert!(class.has_method(META_METHOD));
        assert_eq!(class.contract_for("get").map(ContractBundle::len), Some(1));
        assert!(class.contract_for("peek").is_none());
        assert!(class.contract_for(META_METHOD).is_none());

        let meta = class
            .dispatch(&mut Cell::default(), META_METHOD, &[], CallContext::Scalar)
            .unwrap()
            .into_scalar();
        assert_eq!(meta, class.describe());
        assert_eq!(meta["name"], json!("Cell"));
        assert_eq!(meta["methods"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_inherited_contracts_precede_child_contracts() {
        let parent = ClassBuilder::new("Base", &enabled())
            .method(getter("get"))
            .unwrap()
            .contract("get", [Term::kind("pre"), Term::Check(passing("parent"))])
            .unwrap()
            .build();

        let child = ClassBuilder::new("Derived", &enabled())
            .extends(&parent)
            .contract("get", [Term::kind("pre"), Term::Check(passing("child"))])
            .unwrap()
            .build();

        let labels: Vec<&str> = child
            .contract_for("get")
            .unwrap()
            .pre()
            .iter()
            .map(Check::label)
            .collect();
        assert_eq!(labels, vec!["parent", "child"]);
        assert_eq!(child.composed(), &["Base".to_string()]);
        assert_eq!(child.method("get").unwrap().declaring_class(), "Base");
    }

    #[test]
    fn test_override_drops_inherited_contract() {
        let parent = ClassBuilder::new("Base", &enabled())
            .method(getter("get"))
            .unwrap()
            .contract("get", [Term::kind("pre"), Term::Check(passing("parent"))])
            .unwrap()
            .build();

        let child = ClassBuilder::new("Derived", &enabled())
            .extends(&parent)
            .method(getter("get"))
            .unwrap()
            .build();
        assert!(child.contract_for("get").is_none());
        assert_eq!(child.method("get").unwrap().declaring_class(), "Derived");
    }

    #[test]
    fn test_disabled_builder_summaries_empty() {
        let builder = ClassBuilder::new("Cell", &EnforcementConfig::disabled())
            .method(getter("get"))
            .unwrap()
            .contract("get", [Term::kind("pre"), Term::Check(passing("a"))])
            .unwrap();
        assert!(builder.summaries().is_empty());
        let class = builder.build();
        assert!(!class.is_enforced());
        assert!(class.contract_for("get").is_none());
    }
}
