//! Built classes, roles and method dispatch.

use super::method::{CallContext, MethodDef, MethodInfo, Returned};
use crate::contracts::{ContractBundle, ContractSummary};
use crate::errors::CallError;
use crate::interceptors::ContractWrapper;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;

/// Name of the introspection accessor every class carries.
pub const META_METHOD: &str = "meta";

/// A named set of methods that can be composed into classes.
pub struct Role<T> {
    name: String,
    methods: Vec<MethodDef<T>>,
}

impl<T> Role<T> {
    /// Creates an empty role.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    /// Adds a method, replacing one of the same name.
    #[must_use]
    pub fn method(mut self, def: MethodDef<T>) -> Self {
        let def = def.declared_by(&self.name);
        self.methods.retain(|m| m.name() != def.name());
        self.methods.push(def);
        self
    }

    /// The role name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The role's methods.
    #[must_use]
    pub fn methods(&self) -> &[MethodDef<T>] {
        &self.methods
    }
}

impl<T> fmt::Debug for Role<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Role")
            .field("name", &self.name)
            .field("methods", &self.methods)
            .finish()
    }
}

/// One slot of a class's dispatch table.
pub(crate) struct MethodEntry<T> {
    pub(crate) def: MethodDef<T>,
    pub(crate) contract: Option<ContractBundle<T>>,
    pub(crate) wrapper: Option<ContractWrapper<T>>,
}

impl<T> MethodEntry<T> {
    pub(crate) fn new(class: &str, def: MethodDef<T>, contract: Option<ContractBundle<T>>) -> Self {
        let wrapper = contract
            .as_ref()
            .map(|bundle| ContractWrapper::new(class, def.name(), bundle));
        Self {
            def,
            contract,
            wrapper,
        }
    }

    fn invoke(
        &self,
        class: &str,
        receiver: &mut T,
        args: &[Value],
        context: CallContext,
    ) -> Result<Returned, CallError> {
        match self.wrapper {
            Some(ref wrapper) => wrapper.invoke(&self.def, receiver, args, context),
            None => self
                .def
                .invoke(receiver, args, context)
                .map(|result| result.shape(context))
                .map_err(|message| CallError::method(class, self.def.name(), message)),
        }
    }
}

/// A finished class: an immutable dispatch table.
///
/// Contracts are fixed when the class is built; calls consult the table and
/// never the enforcement switch.
pub struct Class<T> {
    name: String,
    entries: Vec<MethodEntry<T>>,
    index: HashMap<String, usize>,
    composed: Vec<String>,
    enforced: bool,
}

impl<T> Class<T> {
    pub(crate) fn from_entries(
        name: String,
        entries: Vec<MethodEntry<T>>,
        composed: Vec<String>,
        enforced: bool,
    ) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.def.name().to_string(), i))
            .collect();
        Self {
            name,
            entries,
            index,
            composed,
            enforced,
        }
    }

    /// The class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when the class was built with enforcement on.
    #[must_use]
    pub const fn is_enforced(&self) -> bool {
        self.enforced
    }

    /// Names of the parents and roles this class was composed from.
    #[must_use]
    pub fn composed(&self) -> &[String] {
        &self.composed
    }

    /// Every method with its declaring class, in definition order.
    #[must_use]
    pub fn list_methods(&self) -> Vec<MethodInfo> {
        self.entries.iter().map(|entry| entry.def.info()).collect()
    }

    /// True if the class can dispatch `name`.
    #[must_use]
    pub fn has_method(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// The definition of `name`.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&MethodDef<T>> {
        self.entry(name).map(|entry| &entry.def)
    }

    /// The contract installed on `name`, if any.
    #[must_use]
    pub fn contract_for(&self, name: &str) -> Option<&ContractBundle<T>> {
        self.entry(name).and_then(|entry| entry.contract.as_ref())
    }

    /// Check counts for every contracted method.
    #[must_use]
    pub fn contract_summaries(&self) -> Vec<ContractSummary> {
        self.entries
            .iter()
            .filter_map(|entry| {
                entry.contract.as_ref().map(|bundle| ContractSummary {
                    method: entry.def.name().to_string(),
                    pre: bundle.pre().len(),
                    post: bundle.post().len(),
                    invar: bundle.invar().len(),
                })
            })
            .collect()
    }

    /// A JSON description of the class, as returned by its `meta` accessor.
    ///
    /// The accessor itself is not listed.
    #[must_use]
    pub fn describe(&self) -> Value {
        describe_entries(&self.name, &self.composed, &self.entries)
    }

    /// Calls `method` on `receiver` in the given context.
    pub fn dispatch(
        &self,
        receiver: &mut T,
        method: &str,
        args: &[Value],
        context: CallContext,
    ) -> Result<Returned, CallError> {
        let entry = self
            .entry(method)
            .ok_or_else(|| CallError::no_such_method(&self.name, method))?;
        entry.invoke(&self.name, receiver, args, context)
    }

    fn entry(&self, name: &str) -> Option<&MethodEntry<T>> {
        self.index.get(name).map(|&i| &self.entries[i])
    }
}

pub(crate) fn describe_entries<T>(
    name: &str,
    composed: &[String],
    entries: &[MethodEntry<T>],
) -> Value {
    let methods: Vec<Value> = entries
        .iter()
        .filter(|entry| entry.def.name() != META_METHOD)
        .map(|entry| {
            let counts = entry.contract.as_ref().map(|bundle| {
                json!({
                    "pre": bundle.pre().len(),
                    "post": bundle.post().len(),
                    "invar": bundle.invar().len(),
                })
            });
            json!({
                "name": entry.def.name(),
                "declaring_class": entry.def.declaring_class(),
                "visibility": entry.def.visibility(),
                "contract": counts,
            })
        })
        .collect();

    json!({
        "name": name,
        "composed": composed,
        "methods": methods,
    })
}

impl<T> fmt::Debug for Class<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("methods", &self.index.keys().collect::<Vec<_>>())
            .field("composed", &self.composed)
            .field("enforced", &self.enforced)
            .finish()
    }
}
