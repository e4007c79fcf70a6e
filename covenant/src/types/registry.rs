//! Named type registry and descriptor resolution.

use super::descriptor::TypeDescriptor;
use super::parser::{self, TypeExpr};
use crate::errors::SetupError;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Resolves type names into descriptors.
///
/// This is the interface checks need from a type system; [`TypeRegistry`] is
/// the bundled implementation.
#[cfg_attr(test, mockall::automock)]
pub trait TypeResolver {
    /// Resolves a name (plain or structural) into a descriptor.
    fn resolve(&self, name: &str) -> Result<Arc<TypeDescriptor>, SetupError>;
}

/// A type given either by name or as an already-built descriptor.
#[derive(Debug, Clone)]
pub enum TypeSpec {
    /// Resolved through a [`TypeResolver`].
    Name(String),
    /// Used as-is.
    Descriptor(Arc<TypeDescriptor>),
}

impl TypeSpec {
    /// Resolves the type, going through `resolver` only for names.
    pub fn resolve(&self, resolver: &dyn TypeResolver) -> Result<Arc<TypeDescriptor>, SetupError> {
        match self {
            Self::Name(name) => resolver.resolve(name),
            Self::Descriptor(descriptor) => Ok(Arc::clone(descriptor)),
        }
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Descriptor(descriptor) => f.write_str(descriptor.name()),
        }
    }
}

impl From<&str> for TypeSpec {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for TypeSpec {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<Arc<TypeDescriptor>> for TypeSpec {
    fn from(descriptor: Arc<TypeDescriptor>) -> Self {
        Self::Descriptor(descriptor)
    }
}

impl From<TypeDescriptor> for TypeSpec {
    fn from(descriptor: TypeDescriptor) -> Self {
        Self::Descriptor(Arc::new(descriptor))
    }
}

/// Thread-safe registry of named type descriptors.
///
/// Structural names are built on first use and cached under their canonical
/// spelling.
pub struct TypeRegistry {
    entries: RwLock<HashMap<String, Arc<TypeDescriptor>>>,
}

impl TypeRegistry {
    /// Creates a registry holding the builtin types.
    #[must_use]
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.install_builtins();
        registry
    }

    /// Creates a registry with no types at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a descriptor under its own name, replacing any previous one.
    pub fn register(&self, descriptor: TypeDescriptor) -> Arc<TypeDescriptor> {
        let descriptor = Arc::new(descriptor);
        self.entries
            .write()
            .insert(descriptor.name().to_string(), Arc::clone(&descriptor));
        descriptor
    }

    /// Registers a named refinement of an existing type.
    pub fn subtype<F>(
        &self,
        name: impl Into<String>,
        parent: &str,
        predicate: F,
    ) -> Result<Arc<TypeDescriptor>, SetupError>
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let parent = self.resolve(parent)?;
        Ok(self.register(TypeDescriptor::subtype(name, parent, predicate)))
    }

    /// Fetches a registered descriptor without parsing.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.entries.read().get(name).cloned()
    }

    /// True if a descriptor is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    /// Returns all registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the number of registered descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn install_builtins(&self) {
        let any = self.register(TypeDescriptor::new("Any", |_| true));
        let item = self.register(TypeDescriptor::subtype("Item", any, |_| true));
        self.register(TypeDescriptor::subtype("Undef", Arc::clone(&item), Value::is_null));
        let defined = self.register(TypeDescriptor::subtype("Defined", item, |v| !v.is_null()));
        self.register(TypeDescriptor::subtype("Bool", Arc::clone(&defined), Value::is_boolean));
        let value = self.register(TypeDescriptor::subtype("Value", Arc::clone(&defined), |v| {
            !v.is_array() && !v.is_object()
        }));
        self.register(TypeDescriptor::subtype("Str", Arc::clone(&value), Value::is_string));
        let num = self.register(TypeDescriptor::subtype("Num", value, Value::is_number));
        self.register(TypeDescriptor::subtype("Int", num, |v| v.is_i64() || v.is_u64()));
        let reference = self.register(TypeDescriptor::subtype("Ref", defined, |v| {
            v.is_array() || v.is_object()
        }));
        self.register(TypeDescriptor::subtype("ArrayRef", Arc::clone(&reference), Value::is_array));
        self.register(TypeDescriptor::subtype("HashRef", reference, Value::is_object));
    }

    fn build(&self, expr: &TypeExpr) -> Result<Arc<TypeDescriptor>, SetupError> {
        let canonical = expr.to_string();
        if let Some(existing) = self.get(&canonical) {
            return Ok(existing);
        }

        let descriptor = match expr {
            TypeExpr::Named(name) => {
                return Err(SetupError::unresolvable(
                    name,
                    format!("no type named '{name}' is registered"),
                ));
            }
            TypeExpr::Parameterized { base, param } => {
                let inner = self.build(param)?;
                match base.as_str() {
                    "ArrayRef" => TypeDescriptor::subtype(
                        &canonical,
                        self.resolve("ArrayRef")?,
                        move |v| {
                            v.as_array()
                                .is_some_and(|items| items.iter().all(|item| inner.check(item)))
                        },
                    ),
                    "HashRef" => TypeDescriptor::subtype(
                        &canonical,
                        self.resolve("HashRef")?,
                        move |v| {
                            v.as_object()
                                .is_some_and(|map| map.values().all(|item| inner.check(item)))
                        },
                    ),
                    "Maybe" => TypeDescriptor::subtype(&canonical, self.resolve("Item")?, move |v| {
                        v.is_null() || inner.check(v)
                    }),
                    other => {
                        return Err(SetupError::unresolvable(
                            &canonical,
                            format!("'{other}' is not a parameterizable type"),
                        ));
                    }
                }
            }
            TypeExpr::Union(members) => {
                let members = members
                    .iter()
                    .map(|member| self.build(member))
                    .collect::<Result<Vec<_>, _>>()?;
                TypeDescriptor::new(&canonical, move |v| members.iter().any(|m| m.check(v)))
            }
        };

        tracing::debug!(type_name = %canonical, "Built structural type");
        Ok(self.register(descriptor))
    }
}

impl TypeResolver for TypeRegistry {
    fn resolve(&self, name: &str) -> Result<Arc<TypeDescriptor>, SetupError> {
        if let Some(descriptor) = self.get(name.trim()) {
            return Ok(descriptor);
        }
        let expr = parser::parse(name).map_err(|reason| SetupError::unresolvable(name, reason))?;
        self.build(&expr)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("type_count", &self.len())
            .finish()
    }
}

static GLOBAL_REGISTRY: LazyLock<Arc<TypeRegistry>> =
    LazyLock::new(|| Arc::new(TypeRegistry::new()));

/// Gets the process-wide type registry.
pub fn global_registry() -> Arc<TypeRegistry> {
    Arc::clone(&GLOBAL_REGISTRY)
}
