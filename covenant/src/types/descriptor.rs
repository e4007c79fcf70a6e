//! Type descriptors and the validator that wraps them.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Predicate deciding whether a value has the described shape.
pub type TypePredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Builds a custom failure message for a rejected value.
pub type MessageFn = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// A resolved description of an acceptable value shape.
///
/// A descriptor accepts a value when its parent (if any) accepts it and its
/// own predicate holds.
#[derive(Clone)]
pub struct TypeDescriptor {
    name: String,
    parent: Option<Arc<TypeDescriptor>>,
    predicate: TypePredicate,
    message: Option<MessageFn>,
}

impl TypeDescriptor {
    /// Creates a root descriptor.
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            parent: None,
            predicate: Arc::new(predicate),
            message: None,
        }
    }

    /// Creates a descriptor refining `parent`.
    pub fn subtype<F>(name: impl Into<String>, parent: Arc<Self>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            parent: Some(parent),
            predicate: Arc::new(predicate),
            message: None,
        }
    }

    /// Replaces the default failure message.
    #[must_use]
    pub fn with_message<F>(mut self, message: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        self.message = Some(Arc::new(message));
        self
    }

    /// The descriptor's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The descriptor this one refines.
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<Self>> {
        self.parent.as_ref()
    }

    /// True when `name` is this descriptor or one of its ancestors.
    #[must_use]
    pub fn is_a(&self, name: &str) -> bool {
        self.name == name || self.parent.as_ref().is_some_and(|p| p.is_a(name))
    }

    /// True when the value has the described shape.
    #[must_use]
    pub fn check(&self, value: &Value) -> bool {
        if let Some(ref parent) = self.parent {
            if !parent.check(value) {
                return false;
            }
        }
        (self.predicate)(value)
    }

    /// Validates a value, returning a printable reason on failure.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        if self.check(value) {
            return Ok(());
        }
        Err(self.message.as_ref().map_or_else(
            || {
                format!(
                    "Validation failed for '{}' with value {}",
                    self.name,
                    describe_value(value)
                )
            },
            |message| message(value),
        ))
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name.clone()))
            .field("custom_message", &self.message.is_some())
            .finish()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Validates values against a single descriptor.
#[derive(Debug, Clone)]
pub struct TypeValidator {
    descriptor: Arc<TypeDescriptor>,
}

impl TypeValidator {
    /// Wraps a resolved descriptor.
    #[must_use]
    pub const fn new(descriptor: Arc<TypeDescriptor>) -> Self {
        Self { descriptor }
    }

    /// The wrapped descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// Validates a value.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        self.descriptor.validate(value)
    }
}

/// Renders a value for inclusion in a failure message.
pub(crate) fn describe_value(value: &Value) -> String {
    match value {
        Value::Null => "undef".to_string(),
        other => other.to_string(),
    }
}
