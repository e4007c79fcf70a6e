//! Method definitions and calling-context plumbing.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// What the caller expects back from a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallContext {
    /// The result is discarded.
    Void,
    /// Exactly one value.
    Scalar,
    /// A sequence of values.
    List,
}

impl CallContext {
    /// True unless the caller discards the result.
    #[must_use]
    pub const fn expects_value(self) -> bool {
        !matches!(self, Self::Void)
    }
}

/// What a method body produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Returned {
    /// No value.
    Nothing,
    /// A single value.
    One(Value),
    /// Several values.
    Many(Vec<Value>),
}

impl Returned {
    /// Reshapes the result for the caller's context.
    ///
    /// Scalar context always yields exactly one value: the single value, the
    /// last of several, or `null`. List context always yields a sequence.
    /// Void context yields nothing.
    #[must_use]
    pub fn shape(self, context: CallContext) -> Self {
        match context {
            CallContext::Void => Self::Nothing,
            CallContext::Scalar => Self::One(self.into_scalar()),
            CallContext::List => Self::Many(self.into_list()),
        }
    }

    /// The values a postcondition sees.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        match self {
            Self::Nothing => &[],
            Self::One(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        }
    }

    /// Collapses into a single value.
    #[must_use]
    pub fn into_scalar(self) -> Value {
        match self {
            Self::Nothing => Value::Null,
            Self::One(value) => value,
            Self::Many(mut values) => values.pop().unwrap_or(Value::Null),
        }
    }

    /// Expands into a value sequence.
    #[must_use]
    pub fn into_list(self) -> Vec<Value> {
        match self {
            Self::Nothing => Vec::new(),
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

/// Whether a method counts as part of the class's public surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Covered by invariants.
    Public,
    /// Skipped by invariant expansion.
    Private,
}

impl Visibility {
    /// Names starting with an underscore are private.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name.starts_with('_') {
            Self::Private
        } else {
            Self::Public
        }
    }
}

/// The callable part of a method.
pub type MethodBody<T> =
    Arc<dyn Fn(&mut T, &[Value], CallContext) -> Result<Returned, String> + Send + Sync>;

/// A named method with its declaring class.
pub struct MethodDef<T> {
    name: String,
    declaring_class: String,
    visibility: Visibility,
    body: MethodBody<T>,
}

impl<T: 'static> MethodDef<T> {
    /// Creates a method whose body sees the calling context.
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut T, &[Value], CallContext) -> Result<Returned, String> + Send + Sync + 'static,
    {
        let name = name.into();
        Self {
            visibility: Visibility::from_name(&name),
            name,
            declaring_class: String::new(),
            body: Arc::new(body),
        }
    }

    /// Creates a method returning one value.
    pub fn scalar<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut T, &[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self::new(name, move |receiver: &mut T, args: &[Value], _| {
            body(receiver, args).map(Returned::One)
        })
    }

    /// Creates a method returning several values.
    pub fn list<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut T, &[Value]) -> Result<Vec<Value>, String> + Send + Sync + 'static,
    {
        Self::new(name, move |receiver: &mut T, args: &[Value], _| {
            body(receiver, args).map(Returned::Many)
        })
    }

    /// Creates a method returning nothing.
    pub fn procedure<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut T, &[Value]) -> Result<(), String> + Send + Sync + 'static,
    {
        Self::new(name, move |receiver: &mut T, args: &[Value], _| {
            body(receiver, args).map(|()| Returned::Nothing)
        })
    }
}

impl<T> MethodDef<T> {
    /// Overrides the visibility derived from the name.
    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// The method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The class or role that declared the method.
    #[must_use]
    pub fn declaring_class(&self) -> &str {
        &self.declaring_class
    }

    /// The method's visibility.
    #[must_use]
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// True for public methods.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Describes the method for introspection.
    #[must_use]
    pub fn info(&self) -> MethodInfo {
        MethodInfo {
            name: self.name.clone(),
            declaring_class: self.declaring_class.clone(),
            visibility: self.visibility,
        }
    }

    /// Runs the body without any contract.
    pub fn invoke(
        &self,
        receiver: &mut T,
        args: &[Value],
        context: CallContext,
    ) -> Result<Returned, String> {
        (self.body)(receiver, args, context)
    }

    pub(crate) fn declared_by(mut self, class: impl Into<String>) -> Self {
        self.declaring_class = class.into();
        self
    }
}

impl<T> Clone for MethodDef<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            declaring_class: self.declaring_class.clone(),
            visibility: self.visibility,
            body: Arc::clone(&self.body),
        }
    }
}

impl<T> fmt::Debug for MethodDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDef")
            .field("name", &self.name)
            .field("declaring_class", &self.declaring_class)
            .field("visibility", &self.visibility)
            .finish_non_exhaustive()
    }
}

/// Introspection record for one method of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    /// The method name.
    pub name: String,
    /// The class or role that declared it.
    pub declaring_class: String,
    /// Its visibility.
    pub visibility: Visibility,
}
