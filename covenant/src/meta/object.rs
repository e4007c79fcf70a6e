//! Object handles: a receiver state paired with its class.

use super::class::Class;
use super::method::{CallContext, Returned};
use crate::errors::CallError;
use serde_json::Value;
use std::sync::Arc;

/// An instance of a class.
pub struct Object<T> {
    class: Arc<Class<T>>,
    state: T,
}

impl<T> Object<T> {
    /// Creates an instance of `class` holding `state`.
    #[must_use]
    pub fn new(class: &Arc<Class<T>>, state: T) -> Self {
        Self {
            class: Arc::clone(class),
            state,
        }
    }

    /// Calls `method` in the given context.
    pub fn call(
        &mut self,
        method: &str,
        args: &[Value],
        context: CallContext,
    ) -> Result<Returned, CallError> {
        self.class.dispatch(&mut self.state, method, args, context)
    }

    /// Calls `method`, discarding its result. Postconditions do not run.
    pub fn call_void(&mut self, method: &str, args: &[Value]) -> Result<(), CallError> {
        self.call(method, args, CallContext::Void).map(|_| ())
    }

    /// Calls `method` for exactly one value.
    pub fn call_scalar(&mut self, method: &str, args: &[Value]) -> Result<Value, CallError> {
        self.call(method, args, CallContext::Scalar)
            .map(Returned::into_scalar)
    }

    /// Calls `method` for a sequence of values.
    pub fn call_list(&mut self, method: &str, args: &[Value]) -> Result<Vec<Value>, CallError> {
        self.call(method, args, CallContext::List)
            .map(Returned::into_list)
    }

    /// The receiver state.
    #[must_use]
    pub const fn state(&self) -> &T {
        &self.state
    }

    /// The object's class.
    #[must_use]
    pub const fn class(&self) -> &Arc<Class<T>> {
        &self.class
    }

    /// Consumes the handle, yielding the state.
    pub fn into_inner(self) -> T {
        self.state
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Object<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Object")
            .field("class", &self.class.name())
            .field("state", &self.state)
            .finish()
    }
}
