//! The check function type shared by every contract stage.

use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Why a check did not pass.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckFailure {
    /// The check ran and rejected the values.
    #[error("{0}")]
    Violated(String),
    /// The check itself failed before reaching a verdict: it returned an
    /// error or panicked.
    #[error("{0}")]
    Errored(String),
}

impl CheckFailure {
    /// The human-readable reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        match self {
            Self::Violated(reason) | Self::Errored(reason) => reason,
        }
    }

    /// True when the check's own logic failed.
    #[must_use]
    pub const fn is_errored(&self) -> bool {
        matches!(self, Self::Errored(_))
    }

    /// Prefixes the reason, keeping the failure kind.
    #[must_use]
    pub fn prefixed(self, prefix: &str) -> Self {
        match self {
            Self::Violated(reason) => Self::Violated(format!("{prefix}: {reason}")),
            Self::Errored(reason) => Self::Errored(format!("{prefix}: {reason}")),
        }
    }
}

/// Signature of a check: receiver plus arguments or return values.
pub type CheckFn<T> = dyn Fn(&T, &[Value]) -> Result<(), CheckFailure> + Send + Sync;

/// A reusable unit of validation logic.
///
/// Checks receive the receiver object and a sequence of values: the call
/// arguments for `pre`, the captured result for `post`, nothing for `invar`.
pub struct Check<T> {
    label: Arc<str>,
    func: Arc<CheckFn<T>>,
}

impl<T: 'static> Check<T> {
    /// Creates a check from a raw function.
    pub fn new<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(&T, &[Value]) -> Result<(), CheckFailure> + Send + Sync + 'static,
    {
        Self {
            label: Arc::from(label.into()),
            func: Arc::new(func),
        }
    }
}

impl<T> Check<T> {
    /// A short description used in logs.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Runs the check.
    ///
    /// A panic inside the check is reported as [`CheckFailure::Errored`]
    /// carrying the panic message.
    pub fn run(&self, receiver: &T, values: &[Value]) -> Result<(), CheckFailure> {
        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| (self.func)(receiver, values)))
            .unwrap_or_else(|payload| {
                tracing::warn!(check = %self.label, "Check panicked");
                Err(CheckFailure::Errored(panic_message(&*payload)))
            })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "check panicked".to_string())
}

impl<T> Clone for Check<T> {
    fn clone(&self) -> Self {
        Self {
            label: Arc::clone(&self.label),
            func: Arc::clone(&self.func),
        }
    }
}

impl<T> fmt::Debug for Check<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check").field("label", &self.label).finish()
    }
}
