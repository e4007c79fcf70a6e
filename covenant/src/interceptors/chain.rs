//! Check chain for ordered, short-circuiting evaluation.

use crate::checks::{Check, CheckFailure};
use crate::errors::ViolationKind;
use serde_json::Value;

/// The checks of one contract stage, run in declaration order.
pub struct CheckChain<T> {
    stage: ViolationKind,
    checks: Vec<Check<T>>,
}

impl<T> CheckChain<T> {
    /// Creates a chain for `stage`.
    #[must_use]
    pub fn new(stage: ViolationKind, checks: Vec<Check<T>>) -> Self {
        Self { stage, checks }
    }

    /// The stage this chain guards.
    #[must_use]
    pub const fn stage(&self) -> ViolationKind {
        self.stage
    }

    /// Runs every check, stopping at the first failure.
    pub fn run(&self, receiver: &T, values: &[Value]) -> Result<(), CheckFailure> {
        for check in &self.checks {
            tracing::trace!(stage = ?self.stage, check = check.label(), "Running check");
            check.run(receiver, values)?;
        }
        Ok(())
    }

    /// Returns the number of checks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Returns true if the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl<T> std::fmt::Debug for CheckChain<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckChain")
            .field("stage", &self.stage)
            .field("checks", &self.checks)
            .finish()
    }
}
