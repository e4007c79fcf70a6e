//! Test assertions for call results.

use crate::errors::{CallError, ContractViolation, ViolationKind};
use std::fmt::Debug;

/// Asserts that the call failed with a violation at `kind`, returning it.
pub fn assert_violation<V: Debug>(
    result: &Result<V, CallError>,
    kind: ViolationKind,
) -> &ContractViolation {
    match result {
        Err(CallError::Violation(violation)) => {
            assert_eq!(
                violation.kind, kind,
                "Expected {kind} violation, got {}: {violation}",
                violation.kind
            );
            violation
        }
        other => panic!("Expected {kind} violation, got {other:?}"),
    }
}

/// Asserts a precondition violation.
pub fn assert_pre_violation<V: Debug>(result: &Result<V, CallError>) -> &ContractViolation {
    assert_violation(result, ViolationKind::Pre)
}

/// Asserts a postcondition violation.
pub fn assert_post_violation<V: Debug>(result: &Result<V, CallError>) -> &ContractViolation {
    assert_violation(result, ViolationKind::Post)
}

/// Asserts an invariant violation.
pub fn assert_invariant_violation<V: Debug>(result: &Result<V, CallError>) -> &ContractViolation {
    assert_violation(result, ViolationKind::Invariant)
}

/// Asserts that the call did not fail with a contract violation.
///
/// Other failures, such as a body error, pass.
pub fn assert_no_violation<V: Debug>(result: &Result<V, CallError>) {
    if let Err(CallError::Violation(violation)) = result {
        panic!("Expected no violation, got: {violation}");
    }
}
