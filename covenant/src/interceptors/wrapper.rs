//! The per-call contract wrapper.
//!
//! Every contracted method gets exactly one wrapper, built when its class is
//! built. A call walks PRE, BODY, POST (only when the caller wants a value),
//! INVARIANT and RETURN; any check failure aborts with a violation. The
//! body's side effects are never rolled back.

use super::chain::CheckChain;
use crate::checks::CheckFailure;
use crate::contracts::ContractBundle;
use crate::errors::{CallError, ContractViolation, ViolationKind};
use crate::meta::{CallContext, MethodDef, Returned};
use serde_json::Value;
use tracing::{debug, trace};

/// Runs a method body between its contract stages.
pub struct ContractWrapper<T> {
    class: String,
    method: String,
    pre: CheckChain<T>,
    post: CheckChain<T>,
    invar: CheckChain<T>,
}

impl<T> ContractWrapper<T> {
    /// Builds the wrapper for one method from its finished bundle.
    #[must_use]
    pub fn new(class: impl Into<String>, method: impl Into<String>, bundle: &ContractBundle<T>) -> Self {
        Self {
            class: class.into(),
            method: method.into(),
            pre: CheckChain::new(ViolationKind::Pre, bundle.pre().to_vec()),
            post: CheckChain::new(ViolationKind::Post, bundle.post().to_vec()),
            invar: CheckChain::new(ViolationKind::Invariant, bundle.invar().to_vec()),
        }
    }

    /// The preconditions.
    #[must_use]
    pub const fn pre(&self) -> &CheckChain<T> {
        &self.pre
    }

    /// The postconditions.
    #[must_use]
    pub const fn post(&self) -> &CheckChain<T> {
        &self.post
    }

    /// The invariants.
    #[must_use]
    pub const fn invar(&self) -> &CheckChain<T> {
        &self.invar
    }

    /// Calls `body` under the contract.
    ///
    /// The calling context is fixed by the caller and decides both how the
    /// result is captured and whether postconditions run.
    pub fn invoke(
        &self,
        body: &MethodDef<T>,
        receiver: &mut T,
        args: &[Value],
        context: CallContext,
    ) -> Result<Returned, CallError> {
        trace!(class = %self.class, method = %self.method, ?context, "Checking preconditions");
        self.pre
            .run(receiver, args)
            .map_err(|failure| self.abort(ViolationKind::Pre, failure))?;

        let result = body
            .invoke(receiver, args, context)
            .map_err(|message| CallError::method(&self.class, &self.method, message))?
            .shape(context);

        if context.expects_value() {
            trace!(class = %self.class, method = %self.method, "Checking postconditions");
            self.post
                .run(receiver, result.values())
                .map_err(|failure| self.abort(ViolationKind::Post, failure))?;
        }

        trace!(class = %self.class, method = %self.method, "Checking invariants");
        self.invar
            .run(receiver, &[])
            .map_err(|failure| self.abort(ViolationKind::Invariant, failure))?;

        Ok(result)
    }

    fn abort(&self, kind: ViolationKind, failure: CheckFailure) -> CallError {
        debug!(
            class = %self.class,
            method = %self.method,
            stage = ?kind,
            reason = failure.reason(),
            check_errored = failure.is_errored(),
            "Contract violation"
        );
        ContractViolation::new(kind, &self.class, &self.method, failure).into()
    }
}

impl<T> std::fmt::Debug for ContractWrapper<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractWrapper")
            .field("class", &self.class)
            .field("method", &self.method)
            .field("pre", &self.pre.len())
            .field("post", &self.post.len())
            .field("invar", &self.invar.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{assert_check, void_check, Check};
    use crate::testing::{recording_check, CallLog};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Debug, Default)]
    struct Tally {
        value: i64,
        calls: usize,
    }

    fn add() -> MethodDef<Tally> {
        MethodDef::scalar("add", |t: &mut Tally, args| {
            t.calls += 1;
            t.value += args.first().and_then(Value::as_i64).unwrap_or(0);
            Ok(json!(t.value))
        })
    }

    fn wrapper(bundle: &ContractBundle<Tally>) -> ContractWrapper<Tally> {
        ContractWrapper::new("Tally", "add", bundle)
    }

    fn positive_arg() -> Check<Tally> {
        assert_check(
            |_: &Tally, args: &[Value]| Ok(args.first().and_then(Value::as_i64).is_some_and(|n| n > 0)),
            "argument must be positive",
        )
    }

    fn small_result() -> Check<Tally> {
        assert_check(
            |_: &Tally, values: &[Value]| Ok(values.first().and_then(Value::as_i64).is_some_and(|n| n < 10)),
            "result must be below 10",
        )
    }

    fn non_negative() -> Check<Tally> {
        assert_check(|t: &Tally, _: &[Value]| Ok(t.value >= 0), "value >= 0")
    }

    #[test]
    fn test_pre_failure_skips_body() {
        let wrapper = wrapper(&ContractBundle::new().with_pre(positive_arg()));
        let mut tally = Tally::default();

        let err = wrapper
            .invoke(&add(), &mut tally, &[json!(-1)], CallContext::Scalar)
            .unwrap_err();
        assert!(err.is_violation(ViolationKind::Pre));
        assert_eq!(tally.calls, 0);
    }

    #[test]
    fn test_post_failure_after_side_effects() {
        let wrapper = wrapper(&ContractBundle::new().with_post(small_result()));
        let mut tally = Tally::default();

        let err = wrapper
            .invoke(&add(), &mut tally, &[json!(12)], CallContext::Scalar)
            .unwrap_err();
        assert!(err.is_violation(ViolationKind::Post));
        assert_eq!(tally.value, 12);
        assert_eq!(tally.calls, 1);
    }

    #[test]
    fn test_void_context_skips_post_but_runs_invariant() {
        let bundle = ContractBundle::new()
            .with_post(small_result())
            .with_invar(non_negative());
        let wrapper = wrapper(&bundle);
        let mut tally = Tally::default();

        let result = wrapper
            .invoke(&add(), &mut tally, &[json!(12)], CallContext::Void)
            .unwrap();
        assert_eq!(result, Returned::Nothing);
        assert_eq!(tally.value, 12);

        let err = wrapper
            .invoke(&add(), &mut tally, &[json!(-20)], CallContext::Void)
            .unwrap_err();
        assert!(err.is_violation(ViolationKind::Invariant));
        assert_eq!(tally.value, -8);
    }

    #[test]
    fn test_list_context_post_sees_all_values() {
        let bundle = ContractBundle::new().with_post(void_check());
        let wrapper = ContractWrapper::new("Tally", "nothing", &bundle);
        let quiet: MethodDef<Tally> = MethodDef::procedure("nothing", |_: &mut Tally, _| Ok(()));
        let mut tally = Tally::default();

        let result = wrapper
            .invoke(&quiet, &mut tally, &[], CallContext::List)
            .unwrap();
        assert_eq!(result, Returned::Many(vec![]));

        // Scalar context always captures one value, so `void` rejects it.
        let err = wrapper
            .invoke(&quiet, &mut tally, &[], CallContext::Scalar)
            .unwrap_err();
        assert_eq!(
            err.violation().map(ContractViolation::reason),
            Some("expected no values, got 1")
        );
    }

    #[test]
    fn test_body_error_propagates_without_checks() {
        let bundle = ContractBundle::new().with_invar(assert_check(
            |_: &Tally, _: &[Value]| Err("invariant should not run".to_string()),
            "unused",
        ));
        let wrapper = ContractWrapper::new("Tally", "explode", &bundle);
        let explode: MethodDef<Tally> =
            MethodDef::procedure("explode", |_: &mut Tally, _| Err("kaboom".to_string()));

        let err = wrapper
            .invoke(&explode, &mut Tally::default(), &[], CallContext::Void)
            .unwrap_err();
        assert_eq!(err, CallError::method("Tally", "explode", "kaboom"));
    }

    #[test]
    fn test_returns_shaped_result() {
        let wrapper = wrapper(&ContractBundle::new().with_pre(positive_arg()));
        let mut tally = Tally::default();
        let result = wrapper
            .invoke(&add(), &mut tally, &[json!(3)], CallContext::List)
            .unwrap();
        assert_eq!(result, Returned::Many(vec![json!(3)]));
        assert_eq!(wrapper.pre().len(), 1);
        assert!(wrapper.post().is_empty());
        assert!(wrapper.invar().is_empty());
    }

    #[test]
    fn test_post_runs_before_invariant() {
        let log = CallLog::new();
        let bundle = ContractBundle::new()
            .with_invar(recording_check(&log, "inv"))
            .with_post(recording_check(&log, "post"));
        let wrapper = wrapper(&bundle);
        let mut tally = Tally::default();

        wrapper
            .invoke(&add(), &mut tally, &[json!(1)], CallContext::Scalar)
            .unwrap();
        assert_eq!(log.entries(), vec!["post", "inv"]);
    }

    #[test]
    fn test_post_failure_skips_invariant() {
        let log = CallLog::new();
        let bundle = ContractBundle::new()
            .with_post(small_result())
            .with_invar(recording_check(&log, "inv"));
        let wrapper = wrapper(&bundle);
        let mut tally = Tally::default();

        let err = wrapper
            .invoke(&add(), &mut tally, &[json!(50)], CallContext::Scalar)
            .unwrap_err();
        assert!(err.is_violation(ViolationKind::Post));
        assert!(log.is_empty());
    }

    #[test]
    fn test_panicking_pre_check_is_errored_violation() {
        let bundle = ContractBundle::new().with_pre(Check::new(
            "explodes",
            |_: &Tally, _: &[Value]| panic!("lookup table missing"),
        ));
        let wrapper = wrapper(&bundle);
        let mut tally = Tally::default();

        let err = wrapper
            .invoke(&add(), &mut tally, &[json!(1)], CallContext::Scalar)
            .unwrap_err();
        let violation = err.violation().unwrap();
        assert_eq!(violation.kind, ViolationKind::Pre);
        assert_eq!(
            violation.failure,
            CheckFailure::Errored("lookup table missing".to_string())
        );
        assert_eq!(tally.calls, 0);
    }
}
