//! Error types for covenant.
//!
//! Errors fall into two families: setup-time errors raised while a class and
//! its contracts are being declared, and call-time errors surfaced to the
//! caller of a contracted method.

use crate::checks::CheckFailure;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// The main error type for covenant operations.
#[derive(Debug, Error)]
pub enum CovenantError {
    /// A contract or class declaration was rejected.
    #[error(transparent)]
    Setup(#[from] SetupError),

    /// A call to a method failed.
    #[error(transparent)]
    Call(#[from] CallError),
}

/// Errors raised while declaring classes and attaching contracts.
///
/// These are always fatal to the class definition being built.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SetupError {
    /// A contract clause named something other than `pre`, `post` or `invar`.
    #[error("Unknown contract kind '{kind}' (expected one of: pre, post, invar)")]
    UnknownKind {
        /// The rejected kind.
        kind: String,
    },

    /// The flat clause sequence was not a list of kind/check pairs.
    #[error("Malformed contract arguments: {reason}")]
    MalformedArguments {
        /// What was wrong with the sequence.
        reason: String,
    },

    /// A clause value was not a check.
    #[error("Contract value for '{kind}' is not executable: {found}")]
    NotExecutable {
        /// The clause kind the value was given for.
        kind: String,
        /// A description of the value found instead.
        found: String,
    },

    /// A type descriptor name could not be resolved.
    #[error("Could not resolve type '{name}': {reason}")]
    UnresolvableType {
        /// The name that failed to resolve.
        name: String,
        /// Why resolution failed.
        reason: String,
    },

    /// A method selector named a method the class does not have.
    #[error("The method '{method}' was not found in class '{class}'")]
    UnknownMethod {
        /// The class being declared.
        class: String,
        /// The missing method.
        method: String,
    },

    /// An invariant named a contributing class or role that was never composed.
    #[error("Class '{class}' does not compose '{name}'")]
    UnknownClass {
        /// The class being declared.
        class: String,
        /// The unknown contributor.
        name: String,
    },

    /// A method selector pattern is not a valid regex.
    #[error("Invalid method pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern source.
        pattern: String,
        /// The regex compiler's message.
        reason: String,
    },

    /// The same method was defined twice by one class or by two roles.
    #[error("Method '{method}' is already defined in class '{class}'")]
    DuplicateMethod {
        /// The class being declared.
        class: String,
        /// The duplicated method.
        method: String,
    },

    /// A method name is reserved by the object model.
    #[error("Method name '{method}' is reserved in class '{class}'")]
    ReservedMethod {
        /// The class being declared.
        class: String,
        /// The reserved name.
        method: String,
    },
}

impl SetupError {
    /// Creates a malformed arguments error.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedArguments {
            reason: reason.into(),
        }
    }

    /// Creates an unresolvable type error.
    #[must_use]
    pub fn unresolvable(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnresolvableType {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// The contract stage at which a violation was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A `pre` check failed; the method body never ran.
    Pre,
    /// A `post` check failed after the body ran.
    Post,
    /// An `invar` check failed after the body ran.
    Invariant,
}

impl ViolationKind {
    /// Returns the stable error code for this kind of violation.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Pre => codes::PRECONDITION,
            Self::Post => codes::POSTCONDITION,
            Self::Invariant => codes::INVARIANT,
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pre => write!(f, "Precondition"),
            Self::Post => write!(f, "Postcondition"),
            Self::Invariant => write!(f, "Invariant"),
        }
    }
}

/// A failed contract check, tagged with the method it guarded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind} violated in {class}::{method}: {failure}")]
pub struct ContractViolation {
    /// Which stage failed.
    pub kind: ViolationKind,
    /// The class whose method was called.
    pub class: String,
    /// The method that was called.
    pub method: String,
    /// The underlying check failure.
    pub failure: CheckFailure,
}

impl ContractViolation {
    /// Creates a new contract violation.
    #[must_use]
    pub fn new(
        kind: ViolationKind,
        class: impl Into<String>,
        method: impl Into<String>,
        failure: CheckFailure,
    ) -> Self {
        Self {
            kind,
            class: class.into(),
            method: method.into(),
            failure,
        }
    }

    /// The failure reason reported by the check.
    #[must_use]
    pub fn reason(&self) -> &str {
        self.failure.reason()
    }

    /// Builds structured diagnostics for logging or API responses.
    #[must_use]
    pub fn error_info(&self) -> ContractErrorInfo {
        let hint = match self.kind {
            ViolationKind::Pre => "Check the arguments passed to the method.",
            ViolationKind::Post => "The method returned a value its contract does not allow.",
            ViolationKind::Invariant => {
                "The method left the object in a state its class invariant forbids."
            }
        };

        ContractErrorInfo::new(self.kind.code(), self.to_string())
            .with_fix_hint(hint)
            .with_context_entry("class", &self.class)
            .with_context_entry("method", &self.method)
            .with_context_entry("reason", self.reason())
            .with_context_entry(
                "check_errored",
                if self.failure.is_errored() { "true" } else { "false" },
            )
    }
}

/// Errors surfaced to the caller of a method.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CallError {
    /// A contract check failed.
    #[error(transparent)]
    Violation(#[from] ContractViolation),

    /// The class has no method with this name.
    #[error("Can't locate method '{method}' via class '{class}'")]
    NoSuchMethod {
        /// The receiver's class.
        class: String,
        /// The requested method.
        method: String,
    },

    /// The method body itself failed.
    #[error("Method {class}::{method} failed: {message}")]
    Method {
        /// The receiver's class.
        class: String,
        /// The method that failed.
        method: String,
        /// The body's failure message.
        message: String,
    },
}

impl CallError {
    /// Creates a no-such-method error.
    #[must_use]
    pub fn no_such_method(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self::NoSuchMethod {
            class: class.into(),
            method: method.into(),
        }
    }

    /// Creates a method body failure.
    #[must_use]
    pub fn method(
        class: impl Into<String>,
        method: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Method {
            class: class.into(),
            method: method.into(),
            message: message.into(),
        }
    }

    /// Returns the contract violation, if this error is one.
    #[must_use]
    pub const fn violation(&self) -> Option<&ContractViolation> {
        match self {
            Self::Violation(v) => Some(v),
            _ => None,
        }
    }

    /// True when this error is a violation of the given kind.
    #[must_use]
    pub fn is_violation(&self, kind: ViolationKind) -> bool {
        self.violation().is_some_and(|v| v.kind == kind)
    }
}

/// Metadata about a contract violation for better diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ContractErrorInfo {
    /// Error code (e.g., "CONTRACT-PRE").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ContractErrorInfo {
    /// Creates a new contract error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("code".to_string(), serde_json::Value::String(self.code.clone()));
        map.insert("summary".to_string(), serde_json::Value::String(self.summary.clone()));

        if let Some(ref hint) = self.fix_hint {
            map.insert("fix_hint".to_string(), serde_json::Value::String(hint.clone()));
        }
        if !self.context.is_empty() {
            let context_map: serde_json::Map<String, serde_json::Value> = self
                .context
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect();
            map.insert("context".to_string(), serde_json::Value::Object(context_map));
        }

        map
    }
}

/// Stable error codes for contract violations.
pub mod codes {
    /// Precondition violation.
    pub const PRECONDITION: &str = "CONTRACT-PRE";
    /// Postcondition violation.
    pub const POSTCONDITION: &str = "CONTRACT-POST";
    /// Invariant violation.
    pub const INVARIANT: &str = "CONTRACT-INVARIANT";
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn violation(kind: ViolationKind) -> ContractViolation {
        ContractViolation::new(
            kind,
            "Counter",
            "decrement",
            CheckFailure::Violated("value >= 0".to_string()),
        )
    }

    #[test]
    fn test_violation_message_names_method() {
        let err = violation(ViolationKind::Invariant);
        assert_eq!(
            err.to_string(),
            "Invariant violated in Counter::decrement: value >= 0"
        );
        assert_eq!(err.reason(), "value >= 0");
    }

    #[test]
    fn test_violation_error_info() {
        let info = violation(ViolationKind::Pre).error_info();
        assert_eq!(info.code, codes::PRECONDITION);
        assert_eq!(info.context.get("method"), Some(&"decrement".to_string()));
        assert_eq!(info.context.get("check_errored"), Some(&"false".to_string()));
        assert!(info.fix_hint.is_some());

        let dict = info.to_dict();
        assert_eq!(dict.get("code").unwrap(), "CONTRACT-PRE");
    }

    #[test]
    fn test_call_error_violation_accessors() {
        let err = CallError::from(violation(ViolationKind::Post));
        assert!(err.is_violation(ViolationKind::Post));
        assert!(!err.is_violation(ViolationKind::Pre));
        assert_eq!(err.violation().map(|v| v.method.as_str()), Some("decrement"));

        let other = CallError::no_such_method("Counter", "reset");
        assert!(other.violation().is_none());
        assert_eq!(
            other.to_string(),
            "Can't locate method 'reset' via class 'Counter'"
        );
    }

    #[test]
    fn test_setup_error_display() {
        let err = SetupError::UnknownKind {
            kind: "during".to_string(),
        };
        assert!(err.to_string().contains("'during'"));

        let err = SetupError::unresolvable("Widget", "no type named 'Widget'");
        assert_eq!(
            err.to_string(),
            "Could not resolve type 'Widget': no type named 'Widget'"
        );
    }

    #[test]
    fn test_covenant_error_from() {
        let err: CovenantError = SetupError::malformed("odd").into();
        assert!(matches!(err, CovenantError::Setup(_)));

        let err: CovenantError = CallError::method("A", "b", "boom").into();
        assert_eq!(err.to_string(), "Method A::b failed: boom");
    }

    #[test]
    fn test_error_info_serialization() {
        let info = violation(ViolationKind::Invariant).error_info();
        let json = serde_json::to_string(&info).unwrap();
        let back: ContractErrorInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(info, back);
    }
}
