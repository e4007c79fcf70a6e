//! Contract bundles and the flat clause terms they are parsed from.

use crate::checks::Check;
use crate::errors::SetupError;
use serde_json::Value;
use std::fmt;

/// The three stages a check can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractKind {
    /// Before the body, over the arguments.
    Pre,
    /// After the body, over the result.
    Post,
    /// After the body, over the receiver only.
    Invar,
}

impl ContractKind {
    /// Parses a clause keyword.
    pub fn parse(kind: &str) -> Result<Self, SetupError> {
        match kind {
            "pre" => Ok(Self::Pre),
            "post" => Ok(Self::Post),
            "invar" => Ok(Self::Invar),
            other => Err(SetupError::UnknownKind {
                kind: other.to_string(),
            }),
        }
    }

    /// The clause keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pre => "pre",
            Self::Post => "post",
            Self::Invar => "invar",
        }
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One element of a flat contract declaration.
///
/// Declarations are written as alternating keys and checks, for example
/// `[Kind("pre"), Check(a), Kind("post"), Check(b)]`. Invariant declarations
/// additionally accept `Class` terms naming contributing roles or classes.
pub enum Term<T> {
    /// A clause keyword: `pre`, `post` or `invar`.
    Kind(String),
    /// An executable check.
    Check(Check<T>),
    /// A plain value; never valid as a check.
    Value(Value),
    /// The name of a contributing class or role.
    Class(String),
}

impl<T> Term<T> {
    /// Creates a keyword term.
    #[must_use]
    pub fn kind(kind: impl Into<String>) -> Self {
        Self::Kind(kind.into())
    }

    /// Creates a contributor term.
    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        Self::Class(name.into())
    }

    fn describe(&self) -> String {
        match self {
            Self::Kind(kind) => format!("keyword '{kind}'"),
            Self::Check(check) => format!("check {}", check.label()),
            Self::Value(value) => format!("value {value}"),
            Self::Class(name) => format!("class name '{name}'"),
        }
    }
}

impl<T> Clone for Term<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Kind(kind) => Self::Kind(kind.clone()),
            Self::Check(check) => Self::Check(check.clone()),
            Self::Value(value) => Self::Value(value.clone()),
            Self::Class(name) => Self::Class(name.clone()),
        }
    }
}

impl<T> fmt::Debug for Term<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl<T> From<Check<T>> for Term<T> {
    fn from(check: Check<T>) -> Self {
        Self::Check(check)
    }
}

impl<T> From<Value> for Term<T> {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Ordered `pre`, `post` and `invar` checks for one method.
pub struct ContractBundle<T> {
    pre: Vec<Check<T>>,
    post: Vec<Check<T>>,
    invar: Vec<Check<T>>,
}

impl<T> ContractBundle<T> {
    /// Creates an empty bundle.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pre: Vec::new(),
            post: Vec::new(),
            invar: Vec::new(),
        }
    }

    /// Parses a flat sequence of keyword/check pairs.
    pub fn from_terms<I>(terms: I) -> Result<Self, SetupError>
    where
        I: IntoIterator<Item = Term<T>>,
    {
        let terms: Vec<Term<T>> = terms.into_iter().collect();
        if terms.len() % 2 != 0 {
            return Err(SetupError::malformed(format!(
                "expected keyword/check pairs, got {} term(s)",
                terms.len()
            )));
        }

        let mut bundle = Self::new();
        let mut iter = terms.into_iter();
        while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
            let kind = match key {
                Term::Kind(kind) => ContractKind::parse(&kind)?,
                other => {
                    return Err(SetupError::malformed(format!(
                        "expected a contract keyword, found {}",
                        other.describe()
                    )));
                }
            };
            match value {
                Term::Check(check) => bundle.push(kind, check),
                other => {
                    return Err(SetupError::NotExecutable {
                        kind: kind.to_string(),
                        found: other.describe(),
                    });
                }
            }
        }
        Ok(bundle)
    }

    /// Appends a check to one stage.
    pub fn push(&mut self, kind: ContractKind, check: Check<T>) {
        match kind {
            ContractKind::Pre => self.pre.push(check),
            ContractKind::Post => self.post.push(check),
            ContractKind::Invar => self.invar.push(check),
        }
    }

    /// Adds a precondition.
    #[must_use]
    pub fn with_pre(mut self, check: Check<T>) -> Self {
        self.pre.push(check);
        self
    }

    /// Adds a postcondition.
    #[must_use]
    pub fn with_post(mut self, check: Check<T>) -> Self {
        self.post.push(check);
        self
    }

    /// Adds an invariant.
    #[must_use]
    pub fn with_invar(mut self, check: Check<T>) -> Self {
        self.invar.push(check);
        self
    }

    /// Appends every check of `other` after this bundle's own.
    pub fn extend(&mut self, other: &Self) {
        self.pre.extend(other.pre.iter().cloned());
        self.post.extend(other.post.iter().cloned());
        self.invar.extend(other.invar.iter().cloned());
    }

    /// The preconditions, in declaration order.
    #[must_use]
    pub fn pre(&self) -> &[Check<T>] {
        &self.pre
    }

    /// The postconditions, in declaration order.
    #[must_use]
    pub fn post(&self) -> &[Check<T>] {
        &self.post
    }

    /// The invariants, in declaration order.
    #[must_use]
    pub fn invar(&self) -> &[Check<T>] {
        &self.invar
    }

    /// Total number of checks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pre.len() + self.post.len() + self.invar.len()
    }

    /// True when the bundle holds no checks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for ContractBundle<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ContractBundle<T> {
    fn clone(&self) -> Self {
        Self {
            pre: self.pre.clone(),
            post: self.post.clone(),
            invar: self.invar.clone(),
        }
    }
}

impl<T> fmt::Debug for ContractBundle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractBundle")
            .field("pre", &self.pre)
            .field("post", &self.post)
            .field("invar", &self.invar)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::void_check;
    use serde_json::json;

    fn passing(label: &str) -> Check<()> {
        Check::new(label, |_: &(), _: &[Value]| Ok(()))
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(ContractKind::parse("pre").unwrap(), ContractKind::Pre);
        assert_eq!(ContractKind::parse("invar").unwrap().to_string(), "invar");
        assert!(matches!(
            ContractKind::parse("during"),
            Err(SetupError::UnknownKind { ref kind }) if kind == "during"
        ));
    }

    #[test]
    fn test_from_terms_pairs() {
        let bundle = ContractBundle::from_terms([
            Term::kind("pre"),
            Term::Check(passing("a")),
            Term::kind("post"),
            Term::Check(void_check()),
            Term::kind("pre"),
            Term::Check(passing("b")),
        ])
        .unwrap();

        assert_eq!(bundle.pre().len(), 2);
        assert_eq!(bundle.pre()[0].label(), "a");
        assert_eq!(bundle.pre()[1].label(), "b");
        assert_eq!(bundle.post().len(), 1);
        assert!(bundle.invar().is_empty());
        assert_eq!(bundle.len(), 3);
    }

    #[test]
    fn test_from_terms_rejects_odd_length() {
        let err = ContractBundle::<()>::from_terms([Term::kind("pre")]).unwrap_err();
        assert!(matches!(err, SetupError::MalformedArguments { .. }));
    }

    #[test]
    fn test_from_terms_rejects_unknown_kind() {
        let err =
            ContractBundle::from_terms([Term::kind("around"), Term::Check(passing("a"))]).unwrap_err();
        assert_eq!(
            err,
            SetupError::UnknownKind {
                kind: "around".to_string()
            }
        );
    }

    #[test]
    fn test_from_terms_rejects_non_executable() {
        let err = ContractBundle::<()>::from_terms([Term::kind("post"), Term::Value(json!(42))])
            .unwrap_err();
        assert_eq!(
            err,
            SetupError::NotExecutable {
                kind: "post".to_string(),
                found: "value 42".to_string()
            }
        );
    }

    #[test]
    fn test_from_terms_rejects_check_in_key_position() {
        let err = ContractBundle::from_terms([Term::Check(passing("a")), Term::kind("pre")])
            .unwrap_err();
        assert!(matches!(err, SetupError::MalformedArguments { ref reason } if reason.contains("check a")));
    }

    #[test]
    fn test_extend_appends_in_order() {
        let mut first = ContractBundle::new().with_pre(passing("a"));
        let second = ContractBundle::new()
            .with_pre(passing("b"))
            .with_invar(passing("i"));
        first.extend(&second);

        let labels: Vec<&str> = first.pre().iter().map(Check::label).collect();
        assert_eq!(labels, vec!["a", "b"]);
        assert_eq!(first.invar().len(), 1);
        assert!(!first.is_empty());
    }
}
