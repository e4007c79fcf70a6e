//! Method selectors: one name, a list of names, or a regex over names.

use crate::errors::SetupError;
use crate::meta::META_METHOD;
use regex::Regex;
use std::fmt;

/// Chooses which methods a contract attaches to.
///
/// Selectors are resolved once, against the methods known when the contract
/// is declared. Methods added afterwards are not covered.
#[derive(Debug, Clone)]
pub enum MethodSelector {
    /// Exactly one method.
    Name(String),
    /// Several methods, each of which must exist.
    Names(Vec<String>),
    /// Every known method whose name matches.
    Pattern(Regex),
}

impl MethodSelector {
    /// Compiles a pattern selector.
    pub fn pattern(pattern: &str) -> Result<Self, SetupError> {
        Regex::new(pattern)
            .map(Self::Pattern)
            .map_err(|e| SetupError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    /// Resolves the selector against the known method names.
    ///
    /// Named methods must exist. A pattern may match nothing; the `meta`
    /// accessor is never matched by a pattern.
    pub fn resolve<'a, I>(&self, class: &str, known: I) -> Result<Vec<String>, SetupError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let known: Vec<&str> = known.into_iter().collect();
        let require = |name: &String| {
            if known.contains(&name.as_str()) {
                Ok(name.clone())
            } else {
                Err(SetupError::UnknownMethod {
                    class: class.to_string(),
                    method: name.clone(),
                })
            }
        };

        match self {
            Self::Name(name) => Ok(vec![require(name)?]),
            Self::Names(names) => {
                let mut resolved: Vec<String> = Vec::with_capacity(names.len());
                for name in names {
                    let name = require(name)?;
                    if !resolved.contains(&name) {
                        resolved.push(name);
                    }
                }
                Ok(resolved)
            }
            Self::Pattern(regex) => Ok(known
                .iter()
                .filter(|name| **name != META_METHOD && regex.is_match(name))
                .map(|name| (*name).to_string())
                .collect()),
        }
    }
}

impl fmt::Display for MethodSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Names(names) => write!(f, "[{}]", names.join(", ")),
            Self::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

impl From<&str> for MethodSelector {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for MethodSelector {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<Vec<String>> for MethodSelector {
    fn from(names: Vec<String>) -> Self {
        Self::Names(names)
    }
}

impl From<&[&str]> for MethodSelector {
    fn from(names: &[&str]) -> Self {
        Self::Names(names.iter().map(|n| (*n).to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for MethodSelector {
    fn from(names: [&str; N]) -> Self {
        Self::Names(names.iter().map(|n| (*n).to_string()).collect())
    }
}

impl From<Regex> for MethodSelector {
    fn from(regex: Regex) -> Self {
        Self::Pattern(regex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const KNOWN: [&str; 5] = ["deposit", "withdraw", "balance", "_audit", "meta"];

    #[test]
    fn test_single_name() {
        let selector = MethodSelector::from("deposit");
        assert_eq!(selector.resolve("Account", KNOWN).unwrap(), vec!["deposit"]);
    }

    #[test]
    fn test_unknown_name() {
        let err = MethodSelector::from("close").resolve("Account", KNOWN).unwrap_err();
        assert_eq!(
            err,
            SetupError::UnknownMethod {
                class: "Account".to_string(),
                method: "close".to_string()
            }
        );
    }

    #[test]
    fn test_name_list_dedups_and_keeps_order() {
        let selector = MethodSelector::from(["withdraw", "deposit", "withdraw"]);
        assert_eq!(
            selector.resolve("Account", KNOWN).unwrap(),
            vec!["withdraw", "deposit"]
        );
        assert!(MethodSelector::from(["deposit", "nope"])
            .resolve("Account", KNOWN)
            .is_err());
    }

    #[test]
    fn test_pattern_skips_meta() {
        let selector = MethodSelector::pattern("^(d|w|m)").unwrap();
        assert_eq!(
            selector.resolve("Account", KNOWN).unwrap(),
            vec!["deposit", "withdraw"]
        );
        assert_eq!(selector.to_string(), "/^(d|w|m)/");
    }

    #[test]
    fn test_pattern_may_match_nothing() {
        let selector = MethodSelector::pattern("^transfer").unwrap();
        assert!(selector.resolve("Account", KNOWN).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_pattern() {
        let err = MethodSelector::pattern("(unclosed").unwrap_err();
        assert!(matches!(err, SetupError::InvalidPattern { ref pattern, .. } if pattern == "(unclosed"));
    }
}
