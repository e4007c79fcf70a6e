//! Test fixtures for contracted classes.

use crate::checks::Check;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;

/// A shared, ordered log of events.
///
/// Clones share the same log, so a method body or check can record into it
/// while the test inspects it.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    /// A copy of the entries so far.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Number of entries equal to `entry`.
    #[must_use]
    pub fn count(&self, entry: &str) -> usize {
        self.entries.lock().iter().filter(|e| *e == entry).count()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// A passing check that records `label` each time it runs.
pub fn recording_check<T: 'static>(log: &CallLog, label: &str) -> Check<T> {
    let log = log.clone();
    let entry = label.to_string();
    Check::new(label, move |_: &T, _: &[Value]| {
        log.record(entry.clone());
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_call_log_shared_between_clones() {
        let log = CallLog::new();
        let other = log.clone();
        other.record("body");
        log.record("body");
        log.record("post");

        assert_eq!(log.entries(), vec!["body", "body", "post"]);
        assert_eq!(log.count("body"), 2);
        assert_eq!(other.len(), 3);

        log.clear();
        assert!(other.is_empty());
    }

    #[test]
    fn test_recording_check() {
        let log = CallLog::new();
        let check: Check<()> = recording_check(&log, "a");
        assert_eq!(check.label(), "a");
        check.run(&(), &[]).unwrap();
        check.run(&(), &[]).unwrap();
        assert_eq!(log.count("a"), 2);
    }
}
