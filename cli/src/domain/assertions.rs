//! Non-fatal assertions.
//!
//! A failed check is recorded and verification continues; the variant is
//! marked failed at the end. Fatal conditions are plain errors instead.

use serde::Serialize;

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertionFailure {
    pub check: String,
    pub expected: String,
    pub actual: String,
}

impl std::fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: expected {:?}, got {:?}",
            self.check, self.expected, self.actual
        )
    }
}

/// Accumulates assertion failures for one variant.
#[derive(Debug, Default)]
pub struct Assertions {
    failures: Vec<AssertionFailure>,
}

impl Assertions {
    /// `actual == expected`
    pub fn equal(&mut self, check: &str, expected: impl ToString, actual: impl ToString) -> bool {
        let (expected, actual) = (expected.to_string(), actual.to_string());
        let ok = expected == actual;
        if !ok {
            self.record(check, expected, actual);
        }
        ok
    }

    /// `haystack` contains `needle`
    pub fn contains(&mut self, check: &str, haystack: &str, needle: &str) -> bool {
        let ok = haystack.contains(needle);
        if !ok {
            self.record(check, format!("contains {needle}"), haystack.to_owned());
        }
        ok
    }

    /// `value` is not empty
    pub fn not_empty(&mut self, check: &str, value: &str) -> bool {
        let ok = !value.is_empty();
        if !ok {
            self.record(check, "non-empty".to_owned(), String::new());
        }
        ok
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    #[must_use]
    pub fn into_failures(self) -> Vec<AssertionFailure> {
        self.failures
    }

    fn record(&mut self, check: &str, expected: String, actual: String) {
        self.failures.push(AssertionFailure {
            check: check.to_owned(),
            expected,
            actual,
        });
    }
}
