//! Per-variant verification result.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::assertions::AssertionFailure;
use crate::domain::variant::{Flavor, Variant};

/// Terminal state of one variant run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Every step ran, every assertion held, teardown succeeded.
    Passed,
    /// Every step ran but an assertion failed or teardown failed.
    Failed,
    /// A fatal error stopped the run early.
    Aborted,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Outcome::Passed => "passed",
            Outcome::Failed => "failed",
            Outcome::Aborted => "aborted",
        })
    }
}

/// Everything observed while verifying one variant.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub variant: String,
    pub flavor: Flavor,
    pub outcome: Outcome,
    pub started_at: DateTime<Utc>,
    pub duration_secs: f64,
    /// Provisioning outputs read during validation.
    pub outputs: BTreeMap<String, String>,
    pub failures: Vec<AssertionFailure>,
    /// The error that aborted the run, if any.
    pub error: Option<String>,
    /// Set when teardown itself failed; infrastructure may be left behind.
    pub teardown_error: Option<String>,
}

impl VerificationReport {
    #[must_use]
    pub fn new(variant: &Variant, started_at: DateTime<Utc>) -> Self {
        Self {
            variant: variant.name().to_owned(),
            flavor: variant.flavor(),
            outcome: Outcome::Passed,
            started_at,
            duration_secs: 0.0,
            outputs: BTreeMap::new(),
            failures: Vec::new(),
            error: None,
            teardown_error: None,
        }
    }

    /// Settle the outcome from what was recorded.
    ///
    /// A fatal error wins over assertion failures; a teardown error turns an
    /// otherwise passing run into a failure.
    pub fn finish(&mut self, elapsed: Duration) {
        self.duration_secs = elapsed.as_secs_f64();
        self.outcome = if self.error.is_some() {
            Outcome::Aborted
        } else if !self.failures.is_empty() || self.teardown_error.is_some() {
            Outcome::Failed
        } else {
            Outcome::Passed
        };
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }
}
