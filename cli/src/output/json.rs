//! JSON output helpers.
//!
//! Provides the error-object formatter used by all `--json` code paths when
//! a command fails, and the document shapes for reports and flavors.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::{FlavorPlan, VerificationReport};

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

#[derive(Serialize)]
struct RunDocument<'a> {
    passed: bool,
    variants: &'a [VerificationReport],
}

/// `{"passed": <all passed>, "variants": [<report>...]}`
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_reports(reports: &[VerificationReport]) -> Result<String> {
    let doc = RunDocument {
        passed: reports.iter().all(VerificationReport::passed),
        variants: reports,
    };
    serde_json::to_string_pretty(&doc).context("JSON serialization failed")
}

/// The flavor table as a JSON array.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_flavors(plans: &[FlavorPlan]) -> Result<String> {
    serde_json::to_string_pretty(plans).context("JSON serialization failed")
}

/// `{"version": "..."}`
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_version(version: &str) -> Result<String> {
    serde_json::to_string_pretty(&serde_json::json!({ "version": version }))
        .context("JSON serialization failed")
}

/// Renders domain types as JSON on stdout.
pub struct JsonRenderer;

impl JsonRenderer {
    /// Print all reports as one document.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_reports(&self, reports: &[VerificationReport]) -> Result<()> {
        println!("{}", format_reports(reports)?);
        Ok(())
    }

    /// Print the flavor table.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_flavors(&self, plans: &[FlavorPlan]) -> Result<()> {
        println!("{}", format_flavors(plans)?);
        Ok(())
    }

    /// Print the version object.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        println!("{}", format_version(version)?);
        Ok(())
    }
}
