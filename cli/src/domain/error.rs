//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors raised while assembling the harness configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be set to {purpose}. e.g. 'export {var}={example}'")]
    MissingEnv {
        var: &'static str,
        purpose: String,
        example: &'static str,
    },

    #[error("Invalid value for {key}: {value}\n\n{hint}")]
    InvalidValue {
        key: &'static str,
        value: String,
        hint: &'static str,
    },
}

// ── Variant errors ────────────────────────────────────────────────────────────

/// Errors related to example variant names.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VariantError {
    #[error("Invalid variant name '{0}': must match ^[a-z0-9][a-z0-9-]*$")]
    InvalidName(String),
}

// ── Registry errors ───────────────────────────────────────────────────────────

/// Errors related to container registry authorization.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("registry returned no authorization data")]
    NoAuthorizationData,

    #[error("authorization token is not valid base64")]
    InvalidEncoding,

    #[error("authorization token is not of the form <user>:<password>")]
    MalformedToken,
}

// ── Probe errors ──────────────────────────────────────────────────────────────

/// Errors raised by bounded HTTP probes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProbeError {
    #[error("{label}: gave up after {attempts} attempts (last: {last})")]
    Exhausted {
        label: String,
        attempts: u32,
        last: String,
    },

    #[error("{url}: expected status {expected}, got {actual}")]
    UnexpectedStatus {
        url: String,
        expected: u16,
        actual: u16,
    },

    /// A response arrived but its body was cut off. Not retried.
    #[error("{url}: response body could not be read: {reason}")]
    UnreadableBody { url: String, reason: String },
}

// ── Tool errors ───────────────────────────────────────────────────────────────

/// Errors raised when an external CLI exits unsuccessfully.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("{tool} {step} failed (exit code {code}):\n{output}")]
    Failed {
        tool: String,
        step: String,
        code: String,
        output: String,
    },

    #[error("{tool} {step} returned unparseable output: {output}")]
    UnparseableOutput {
        tool: String,
        step: String,
        output: String,
    },
}
