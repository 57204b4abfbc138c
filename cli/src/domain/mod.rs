//! Domain layer — pure types, derived names, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod assertions;
pub mod config;
pub mod error;
pub mod registry;
pub mod report;
pub mod retry;
pub mod variant;

pub use assertions::{AssertionFailure, Assertions};
pub use config::{ConfigOverrides, FileConfig, HarnessConfig};
pub use error::{ConfigError, ProbeError, RegistryError, ToolError, VariantError};
pub use registry::RegistryCredentials;
pub use report::{Outcome, VerificationReport};
pub use retry::RetryPolicy;
pub use variant::{EndpointCheck, FLAVOR_PLANS, Flavor, FlavorPlan, Variant};
