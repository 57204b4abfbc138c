//! Domain types and validators for harness configuration.
//!
//! Pure functions only — no I/O, no async, no filesystem access. The
//! environment is passed in as a lookup function so resolution is testable.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;
use crate::domain::variant::Variant;

// ── Constants ────────────────────────────────────────────────────────────────

pub const HOSTED_ZONE_ENV: &str = "TF_VAR_primary_hosted_zone";
pub const ALTERNATE_DOMAIN_ENV: &str = "TF_VAR_alternate_domain_name";
pub const REGION_ENVS: &[&str] = &["AWS_REGION", "AWS_DEFAULT_REGION"];
pub const CONFIG_PATH_ENV: &str = "LAMBDA_API_VERIFY_CONFIG";

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_EXAMPLES_ROOT: &str = "examples";
pub const DEFAULT_DOCKER_SRC: &str = "examples/src-docker";
pub const DEFAULT_LOCK_TIMEOUT: &str = "5m";
pub const DEFAULT_LOCAL_PORT: u16 = 8080;
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 3600;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

// ── Config file schema ───────────────────────────────────────────────────────

/// Optional overlay read from `~/.lambda-api-verify/config.yaml` (or
/// `$LAMBDA_API_VERIFY_CONFIG`). Every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub region: Option<String>,
    pub examples_root: Option<PathBuf>,
    pub docker_src: Option<PathBuf>,
    pub lock_timeout: Option<String>,
    pub local_port: Option<u16>,
    pub tool_timeout_secs: Option<u64>,
    pub http_timeout_secs: Option<u64>,
}

/// Values supplied on the command line. They win over everything else.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub region: Option<String>,
    pub examples_root: Option<PathBuf>,
    pub docker_src: Option<PathBuf>,
}

// ── Resolved config ──────────────────────────────────────────────────────────

/// Fully resolved configuration for one harness run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub hosted_zone: String,
    pub alternate_domain: Option<String>,
    pub region: String,
    pub examples_root: PathBuf,
    pub docker_src: PathBuf,
    pub lock_timeout: String,
    pub local_port: u16,
    pub tool_timeout: Duration,
    pub http_timeout: Duration,
}

impl HarnessConfig {
    /// Resolve configuration from command-line overrides, the environment
    /// (via `lookup`), and the optional config file, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnv`] if the hosted zone is unset, or
    /// [`ConfigError::InvalidValue`] for a zero port or timeout.
    pub fn resolve(
        lookup: impl Fn(&str) -> Option<String>,
        file: FileConfig,
        overrides: ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let non_empty = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let hosted_zone = non_empty(HOSTED_ZONE_ENV).ok_or_else(|| ConfigError::MissingEnv {
            var: HOSTED_ZONE_ENV,
            purpose: "run tests".to_owned(),
            example: "example.org",
        })?;

        let region = overrides
            .region
            .or_else(|| REGION_ENVS.iter().find_map(|&var| non_empty(var)))
            .or(file.region)
            .unwrap_or_else(|| DEFAULT_REGION.to_owned());

        let local_port = file.local_port.unwrap_or(DEFAULT_LOCAL_PORT);
        if local_port == 0 {
            return Err(ConfigError::InvalidValue {
                key: "local_port",
                value: "0".to_owned(),
                hint: "The local container port must be between 1 and 65535.",
            });
        }

        Ok(Self {
            hosted_zone,
            alternate_domain: non_empty(ALTERNATE_DOMAIN_ENV),
            region,
            examples_root: overrides
                .examples_root
                .or(file.examples_root)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_EXAMPLES_ROOT)),
            docker_src: overrides
                .docker_src
                .or(file.docker_src)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCKER_SRC)),
            lock_timeout: file
                .lock_timeout
                .unwrap_or_else(|| DEFAULT_LOCK_TIMEOUT.to_owned()),
            local_port,
            tool_timeout: positive_secs(
                "tool_timeout_secs",
                file.tool_timeout_secs,
                DEFAULT_TOOL_TIMEOUT_SECS,
            )?,
            http_timeout: positive_secs(
                "http_timeout_secs",
                file.http_timeout_secs,
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?,
        })
    }

    /// Alternate domain the `alt-domain` flavor must report.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnv`] when the flavor needs it and it is unset.
    pub fn require_alternate_domain(&self, variant: &Variant) -> Result<&str, ConfigError> {
        self.alternate_domain
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnv {
                var: ALTERNATE_DOMAIN_ENV,
                purpose: format!("test {variant} variant"),
                example: "example.org",
            })
    }

    /// URL the locally running container answers on.
    #[must_use]
    pub fn local_url(&self) -> String {
        format!("http://localhost:{}/", self.local_port)
    }
}

fn positive_secs(
    key: &'static str,
    value: Option<u64>,
    default: u64,
) -> Result<Duration, ConfigError> {
    match value.unwrap_or(default) {
        0 => Err(ConfigError::InvalidValue {
            key,
            value: "0".to_owned(),
            hint: "Timeouts must be at least one second.",
        }),
        secs => Ok(Duration::from_secs(secs)),
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
