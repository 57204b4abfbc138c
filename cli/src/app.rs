//! Application context — unified state passed to every command handler.
//!
//! Adding a new cross-cutting concern requires only one field change here;
//! command signatures stay the same.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::{ConfigOverrides, HarnessConfig};
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::YamlConfigStore;
use crate::infra::docker::DockerCli;
use crate::infra::terraform::TerraformCli;
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    ///
    /// JSON mode forces `quiet` so progress lines never interleave with the
    /// document on stdout.
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Source of the optional YAML overlay.
    pub config_store: YamlConfigStore,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &OutputFlags) -> Self {
        let mode = if flags.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };

        Self {
            output: OutputContext::new(flags.no_color, flags.quiet || flags.json),
            mode,
            config_store: YamlConfigStore::new(),
        }
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// Resolve the harness configuration from flags, the process
    /// environment and the overlay file.
    ///
    /// # Errors
    ///
    /// Returns an error if the overlay cannot be read or parsed, or if a
    /// required environment variable is missing.
    pub fn load_config(&self, overrides: ConfigOverrides) -> Result<HarnessConfig> {
        let file = self.config_store.load()?;
        let config = HarnessConfig::resolve(|var| std::env::var(var).ok(), file, overrides)?;
        tracing::debug!(?config, "configuration resolved");
        Ok(config)
    }

    /// Terraform adapter bounded by the configured tool timeout.
    #[must_use]
    pub fn terraform(&self, config: &HarnessConfig) -> TerraformCli<TokioCommandRunner> {
        TerraformCli::new(TokioCommandRunner::new(config.tool_timeout))
    }

    /// Docker adapter bounded by the configured tool timeout.
    #[must_use]
    pub fn docker(&self, config: &HarnessConfig) -> DockerCli<TokioCommandRunner> {
        DockerCli::new(TokioCommandRunner::new(config.tool_timeout))
    }
}
