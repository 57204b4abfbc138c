//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::Result;

use crate::domain::{FileConfig, RegistryCredentials};

// ── Value Types ───────────────────────────────────────────────────────────────

/// Options bundle submitted with every provisioning command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionOptions {
    /// Terraform working directory.
    pub dir: PathBuf,
    /// State lock timeout, e.g. `"5m"`.
    pub lock_timeout: String,
    /// Upgrade modules and providers on init.
    pub upgrade: bool,
    /// Restrict apply to these resource addresses. Empty means everything.
    pub targets: Vec<String>,
}

impl ProvisionOptions {
    #[must_use]
    pub fn new(dir: PathBuf, lock_timeout: &str) -> Self {
        Self {
            dir,
            lock_timeout: lock_timeout.to_owned(),
            upgrade: true,
            targets: Vec::new(),
        }
    }

    /// Copy of these options restricted to `targets`.
    #[must_use]
    pub fn targeted(&self, targets: &[&str]) -> Self {
        Self {
            targets: targets.iter().map(|t| (*t).to_owned()).collect(),
            ..self.clone()
        }
    }
}

/// Image build parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuild {
    pub tags: Vec<String>,
    /// Target platforms, e.g. `linux/arm64`.
    pub platforms: Vec<String>,
    /// Extra flags passed through verbatim.
    pub extra: Vec<String>,
}

/// Container run parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRun {
    pub name: String,
    pub remove: bool,
    pub detach: bool,
    /// Extra flags passed through verbatim (port mappings etc.).
    pub extra: Vec<String>,
}

/// Container stop parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerStop {
    /// Seconds to wait before killing.
    pub grace_secs: u32,
}

/// Response observed by an HTTP probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Result of deleting a log group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogGroupDeletion {
    Deleted,
    NotFound,
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds the
    /// runner's timeout. On timeout the child must be killed, not orphaned.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with stdin piped from `stdin`.
    async fn run_with_stdin(&self, program: &str, args: &[&str], stdin: &[u8]) -> Result<Output>;
}

// ── Provisioning Port ─────────────────────────────────────────────────────────

/// Infrastructure provisioning lifecycle: init, apply, output, destroy.
#[allow(async_fn_in_trait)]
pub trait Provisioner {
    /// Initialise the working directory (modules, providers, backend).
    async fn init(&self, opts: &ProvisionOptions) -> Result<()>;
    /// Apply the plan, limited to `opts.targets` when non-empty.
    async fn apply(&self, opts: &ProvisionOptions) -> Result<()>;
    /// Read a single output value as a string.
    async fn output(&self, opts: &ProvisionOptions, name: &str) -> Result<String>;
    /// Destroy everything in the working directory's state.
    async fn destroy(&self, opts: &ProvisionOptions) -> Result<()>;
}

// ── Container Port ────────────────────────────────────────────────────────────

/// Container image build/run/push operations.
#[allow(async_fn_in_trait)]
pub trait ContainerTool {
    /// Build an image from `context_dir`.
    async fn build(&self, context_dir: &Path, opts: &ImageBuild) -> Result<()>;
    /// Start a container from `image`.
    async fn run(&self, image: &str, opts: &ContainerRun) -> Result<()>;
    /// Stop the named containers.
    async fn stop(&self, names: &[&str], opts: &ContainerStop) -> Result<()>;
    /// Push `tag` to its registry.
    async fn push(&self, tag: &str) -> Result<()>;
    /// Authenticate against a registry. Returns the tool's combined output.
    async fn login(&self, creds: &RegistryCredentials) -> Result<String>;
}

// ── Cloud API Port ────────────────────────────────────────────────────────────

/// Cloud identity, registry and logging calls the harness needs.
#[allow(async_fn_in_trait)]
pub trait CloudApi {
    /// Account id of the ambient credentials.
    async fn caller_account_id(&self) -> Result<String>;
    /// Registry authorization tokens, as returned (possibly empty).
    async fn registry_authorization_tokens(&self) -> Result<Vec<String>>;
    /// Delete a log group. A missing group is not an error.
    async fn delete_log_group(&self, name: &str) -> Result<LogGroupDeletion>;
}

// ── HTTP Probe Port ───────────────────────────────────────────────────────────

/// Abstracts HTTP GETs so probes can be tested without a network.
#[allow(async_fn_in_trait)]
pub trait HttpProbe {
    /// Issue a GET. `Err` means no response was received (connection,
    /// TLS, DNS, timeout); any status code is `Ok`.
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Loads the optional config file overlay.
pub trait ConfigStore {
    /// Load the overlay, returning defaults when the file does not exist.
    fn load(&self) -> Result<FileConfig>;
    /// Path the overlay is read from.
    fn path(&self) -> Result<PathBuf>;
}
