//! Scoped provisioning session and local container.
//!
//! Both types are opened before the risky work starts and must be closed
//! afterwards; callers keep the work in a separate function so the close
//! runs on every exit path of that function. Dropping an unclosed handle
//! logs what was left behind.

use anyhow::{Context, Result};

use crate::application::ports::{
    ContainerRun, ContainerStop, ContainerTool, ProgressReporter, ProvisionOptions, Provisioner,
};

// ── ProvisioningSession ───────────────────────────────────────────────────────

/// A Terraform working directory plus the options every command uses.
#[must_use = "a provisioning session must be closed to tear down infrastructure"]
pub struct ProvisioningSession<'a, P: Provisioner> {
    provisioner: &'a P,
    options: ProvisionOptions,
    closed: bool,
}

impl<'a, P: Provisioner> ProvisioningSession<'a, P> {
    /// Register a session. Nothing runs until a lifecycle method is called,
    /// but teardown is owed from this point on.
    pub fn open(provisioner: &'a P, options: ProvisionOptions) -> Self {
        tracing::debug!(dir = %options.dir.display(), "provisioning session opened");
        Self {
            provisioner,
            options,
            closed: false,
        }
    }

    /// # Errors
    ///
    /// Propagates provisioner failures.
    pub async fn init(&self) -> Result<()> {
        self.provisioner.init(&self.options).await
    }

    /// Apply the whole plan.
    ///
    /// # Errors
    ///
    /// Propagates provisioner failures.
    pub async fn apply(&self) -> Result<()> {
        self.provisioner.apply(&self.options).await
    }

    /// Apply only `targets`.
    ///
    /// # Errors
    ///
    /// Propagates provisioner failures.
    pub async fn apply_targets(&self, targets: &[&str]) -> Result<()> {
        self.provisioner
            .apply(&self.options.targeted(targets))
            .await
    }

    /// # Errors
    ///
    /// Propagates provisioner failures.
    pub async fn output(&self, name: &str) -> Result<String> {
        self.provisioner
            .output(&self.options, name)
            .await
            .with_context(|| format!("reading output '{name}'"))
    }

    /// Tear down everything in the session's state.
    ///
    /// # Errors
    ///
    /// Returns the destroy failure; the session counts as closed either way.
    pub async fn close(mut self, reporter: &impl ProgressReporter) -> Result<()> {
        self.closed = true;
        reporter.step("destroying infrastructure...");
        let result = self.provisioner.destroy(&self.options).await;
        match &result {
            Ok(()) => reporter.success("infrastructure destroyed"),
            Err(e) => reporter.warn(&format!("destroy failed: {e:#}")),
        }
        result
    }
}

impl<P: Provisioner> Drop for ProvisioningSession<'_, P> {
    fn drop(&mut self) {
        if !self.closed {
            tracing::error!(
                dir = %self.options.dir.display(),
                "provisioning session dropped without teardown; infrastructure may be left behind"
            );
        }
    }
}

// ── LocalContainer ────────────────────────────────────────────────────────────

/// A container started locally for a smoke check.
#[must_use = "a local container must be stopped"]
pub struct LocalContainer<'a, C: ContainerTool> {
    containers: &'a C,
    name: String,
    stopped: bool,
}

impl<'a, C: ContainerTool> LocalContainer<'a, C> {
    /// Start `image` with `opts`.
    ///
    /// # Errors
    ///
    /// Propagates container tool failures; nothing is left running then.
    pub async fn start(containers: &'a C, image: &str, opts: &ContainerRun) -> Result<Self> {
        containers
            .run(image, opts)
            .await
            .with_context(|| format!("starting container '{}'", opts.name))?;
        Ok(Self {
            containers,
            name: opts.name.clone(),
            stopped: false,
        })
    }

    /// Stop the container, waiting up to `grace_secs` before it is killed.
    ///
    /// # Errors
    ///
    /// Propagates container tool failures.
    pub async fn stop(mut self, grace_secs: u32) -> Result<()> {
        self.stopped = true;
        self.containers
            .stop(&[self.name.as_str()], &ContainerStop { grace_secs })
            .await
            .with_context(|| format!("stopping container '{}'", self.name))
    }
}

impl<C: ContainerTool> Drop for LocalContainer<'_, C> {
    fn drop(&mut self) {
        if !self.stopped {
            tracing::error!(name = %self.name, "local container dropped while still running");
        }
    }
}
