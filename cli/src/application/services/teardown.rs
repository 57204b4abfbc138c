//! Application service — tear down a variant left behind by an interrupted run.

use anyhow::{Context, Result};

use crate::application::ports::{ProgressReporter, ProvisionOptions, Provisioner};
use crate::application::services::session::ProvisioningSession;
use crate::domain::{HarnessConfig, Variant};

/// Re-initialise the variant's working directory and destroy its state.
///
/// Destroy is attempted even when init fails, so a partially initialised
/// directory still gets a chance to be cleaned up.
///
/// # Errors
///
/// Returns the init failure if there was one, otherwise the destroy failure.
pub async fn destroy_variant(
    provisioner: &impl Provisioner,
    config: &HarnessConfig,
    variant: &Variant,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    let options = ProvisionOptions::new(
        variant.terraform_dir(&config.examples_root),
        &config.lock_timeout,
    );
    let session = ProvisioningSession::open(provisioner, options);
    let init = session.init().await.context("terraform init");
    let destroyed = session.close(reporter).await;
    init?;
    destroyed
}
