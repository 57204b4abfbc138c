//! Application service — authenticate the image tool against the account's
//! container registry.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::{Context, Result};

use crate::application::ports::{CloudApi, ContainerTool, ProgressReporter};
use crate::domain::RegistryCredentials;

/// Fetch the caller's account id and a registry token, then log the image
/// tool in. Returns the registry host that was authenticated.
///
/// # Errors
///
/// Every failure is fatal: identity lookup, token fetch, an empty token
/// list, a malformed token, or a rejected login (with the tool's output).
pub async fn registry_login(
    cloud: &impl CloudApi,
    containers: &impl ContainerTool,
    region: &str,
    reporter: &impl ProgressReporter,
) -> Result<String> {
    reporter.step("authenticating to container registry...");

    let account_id = cloud
        .caller_account_id()
        .await
        .context("looking up caller identity")?;
    let tokens = cloud
        .registry_authorization_tokens()
        .await
        .context("requesting registry authorization token")?;
    let creds = RegistryCredentials::from_tokens(&tokens, &account_id, region)?;

    let output = containers
        .login(&creds)
        .await
        .with_context(|| format!("logging in to {}", creds.registry))?;
    tracing::debug!(registry = %creds.registry, %output, "registry login");

    reporter.success(&format!("logged in to {}", creds.registry));
    Ok(creds.registry)
}
