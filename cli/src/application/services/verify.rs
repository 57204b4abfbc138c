//! Application service — verify one example variant end to end.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.
//!
//! Steps, in order:
//!
//! 1. preflight: flavor-specific configuration must be present
//! 2. open the provisioning session (teardown is owed from here on)
//! 3. delete the stale log group, `init`
//! 4. container flavors only: registry apply, build, local smoke probe,
//!    registry login, push
//! 5. full `apply`, output validation, endpoint probe
//! 6. close the session (destroy), whatever happened in 3–5

use std::collections::BTreeMap;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::application::ports::{
    CloudApi, ContainerRun, ContainerTool, HttpProbe, ImageBuild, LogGroupDeletion,
    ProgressReporter, ProvisionOptions, Provisioner,
};
use crate::application::services::registry_login::registry_login;
use crate::application::services::retry::{probe_until_connected, probe_until_matches};
use crate::application::services::session::{LocalContainer, ProvisioningSession};
use crate::domain::variant::{REGISTRY_TARGET, REGISTRY_URL_OUTPUT, STATUS_TOKEN, api_arn_prefix};
use crate::domain::{
    Assertions, ConfigError, EndpointCheck, FlavorPlan, HarnessConfig, ProbeError, RetryPolicy,
    Variant, VerificationReport,
};

/// Platform the container image is built for.
pub const IMAGE_PLATFORM: &str = "linux/arm64";
/// Port the container image listens on.
pub const CONTAINER_PORT: u16 = 8080;
/// Seconds a local container gets to exit before it is killed.
pub const STOP_GRACE_SECS: u32 = 5;

const HTTP_OK: u16 = 200;

/// The ports one verification run talks to.
pub struct Harness<'a, P, C, A, H> {
    pub provisioner: &'a P,
    pub containers: &'a C,
    pub cloud: &'a A,
    pub http: &'a H,
    pub config: &'a HarnessConfig,
}

impl<P, C, A, H> Harness<'_, P, C, A, H>
where
    P: Provisioner,
    C: ContainerTool,
    A: CloudApi,
    H: HttpProbe,
{
    /// Verify `variant`, always tearing down whatever was provisioned.
    ///
    /// Never returns an error: fatal errors, assertion failures and teardown
    /// failures all end up in the report.
    pub async fn verify<R: ProgressReporter>(
        &self,
        variant: &Variant,
        reporter: &R,
    ) -> VerificationReport {
        let clock = Instant::now();
        let mut report = VerificationReport::new(variant, Utc::now());

        if let Err(e) = self.preflight(variant) {
            reporter.warn(&e.to_string());
            report.error = Some(e.to_string());
            report.finish(clock.elapsed());
            return report;
        }

        let options = ProvisionOptions::new(
            variant.terraform_dir(&self.config.examples_root),
            &self.config.lock_timeout,
        );
        let session = ProvisioningSession::open(self.provisioner, options);
        let mut checks = Assertions::default();

        let result = self
            .drive(&session, variant, &mut checks, &mut report.outputs, reporter)
            .await;
        let teardown = session.close(reporter).await;

        report.failures = checks.into_failures();
        if let Err(e) = result {
            reporter.warn(&format!("{e:#}"));
            report.error = Some(format!("{e:#}"));
        }
        if let Err(e) = teardown {
            report.teardown_error = Some(format!("{e:#}"));
        }
        report.finish(clock.elapsed());
        report
    }

    fn preflight(&self, variant: &Variant) -> Result<(), ConfigError> {
        if variant.plan().alternate_domain {
            self.config.require_alternate_domain(variant)?;
        }
        Ok(())
    }

    async fn drive<R: ProgressReporter>(
        &self,
        session: &ProvisioningSession<'_, P>,
        variant: &Variant,
        checks: &mut Assertions,
        outputs: &mut BTreeMap<String, String>,
        reporter: &R,
    ) -> Result<()> {
        let plan = variant.plan();

        self.clear_log_group(variant, reporter).await?;

        reporter.step("initializing terraform...");
        session.init().await.context("terraform init")?;

        let local_body = if plan.container_image {
            Some(self.publish_image(session, variant, checks, reporter).await?)
        } else {
            None
        };

        reporter.step("applying full plan...");
        session.apply().await.context("terraform apply")?;
        reporter.success("infrastructure applied");

        let domain = self
            .validate_outputs(session, variant, plan, checks, outputs)
            .await?;
        self.check_endpoint(plan.endpoint, &domain, local_body.as_deref(), checks, reporter)
            .await
    }

    /// The function's log group outlives `destroy`; a leftover one from an
    /// earlier run makes the next apply fail.
    async fn clear_log_group<R: ProgressReporter>(
        &self,
        variant: &Variant,
        reporter: &R,
    ) -> Result<()> {
        let name = variant.log_group_name();
        match self
            .cloud
            .delete_log_group(&name)
            .await
            .with_context(|| format!("deleting log group {name}"))?
        {
            LogGroupDeletion::Deleted => reporter.step(&format!("deleted stale log group {name}")),
            LogGroupDeletion::NotFound => tracing::debug!(%name, "no stale log group"),
        }
        Ok(())
    }

    /// Create the registry, build and smoke-test the image locally, push it.
    /// Returns the body the local container served.
    async fn publish_image<R: ProgressReporter>(
        &self,
        session: &ProvisioningSession<'_, P>,
        variant: &Variant,
        checks: &mut Assertions,
        reporter: &R,
    ) -> Result<String> {
        reporter.step("creating container registry...");
        session
            .apply_targets(&[REGISTRY_TARGET])
            .await
            .with_context(|| format!("terraform apply -target={REGISTRY_TARGET}"))?;
        let repo = session.output(REGISTRY_URL_OUTPUT).await?;
        let tag = format!("{repo}:latest");

        reporter.step(&format!("building {tag}..."));
        let build = ImageBuild {
            tags: vec![tag.clone()],
            platforms: vec![IMAGE_PLATFORM.to_owned()],
            extra: ["--provenance", "false", "--load"]
                .map(str::to_owned)
                .to_vec(),
        };
        self.containers
            .build(&self.config.docker_src, &build)
            .await
            .with_context(|| format!("building {tag}"))?;

        let run = ContainerRun {
            name: variant.name().to_owned(),
            remove: true,
            detach: true,
            extra: vec![
                "-p".to_owned(),
                format!("{}:{CONTAINER_PORT}", self.config.local_port),
            ],
        };
        let container = LocalContainer::start(self.containers, &tag, &run).await?;
        let probed = probe_until_connected(
            self.http,
            RetryPolicy::LOCAL_CONTAINER,
            reporter,
            "waiting for container to start",
            &self.config.local_url(),
        )
        .await;
        let stopped = container.stop(STOP_GRACE_SECS).await;

        let response = match (probed, stopped) {
            (Ok(response), Ok(())) => response,
            (Ok(_), Err(e)) => return Err(e),
            (Err(e), stopped) => {
                if let Err(stop_err) = stopped {
                    tracing::warn!(error = %format!("{stop_err:#}"), "container stop failed");
                }
                return Err(e.into());
            }
        };
        checks.equal("local container status", HTTP_OK, response.status);
        reporter.success("local container responded");

        registry_login(self.cloud, self.containers, &self.config.region, reporter).await?;

        reporter.step(&format!("pushing {tag}..."));
        self.containers
            .push(&tag)
            .await
            .with_context(|| format!("pushing {tag}"))?;
        reporter.success("image pushed");

        Ok(response.body)
    }

    /// Read and check provisioning outputs. Returns the reported domain name.
    async fn validate_outputs(
        &self,
        session: &ProvisioningSession<'_, P>,
        variant: &Variant,
        plan: &FlavorPlan,
        checks: &mut Assertions,
        outputs: &mut BTreeMap<String, String>,
    ) -> Result<String> {
        if plan.alternate_domain {
            let expected = self.config.require_alternate_domain(variant)?;
            let alt_domain = read_output(session, outputs, "alternate_domain_name").await?;
            checks.equal("alternate_domain_name", expected, &alt_domain);
            let alt_endpoint = read_output(session, outputs, "alternate_domain_endpoint").await?;
            checks.not_empty("alternate_domain_endpoint", &alt_endpoint);
        }

        let arn = read_output(session, outputs, "arn").await?;
        checks.contains("arn", &arn, &api_arn_prefix(&self.config.region));

        let domain = read_output(session, outputs, "domain_name").await?;
        checks.equal(
            "domain_name",
            variant.domain_name(&self.config.hosted_zone),
            &domain,
        );
        Ok(domain)
    }

    async fn check_endpoint<R: ProgressReporter>(
        &self,
        endpoint: EndpointCheck,
        domain: &str,
        local_body: Option<&str>,
        checks: &mut Assertions,
        reporter: &R,
    ) -> Result<()> {
        match endpoint {
            EndpointCheck::StatusToken => {
                let url = format!("https://{domain}/status");
                probe_until_matches(
                    self.http,
                    RetryPolicy::STATUS_ENDPOINT,
                    reporter,
                    &url,
                    HTTP_OK,
                    STATUS_TOKEN,
                )
                .await?;
                reporter.success(&format!("{url} reports {STATUS_TOKEN}"));
            }
            EndpointCheck::MatchesLocalImage => {
                let url = format!("https://{domain}");
                let response = probe_until_connected(
                    self.http,
                    RetryPolicy::IMAGE_ENDPOINT,
                    reporter,
                    "waiting for API to be available",
                    &url,
                )
                .await?;
                if response.status != HTTP_OK {
                    return Err(ProbeError::UnexpectedStatus {
                        url,
                        expected: HTTP_OK,
                        actual: response.status,
                    }
                    .into());
                }
                if checks.equal(
                    "deployed body matches local image",
                    local_body.unwrap_or_default(),
                    &response.body,
                ) {
                    reporter.success("deployed image matches local image");
                }
            }
        }
        Ok(())
    }
}

async fn read_output<P: Provisioner>(
    session: &ProvisioningSession<'_, P>,
    outputs: &mut BTreeMap<String, String>,
    name: &str,
) -> Result<String> {
    let value = session.output(name).await?;
    outputs.insert(name.to_owned(), value.clone());
    Ok(value)
}
