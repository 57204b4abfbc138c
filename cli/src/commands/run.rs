//! Run command — verify every requested variant concurrently.

use anyhow::Result;
use clap::Args;
use futures_util::future::join_all;
use indicatif::MultiProgress;

use crate::app::AppContext;
use crate::application::services::verify::Harness;
use crate::commands::HarnessArgs;
use crate::domain::VerificationReport;
use crate::infra::aws::AwsCloud;
use crate::infra::http::ReqwestProbe;
use crate::output::{TerminalReporter, progress};

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub harness: HarnessArgs,
}

/// Returned when at least one variant did not pass. The reports have
/// already been rendered, so `main` only needs the exit code.
#[derive(Debug, thiserror::Error)]
#[error("{failed} of {total} variant(s) did not pass")]
pub struct VerificationFailed {
    pub failed: usize,
    pub total: usize,
}

/// Entry point for `lambda-api-verify run`.
///
/// # Errors
///
/// Returns an error if configuration is incomplete, a variant name is
/// invalid, or any variant fails ([`VerificationFailed`]).
pub async fn run(app: &AppContext, args: &RunArgs) -> Result<()> {
    let variants = args.harness.parse_variants()?;
    let config = app.load_config(args.harness.overrides())?;

    let provisioner = app.terraform(&config);
    let containers = app.docker(&config);
    let cloud = AwsCloud::connect(&config.region).await;
    let http = ReqwestProbe::new(config.http_timeout)?;
    let harness = Harness {
        provisioner: &provisioner,
        containers: &containers,
        cloud: &cloud,
        http: &http,
        config: &config,
    };

    app.output.header(&format!(
        "Verifying {} in {}",
        args.harness.variants.join(", "),
        config.region
    ));
    let multi = MultiProgress::new();
    let reporters: Vec<TerminalReporter<'_>> = variants
        .iter()
        .map(|variant| {
            let reporter = TerminalReporter::new(&app.output).with_prefix(variant.name());
            if app.output.show_progress() {
                let pb = multi.add(progress::spinner("starting..."));
                pb.set_prefix(variant.name().to_owned());
                reporter.with_spinner(pb)
            } else {
                reporter
            }
        })
        .collect();

    tracing::info!(count = variants.len(), region = %config.region, "verifying variants");
    let reports: Vec<VerificationReport> = join_all(
        variants
            .iter()
            .zip(&reporters)
            .map(|(variant, reporter)| harness.verify(variant, reporter)),
    )
    .await;

    for (report, reporter) in reports.iter().zip(&reporters) {
        if let Some(pb) = reporter.spinner() {
            if report.passed() {
                progress::finish_ok(pb, "passed");
            } else {
                progress::finish_error(pb, &report.outcome.to_string());
            }
        }
    }

    app.renderer().render_reports(&reports)?;

    let failed = reports.iter().filter(|r| !r.passed()).count();
    if failed > 0 {
        return Err(VerificationFailed {
            failed,
            total: reports.len(),
        }
        .into());
    }
    Ok(())
}
