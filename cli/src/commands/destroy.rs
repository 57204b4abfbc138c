//! Destroy command — tear down variants without verifying them.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::teardown::destroy_variant;
use crate::commands::HarnessArgs;
use crate::output::{TerminalReporter, progress};

/// Arguments for the destroy command.
#[derive(Args)]
pub struct DestroyArgs {
    #[command(flatten)]
    pub harness: HarnessArgs,
}

/// Entry point for `lambda-api-verify destroy`.
///
/// Variants are destroyed one after another; a failure does not stop the
/// remaining ones.
///
/// # Errors
///
/// Returns an error if configuration is incomplete, a variant name is
/// invalid, or any destroy failed.
pub async fn run(app: &AppContext, args: &DestroyArgs) -> Result<()> {
    let variants = args.harness.parse_variants()?;
    let config = app.load_config(args.harness.overrides())?;
    let provisioner = app.terraform(&config);

    let mut failed = Vec::new();
    for variant in &variants {
        let mut reporter = TerminalReporter::new(&app.output).with_prefix(variant.name());
        if app.output.show_progress() {
            let pb = progress::spinner("destroying...");
            pb.set_prefix(variant.name().to_owned());
            reporter = reporter.with_spinner(pb);
        }

        let result = destroy_variant(&provisioner, &config, variant, &reporter).await;
        match (&result, reporter.spinner()) {
            (Ok(()), Some(pb)) => progress::finish_ok(pb, "destroyed"),
            (Err(_), Some(pb)) => progress::finish_error(pb, "destroy failed"),
            (_, None) => {}
        }
        if let Err(e) = result {
            tracing::error!(variant = %variant, error = %format!("{e:#}"), "destroy failed");
            app.output.error(&format!("{variant}: {e:#}"));
            failed.push(variant.name().to_owned());
        }
    }

    if failed.is_empty() {
        app.output.success("teardown complete");
        Ok(())
    } else {
        anyhow::bail!("destroy failed for: {}", failed.join(", "))
    }
}
