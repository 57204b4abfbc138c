//! Human-readable terminal renderer.

use owo_colors::OwoColorize as _;

use crate::domain::{EndpointCheck, FlavorPlan, VerificationReport};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        println!("lambda-api-verify {version}");
    }

    /// Render one block per report followed by a summary line.
    ///
    /// Failed and aborted variants are always shown, even when quiet.
    pub fn render_reports(&self, reports: &[VerificationReport]) {
        for report in reports {
            if self.ctx.quiet && report.passed() {
                continue;
            }
            self.render_report(report);
        }
        if !self.ctx.quiet {
            println!();
            let summary = summary_line(reports);
            if reports.iter().all(VerificationReport::passed) {
                println!("  {}", summary.style(self.ctx.styles.success));
            } else {
                println!("  {}", summary.style(self.ctx.styles.error));
            }
        }
    }

    fn render_report(&self, report: &VerificationReport) {
        println!();
        let symbol = if report.passed() { "✓" } else { "✗" };
        let outcome_style = self.ctx.styles.outcome(report.outcome);
        println!(
            "  {} {} {} {}",
            symbol.style(outcome_style),
            report.variant.style(self.ctx.styles.bold),
            report.outcome.style(outcome_style),
            format!("({})", format_duration(report.duration_secs)).style(self.ctx.styles.dim),
        );

        for (name, value) in &report.outputs {
            println!("      {:<28} {value}", name.style(self.ctx.styles.dim));
        }
        for failure in &report.failures {
            println!("      {} {failure}", "✗".style(self.ctx.styles.error));
        }
        if let Some(error) = &report.error {
            println!("      {} {error}", "error:".style(self.ctx.styles.error));
        }
        if let Some(error) = &report.teardown_error {
            println!(
                "      {} {error}",
                "teardown failed:".style(self.ctx.styles.warning)
            );
            println!(
                "      {}",
                format!("Run: lambda-api-verify destroy --variant {}", report.variant)
                    .style(self.ctx.styles.dim)
            );
        }
    }

    /// Render the flavor dispatch table.
    pub fn render_flavors(&self, plans: &[FlavorPlan]) {
        println!(
            "  {:<14} {:<12} {:<7} {:<11} {}",
            "VARIANT".style(self.ctx.styles.header),
            "FLAVOR".style(self.ctx.styles.header),
            "IMAGE".style(self.ctx.styles.header),
            "ALT DOMAIN".style(self.ctx.styles.header),
            "ENDPOINT".style(self.ctx.styles.header),
        );
        for plan in plans {
            println!(
                "  {:<14} {:<12} {:<7} {:<11} {}",
                plan.variant.unwrap_or("(any other)"),
                plan.flavor.to_string(),
                yes_no(plan.container_image),
                yes_no(plan.alternate_domain),
                endpoint_label(plan.endpoint),
            );
        }
    }
}

/// `"N/M variants passed"`.
#[must_use]
pub fn summary_line(reports: &[VerificationReport]) -> String {
    let passed = reports.iter().filter(|r| r.passed()).count();
    let noun = if reports.len() == 1 { "variant" } else { "variants" };
    format!("{passed}/{} {noun} passed", reports.len())
}

/// `"42.0s"` under a minute, `"3m 07s"` otherwise.
#[must_use]
pub fn format_duration(secs: f64) -> String {
    if secs < 60.0 {
        return format!("{secs:.1}s");
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let whole = secs as u64;
    format!("{}m {:02}s", whole / 60, whole % 60)
}

fn endpoint_label(endpoint: EndpointCheck) -> &'static str {
    match endpoint {
        EndpointCheck::StatusToken => "GET /status returns ok",
        EndpointCheck::MatchesLocalImage => "GET / matches local container",
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
