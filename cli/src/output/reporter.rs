//! `TerminalReporter` — Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so application services can emit progress events without depending on
//! any presentation type directly.
//!
//! Variants run concurrently, so each reporter can carry the variant name as a
//! prefix and, on a TTY, a spinner owned by a shared `MultiProgress`.

use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::OutputContext;

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// - `step()` prints `"  → [prefix] {message}"`, or updates the spinner
/// - `success()` prints `"  ✓ [prefix] {message}"`
/// - `warn()` prints `"  ! [prefix] {message}"`
///
/// All three are suppressed when `ctx.quiet`.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    prefix: Option<String>,
    spinner: Option<ProgressBar>,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            prefix: None,
            spinner: None,
        }
    }

    /// Tag every line with `prefix`.
    #[must_use]
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_owned());
        self
    }

    /// Route steps to `spinner` and print other lines above it.
    #[must_use]
    pub fn with_spinner(mut self, spinner: ProgressBar) -> Self {
        self.spinner = Some(spinner);
        self
    }

    /// The spinner, if one is attached.
    #[must_use]
    pub fn spinner(&self) -> Option<&ProgressBar> {
        self.spinner.as_ref()
    }

    /// `message` with the variant prefix, if any.
    #[must_use]
    pub fn label(&self, message: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!(
                "{} {message}",
                format!("[{prefix}]").style(self.ctx.styles.variant)
            ),
            None => message.to_owned(),
        }
    }

    fn emit(&self, line: String) {
        match &self.spinner {
            Some(pb) => pb.println(line),
            None => println!("{line}"),
        }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        match &self.spinner {
            Some(pb) => pb.set_message(message.to_owned()),
            None => println!("  {} {}", "→".cyan(), self.label(message)),
        }
    }

    fn success(&self, message: &str) {
        if !self.ctx.quiet {
            self.emit(format!(
                "  {} {}",
                "✓".style(self.ctx.styles.success),
                self.label(message)
            ));
        }
    }

    fn warn(&self, message: &str) {
        if !self.ctx.quiet {
            self.emit(format!(
                "  {} {}",
                "!".style(self.ctx.styles.warning),
                self.label(message)
            ));
        }
    }
}
