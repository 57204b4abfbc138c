//! Terminal palette for progress lines and verification reports.

use owo_colors::Style;

use crate::domain::Outcome;

/// Colors used across the terminal output. All styles are plain until
/// [`Styles::colorize`] is called, so `--no-color` needs no special casing.
#[derive(Default, Clone)]
pub struct Styles {
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    /// Secondary text: durations, output names, hints.
    pub dim: Style,
    pub bold: Style,
    /// Section titles and table headings.
    pub header: Style,
    /// `[variant]` prefix on progress lines.
    pub variant: Style,
}

impl Styles {
    pub fn colorize(&mut self) {
        *self = Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red(),
            dim: Style::new().dimmed(),
            bold: Style::new().bold(),
            header: Style::new().bold().cyan(),
            variant: Style::new().magenta(),
        };
    }

    /// Aborted runs are shown as warnings since teardown still ran.
    #[must_use]
    pub fn outcome(&self, outcome: Outcome) -> Style {
        match outcome {
            Outcome::Passed => self.success,
            Outcome::Failed => self.error,
            Outcome::Aborted => self.warning,
        }
    }
}
