//! Variants command — print the flavor dispatch table.

use anyhow::Result;

use crate::app::AppContext;
use crate::domain::FLAVOR_PLANS;

/// Entry point for `lambda-api-verify variants`.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn run(app: &AppContext) -> Result<()> {
    app.renderer().render_flavors(FLAVOR_PLANS)
}
