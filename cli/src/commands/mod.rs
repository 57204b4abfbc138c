//! Command implementations

pub mod destroy;
pub mod run;
pub mod variants;
pub mod version;

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::domain::{ConfigOverrides, Variant};

/// Flags shared by commands that touch a variant's workspace.
#[derive(Args, Debug, Clone)]
pub struct HarnessArgs {
    /// Variant to operate on (repeatable, or comma separated)
    #[arg(long = "variant", value_name = "NAME", value_delimiter = ',', required = true)]
    pub variants: Vec<String>,

    /// Directory holding one Terraform example per variant
    #[arg(long, value_name = "DIR")]
    pub examples_root: Option<PathBuf>,

    /// Build context for the container image
    #[arg(long, value_name = "DIR")]
    pub docker_src: Option<PathBuf>,

    /// AWS region (defaults to AWS_REGION, then us-east-1)
    #[arg(long)]
    pub region: Option<String>,
}

impl HarnessArgs {
    /// Command-line values that win over environment and file.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            region: self.region.clone(),
            examples_root: self.examples_root.clone(),
            docker_src: self.docker_src.clone(),
        }
    }

    /// Parse and validate the variant names. Duplicates are rejected since
    /// two runs of one variant would share a Terraform working directory.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid or repeated name.
    pub fn parse_variants(&self) -> Result<Vec<Variant>> {
        let mut parsed: Vec<Variant> = Vec::with_capacity(self.variants.len());
        for name in &self.variants {
            let variant = Variant::parse(name.trim())?;
            if parsed.contains(&variant) {
                anyhow::bail!("variant '{variant}' given more than once");
            }
            parsed.push(variant);
        }
        Ok(parsed)
    }
}
