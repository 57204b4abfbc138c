//! Example variants, deployment flavors, and the names derived from them.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::error::VariantError;

// ── Constants ────────────────────────────────────────────────────────────────

/// Prefix shared by every resource the example modules create.
pub const RESOURCE_PREFIX: &str = "ex-tf-lambda-api";

/// Terraform target that creates only the container registry.
pub const REGISTRY_TARGET: &str = "module.ecr";

/// Terraform output holding the registry repository URL.
pub const REGISTRY_URL_OUTPUT: &str = "ecr_repo_url";

/// Body the status sub-path returns once the API is live.
pub const STATUS_TOKEN: &str = "ok";

// ── Flavors ──────────────────────────────────────────────────────────────────

/// Deployment flavor selected by the variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Flavor {
    /// Zip-packaged function behind the primary domain.
    Default,
    /// Container-image function; the image is built, smoke-tested and pushed first.
    Docker,
    /// Default flavor plus an alternate custom domain.
    AltDomain,
}

/// How the deployed endpoint is checked once the full plan is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndpointCheck {
    /// `GET /status` must return 200 with body [`STATUS_TOKEN`].
    StatusToken,
    /// `GET /` must return 200 with the same body the local container returned.
    MatchesLocalImage,
}

/// Steps enabled for one flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlavorPlan {
    pub flavor: Flavor,
    /// Variant name that selects this flavor, `None` for the fallback.
    pub variant: Option<&'static str>,
    /// Build, smoke-test and push a container image before the full apply.
    pub container_image: bool,
    /// Validate the alternate domain outputs.
    pub alternate_domain: bool,
    pub endpoint: EndpointCheck,
}

/// Flavor dispatch table. The last entry is the fallback for unknown names.
pub const FLAVOR_PLANS: &[FlavorPlan] = &[
    FlavorPlan {
        flavor: Flavor::Docker,
        variant: Some("docker"),
        container_image: true,
        alternate_domain: false,
        endpoint: EndpointCheck::MatchesLocalImage,
    },
    FlavorPlan {
        flavor: Flavor::AltDomain,
        variant: Some("alt-domain"),
        container_image: false,
        alternate_domain: true,
        endpoint: EndpointCheck::StatusToken,
    },
    FlavorPlan {
        flavor: Flavor::Default,
        variant: None,
        container_image: false,
        alternate_domain: false,
        endpoint: EndpointCheck::StatusToken,
    },
];

impl Flavor {
    /// Resolve the flavor for a variant name.
    #[must_use]
    pub fn from_variant(name: &str) -> Self {
        FLAVOR_PLANS
            .iter()
            .find(|plan| plan.variant == Some(name))
            .map_or(Flavor::Default, |plan| plan.flavor)
    }

    /// The dispatch table entry for this flavor.
    #[must_use]
    pub fn plan(self) -> &'static FlavorPlan {
        FLAVOR_PLANS
            .iter()
            .find(|plan| plan.flavor == self)
            .unwrap_or(&FLAVOR_PLANS[FLAVOR_PLANS.len() - 1])
    }
}

impl std::fmt::Display for Flavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Flavor::Default => "default",
            Flavor::Docker => "docker",
            Flavor::AltDomain => "alt-domain",
        })
    }
}

// ── Variant ──────────────────────────────────────────────────────────────────

/// A named example configuration of the module under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    name: String,
    flavor: Flavor,
}

impl Variant {
    /// Parse and validate a variant name.
    ///
    /// Names become a directory under the examples root and part of DNS
    /// labels, so only `^[a-z0-9][a-z0-9-]*$` is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`VariantError::InvalidName`] for anything else.
    pub fn parse(name: &str) -> Result<Self, VariantError> {
        validate_variant_name(name)?;
        Ok(Self {
            name: name.to_owned(),
            flavor: Flavor::from_variant(name),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    #[must_use]
    pub fn plan(&self) -> &'static FlavorPlan {
        self.flavor.plan()
    }

    /// `ex-tf-lambda-api-<variant>`
    #[must_use]
    pub fn resource_name(&self) -> String {
        format!("{RESOURCE_PREFIX}-{}", self.name)
    }

    /// `<resource-name>.<hosted-zone>`
    #[must_use]
    pub fn domain_name(&self, hosted_zone: &str) -> String {
        format!("{}.{hosted_zone}", self.resource_name())
    }

    /// Log group the function writes to. Destroy leaves it behind.
    #[must_use]
    pub fn log_group_name(&self) -> String {
        format!("/aws/lambda/{}", self.resource_name())
    }

    /// Terraform working directory for this variant.
    #[must_use]
    pub fn terraform_dir(&self, examples_root: &Path) -> PathBuf {
        examples_root.join(&self.name)
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// ARN prefix every API Gateway HTTP API in `region` shares.
#[must_use]
pub fn api_arn_prefix(region: &str) -> String {
    format!("arn:aws:apigateway:{region}::/apis/")
}

fn validate_variant_name(name: &str) -> Result<(), VariantError> {
    let mut chars = name.chars();
    let valid_first = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    let valid_rest = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid_first && valid_rest {
        Ok(())
    } else {
        Err(VariantError::InvalidName(name.to_owned()))
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
