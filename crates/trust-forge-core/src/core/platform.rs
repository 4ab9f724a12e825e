// trust-forge-core/src/core/platform.rs
// ============================================================================
// Module: Trust Forge Platform Catalog
// Description: Static per-platform issuer, audience, and claim-mapping defaults.
// Purpose: Single immutable table the normalizer resolves defaults from.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Each CI/CD platform has a well-known token issuer, an expected audience,
//! and a claim layout. Templates use `{placeholder}` segments that the
//! normalizer fills from the provider's platform fields; a template with any
//! unresolved placeholder yields nothing rather than a partial URL.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Platform Kind
// ============================================================================

/// Provider type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformKind {
    /// GitHub Actions.
    Github,
    /// GitLab CI.
    Gitlab,
    /// Azure DevOps.
    AzureDevops,
    /// Terraform Cloud / Enterprise.
    TerraformCloud,
    /// Jenkins with the OIDC provider plugin.
    Jenkins,
    /// CircleCI.
    Circleci,
    /// Bitbucket Pipelines.
    Bitbucket,
    /// Spinnaker behind an OIDC issuer.
    Spinnaker,
    /// Harness.
    Harness,
    /// AWS CodeBuild (AWS provider).
    AwsCodebuild,
    /// Generic OIDC issuer.
    CustomOidc,
    /// No platform configured; explicit overrides only.
    Custom,
}

impl PlatformKind {
    /// All tags in catalog order.
    pub const ALL: [Self; 12] = [
        Self::Github,
        Self::Gitlab,
        Self::AzureDevops,
        Self::TerraformCloud,
        Self::Jenkins,
        Self::Circleci,
        Self::Bitbucket,
        Self::Spinnaker,
        Self::Harness,
        Self::AwsCodebuild,
        Self::CustomOidc,
        Self::Custom,
    ];

    /// Returns the snake_case tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Gitlab => "gitlab",
            Self::AzureDevops => "azure_devops",
            Self::TerraformCloud => "terraform_cloud",
            Self::Jenkins => "jenkins",
            Self::Circleci => "circleci",
            Self::Bitbucket => "bitbucket",
            Self::Spinnaker => "spinnaker",
            Self::Harness => "harness",
            Self::AwsCodebuild => "aws_codebuild",
            Self::CustomOidc => "custom_oidc",
            Self::Custom => "custom",
        }
    }

    /// Parses a tag, returning `None` for unknown tags.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }

    /// Returns the catalog defaults for this platform.
    #[must_use]
    pub const fn defaults(self) -> &'static PlatformDefaults {
        match self {
            Self::Github => &GITHUB,
            Self::Gitlab => &GITLAB,
            Self::AzureDevops => &AZURE_DEVOPS,
            Self::TerraformCloud => &TERRAFORM_CLOUD,
            Self::Jenkins => &JENKINS,
            Self::Circleci => &CIRCLECI,
            Self::Bitbucket => &BITBUCKET,
            Self::Spinnaker => &SPINNAKER,
            Self::Harness => &HARNESS,
            Self::AwsCodebuild => &AWS_CODEBUILD,
            Self::CustomOidc => &CUSTOM_OIDC,
            Self::Custom => &CUSTOM,
        }
    }

    /// Returns true for platforms federated through an AWS provider.
    #[must_use]
    pub const fn is_aws(self) -> bool {
        matches!(self, Self::AwsCodebuild)
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Catalog Entries
// ============================================================================

/// Static defaults for one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformDefaults {
    /// Platform tag.
    pub kind: PlatformKind,
    /// Issuer URL template.
    pub issuer_template: Option<&'static str>,
    /// Audience templates.
    pub audience_templates: &'static [&'static str],
    /// Default `(target attribute, assertion expression)` mapping.
    pub claim_mapping: &'static [(&'static str, &'static str)],
}

/// Lookup surface over the static catalog.
pub struct PlatformCatalog;

impl PlatformCatalog {
    /// Returns defaults for a platform tag; unknown tags get `custom` defaults.
    #[must_use]
    pub fn lookup(tag: &str) -> &'static PlatformDefaults {
        PlatformKind::from_tag(tag).map_or(&CUSTOM, PlatformKind::defaults)
    }
}

/// GitHub Actions defaults.
const GITHUB: PlatformDefaults = PlatformDefaults {
    kind: PlatformKind::Github,
    issuer_template: Some("https://token.actions.githubusercontent.com"),
    audience_templates: &[],
    claim_mapping: &[
        ("google.subject", "assertion.sub"),
        ("attribute.actor", "assertion.actor"),
        ("attribute.repository", "assertion.repository"),
        ("attribute.repository_owner", "assertion.repository_owner"),
        ("attribute.ref", "assertion.ref"),
        ("attribute.environment", "assertion.environment"),
        ("attribute.workflow_ref", "assertion.workflow_ref"),
    ],
};

/// GitLab CI defaults.
const GITLAB: PlatformDefaults = PlatformDefaults {
    kind: PlatformKind::Gitlab,
    issuer_template: Some("{url}"),
    audience_templates: &["{url}"],
    claim_mapping: &[
        ("google.subject", "assertion.sub"),
        ("attribute.namespace_path", "assertion.namespace_path"),
        ("attribute.project_path", "assertion.project_path"),
        ("attribute.ref", "assertion.ref"),
        ("attribute.ref_type", "assertion.ref_type"),
        ("attribute.ref_protected", "assertion.ref_protected"),
        ("attribute.environment", "assertion.environment"),
        ("attribute.user_login", "assertion.user_login"),
    ],
};

/// Azure DevOps defaults.
const AZURE_DEVOPS: PlatformDefaults = PlatformDefaults {
    kind: PlatformKind::AzureDevops,
    issuer_template: Some("https://vstoken.dev.azure.com/{organization_id}"),
    audience_templates: &["api://AzureADTokenExchange"],
    claim_mapping: &[("google.subject", "assertion.sub")],
};

/// Terraform Cloud defaults.
const TERRAFORM_CLOUD: PlatformDefaults = PlatformDefaults {
    kind: PlatformKind::TerraformCloud,
    issuer_template: Some("https://{hostname}"),
    audience_templates: &[],
    claim_mapping: &[
        ("google.subject", "assertion.sub"),
        ("attribute.terraform_organization_name", "assertion.terraform_organization_name"),
        ("attribute.terraform_project_name", "assertion.terraform_project_name"),
        ("attribute.terraform_workspace_name", "assertion.terraform_workspace_name"),
        ("attribute.terraform_run_phase", "assertion.terraform_run_phase"),
    ],
};

/// Jenkins defaults.
const JENKINS: PlatformDefaults = PlatformDefaults {
    kind: PlatformKind::Jenkins,
    issuer_template: Some("{url}/oidc"),
    audience_templates: &[],
    claim_mapping: &[
        ("google.subject", "assertion.sub"),
        ("attribute.build_number", "assertion.build_number"),
    ],
};

/// CircleCI defaults.
const CIRCLECI: PlatformDefaults = PlatformDefaults {
    kind: PlatformKind::Circleci,
    issuer_template: Some("https://oidc.circleci.com/org/{organization_id}"),
    audience_templates: &["{organization_id}"],
    claim_mapping: &[
        ("google.subject", "assertion.sub"),
        ("attribute.project_id", "assertion['oidc.circleci.com/project-id']"),
        ("attribute.vcs_ref", "assertion['oidc.circleci.com/vcs-ref']"),
        ("attribute.context_ids", "assertion['oidc.circleci.com/context-ids']"),
    ],
};

/// Bitbucket Pipelines defaults.
const BITBUCKET: PlatformDefaults = PlatformDefaults {
    kind: PlatformKind::Bitbucket,
    issuer_template: Some(
        "https://api.bitbucket.org/2.0/workspaces/{workspace}/pipelines-config/identity/oidc",
    ),
    audience_templates: &["ari:cloud:bitbucket::workspace/{workspace_uuid}"],
    claim_mapping: &[
        ("google.subject", "assertion.sub"),
        ("attribute.repository_uuid", "assertion.repositoryUuid"),
        ("attribute.branch_name", "assertion.branchName"),
        ("attribute.deployment_environment_uuid", "assertion.deploymentEnvironmentUuid"),
    ],
};

/// Spinnaker defaults.
const SPINNAKER: PlatformDefaults = PlatformDefaults {
    kind: PlatformKind::Spinnaker,
    issuer_template: Some("{issuer_url}"),
    audience_templates: &[],
    claim_mapping: &[
        ("google.subject", "assertion.sub"),
        ("attribute.application", "assertion.application"),
        ("attribute.account", "assertion.account"),
    ],
};

/// Harness defaults.
const HARNESS: PlatformDefaults = PlatformDefaults {
    kind: PlatformKind::Harness,
    issuer_template: Some("https://app.harness.io/ng/api/oidc/account/{account_id}"),
    audience_templates: &["https://app.harness.io"],
    claim_mapping: &[
        ("google.subject", "assertion.sub"),
        ("attribute.organization_id", "assertion.organization_id"),
        ("attribute.project_id", "assertion.project_id"),
        ("attribute.pipeline_id", "assertion.pipeline_id"),
    ],
};

/// AWS CodeBuild defaults (AWS provider, no issuer).
const AWS_CODEBUILD: PlatformDefaults = PlatformDefaults {
    kind: PlatformKind::AwsCodebuild,
    issuer_template: None,
    audience_templates: &[],
    claim_mapping: &[
        ("google.subject", "assertion.arn"),
        ("attribute.aws_role", "assertion.arn.extract('assumed-role/{role}/')"),
        ("attribute.account", "assertion.account"),
    ],
};

/// Generic OIDC defaults; claims come from the provider's own settings.
const CUSTOM_OIDC: PlatformDefaults = PlatformDefaults {
    kind: PlatformKind::CustomOidc,
    issuer_template: None,
    audience_templates: &[],
    claim_mapping: &[("google.subject", "assertion.sub")],
};

/// Defaults for providers with no platform and for unknown tags.
const CUSTOM: PlatformDefaults = PlatformDefaults {
    kind: PlatformKind::Custom,
    issuer_template: None,
    audience_templates: &[],
    claim_mapping: &[],
};

// ============================================================================
// SECTION: Template Interpolation
// ============================================================================

/// Fills `{placeholder}` segments using `resolve`.
///
/// Returns `None` when any placeholder has no value or a brace is unbalanced.
pub fn interpolate<'v>(
    template: &str,
    mut resolve: impl FnMut(&str) -> Option<&'v str>,
) -> Option<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[.. open]);
        let after = &rest[open + 1 ..];
        let close = after.find('}')?;
        out.push_str(resolve(&after[.. close])?);
        rest = &after[close + 1 ..];
    }
    if rest.contains('}') {
        return None;
    }
    out.push_str(rest);
    Some(out)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::PlatformCatalog;
    use super::PlatformKind;
    use super::interpolate;

    #[test]
    fn every_tag_round_trips() {
        for kind in PlatformKind::ALL {
            assert_eq!(PlatformKind::from_tag(kind.as_str()), Some(kind));
            assert_eq!(PlatformCatalog::lookup(kind.as_str()).kind, kind);
        }
    }

    #[test]
    fn interpolation_requires_every_placeholder() {
        let filled = interpolate("https://x/{a}/{b}", |key| match key {
            "a" => Some("one"),
            "b" => Some("two"),
            _ => None,
        });
        assert_eq!(filled.as_deref(), Some("https://x/one/two"));
        assert_eq!(interpolate("https://x/{a}/{c}", |key| (key == "a").then_some("one")), None);
        assert_eq!(interpolate("{unterminated", |_| Some("x")), None);
    }
}
