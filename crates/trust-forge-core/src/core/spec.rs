// trust-forge-core/src/core/spec.rs
// ============================================================================
// Module: Trust Forge Input Specifications
// Description: Pool, provider, and service-account trust configuration.
// Purpose: Canonical serde model supplied by the config-loading layer.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Provider specs carry one optional field per CI/CD platform. Exactly one may
//! be populated; [`ProviderSpec::variant`] turns that field set into the
//! [`PlatformVariant`] sum type consumed by the normalizer and the condition
//! synthesizer. No field here is trusted until the compiler validates it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::error::CompileError;
use crate::core::identifiers::PoolId;
use crate::core::identifiers::ProviderId;
use crate::core::identifiers::ServiceAccountId;
use crate::core::platform::PlatformKind;

// ============================================================================
// SECTION: Compile Input
// ============================================================================

/// Complete input for one federation compile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompileInput {
    /// Pool settings.
    pub pool: PoolSettings,
    /// Provider specifications.
    #[serde(default)]
    pub providers: Vec<ProviderSpec>,
    /// Service accounts and their federated bindings.
    #[serde(default)]
    pub service_accounts: Vec<ServiceAccountSpec>,
}

/// Workload identity pool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolSettings {
    /// Pool identifier.
    pub id: PoolId,
    /// Numeric project that owns the pool; used in principal-set members.
    pub project_number: String,
    /// Optional display name (defaults to the pool id).
    #[serde(default)]
    pub display_name: Option<String>,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the pool is disabled.
    #[serde(default)]
    pub disabled: bool,
    /// Whether providers may carry attribute conditions.
    #[serde(default = "default_attribute_conditions")]
    pub attribute_conditions: bool,
}

/// Default for [`PoolSettings::attribute_conditions`].
const fn default_attribute_conditions() -> bool {
    true
}

// ============================================================================
// SECTION: Provider Spec
// ============================================================================

/// One external identity provider in the pool.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSpec {
    /// Provider identifier, unique within the pool.
    pub id: ProviderId,
    /// Optional display name (defaults to the provider id).
    #[serde(default)]
    pub display_name: Option<String>,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the provider is disabled.
    #[serde(default)]
    pub disabled: bool,
    /// GitHub Actions settings.
    #[serde(default)]
    pub github: Option<GithubConfig>,
    /// GitLab CI settings.
    #[serde(default)]
    pub gitlab: Option<GitlabConfig>,
    /// Azure DevOps settings.
    #[serde(default)]
    pub azure_devops: Option<AzureDevopsConfig>,
    /// Terraform Cloud settings.
    #[serde(default)]
    pub terraform_cloud: Option<TerraformCloudConfig>,
    /// Jenkins settings.
    #[serde(default)]
    pub jenkins: Option<JenkinsConfig>,
    /// CircleCI settings.
    #[serde(default)]
    pub circleci: Option<CircleciConfig>,
    /// Bitbucket Pipelines settings.
    #[serde(default)]
    pub bitbucket: Option<BitbucketConfig>,
    /// Spinnaker settings.
    #[serde(default)]
    pub spinnaker: Option<SpinnakerConfig>,
    /// Harness settings.
    #[serde(default)]
    pub harness: Option<HarnessConfig>,
    /// AWS CodeBuild settings.
    #[serde(default)]
    pub aws_codebuild: Option<AwsCodebuildConfig>,
    /// Generic OIDC issuer settings.
    #[serde(default)]
    pub custom_oidc: Option<CustomOidcConfig>,
    /// Explicit issuer override.
    #[serde(default)]
    pub issuer_uri: Option<String>,
    /// Explicit audience override (ignored when empty).
    #[serde(default)]
    pub allowed_audiences: Vec<String>,
    /// Explicit attribute mapping entries, applied last.
    #[serde(default)]
    pub attribute_mapping: BTreeMap<String, String>,
    /// Explicit condition that replaces synthesized clauses.
    #[serde(default)]
    pub condition: Option<String>,
    /// Opt-in to trusting every identity from the issuer.
    #[serde(default)]
    pub unrestricted: bool,
}

impl ProviderSpec {
    /// Creates an empty spec with only an id set.
    #[must_use]
    pub fn new(id: impl Into<ProviderId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Resolves the populated platform field into a [`PlatformVariant`].
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::ConfigAmbiguity`] naming every populated
    /// platform when more than one is set.
    pub fn variant(&self) -> Result<PlatformVariant<'_>, CompileError> {
        let candidates = [
            self.github.as_ref().map(PlatformVariant::Github),
            self.gitlab.as_ref().map(PlatformVariant::Gitlab),
            self.azure_devops.as_ref().map(PlatformVariant::AzureDevops),
            self.terraform_cloud.as_ref().map(PlatformVariant::TerraformCloud),
            self.jenkins.as_ref().map(PlatformVariant::Jenkins),
            self.circleci.as_ref().map(PlatformVariant::Circleci),
            self.bitbucket.as_ref().map(PlatformVariant::Bitbucket),
            self.spinnaker.as_ref().map(PlatformVariant::Spinnaker),
            self.harness.as_ref().map(PlatformVariant::Harness),
            self.aws_codebuild.as_ref().map(PlatformVariant::AwsCodebuild),
            self.custom_oidc.as_ref().map(PlatformVariant::CustomOidc),
        ];
        let mut populated = candidates.into_iter().flatten();
        let Some(first) = populated.next() else {
            return Ok(PlatformVariant::Custom);
        };
        let rest: Vec<PlatformVariant<'_>> = populated.collect();
        if rest.is_empty() {
            return Ok(first);
        }
        let tags: Vec<&str> = std::iter::once(&first)
            .chain(rest.iter())
            .map(|variant| variant.kind().as_str())
            .collect();
        Err(CompileError::ambiguity(
            format!("provider {}", self.id),
            format!("multiple platform variants set: {}", tags.join(", ")),
        ))
    }
}

// ============================================================================
// SECTION: Platform Variant
// ============================================================================

/// The single platform configuration of a provider spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformVariant<'a> {
    /// GitHub Actions.
    Github(&'a GithubConfig),
    /// GitLab CI.
    Gitlab(&'a GitlabConfig),
    /// Azure DevOps.
    AzureDevops(&'a AzureDevopsConfig),
    /// Terraform Cloud.
    TerraformCloud(&'a TerraformCloudConfig),
    /// Jenkins.
    Jenkins(&'a JenkinsConfig),
    /// CircleCI.
    Circleci(&'a CircleciConfig),
    /// Bitbucket Pipelines.
    Bitbucket(&'a BitbucketConfig),
    /// Spinnaker.
    Spinnaker(&'a SpinnakerConfig),
    /// Harness.
    Harness(&'a HarnessConfig),
    /// AWS CodeBuild.
    AwsCodebuild(&'a AwsCodebuildConfig),
    /// Generic OIDC issuer.
    CustomOidc(&'a CustomOidcConfig),
    /// No platform field populated.
    Custom,
}

impl PlatformVariant<'_> {
    /// Returns the platform tag.
    #[must_use]
    pub const fn kind(&self) -> PlatformKind {
        match self {
            Self::Github(_) => PlatformKind::Github,
            Self::Gitlab(_) => PlatformKind::Gitlab,
            Self::AzureDevops(_) => PlatformKind::AzureDevops,
            Self::TerraformCloud(_) => PlatformKind::TerraformCloud,
            Self::Jenkins(_) => PlatformKind::Jenkins,
            Self::Circleci(_) => PlatformKind::Circleci,
            Self::Bitbucket(_) => PlatformKind::Bitbucket,
            Self::Spinnaker(_) => PlatformKind::Spinnaker,
            Self::Harness(_) => PlatformKind::Harness,
            Self::AwsCodebuild(_) => PlatformKind::AwsCodebuild,
            Self::CustomOidc(_) => PlatformKind::CustomOidc,
            Self::Custom => PlatformKind::Custom,
        }
    }

    /// Returns the value for a catalog template placeholder.
    ///
    /// Blank values count as absent. Platforms with a well-known public
    /// endpoint fall back to it when the field is unset.
    #[must_use]
    pub fn template_value(&self, placeholder: &str) -> Option<&str> {
        let value = match (self, placeholder) {
            (Self::Gitlab(config), "url") => {
                Some(config.url.as_deref().unwrap_or(DEFAULT_GITLAB_URL))
            }
            (Self::AzureDevops(config), "organization") => config.organization.as_deref(),
            (Self::AzureDevops(config), "organization_id") => config.organization_id.as_deref(),
            (Self::TerraformCloud(config), "hostname") => {
                Some(config.hostname.as_deref().unwrap_or(DEFAULT_TERRAFORM_HOSTNAME))
            }
            (Self::Jenkins(config), "url") => config.url.as_deref(),
            (Self::Circleci(config), "organization_id") => config.organization_id.as_deref(),
            (Self::Bitbucket(config), "workspace") => config.workspace.as_deref(),
            (Self::Bitbucket(config), "workspace_uuid") => config.workspace_uuid.as_deref(),
            (Self::Spinnaker(config), "issuer_url") => config.issuer_url.as_deref(),
            (Self::Harness(config), "account_id") => config.account_id.as_deref(),
            _ => None,
        };
        value.map(str::trim).filter(|value| !value.is_empty())
    }
}

/// Public GitLab endpoint used when no self-managed URL is configured.
pub const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";
/// Terraform Cloud hostname used when no Enterprise host is configured.
pub const DEFAULT_TERRAFORM_HOSTNAME: &str = "app.terraform.io";

// ============================================================================
// SECTION: Platform Configurations
// ============================================================================

/// GitHub Actions trust settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GithubConfig {
    /// Repository owner (organization or user).
    #[serde(default)]
    pub organization: Option<String>,
    /// Allowed repositories, bare or `owner/name`.
    #[serde(default)]
    pub repositories: Vec<String>,
    /// Allowed branches, bare or full `refs/` paths.
    #[serde(default)]
    pub branches: Vec<String>,
    /// Allowed deployment environments.
    #[serde(default)]
    pub environments: Vec<String>,
}

/// GitLab CI trust settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitlabConfig {
    /// Instance URL for self-managed GitLab.
    #[serde(default)]
    pub url: Option<String>,
    /// Top-level group or user namespace.
    #[serde(default)]
    pub namespace_path: Option<String>,
    /// Allowed `group/project` paths.
    #[serde(default)]
    pub project_paths: Vec<String>,
    /// Allowed branch names.
    #[serde(default)]
    pub branches: Vec<String>,
    /// Allowed deployment environments.
    #[serde(default)]
    pub environments: Vec<String>,
}

/// Azure DevOps trust settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AzureDevopsConfig {
    /// Organization name as it appears in the token subject.
    #[serde(default)]
    pub organization: Option<String>,
    /// Organization GUID used in the issuer URL.
    #[serde(default)]
    pub organization_id: Option<String>,
    /// Allowed projects.
    #[serde(default)]
    pub projects: Vec<String>,
    /// Allowed service connections.
    #[serde(default)]
    pub service_connections: Vec<String>,
}

/// Terraform Cloud trust settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TerraformCloudConfig {
    /// Terraform Enterprise hostname.
    #[serde(default)]
    pub hostname: Option<String>,
    /// Organization name.
    #[serde(default)]
    pub organization: Option<String>,
    /// Allowed projects.
    #[serde(default)]
    pub projects: Vec<String>,
    /// Allowed workspaces.
    #[serde(default)]
    pub workspaces: Vec<String>,
    /// Allowed run phases (`plan`, `apply`).
    #[serde(default)]
    pub run_phases: Vec<String>,
}

/// Jenkins OIDC plugin trust settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JenkinsConfig {
    /// Jenkins root URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Allowed job URLs (token subjects).
    #[serde(default)]
    pub jobs: Vec<String>,
}

/// CircleCI trust settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CircleciConfig {
    /// Organization id.
    #[serde(default)]
    pub organization_id: Option<String>,
    /// Allowed project ids.
    #[serde(default)]
    pub project_ids: Vec<String>,
    /// Allowed branches.
    #[serde(default)]
    pub branches: Vec<String>,
}

/// Bitbucket Pipelines trust settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BitbucketConfig {
    /// Workspace slug used in the issuer URL.
    #[serde(default)]
    pub workspace: Option<String>,
    /// Workspace UUID used in the audience.
    #[serde(default)]
    pub workspace_uuid: Option<String>,
    /// Allowed repository UUIDs.
    #[serde(default)]
    pub repository_uuids: Vec<String>,
    /// Allowed branches.
    #[serde(default)]
    pub branches: Vec<String>,
    /// Allowed deployment environment UUIDs.
    #[serde(default)]
    pub deployment_environment_uuids: Vec<String>,
}

/// Spinnaker trust settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpinnakerConfig {
    /// Token issuer URL fronting Spinnaker.
    #[serde(default)]
    pub issuer_url: Option<String>,
    /// Allowed applications.
    #[serde(default)]
    pub applications: Vec<String>,
    /// Allowed cloud accounts.
    #[serde(default)]
    pub accounts: Vec<String>,
}

/// Harness trust settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    /// Harness account id.
    #[serde(default)]
    pub account_id: Option<String>,
    /// Allowed organization ids.
    #[serde(default)]
    pub organization_ids: Vec<String>,
    /// Allowed project ids.
    #[serde(default)]
    pub project_ids: Vec<String>,
    /// Allowed pipeline ids.
    #[serde(default)]
    pub pipeline_ids: Vec<String>,
}

/// AWS CodeBuild trust settings (AWS provider).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AwsCodebuildConfig {
    /// AWS account id.
    #[serde(default)]
    pub account_id: Option<String>,
    /// Allowed assumed-role names.
    #[serde(default)]
    pub role_names: Vec<String>,
}

/// Generic OIDC issuer trust settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomOidcConfig {
    /// Issuer URL.
    #[serde(default)]
    pub issuer_uri: Option<String>,
    /// Allowed audiences.
    #[serde(default)]
    pub allowed_audiences: Vec<String>,
    /// Claims mapped one-to-one into `attribute.<claim>`.
    #[serde(default)]
    pub claims: Vec<String>,
    /// Allowed values per claim.
    #[serde(default)]
    pub allowed_claims: BTreeMap<String, Vec<String>>,
}

// ============================================================================
// SECTION: Service Accounts
// ============================================================================

/// A service account external identities may impersonate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceAccountSpec {
    /// Service account identifier.
    pub id: ServiceAccountId,
    /// Roles granted to the account; default for bindings without roles.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Federated bindings.
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

/// A provider allowed to impersonate a service account.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Binding {
    /// Referenced provider id.
    pub provider_id: ProviderId,
    /// Optional `<attribute>/<value>` narrowing of the principal set.
    #[serde(default)]
    pub extra_condition: Option<String>,
    /// Roles requested through this binding.
    #[serde(default)]
    pub roles: Vec<String>,
}
