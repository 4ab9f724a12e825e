// trust-forge-core/src/runtime/condition.rs
// ============================================================================
// Module: Condition Synthesizer
// Description: Builds provider trust conditions from platform fields.
// Purpose: Emit restrictive CEL conditions and fail closed when none can be built.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Each platform has a clause builder that reads its structured fields and
//! returns zero or more clauses. Clauses are AND-joined; a field that is unset
//! or empty contributes nothing, never a wildcard.
//!
//! Security posture: a provider with no discriminating clause would accept any
//! token from its issuer. That is only allowed with `unrestricted = true`;
//! otherwise synthesis fails with
//! [`CompileError::UnrestrictedTrustWithoutOptIn`]. GitLab providers always
//! carry the protected-ref clause, even with an explicit override.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::AwsCodebuildConfig;
use crate::core::AzureDevopsConfig;
use crate::core::BitbucketConfig;
use crate::core::CircleciConfig;
use crate::core::ClaimPath;
use crate::core::CompileError;
use crate::core::CustomOidcConfig;
use crate::core::GithubConfig;
use crate::core::GitlabConfig;
use crate::core::HarnessConfig;
use crate::core::JenkinsConfig;
use crate::core::PlatformVariant;
use crate::core::ProviderSpec;
use crate::core::SpinnakerConfig;
use crate::core::TerraformCloudConfig;
use crate::core::TrustCondition;
use crate::core::TrustExpr;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Git ref prefix for branches.
const BRANCH_REF_PREFIX: &str = "refs/heads/";
/// CircleCI project-id claim.
const CIRCLECI_PROJECT_CLAIM: &str = "oidc.circleci.com/project-id";
/// CircleCI VCS ref claim.
const CIRCLECI_REF_CLAIM: &str = "oidc.circleci.com/vcs-ref";

// ============================================================================
// SECTION: Synthesis
// ============================================================================

/// Synthesizes the trust condition for one provider.
///
/// Returns `Ok(None)` only when the provider sets `unrestricted = true` and
/// no mandatory clause applies.
///
/// # Errors
///
/// - [`CompileError::ConfigAmbiguity`] for several platform variants, or for
///   `unrestricted` combined with a condition or restricting fields.
/// - [`CompileError::ConfigIncomplete`] when platform fields cannot form a
///   clause (for example Azure projects without an organization) and no
///   explicit condition replaces them.
/// - [`CompileError::UnrestrictedTrustWithoutOptIn`] when nothing restricts
///   the provider and it has not opted in.
pub fn synthesize_condition(spec: &ProviderSpec) -> Result<Option<TrustCondition>, CompileError> {
    let variant = spec.variant()?;
    let subject = format!("provider {}", spec.id);
    let mandatory = mandatory_clauses(&variant);

    // An explicit condition replaces the platform clauses entirely.
    if let Some(explicit) = spec.condition.as_deref() {
        if spec.unrestricted {
            return Err(CompileError::ambiguity(
                &subject,
                "an explicit condition cannot be combined with unrestricted = true",
            ));
        }
        if explicit.trim().is_empty() {
            return Err(CompileError::UnrestrictedTrustWithoutOptIn {
                provider_id: spec.id.clone(),
            });
        }
        let mut parts = vec![TrustExpr::raw(explicit)];
        parts.extend(mandatory);
        return Ok(TrustCondition::new(TrustExpr::all(parts).render()));
    }

    let clauses =
        platform_clauses(&variant).map_err(|detail| CompileError::incomplete(&subject, detail))?;
    let expr = if spec.unrestricted {
        if !clauses.is_empty() {
            return Err(CompileError::ambiguity(
                &subject,
                format!(
                    "unrestricted = true conflicts with {} restricting {} field(s)",
                    clauses.len(),
                    variant.kind()
                ),
            ));
        }
        if mandatory.is_empty() { None } else { Some(TrustExpr::all(mandatory)) }
    } else {
        if clauses.is_empty() {
            return Err(CompileError::UnrestrictedTrustWithoutOptIn {
                provider_id: spec.id.clone(),
            });
        }
        let mut parts = clauses;
        parts.extend(mandatory);
        Some(TrustExpr::all(parts))
    };
    Ok(expr.and_then(|expr| TrustCondition::new(expr.render())))
}

/// Returns the discriminating clauses configured for a platform.
///
/// # Errors
///
/// Returns a description when the fields are present but cannot form a clause.
pub fn platform_clauses(variant: &PlatformVariant<'_>) -> Result<Vec<TrustExpr>, String> {
    let clauses = match variant {
        PlatformVariant::Github(config) => github_clauses(config),
        PlatformVariant::Gitlab(config) => gitlab_clauses(config),
        PlatformVariant::AzureDevops(config) => azure_devops_clauses(config)?,
        PlatformVariant::TerraformCloud(config) => terraform_cloud_clauses(config),
        PlatformVariant::Jenkins(config) => jenkins_clauses(config),
        PlatformVariant::Circleci(config) => circleci_clauses(config),
        PlatformVariant::Bitbucket(config) => bitbucket_clauses(config),
        PlatformVariant::Spinnaker(config) => spinnaker_clauses(config),
        PlatformVariant::Harness(config) => harness_clauses(config),
        PlatformVariant::AwsCodebuild(config) => aws_codebuild_clauses(config),
        PlatformVariant::CustomOidc(config) => custom_claim_clauses(config),
        PlatformVariant::Custom => Vec::new(),
    };
    Ok(clauses)
}

/// Returns clauses that are always appended for a platform.
#[must_use]
pub fn mandatory_clauses(variant: &PlatformVariant<'_>) -> Vec<TrustExpr> {
    match variant {
        PlatformVariant::Gitlab(_) => {
            vec![TrustExpr::equals(ClaimPath::assertion("ref_protected"), "true")]
        }
        _ => Vec::new(),
    }
}

// ============================================================================
// SECTION: Platform Clause Builders
// ============================================================================

/// GitHub: owner, repositories, branch refs, environments.
fn github_clauses(config: &GithubConfig) -> Vec<TrustExpr> {
    let organization = trimmed(config.organization.as_deref());
    let repositories: Vec<String> = cleaned(&config.repositories)
        .into_iter()
        .map(|repo| match organization {
            Some(org) if !repo.contains('/') => format!("{org}/{repo}"),
            _ => repo,
        })
        .collect();
    let refs: Vec<String> = cleaned(&config.branches).into_iter().map(branch_ref).collect();
    [
        organization.map(|org| TrustExpr::equals(ClaimPath::assertion("repository_owner"), org)),
        membership(ClaimPath::assertion("repository"), repositories),
        membership(ClaimPath::assertion("ref"), refs),
        membership(ClaimPath::assertion("environment"), cleaned(&config.environments)),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// GitLab: namespace, projects, branches, environments.
fn gitlab_clauses(config: &GitlabConfig) -> Vec<TrustExpr> {
    [
        trimmed(config.namespace_path.as_deref())
            .map(|path| TrustExpr::equals(ClaimPath::assertion("namespace_path"), path)),
        membership(ClaimPath::assertion("project_path"), cleaned(&config.project_paths)),
        membership(ClaimPath::assertion("ref"), cleaned(&config.branches)),
        membership(ClaimPath::assertion("environment"), cleaned(&config.environments)),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Azure DevOps: service-connection subjects or project subject prefixes.
fn azure_devops_clauses(config: &AzureDevopsConfig) -> Result<Vec<TrustExpr>, String> {
    let projects = cleaned(&config.projects);
    let connections = cleaned(&config.service_connections);
    if projects.is_empty() {
        if connections.is_empty() {
            return Ok(Vec::new());
        }
        return Err("azure_devops service_connections require projects".to_string());
    }
    let Some(organization) = trimmed(config.organization.as_deref()) else {
        return Err("azure_devops projects require organization".to_string());
    };
    let sub = ClaimPath::assertion("sub");
    if connections.is_empty() {
        let prefixes = projects
            .iter()
            .map(|project| {
                TrustExpr::starts_with(sub.clone(), format!("sc://{organization}/{project}/"))
            })
            .collect();
        return Ok(vec![TrustExpr::any(prefixes)]);
    }
    let subjects = projects
        .iter()
        .flat_map(|project| {
            connections
                .iter()
                .map(move |connection| format!("sc://{organization}/{project}/{connection}"))
        })
        .collect();
    Ok(vec![TrustExpr::one_of(sub, subjects)])
}

/// Terraform Cloud: organization, projects, workspaces, run phases.
fn terraform_cloud_clauses(config: &TerraformCloudConfig) -> Vec<TrustExpr> {
    [
        trimmed(config.organization.as_deref()).map(|org| {
            TrustExpr::equals(ClaimPath::assertion("terraform_organization_name"), org)
        }),
        membership(ClaimPath::assertion("terraform_project_name"), cleaned(&config.projects)),
        membership(ClaimPath::assertion("terraform_workspace_name"), cleaned(&config.workspaces)),
        membership(ClaimPath::assertion("terraform_run_phase"), cleaned(&config.run_phases)),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Jenkins: job URL subjects.
fn jenkins_clauses(config: &JenkinsConfig) -> Vec<TrustExpr> {
    membership(ClaimPath::assertion("sub"), cleaned(&config.jobs)).into_iter().collect()
}

/// CircleCI: project ids and branch refs.
fn circleci_clauses(config: &CircleciConfig) -> Vec<TrustExpr> {
    let refs: Vec<String> = cleaned(&config.branches).into_iter().map(branch_ref).collect();
    [
        membership(ClaimPath::assertion(CIRCLECI_PROJECT_CLAIM), cleaned(&config.project_ids)),
        membership(ClaimPath::assertion(CIRCLECI_REF_CLAIM), refs),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Bitbucket: repositories, branches, deployment environments.
fn bitbucket_clauses(config: &BitbucketConfig) -> Vec<TrustExpr> {
    [
        membership(ClaimPath::assertion("repositoryUuid"), cleaned(&config.repository_uuids)),
        membership(ClaimPath::assertion("branchName"), cleaned(&config.branches)),
        membership(
            ClaimPath::assertion("deploymentEnvironmentUuid"),
            cleaned(&config.deployment_environment_uuids),
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Spinnaker: applications and accounts.
fn spinnaker_clauses(config: &SpinnakerConfig) -> Vec<TrustExpr> {
    [
        membership(ClaimPath::assertion("application"), cleaned(&config.applications)),
        membership(ClaimPath::assertion("account"), cleaned(&config.accounts)),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Harness: organizations, projects, pipelines.
fn harness_clauses(config: &HarnessConfig) -> Vec<TrustExpr> {
    [
        membership(ClaimPath::assertion("organization_id"), cleaned(&config.organization_ids)),
        membership(ClaimPath::assertion("project_id"), cleaned(&config.project_ids)),
        membership(ClaimPath::assertion("pipeline_id"), cleaned(&config.pipeline_ids)),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// AWS CodeBuild: assumed-role names.
fn aws_codebuild_clauses(config: &AwsCodebuildConfig) -> Vec<TrustExpr> {
    membership(ClaimPath::attribute("aws_role"), cleaned(&config.role_names)).into_iter().collect()
}

/// Custom OIDC: values OR-joined within a claim, claims AND-joined.
fn custom_claim_clauses(config: &CustomOidcConfig) -> Vec<TrustExpr> {
    config
        .allowed_claims
        .iter()
        .filter_map(|(claim, values)| {
            let values = cleaned(values);
            if values.is_empty() {
                return None;
            }
            let alternatives = values
                .into_iter()
                .map(|value| TrustExpr::equals(ClaimPath::assertion(claim.as_str()), value))
                .collect();
            Some(TrustExpr::any(alternatives))
        })
        .collect()
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds an `in` clause, or nothing for an empty list.
fn membership(claim: ClaimPath, values: Vec<String>) -> Option<TrustExpr> {
    if values.is_empty() { None } else { Some(TrustExpr::one_of(claim, values)) }
}

/// Renders a branch as a full ref path unless it already is one.
fn branch_ref(branch: String) -> String {
    if branch.starts_with("refs/") { branch } else { format!("{BRANCH_REF_PREFIX}{branch}") }
}

/// Trims a value, treating blank as absent.
fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Trims entries, drops blanks and repeats, keeps first-seen order.
fn cleaned(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values.iter().map(|value| value.trim()).filter(|value| !value.is_empty()) {
        if !out.iter().any(|seen| seen == value) {
            out.push(value.to_string());
        }
    }
    out
}
