// trust-forge-core/tests/common/mod.rs
// =============================================================================
// Module: Core Test Helpers
// Description: Shared fixtures for compile pipeline tests.
// Purpose: Reduce duplication across integration tests for trust-forge-core.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use trust_forge_core::Binding;
use trust_forge_core::CompileError;
use trust_forge_core::CompileErrors;
use trust_forge_core::CompileInput;
use trust_forge_core::CustomOidcConfig;
use trust_forge_core::GithubConfig;
use trust_forge_core::PoolId;
use trust_forge_core::PoolSettings;
use trust_forge_core::ProviderId;
use trust_forge_core::ProviderSpec;
use trust_forge_core::ServiceAccountId;
use trust_forge_core::ServiceAccountSpec;

/// Returns a pool with attribute conditions enabled.
pub fn pool() -> PoolSettings {
    PoolSettings {
        id: PoolId::new("ci-pool"),
        project_number: "123456789012".to_string(),
        display_name: Some("CI pool".to_string()),
        description: None,
        disabled: false,
        attribute_conditions: true,
    }
}

/// Returns a GitHub provider restricted to `acme/app` on `main`.
pub fn github_provider(id: &str) -> ProviderSpec {
    let mut spec = ProviderSpec::new(id);
    spec.github = Some(GithubConfig {
        organization: Some("acme".to_string()),
        repositories: vec!["app".to_string()],
        branches: vec!["main".to_string()],
        environments: Vec::new(),
    });
    spec
}

/// Returns a custom OIDC provider matching `team` in the given values.
pub fn custom_oidc_provider(id: &str, teams: &[&str]) -> ProviderSpec {
    let mut config = CustomOidcConfig {
        issuer_uri: Some("https://idp.example.com".to_string()),
        ..CustomOidcConfig::default()
    };
    config
        .allowed_claims
        .insert("team".to_string(), teams.iter().map(|team| (*team).to_string()).collect());
    let mut spec = ProviderSpec::new(id);
    spec.custom_oidc = Some(config);
    spec
}

/// Returns a binding to `provider` with the given roles.
pub fn binding(provider: &str, roles: &[&str]) -> Binding {
    Binding {
        provider_id: ProviderId::new(provider),
        extra_condition: None,
        roles: roles.iter().map(|role| (*role).to_string()).collect(),
    }
}

/// Returns a service account with account-level roles and bindings.
pub fn service_account(id: &str, roles: &[&str], bindings: Vec<Binding>) -> ServiceAccountSpec {
    ServiceAccountSpec {
        id: ServiceAccountId::new(id),
        roles: roles.iter().map(|role| (*role).to_string()).collect(),
        bindings,
    }
}

/// Returns a valid input with one GitHub provider and one deployer account.
pub fn sample_input() -> CompileInput {
    CompileInput {
        pool: pool(),
        providers: vec![github_provider("github-actions")],
        service_accounts: vec![service_account(
            "deployer",
            &["roles/run.admin"],
            vec![binding("github-actions", &[])],
        )],
    }
}

/// Returns the error kind labels.
pub fn kinds(errors: &CompileErrors) -> Vec<&'static str> {
    errors.errors().iter().map(CompileError::kind).collect()
}
