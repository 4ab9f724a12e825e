// trust-forge-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payloads.
// Purpose: Deterministic examples for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example `trust-forge.toml`. The example is kept compilable: it
//! parses, passes structural validation, and compiles without errors.

/// Returns a canonical example `trust-forge.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[pool]
id = "ci-pool"
project_number = "123456789012"
display_name = "CI pool"
description = "Federated identities for CI/CD pipelines"

[audit]
sink = "none"
# sink = "file"
# path = "trust-forge-audit.jsonl"

[[providers]]
id = "github-actions"
display_name = "GitHub Actions"

[providers.github]
organization = "acme"
repositories = ["app", "infra"]
branches = ["main"]
environments = ["production"]

[[providers]]
id = "gitlab-ci"

[providers.gitlab]
namespace_path = "acme"
project_paths = ["acme/platform"]
branches = ["main"]

[[providers]]
id = "corp-idp"
display_name = "Corporate IdP"

[providers.custom_oidc]
issuer_uri = "https://idp.example.com"
allowed_audiences = ["trust-forge"]
claims = ["team"]
allowed_claims = { team = ["platform", "sre"] }

[[service_accounts]]
id = "deployer"
roles = ["roles/run.admin", "roles/iam.serviceAccountUser"]

[[service_accounts.bindings]]
provider_id = "github-actions"

[[service_accounts.bindings]]
provider_id = "github-actions"
extra_condition = "repository/acme/infra"
roles = ["roles/storage.admin"]

[[service_accounts.bindings]]
provider_id = "gitlab-ci"

[[service_accounts]]
id = "auditor"
roles = ["roles/viewer"]

[[service_accounts.bindings]]
provider_id = "corp-idp"
"#,
    )
}
