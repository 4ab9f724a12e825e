// trust-forge-core/tests/proptest_determinism.rs
// ============================================================================
// Module: Compile Determinism Property-Based Tests
// Description: Property tests for order-independent descriptor output.
// Purpose: Detect ordering leaks from input lists into emitted descriptors.
// ============================================================================

//! Property-based tests for compile determinism.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use proptest::prelude::*;
use trust_forge_core::CompileInput;
use trust_forge_core::ProviderSpec;
use trust_forge_core::ServiceAccountSpec;
use trust_forge_core::compile;

mod common;

fn providers() -> Vec<ProviderSpec> {
    vec![
        common::github_provider("github-actions"),
        common::github_provider("github-release"),
        common::custom_oidc_provider("corp-idp", &["platform", "sre"]),
        common::custom_oidc_provider("partner-idp", &["vendor"]),
    ]
}

fn accounts(roles: &[&str]) -> Vec<ServiceAccountSpec> {
    vec![
        common::service_account("deployer", roles, vec![
            common::binding("github-actions", &[]),
            common::binding("github-release", &["roles/run.admin", "roles/viewer"]),
        ]),
        common::service_account("auditor", &["roles/viewer"], vec![
            common::binding("corp-idp", &[]),
            common::binding("partner-idp", &["roles/logging.viewer"]),
        ]),
        common::service_account("builder", &["roles/artifactregistry.writer"], vec![
            common::binding("github-actions", &["roles/viewer", "roles/run.admin"]),
        ]),
    ]
}

const DEPLOYER_ROLES: [&str; 3] =
    ["roles/run.admin", "roles/iam.serviceAccountUser", "roles/viewer"];

fn baseline() -> CompileInput {
    CompileInput {
        pool: common::pool(),
        providers: providers(),
        service_accounts: accounts(&DEPLOYER_ROLES),
    }
}

proptest! {
    #[test]
    fn shuffled_inputs_compile_to_identical_bytes(
        provider_order in Just(providers()).prop_shuffle(),
        account_order in Just((0 .. 3).collect::<Vec<usize>>()).prop_shuffle(),
        role_order in Just(DEPLOYER_ROLES.to_vec()).prop_shuffle(),
    ) {
        let base = compile(&baseline()).unwrap();
        let accounts = accounts(&role_order);
        let input = CompileInput {
            pool: common::pool(),
            providers: provider_order,
            service_accounts: account_order.iter().map(|index| accounts[*index].clone()).collect(),
        };
        let shuffled = compile(&input).unwrap();
        prop_assert_eq!(shuffled.canonical_json().unwrap(), base.canonical_json().unwrap());
        prop_assert_eq!(shuffled.digest().unwrap(), base.digest().unwrap());
    }

    #[test]
    fn arbitrary_identifiers_compile_the_same_way_twice(
        provider_id in "[a-zA-Z0-9_-]{0,40}",
        account_id in "[a-z0-9@.-]{0,40}",
        role in "[a-z./]{0,20}",
    ) {
        let input = CompileInput {
            pool: common::pool(),
            providers: vec![common::github_provider(&provider_id)],
            service_accounts: vec![common::service_account(&account_id, &[role.as_str()], vec![
                common::binding(&provider_id, &[]),
            ])],
        };
        prop_assert_eq!(compile(&input), compile(&input));
    }
}
