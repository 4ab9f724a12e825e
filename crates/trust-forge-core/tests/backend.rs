// trust-forge-core/tests/backend.rs
// ============================================================================
// Module: In-Memory Backend Tests
// Description: Per-resource outcomes reported by the in-memory backend.
// Purpose: Validate the backend seam used to hand off compiled descriptors.
// Dependencies: trust-forge-core
// ============================================================================
//! ## Overview
//! Ensures every descriptor maps to a resource reference in apply order and
//! that forced failures surface per resource while whole-set rejections
//! surface as errors.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

use trust_forge_core::BackendError;
use trust_forge_core::IdentityBackend;
use trust_forge_core::InMemoryBackend;
use trust_forge_core::ProviderId;
use trust_forge_core::ResourceRef;
use trust_forge_core::ResourceStatus;
use trust_forge_core::compile;
use trust_forge_core::interfaces::resource_refs;

mod common;

#[test]
fn resource_refs_follow_apply_order() {
    let set = compile(&common::sample_input()).unwrap();
    let labels: Vec<String> = resource_refs(&set).iter().map(ToString::to_string).collect();
    assert_eq!(labels[0], "pool/ci-pool");
    assert_eq!(labels[1], "provider/github-actions");
    assert!(labels[2].starts_with("binding/deployer/github-actions/sha256:"));
    assert_eq!(labels[3], "role_grant/deployer/roles/run.admin");
}

#[test]
fn forced_failures_are_reported_per_resource() {
    let set = compile(&common::sample_input()).unwrap();
    let provider = ResourceRef::Provider {
        provider_id: ProviderId::new("github-actions"),
    };
    let backend = InMemoryBackend::new().fail_resource(provider.clone(), "quota exceeded");
    let report = backend.apply(&set).unwrap();
    assert!(!report.is_success());
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.applied_count(), 3);
    let failure = report.failures().next().unwrap();
    assert_eq!(failure.resource, provider);
    assert_eq!(failure.status, ResourceStatus::Failed {
        reason: "quota exceeded".to_string(),
    });
}

#[test]
fn resource_outcomes_serialize_with_tags() {
    let set = compile(&common::sample_input()).unwrap();
    let report = InMemoryBackend::new().apply(&set).unwrap();
    let json = serde_json::to_value(&report.resources[0]).unwrap();
    assert_eq!(json["resource"]["kind"], "pool");
    assert_eq!(json["resource"]["pool_id"], "ci-pool");
    assert_eq!(json["status"]["status"], "applied");
}

#[test]
fn provider_limit_rejects_whole_set_without_recording() {
    let set = compile(&common::sample_input()).unwrap();
    let backend = InMemoryBackend::new().with_provider_limit(0);
    let err = backend.apply(&set).unwrap_err();
    assert!(matches!(err, BackendError::Rejected(_)));
    assert_eq!(
        err.to_string(),
        "identity backend rejected descriptors: pool ci-pool declares 1 providers; limit is 0"
    );
    assert!(backend.applied().unwrap().is_empty());

    let backend = InMemoryBackend::new().with_provider_limit(1);
    assert!(backend.apply(&set).unwrap().is_success());
    assert_eq!(backend.applied().unwrap().len(), 1);
}
