// trust-forge-core/tests/audit.rs
// ============================================================================
// Module: Compile Audit Tests
// Description: Audit events from the audited compiler and apply path.
// Purpose: Ensure one event per compile and JSON-line output without conditions.
// Dependencies: trust-forge-core, serde_json, tempfile
// ============================================================================
//! ## Overview
//! Records events through an in-test sink and the file sink, and drives
//! compile-and-apply against the in-memory backend.

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

use std::sync::Mutex;

use trust_forge_core::ApplyAuditEvent;
use trust_forge_core::AuditOutcome;
use trust_forge_core::BackendError;
use trust_forge_core::CompileAndApplyError;
use trust_forge_core::CompileAuditEvent;
use trust_forge_core::CompileAuditSink;
use trust_forge_core::FederationCompiler;
use trust_forge_core::FileAuditSink;
use trust_forge_core::GithubConfig;
use trust_forge_core::InMemoryBackend;
use trust_forge_core::ProviderSpec;

mod common;

#[derive(Default)]
struct RecordingSink {
    compiles: Mutex<Vec<CompileAuditEvent>>,
    applies: Mutex<Vec<ApplyAuditEvent>>,
}

impl CompileAuditSink for RecordingSink {
    fn record(&self, event: &CompileAuditEvent) {
        self.compiles.lock().unwrap().push(event.clone());
    }

    fn record_apply(&self, event: &ApplyAuditEvent) {
        self.applies.lock().unwrap().push(event.clone());
    }
}

#[test]
fn successful_compile_records_counts_and_digest() {
    let compiler = FederationCompiler::new(RecordingSink::default());
    let set = compiler.compile(&common::sample_input()).unwrap();
    let events = compiler.audit().compiles.lock().unwrap();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.event, "trust_compile");
    assert_eq!(event.outcome, AuditOutcome::Success);
    assert_eq!(event.provider_count, 1);
    assert_eq!(event.binding_count, 1);
    assert_eq!(event.role_grant_count, 1);
    assert!(event.error_kinds.is_empty());
    assert_eq!(event.descriptor_hash, Some(set.digest().unwrap()));
}

#[test]
fn rejected_compile_records_error_kinds() {
    let mut input = common::sample_input();
    let mut open = ProviderSpec::new("open-ci");
    open.github = Some(GithubConfig::default());
    input.providers.push(open);
    let compiler = FederationCompiler::new(RecordingSink::default());
    assert!(compiler.compile(&input).is_err());
    let events = compiler.audit().compiles.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].outcome, AuditOutcome::Rejected);
    assert_eq!(events[0].error_kinds, vec!["unrestricted_trust_without_opt_in"]);
    assert_eq!(events[0].descriptor_hash, None);
}

#[test]
fn file_sink_writes_json_lines_without_conditions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.jsonl");
    let compiler = FederationCompiler::new(FileAuditSink::new(&path).unwrap());
    compiler.compile(&common::sample_input()).unwrap();
    compiler.compile(&common::sample_input()).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    let payload: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(payload["event"], "trust_compile");
    assert_eq!(payload["pool_id"], "ci-pool");
    assert_eq!(payload["outcome"], "success");
    assert!(!contents.contains("assertion."));
    assert!(!contents.contains("principalSet://"));
}

#[test]
fn compile_and_apply_hands_descriptors_to_backend() {
    let backend = InMemoryBackend::new();
    let compiler = FederationCompiler::new(RecordingSink::default());
    let (set, report) = compiler.compile_and_apply(&common::sample_input(), &backend).unwrap();
    assert!(report.is_success());
    assert_eq!(report.resources.len(), 1 + set.providers.len() + set.bindings.len() + 1);
    assert_eq!(backend.applied().unwrap(), vec![set]);
    let applies = compiler.audit().applies.lock().unwrap();
    assert_eq!(applies.len(), 1);
    assert_eq!(applies[0].outcome, AuditOutcome::Success);
}

#[test]
fn rejected_compile_never_reaches_backend() {
    let mut input = common::sample_input();
    input.pool.attribute_conditions = false;
    let backend = InMemoryBackend::new();
    let compiler = FederationCompiler::new(RecordingSink::default());
    let err = compiler.compile_and_apply(&input, &backend).unwrap_err();
    assert!(matches!(err, CompileAndApplyError::Compile(_)));
    assert!(backend.applied().unwrap().is_empty());
    assert!(compiler.audit().applies.lock().unwrap().is_empty());
}

#[test]
fn unavailable_backend_is_audited_as_rejected() {
    let backend = InMemoryBackend::new().unavailable();
    let compiler = FederationCompiler::new(RecordingSink::default());
    let err = compiler.compile_and_apply(&common::sample_input(), &backend).unwrap_err();
    assert!(matches!(err, CompileAndApplyError::Backend(_)));
    let applies = compiler.audit().applies.lock().unwrap();
    assert_eq!(applies[0].outcome, AuditOutcome::Rejected);
    assert_eq!(applies[0].applied_count, 0);
}

#[test]
fn rejected_descriptor_set_is_audited_without_counts() {
    let backend = InMemoryBackend::new().with_provider_limit(0);
    let compiler = FederationCompiler::new(RecordingSink::default());
    let err = compiler.compile_and_apply(&common::sample_input(), &backend).unwrap_err();
    assert!(matches!(err, CompileAndApplyError::Backend(BackendError::Rejected(_))));
    let applies = compiler.audit().applies.lock().unwrap();
    assert_eq!(applies.len(), 1);
    assert_eq!(applies[0].outcome, AuditOutcome::Rejected);
    assert_eq!(applies[0].applied_count, 0);
    assert!(applies[0].descriptor_hash.is_some());
    assert!(applies[0].error_kinds.is_empty());
}
