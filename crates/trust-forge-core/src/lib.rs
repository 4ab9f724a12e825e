// trust-forge-core/src/lib.rs
// ============================================================================
// Module: Trust Forge Core Library
// Description: Public API surface for the Trust Forge federation compiler.
// Purpose: Expose core types, interfaces, audit sinks, and compile stages.
// Dependencies: crate::{core, interfaces, runtime, audit}
// ============================================================================

//! ## Overview
//! Trust Forge compiles CI/CD trust configuration into workload identity
//! federation descriptors: one pool, one provider per CI platform with a
//! restrictive trust condition, and the service-account bindings and role
//! grants that let federated identities act. Compilation is pure, fails
//! closed, and produces byte-identical canonical JSON for identical input.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use audit::ApplyAuditEvent;
pub use audit::AuditOutcome;
pub use audit::CompileAuditEvent;
pub use audit::CompileAuditSink;
pub use audit::DESCRIPTOR_HASH_FAILED;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use interfaces::ApplyReport;
pub use interfaces::BackendError;
pub use interfaces::IdentityBackend;
pub use interfaces::ResourceOutcome;
pub use interfaces::ResourceRef;
pub use interfaces::ResourceStatus;
pub use runtime::CompileAndApplyError;
pub use runtime::FederationCompiler;
pub use runtime::InMemoryBackend;
pub use runtime::compile;
