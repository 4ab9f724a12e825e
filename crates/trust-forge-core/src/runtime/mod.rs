// trust-forge-core/src/runtime/mod.rs
// ============================================================================
// Module: Trust Forge Runtime
// Description: Compile stages, orchestration, and the in-memory backend.
// Purpose: Turn trust configuration into validated federation descriptors.
// Dependencies: crate::{core, interfaces, audit}
// ============================================================================

//! ## Overview
//! Runtime modules implement the compile pipeline leaves first: normalizer,
//! condition synthesizer, materializer, binding resolver, and the compiler
//! that runs them in one pass. Every stage is pure and deterministic.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod backend;
pub mod bindings;
pub mod compiler;
pub mod condition;
pub mod materializer;
pub mod normalizer;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use backend::InMemoryBackend;
pub use bindings::ResolvedBindings;
pub use bindings::principal_member;
pub use bindings::resolve_bindings;
pub use compiler::CompileAndApplyError;
pub use compiler::FederationCompiler;
pub use compiler::compile;
pub use condition::platform_clauses;
pub use condition::synthesize_condition;
pub use materializer::MaterializedPool;
pub use materializer::ProviderIndex;
pub use materializer::duplicate_provider_ids;
pub use materializer::materialize;
pub use normalizer::ResolutionSource;
pub use normalizer::ResolveContext;
pub use normalizer::Resolved;
pub use normalizer::normalize_provider;
