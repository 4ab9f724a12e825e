// trust-forge-core/src/runtime/compiler.rs
// ============================================================================
// Module: Federation Compiler
// Description: Single-pass orchestration from compile input to descriptors.
// Purpose: Accumulate every error across stages and emit output only when clean.
// Dependencies: crate::core, crate::runtime, crate::audit, crate::interfaces
// ============================================================================

//! ## Overview
//! [`compile`] runs normalize, synthesize, materialize, and bind over the
//! whole input, collecting errors from every stage instead of stopping at the
//! first. Any error means no descriptors. The function is pure; the
//! [`FederationCompiler`] wrapper adds one audit event per compile and an
//! optional hand-off to an [`IdentityBackend`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use thiserror::Error;

use crate::audit::ApplyAuditEvent;
use crate::audit::AuditOutcome;
use crate::audit::CompileAuditEvent;
use crate::audit::CompileAuditEventParams;
use crate::audit::CompileAuditSink;
use crate::audit::audited_digest;
use crate::core::CompileErrors;
use crate::core::CompileInput;
use crate::core::DescriptorSet;
use crate::core::ProviderId;
use crate::interfaces::ApplyReport;
use crate::interfaces::BackendError;
use crate::interfaces::IdentityBackend;
use crate::runtime::bindings::resolve_bindings;
use crate::runtime::condition::synthesize_condition;
use crate::runtime::materializer::ProviderIndex;
use crate::runtime::materializer::duplicate_provider_ids;
use crate::runtime::materializer::materialize;
use crate::runtime::normalizer::normalize_provider;

// ============================================================================
// SECTION: Pure Compile
// ============================================================================

/// Compiles trust configuration into a descriptor set.
///
/// # Errors
///
/// Returns [`CompileErrors`] holding every problem found in the input.
pub fn compile(input: &CompileInput) -> Result<DescriptorSet, CompileErrors> {
    let mut errors = Vec::new();
    let declared: BTreeSet<ProviderId> =
        input.providers.iter().map(|provider| provider.id.clone()).collect();

    let mut staged = Vec::with_capacity(input.providers.len());
    let mut staged_ids = BTreeSet::new();
    for spec in &input.providers {
        // Only the first spec per id is staged; later ones are still checked.
        let first = staged_ids.insert(&spec.id);
        if let Err(err) = spec.variant() {
            errors.push(err);
            continue;
        }
        let normalized = normalize_provider(spec);
        let condition = synthesize_condition(spec);
        match (normalized, condition) {
            (Ok(provider), Ok(condition)) => {
                if first {
                    staged.push((provider, condition));
                }
            }
            (normalized, condition) => {
                if let Err(normalize_errors) = normalized {
                    errors.extend(normalize_errors);
                }
                if let Err(err) = condition {
                    errors.push(err);
                }
            }
        }
    }

    errors.extend(duplicate_provider_ids(input.providers.iter().map(|provider| &provider.id)));

    // Bindings are still checked when materialization fails.
    let staged_index: ProviderIndex = staged
        .iter()
        .map(|(provider, _)| (provider.id.clone(), provider.clone()))
        .collect();
    let materialized = match materialize(&input.pool, staged) {
        Ok(materialized) => Some(materialized),
        Err(materialize_errors) => {
            errors.extend(materialize_errors);
            None
        }
    };
    let index = materialized.as_ref().map_or(&staged_index, |materialized| &materialized.index);
    let resolved = match resolve_bindings(&input.pool, &input.service_accounts, index, &declared) {
        Ok(resolved) => Some(resolved),
        Err(binding_errors) => {
            errors.extend(binding_errors);
            None
        }
    };

    match (materialized, resolved) {
        (Some(materialized), Some(resolved)) if errors.is_empty() => Ok(DescriptorSet {
            pool: materialized.pool,
            providers: materialized.providers,
            bindings: resolved.bindings,
            role_grants: resolved.role_grants,
        }),
        _ => Err(CompileErrors::new(errors)),
    }
}

// ============================================================================
// SECTION: Audited Compiler
// ============================================================================

/// Errors from [`FederationCompiler::compile_and_apply`].
#[derive(Debug, Error)]
pub enum CompileAndApplyError {
    /// Compilation rejected the input.
    #[error(transparent)]
    Compile(#[from] CompileErrors),
    /// The backend could not apply the descriptors.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Compiler that records an audit event for every compile.
pub struct FederationCompiler<S: CompileAuditSink> {
    /// Audit sink for compile and apply events.
    audit: S,
}

impl<S: CompileAuditSink> FederationCompiler<S> {
    /// Creates a compiler with the given audit sink.
    #[must_use]
    pub const fn new(audit: S) -> Self {
        Self {
            audit,
        }
    }

    /// Returns the audit sink.
    #[must_use]
    pub const fn audit(&self) -> &S {
        &self.audit
    }

    /// Compiles the input and records exactly one audit event.
    ///
    /// # Errors
    ///
    /// Returns [`CompileErrors`] holding every problem found in the input.
    pub fn compile(&self, input: &CompileInput) -> Result<DescriptorSet, CompileErrors> {
        let result = compile(input);
        let params = match &result {
            Ok(set) => {
                let (descriptor_hash, error_kinds) = audited_digest(set.digest());
                CompileAuditEventParams {
                    pool_id: input.pool.id.clone(),
                    outcome: AuditOutcome::Success,
                    provider_count: set.providers.len(),
                    binding_count: set.bindings.len(),
                    role_grant_count: set.role_grants.len(),
                    error_kinds,
                    descriptor_hash,
                }
            }
            Err(errors) => CompileAuditEventParams {
                pool_id: input.pool.id.clone(),
                outcome: AuditOutcome::Rejected,
                provider_count: 0,
                binding_count: 0,
                role_grant_count: 0,
                error_kinds: errors.kinds(),
                descriptor_hash: None,
            },
        };
        self.audit.record(&CompileAuditEvent::new(params));
        result
    }

    /// Compiles the input and hands the descriptors to a backend.
    ///
    /// Nothing reaches the backend when compilation fails.
    ///
    /// # Errors
    ///
    /// Returns [`CompileAndApplyError`] when compilation fails or the backend
    /// cannot run the apply.
    pub fn compile_and_apply<B: IdentityBackend>(
        &self,
        input: &CompileInput,
        backend: &B,
    ) -> Result<(DescriptorSet, ApplyReport), CompileAndApplyError> {
        let set = self.compile(input)?;
        let digest = set.digest();
        let applied = backend.apply(&set);
        self.audit.record_apply(&ApplyAuditEvent::new(
            set.pool.id.clone(),
            applied.as_ref().ok(),
            digest,
        ));
        let report = applied?;
        Ok((set, report))
    }
}
