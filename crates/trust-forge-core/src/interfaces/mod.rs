// trust-forge-core/src/interfaces/mod.rs
// ============================================================================
// Module: Trust Forge Interfaces
// Description: Backend-agnostic seam for applying compiled descriptors.
// Purpose: Define the contract between the pure compiler and an identity backend.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! The compiler never talks to a cloud API. It hands a [`DescriptorSet`] to
//! an [`IdentityBackend`], which reports a per-resource outcome. Diffing and
//! reconciliation belong to the backend.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::DescriptorSet;
use crate::core::HashDigest;
use crate::core::PoolId;
use crate::core::ProviderId;
use crate::core::ServiceAccountId;

// ============================================================================
// SECTION: Resource References
// ============================================================================

/// Identifies one resource inside a descriptor set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceRef {
    /// Workload identity pool.
    Pool {
        /// Pool identifier.
        pool_id: PoolId,
    },
    /// Pool provider.
    Provider {
        /// Provider identifier.
        provider_id: ProviderId,
    },
    /// Impersonation binding.
    Binding {
        /// Service account identifier.
        service_account_id: ServiceAccountId,
        /// Provider identifier.
        provider_id: ProviderId,
        /// Role-set digest.
        role_set_hash: HashDigest,
    },
    /// Role grant.
    RoleGrant {
        /// Service account identifier.
        service_account_id: ServiceAccountId,
        /// Role name.
        role: String,
    },
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pool {
                pool_id,
            } => write!(f, "pool/{pool_id}"),
            Self::Provider {
                provider_id,
            } => write!(f, "provider/{provider_id}"),
            Self::Binding {
                service_account_id,
                provider_id,
                role_set_hash,
            } => write!(f, "binding/{service_account_id}/{provider_id}/{role_set_hash}"),
            Self::RoleGrant {
                service_account_id,
                role,
            } => write!(f, "role_grant/{service_account_id}/{role}"),
        }
    }
}

/// Lists every resource in a descriptor set in apply order.
#[must_use]
pub fn resource_refs(set: &DescriptorSet) -> Vec<ResourceRef> {
    let mut refs = Vec::with_capacity(
        1 + set.providers.len() + set.bindings.len() + set.role_grants.len(),
    );
    refs.push(ResourceRef::Pool {
        pool_id: set.pool.id.clone(),
    });
    refs.extend(set.providers.iter().map(|provider| ResourceRef::Provider {
        provider_id: provider.provider_id.clone(),
    }));
    refs.extend(set.bindings.iter().map(|binding| ResourceRef::Binding {
        service_account_id: binding.service_account_id.clone(),
        provider_id: binding.provider_id.clone(),
        role_set_hash: binding.role_set_hash.clone(),
    }));
    refs.extend(set.role_grants.iter().map(|grant| ResourceRef::RoleGrant {
        service_account_id: grant.service_account_id.clone(),
        role: grant.role.clone(),
    }));
    refs
}

// ============================================================================
// SECTION: Apply Report
// ============================================================================

/// Outcome status for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResourceStatus {
    /// Resource reached the desired state.
    Applied,
    /// Resource could not be applied.
    Failed {
        /// Backend-provided reason.
        reason: String,
    },
}

/// Outcome for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceOutcome {
    /// Resource reference.
    pub resource: ResourceRef,
    /// Outcome status.
    pub status: ResourceStatus,
}

/// Per-resource results of one apply.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApplyReport {
    /// Outcomes in apply order.
    pub resources: Vec<ResourceOutcome>,
}

impl ApplyReport {
    /// Returns the number of applied resources.
    #[must_use]
    pub fn applied_count(&self) -> usize {
        self.resources.iter().filter(|outcome| outcome.status == ResourceStatus::Applied).count()
    }

    /// Returns the number of failed resources.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.resources.len() - self.applied_count()
    }

    /// Returns true when every resource applied.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    /// Returns the failed outcomes.
    pub fn failures(&self) -> impl Iterator<Item = &ResourceOutcome> {
        self.resources.iter().filter(|outcome| outcome.status != ResourceStatus::Applied)
    }
}

// ============================================================================
// SECTION: Identity Backend
// ============================================================================

/// Identity backend errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Backend could not be reached.
    #[error("identity backend unavailable: {0}")]
    Unavailable(String),
    /// Backend rejected the descriptor set as a whole.
    #[error("identity backend rejected descriptors: {0}")]
    Rejected(String),
    /// Backend reported an error.
    #[error("identity backend error: {0}")]
    Backend(String),
}

/// Applies desired-state descriptors to an identity provider.
pub trait IdentityBackend {
    /// Applies a descriptor set, reporting each resource's outcome.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the apply cannot run at all. Individual
    /// resource failures are reported in the [`ApplyReport`].
    fn apply(&self, descriptors: &DescriptorSet) -> Result<ApplyReport, BackendError>;
}
