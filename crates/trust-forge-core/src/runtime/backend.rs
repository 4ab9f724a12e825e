// trust-forge-core/src/runtime/backend.rs
// ============================================================================
// Module: Trust Forge In-Memory Backend
// Description: Simple in-memory identity backend for tests and examples.
// Purpose: Record applied descriptor sets and simulate per-resource failures.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`InMemoryBackend`] stores every descriptor set it is given and reports
//! each resource as applied unless it was marked to fail. A provider limit
//! makes it reject oversized descriptor sets whole, the way a real identity
//! provider enforces its per-pool quota. It is not intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::DescriptorSet;
use crate::interfaces::ApplyReport;
use crate::interfaces::BackendError;
use crate::interfaces::IdentityBackend;
use crate::interfaces::ResourceOutcome;
use crate::interfaces::ResourceRef;
use crate::interfaces::ResourceStatus;
use crate::interfaces::resource_refs;

// ============================================================================
// SECTION: In-Memory Backend
// ============================================================================

/// In-memory identity backend for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBackend {
    /// Descriptor sets applied so far.
    applied: Arc<Mutex<Vec<DescriptorSet>>>,
    /// Resources forced to fail, with the reported reason.
    failures: BTreeMap<ResourceRef, String>,
    /// Rejects every apply when set.
    unavailable: bool,
    /// Largest provider count accepted per descriptor set.
    provider_limit: Option<usize>,
}

impl InMemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a resource to fail with the given reason.
    #[must_use]
    pub fn fail_resource(mut self, resource: ResourceRef, reason: impl Into<String>) -> Self {
        self.failures.insert(resource, reason.into());
        self
    }

    /// Makes every apply fail with [`BackendError::Unavailable`].
    #[must_use]
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Rejects descriptor sets with more than `limit` providers with
    /// [`BackendError::Rejected`]. Rejected sets are not recorded.
    #[must_use]
    pub fn with_provider_limit(mut self, limit: usize) -> Self {
        self.provider_limit = Some(limit);
        self
    }

    /// Returns the descriptor sets applied so far.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Backend`] when the store lock is poisoned.
    pub fn applied(&self) -> Result<Vec<DescriptorSet>, BackendError> {
        let guard = self
            .applied
            .lock()
            .map_err(|_| BackendError::Backend("in-memory backend mutex poisoned".to_string()))?;
        Ok(guard.clone())
    }
}

impl IdentityBackend for InMemoryBackend {
    fn apply(&self, descriptors: &DescriptorSet) -> Result<ApplyReport, BackendError> {
        if self.unavailable {
            return Err(BackendError::Unavailable(
                "in-memory backend marked unavailable".to_string(),
            ));
        }
        if let Some(limit) = self.provider_limit
            && descriptors.providers.len() > limit
        {
            return Err(BackendError::Rejected(format!(
                "pool {} declares {} providers; limit is {limit}",
                descriptors.pool.id,
                descriptors.providers.len()
            )));
        }
        let resources = resource_refs(descriptors)
            .into_iter()
            .map(|resource| {
                let status = match self.failures.get(&resource) {
                    Some(reason) => ResourceStatus::Failed {
                        reason: reason.clone(),
                    },
                    None => ResourceStatus::Applied,
                };
                ResourceOutcome {
                    resource,
                    status,
                }
            })
            .collect();
        self.applied
            .lock()
            .map_err(|_| BackendError::Backend("in-memory backend mutex poisoned".to_string()))?
            .push(descriptors.clone());
        Ok(ApplyReport {
            resources,
        })
    }
}
