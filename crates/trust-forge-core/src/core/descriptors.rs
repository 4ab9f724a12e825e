// trust-forge-core/src/core/descriptors.rs
// ============================================================================
// Module: Trust Forge Descriptors
// Description: Normalized providers and desired-state descriptor records.
// Purpose: Stable, serializable compile output for the provisioning backend.
// Dependencies: serde, crate::core::hashing
// ============================================================================

//! ## Overview
//! Descriptors are the only thing the compiler hands to the backend. They
//! carry no timestamps or session data, and every collection is sorted, so
//! identical input always yields byte-identical canonical JSON.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::DEFAULT_HASH_ALGORITHM;
use crate::core::hashing::HashDigest;
use crate::core::hashing::HashError;
use crate::core::hashing::canonical_json_bytes;
use crate::core::hashing::hash_canonical_json;
use crate::core::identifiers::PoolId;
use crate::core::identifiers::ProviderId;
use crate::core::identifiers::ServiceAccountId;
use crate::core::platform::PlatformKind;

// ============================================================================
// SECTION: Trust Condition
// ============================================================================

/// Rendered, non-empty attribute condition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrustCondition(String);

impl TrustCondition {
    /// Wraps a rendered expression; blank input yields `None`.
    #[must_use]
    pub fn new(expression: impl Into<String>) -> Option<Self> {
        let expression = expression.into();
        if expression.trim().is_empty() { None } else { Some(Self(expression)) }
    }

    /// Returns the condition as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrustCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Normalized Provider
// ============================================================================

/// A provider with type, issuer, audiences, and mapping fully resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedProvider {
    /// Provider identifier.
    pub id: ProviderId,
    /// Resolved platform type.
    pub kind: PlatformKind,
    /// Display name.
    pub display_name: String,
    /// Description.
    pub description: String,
    /// Whether the provider is disabled.
    pub disabled: bool,
    /// Issuer URL (empty for AWS providers).
    pub issuer_uri: String,
    /// Allowed audiences.
    pub allowed_audiences: Vec<String>,
    /// Target attribute to assertion expression.
    pub attribute_mapping: BTreeMap<String, String>,
    /// AWS account id for AWS providers.
    pub aws_account_id: Option<String>,
    /// Trust condition, attached by the materializer.
    pub condition: Option<TrustCondition>,
}

impl NormalizedProvider {
    /// Returns true when the mapping defines `attribute.<name>`.
    #[must_use]
    pub fn maps_attribute(&self, name: &str) -> bool {
        self.attribute_mapping.contains_key(&format!("attribute.{name}"))
    }
}

// ============================================================================
// SECTION: Output Descriptors
// ============================================================================

/// Desired state of the workload identity pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolDescriptor {
    /// Pool identifier.
    pub id: PoolId,
    /// Display name.
    pub display_name: String,
    /// Description.
    pub description: String,
    /// Whether the pool is disabled.
    pub disabled: bool,
}

/// Desired state of one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    /// Provider identifier.
    pub provider_id: ProviderId,
    /// Display name.
    pub display_name: String,
    /// Description.
    pub description: String,
    /// Whether the provider is disabled.
    pub disabled: bool,
    /// Issuer URL (empty for AWS providers).
    pub issuer_uri: String,
    /// Allowed audiences.
    pub allowed_audiences: Vec<String>,
    /// Target attribute to assertion expression.
    pub attribute_mapping: BTreeMap<String, String>,
    /// AWS account id for AWS providers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_account_id: Option<String>,
    /// Attribute condition; absent only for explicit unrestricted providers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<TrustCondition>,
}

impl From<&NormalizedProvider> for ProviderDescriptor {
    fn from(provider: &NormalizedProvider) -> Self {
        Self {
            provider_id: provider.id.clone(),
            display_name: provider.display_name.clone(),
            description: provider.description.clone(),
            disabled: provider.disabled,
            issuer_uri: provider.issuer_uri.clone(),
            allowed_audiences: provider.allowed_audiences.clone(),
            attribute_mapping: provider.attribute_mapping.clone(),
            aws_account_id: provider.aws_account_id.clone(),
            condition: provider.condition.clone(),
        }
    }
}

/// Principal set allowed to impersonate a service account.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalMember(String);

impl PrincipalMember {
    /// Wraps a principal member string.
    #[must_use]
    pub fn new(member: impl Into<String>) -> Self {
        Self(member.into())
    }

    /// Returns the member as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Resolved impersonation binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingDescriptor {
    /// Service account being impersonated.
    pub service_account_id: ServiceAccountId,
    /// Provider the binding was declared against.
    pub provider_id: ProviderId,
    /// Principal set granted impersonation.
    pub principal_member: PrincipalMember,
    /// Sorted, deduplicated roles.
    pub roles: Vec<String>,
    /// Digest of the sorted role set.
    pub role_set_hash: HashDigest,
}

/// One role granted to one service account.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoleGrant {
    /// Service account receiving the role.
    pub service_account_id: ServiceAccountId,
    /// Role name.
    pub role: String,
}

// ============================================================================
// SECTION: Descriptor Set
// ============================================================================

/// Complete desired state produced by one successful compile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorSet {
    /// Pool descriptor.
    pub pool: PoolDescriptor,
    /// Provider descriptors sorted by id.
    pub providers: Vec<ProviderDescriptor>,
    /// Bindings sorted by (service account, provider, role hash).
    pub bindings: Vec<BindingDescriptor>,
    /// Role grants sorted by (service account, role).
    pub role_grants: Vec<RoleGrant>,
}

impl DescriptorSet {
    /// Returns RFC 8785 canonical JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when serialization fails.
    pub fn canonical_json(&self) -> Result<Vec<u8>, HashError> {
        canonical_json_bytes(self)
    }

    /// Returns the SHA-256 digest of the canonical JSON.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when serialization fails.
    pub fn digest(&self) -> Result<HashDigest, HashError> {
        hash_canonical_json(DEFAULT_HASH_ALGORITHM, self)
    }
}
