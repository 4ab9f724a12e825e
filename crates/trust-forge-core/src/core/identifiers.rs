// trust-forge-core/src/core/identifiers.rs
// ============================================================================
// Module: Trust Forge Identifiers
// Description: Opaque identifiers for pools, providers, and service accounts.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Identifiers are opaque and serialize as plain strings. Format checks for
//! cloud-side resource ids live in [`validate_resource_id`] and run at the
//! materializer boundary, not inside these wrappers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Minimum length of a pool or provider id.
pub const MIN_RESOURCE_ID_LENGTH: usize = 4;
/// Maximum length of a pool or provider id.
pub const MAX_RESOURCE_ID_LENGTH: usize = 32;
/// Prefix reserved by the identity backend.
const RESERVED_ID_PREFIX: &str = "gcp-";

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Workload identity pool identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolId(String);

impl PoolId {
    /// Creates a new pool identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for PoolId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PoolId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Workload identity provider identifier, unique within a pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    /// Creates a new provider identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ProviderId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ProviderId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Service account identifier (account id or email).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceAccountId(String);

impl ServiceAccountId {
    /// Creates a new service account identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceAccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ServiceAccountId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ServiceAccountId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Format Validation
// ============================================================================

/// Validates a pool or provider id against the backend's resource id rules.
///
/// Ids are 4-32 characters of lowercase letters, digits, and hyphens, start
/// with a letter, and must not use the reserved `gcp-` prefix.
///
/// # Errors
///
/// Returns a human-readable reason when the id is rejected.
pub fn validate_resource_id(id: &str) -> Result<(), String> {
    let len = id.chars().count();
    if !(MIN_RESOURCE_ID_LENGTH ..= MAX_RESOURCE_ID_LENGTH).contains(&len) {
        return Err(format!(
            "must be {MIN_RESOURCE_ID_LENGTH}-{MAX_RESOURCE_ID_LENGTH} characters, got {len}"
        ));
    }
    if !id.chars().all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-') {
        return Err("may only contain lowercase letters, digits, and hyphens".to_string());
    }
    if !id.starts_with(|ch: char| ch.is_ascii_lowercase()) {
        return Err("must start with a lowercase letter".to_string());
    }
    if id.ends_with('-') {
        return Err("must not end with a hyphen".to_string());
    }
    if id.starts_with(RESERVED_ID_PREFIX) {
        return Err(format!("must not start with reserved prefix `{RESERVED_ID_PREFIX}`"));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
