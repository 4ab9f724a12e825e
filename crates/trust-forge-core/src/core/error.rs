// trust-forge-core/src/core/error.rs
// ============================================================================
// Module: Trust Forge Compile Errors
// Description: Error taxonomy for federation compilation.
// Purpose: Name every rejected input precisely so one pass reports all issues.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every validation failure is a [`CompileError`] naming the offending
//! provider or service account. The compiler accumulates them into
//! [`CompileErrors`]; any error means no descriptors are emitted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;

use crate::core::identifiers::ProviderId;
use crate::core::identifiers::ServiceAccountId;

// ============================================================================
// SECTION: Compile Error
// ============================================================================

/// A single validation failure raised while compiling federation config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Input admits more than one interpretation.
    #[error("{subject}: ambiguous configuration: {detail}")]
    ConfigAmbiguity {
        /// Provider, service account, or pool the error refers to.
        subject: String,
        /// Description of the conflict.
        detail: String,
    },
    /// A required value is missing or unusable.
    #[error("{subject}: incomplete configuration: {detail}")]
    ConfigIncomplete {
        /// Provider, service account, or pool the error refers to.
        subject: String,
        /// Description of the missing value.
        detail: String,
    },
    /// A provider would trust every identity from its issuer without opting in.
    #[error(
        "provider {provider_id}: no trust condition could be derived; set `unrestricted = true` to \
         trust every identity from this issuer"
    )]
    UnrestrictedTrustWithoutOptIn {
        /// Provider lacking a restricting condition.
        provider_id: ProviderId,
    },
    /// A binding references a provider that is not declared.
    #[error(
        "service account {service_account_id} binding #{binding_index}: unknown provider \
         {provider_id}"
    )]
    UnknownProviderReference {
        /// Service account owning the binding.
        service_account_id: ServiceAccountId,
        /// Zero-based index of the binding within the account.
        binding_index: usize,
        /// Referenced provider id.
        provider_id: ProviderId,
    },
    /// Two providers in the pool share an id.
    #[error("provider {provider_id}: duplicate provider id within pool")]
    DuplicateProviderId {
        /// Duplicated id.
        provider_id: ProviderId,
    },
    /// A pool, provider, or attribute identifier has an invalid format.
    #[error("{subject}: invalid identifier: {detail}")]
    InvalidIdentifier {
        /// Identifier owner.
        subject: String,
        /// Reason the identifier was rejected.
        detail: String,
    },
}

impl CompileError {
    /// Returns a stable snake_case label for audit events.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ConfigAmbiguity {
                ..
            } => "config_ambiguity",
            Self::ConfigIncomplete {
                ..
            } => "config_incomplete",
            Self::UnrestrictedTrustWithoutOptIn {
                ..
            } => "unrestricted_trust_without_opt_in",
            Self::UnknownProviderReference {
                ..
            } => "unknown_provider_reference",
            Self::DuplicateProviderId {
                ..
            } => "duplicate_provider_id",
            Self::InvalidIdentifier {
                ..
            } => "invalid_identifier",
        }
    }

    /// Builds a [`CompileError::ConfigAmbiguity`].
    pub fn ambiguity(subject: impl fmt::Display, detail: impl Into<String>) -> Self {
        Self::ConfigAmbiguity {
            subject: subject.to_string(),
            detail: detail.into(),
        }
    }

    /// Builds a [`CompileError::ConfigIncomplete`].
    pub fn incomplete(subject: impl fmt::Display, detail: impl Into<String>) -> Self {
        Self::ConfigIncomplete {
            subject: subject.to_string(),
            detail: detail.into(),
        }
    }

    /// Builds a [`CompileError::InvalidIdentifier`].
    pub fn invalid_identifier(subject: impl fmt::Display, detail: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            subject: subject.to_string(),
            detail: detail.into(),
        }
    }
}

// ============================================================================
// SECTION: Accumulated Errors
// ============================================================================

/// All errors found in one compile attempt, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompileErrors(Vec<CompileError>);

impl CompileErrors {
    /// Wraps an error list.
    #[must_use]
    pub const fn new(errors: Vec<CompileError>) -> Self {
        Self(errors)
    }

    /// Returns the individual errors.
    #[must_use]
    pub fn errors(&self) -> &[CompileError] {
        &self.0
    }

    /// Returns true when no errors were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the error kind labels in discovery order.
    #[must_use]
    pub fn kinds(&self) -> Vec<&'static str> {
        self.0.iter().map(CompileError::kind).collect()
    }

    /// Consumes the wrapper and returns the error list.
    #[must_use]
    pub fn into_inner(self) -> Vec<CompileError> {
        self.0
    }
}

impl fmt::Display for CompileErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "federation compile failed with {} error(s)", self.0.len())?;
        for (index, error) in self.0.iter().enumerate() {
            let sep = if index == 0 { ": " } else { "; " };
            write!(f, "{sep}{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileErrors {}

impl From<Vec<CompileError>> for CompileErrors {
    fn from(errors: Vec<CompileError>) -> Self {
        Self(errors)
    }
}
