// trust-forge-core/src/runtime/materializer.rs
// ============================================================================
// Module: Pool/Provider Materializer
// Description: Validates normalized providers and emits pool/provider descriptors.
// Purpose: Produce desired state plus the read-only provider index for bindings.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The materializer is the last gate before providers become output. It
//! checks identifier formats, id uniqueness, pool-level condition support,
//! issuers, and display length limits, accumulating every failure. Nothing is
//! returned unless every provider passes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::core::CompileError;
use crate::core::NormalizedProvider;
use crate::core::PoolDescriptor;
use crate::core::PoolSettings;
use crate::core::ProviderDescriptor;
use crate::core::ProviderId;
use crate::core::TrustCondition;
use crate::core::identifiers::validate_resource_id;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum display name length for pools and providers.
pub const MAX_DISPLAY_NAME_LENGTH: usize = 32;
/// Maximum description length for pools and providers.
pub const MAX_DESCRIPTION_LENGTH: usize = 256;

// ============================================================================
// SECTION: Output
// ============================================================================

/// Read-only lookup of materialized providers by id.
pub type ProviderIndex = BTreeMap<ProviderId, NormalizedProvider>;

/// Validated pool and providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedPool {
    /// Pool descriptor.
    pub pool: PoolDescriptor,
    /// Provider descriptors sorted by id.
    pub providers: Vec<ProviderDescriptor>,
    /// Providers keyed by id, conditions attached.
    pub index: ProviderIndex,
}

// ============================================================================
// SECTION: Materialization
// ============================================================================

/// Materializes the pool and its providers.
///
/// # Errors
///
/// Returns every validation failure; see the module overview.
pub fn materialize(
    pool: &PoolSettings,
    providers: Vec<(NormalizedProvider, Option<TrustCondition>)>,
) -> Result<MaterializedPool, Vec<CompileError>> {
    let mut errors = Vec::new();
    let pool_subject = format!("pool {}", pool.id);
    if let Err(detail) = validate_resource_id(pool.id.as_str()) {
        errors.push(CompileError::invalid_identifier(&pool_subject, detail));
    }
    let pool_descriptor = PoolDescriptor {
        id: pool.id.clone(),
        display_name: pool
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| pool.id.as_str())
            .to_string(),
        description: pool.description.clone().unwrap_or_default(),
        disabled: pool.disabled,
    };
    errors.extend(check_lengths(
        &pool_subject,
        &pool_descriptor.display_name,
        &pool_descriptor.description,
    ));

    let mut index = ProviderIndex::new();
    let mut duplicates = BTreeSet::new();
    for (mut provider, condition) in providers {
        let subject = format!("provider {}", provider.id);
        if let Err(detail) = validate_resource_id(provider.id.as_str()) {
            errors.push(CompileError::invalid_identifier(&subject, detail));
        }
        if !pool.attribute_conditions && condition.is_some() {
            errors.push(CompileError::incomplete(
                &subject,
                "pool does not support attribute conditions but the provider requires one",
            ));
        }
        if !provider.kind.is_aws() && provider.issuer_uri.trim().is_empty() {
            errors.push(CompileError::incomplete(&subject, "issuer_uri could not be resolved"));
        }
        errors.extend(check_lengths(&subject, &provider.display_name, &provider.description));

        provider.condition = condition;
        if index.contains_key(&provider.id) {
            if duplicates.insert(provider.id.clone()) {
                errors.push(CompileError::DuplicateProviderId {
                    provider_id: provider.id,
                });
            }
            continue;
        }
        index.insert(provider.id.clone(), provider);
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(MaterializedPool {
        pool: pool_descriptor,
        providers: index.values().map(ProviderDescriptor::from).collect(),
        index,
    })
}

/// Reports every provider id declared more than once, once per id.
#[must_use]
pub fn duplicate_provider_ids<'a>(
    ids: impl IntoIterator<Item = &'a ProviderId>,
) -> Vec<CompileError> {
    let mut seen = BTreeSet::new();
    let mut reported = BTreeSet::new();
    ids.into_iter()
        .filter(|id| !seen.insert(*id) && reported.insert(*id))
        .map(|id| CompileError::DuplicateProviderId {
            provider_id: id.clone(),
        })
        .collect()
}

/// Checks display name and description limits.
fn check_lengths(subject: &str, display_name: &str, description: &str) -> Vec<CompileError> {
    let mut errors = Vec::new();
    let name_length = display_name.chars().count();
    if name_length > MAX_DISPLAY_NAME_LENGTH {
        errors.push(CompileError::incomplete(
            subject,
            format!(
                "display_name is {name_length} characters; at most {MAX_DISPLAY_NAME_LENGTH} \
                 allowed"
            ),
        ));
    }
    let description_length = description.chars().count();
    if description_length > MAX_DESCRIPTION_LENGTH {
        errors.push(CompileError::incomplete(
            subject,
            format!(
                "description is {description_length} characters; at most \
                 {MAX_DESCRIPTION_LENGTH} allowed"
            ),
        ));
    }
    errors
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use std::collections::BTreeMap;

    use super::duplicate_provider_ids;
    use super::materialize;
    use crate::core::CompileError;
    use crate::core::NormalizedProvider;
    use crate::core::PlatformKind;
    use crate::core::PoolId;
    use crate::core::PoolSettings;
    use crate::core::ProviderId;
    use crate::core::TrustCondition;

    fn pool() -> PoolSettings {
        PoolSettings {
            id: PoolId::new("ci-pool"),
            project_number: "123456789".to_string(),
            display_name: None,
            description: None,
            disabled: false,
            attribute_conditions: true,
        }
    }

    fn provider(id: &str) -> NormalizedProvider {
        NormalizedProvider {
            id: ProviderId::new(id),
            kind: PlatformKind::Github,
            display_name: id.to_string(),
            description: String::new(),
            disabled: false,
            issuer_uri: "https://token.actions.githubusercontent.com".to_string(),
            allowed_audiences: Vec::new(),
            attribute_mapping: BTreeMap::new(),
            aws_account_id: None,
            condition: None,
        }
    }

    #[test]
    fn providers_are_sorted_and_conditions_attached() {
        let condition = TrustCondition::new("assertion.ref == 'main'");
        let result = materialize(
            &pool(),
            vec![(provider("zeta-ci"), condition.clone()), (provider("alpha-ci"), condition)],
        )
        .unwrap();
        let ids: Vec<&str> = result.providers.iter().map(|p| p.provider_id.as_str()).collect();
        assert_eq!(ids, vec!["alpha-ci", "zeta-ci"]);
        assert!(result.index[&ProviderId::new("alpha-ci")].condition.is_some());
        assert_eq!(result.pool.display_name, "ci-pool");
    }

    #[test]
    fn duplicate_ids_are_reported_once() {
        let errors = materialize(
            &pool(),
            vec![(provider("gh-ci"), None), (provider("gh-ci"), None), (provider("gh-ci"), None)],
        )
        .unwrap_err();
        assert_eq!(errors, vec![CompileError::DuplicateProviderId {
            provider_id: ProviderId::new("gh-ci")
        }]);
    }

    #[test]
    fn duplicate_ids_follow_first_repeat_order() {
        let ids = ["b-ci", "a-ci", "b-ci", "a-ci", "b-ci"].map(ProviderId::new);
        let errors = duplicate_provider_ids(&ids);
        let reported: Vec<String> = errors.iter().map(ToString::to_string).collect();
        assert_eq!(errors.len(), 2);
        assert!(reported[0].contains("b-ci"));
        assert!(reported[1].contains("a-ci"));
    }

    #[test]
    fn conditions_rejected_when_pool_disables_them() {
        let mut settings = pool();
        settings.attribute_conditions = false;
        let errors = materialize(
            &settings,
            vec![(provider("gh-ci"), TrustCondition::new("assertion.ref == 'main'"))],
        )
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), "config_incomplete");
    }

    #[test]
    fn bad_ids_and_long_names_accumulate() {
        let mut long = provider("gcp-reserved");
        long.display_name = "x".repeat(40);
        long.issuer_uri = String::new();
        let errors = materialize(&pool(), vec![(long, None)]).unwrap_err();
        let kinds: Vec<&str> = errors.iter().map(CompileError::kind).collect();
        assert_eq!(kinds, vec!["invalid_identifier", "config_incomplete", "config_incomplete"]);
    }
}
