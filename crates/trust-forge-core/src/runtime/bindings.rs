// trust-forge-core/src/runtime/bindings.rs
// ============================================================================
// Module: Binding Resolver
// Description: Resolves service-account bindings into principal members and role grants.
// Purpose: Decide which external identities may impersonate which service accounts.
// Dependencies: crate::core, crate::runtime::materializer
// ============================================================================

//! ## Overview
//! Each binding names a provider and, optionally, an `<attribute>/<value>`
//! narrowing. Bindings resolve against the read-only [`ProviderIndex`]
//! produced by the materializer, never against a shared mutable registry.
//!
//! Bindings are keyed by (service account, provider, role-set digest). The
//! role set is sorted and deduplicated before hashing, so role order never
//! changes the key. Two bindings with the same key collapse when their
//! members agree and are rejected as ambiguous when they do not.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::btree_map::Entry;

use crate::core::Binding;
use crate::core::BindingDescriptor;
use crate::core::CompileError;
use crate::core::HashDigest;
use crate::core::NormalizedProvider;
use crate::core::PoolSettings;
use crate::core::PrincipalMember;
use crate::core::ProviderId;
use crate::core::RoleGrant;
use crate::core::ServiceAccountId;
use crate::core::ServiceAccountSpec;
use crate::core::hashing::hash_role_set;
use crate::runtime::materializer::ProviderIndex;
use crate::runtime::normalizer::is_attribute_name;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Principal-set URL prefix.
const PRINCIPAL_SET_PREFIX: &str = "principalSet://iam.googleapis.com/projects";

// ============================================================================
// SECTION: Output
// ============================================================================

/// Resolved bindings and role grants, both sorted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedBindings {
    /// Bindings sorted by (service account, provider, role hash).
    pub bindings: Vec<BindingDescriptor>,
    /// Grants sorted by (service account, role).
    pub role_grants: Vec<RoleGrant>,
}

/// Binding identity after role normalization.
type BindingKey = (ServiceAccountId, ProviderId, HashDigest);

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves every service-account binding.
///
/// `declared` holds every provider id present in the input, including ones
/// that failed validation; bindings on those are skipped because their
/// failure is already reported.
///
/// # Errors
///
/// Returns every unknown provider reference, malformed or unmapped extra
/// condition, empty role set, duplicate service account, and conflicting
/// binding key.
pub fn resolve_bindings(
    pool: &PoolSettings,
    service_accounts: &[ServiceAccountSpec],
    index: &ProviderIndex,
    declared: &BTreeSet<ProviderId>,
) -> Result<ResolvedBindings, Vec<CompileError>> {
    let mut errors = Vec::new();
    let mut seen_accounts = BTreeSet::new();
    let mut resolved: BTreeMap<BindingKey, BindingDescriptor> = BTreeMap::new();
    let mut grants = BTreeSet::new();

    for account in service_accounts {
        let subject = format!("service account {}", account.id);
        if !seen_accounts.insert(&account.id) {
            errors.push(CompileError::ambiguity(
                &subject,
                "service account id declared more than once",
            ));
            continue;
        }
        let account_roles = clean_roles(&account.roles);
        for role in &account_roles {
            grants.insert(RoleGrant {
                service_account_id: account.id.clone(),
                role: role.clone(),
            });
        }

        for (binding_index, binding) in account.bindings.iter().enumerate() {
            for role in clean_roles(&binding.roles) {
                grants.insert(RoleGrant {
                    service_account_id: account.id.clone(),
                    role,
                });
            }
            if !declared.contains(&binding.provider_id) {
                errors.push(CompileError::UnknownProviderReference {
                    service_account_id: account.id.clone(),
                    binding_index,
                    provider_id: binding.provider_id.clone(),
                });
                continue;
            }
            let Some(provider) = index.get(&binding.provider_id) else {
                continue;
            };
            let binding_subject = format!("{subject} binding #{binding_index}");
            match resolve_one(pool, account, &account_roles, binding, provider, &binding_subject) {
                Ok(descriptor) => {
                    if let Err(err) = insert_binding(&mut resolved, descriptor, &binding_subject) {
                        errors.push(err);
                    }
                }
                Err(binding_errors) => errors.extend(binding_errors),
            }
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(ResolvedBindings {
        bindings: resolved.into_values().collect(),
        role_grants: grants.into_iter().collect(),
    })
}

/// Resolves one binding into a descriptor.
fn resolve_one(
    pool: &PoolSettings,
    account: &ServiceAccountSpec,
    account_roles: &[String],
    binding: &Binding,
    provider: &NormalizedProvider,
    subject: &str,
) -> Result<BindingDescriptor, Vec<CompileError>> {
    let mut errors = Vec::new();
    let member = match principal_member(pool, provider, binding.extra_condition.as_deref()) {
        Ok(member) => Some(member),
        Err(detail) => {
            errors.push(CompileError::incomplete(subject, detail));
            None
        }
    };
    let binding_roles = clean_roles(&binding.roles);
    let roles = if binding_roles.is_empty() { account_roles.to_vec() } else { binding_roles };
    if roles.is_empty() {
        errors.push(CompileError::incomplete(
            subject,
            "no roles on the binding or the service account",
        ));
    }
    match member {
        Some(principal_member) if errors.is_empty() => Ok(BindingDescriptor {
            service_account_id: account.id.clone(),
            provider_id: provider.id.clone(),
            principal_member,
            role_set_hash: hash_role_set(&roles),
            roles,
        }),
        _ => Err(errors),
    }
}

/// Inserts a binding, collapsing identical keys.
fn insert_binding(
    resolved: &mut BTreeMap<BindingKey, BindingDescriptor>,
    descriptor: BindingDescriptor,
    subject: &str,
) -> Result<(), CompileError> {
    let key = (
        descriptor.service_account_id.clone(),
        descriptor.provider_id.clone(),
        descriptor.role_set_hash.clone(),
    );
    match resolved.entry(key) {
        Entry::Vacant(slot) => {
            slot.insert(descriptor);
            Ok(())
        }
        Entry::Occupied(existing)
            if existing.get().principal_member == descriptor.principal_member =>
        {
            Ok(())
        }
        Entry::Occupied(existing) => Err(CompileError::ambiguity(
            subject,
            format!(
                "binding to provider {} with roles {} resolves to {} but an earlier binding \
                 resolves to {}",
                descriptor.provider_id,
                descriptor.role_set_hash,
                descriptor.principal_member,
                existing.get().principal_member
            ),
        )),
    }
}

// ============================================================================
// SECTION: Principal Members
// ============================================================================

/// Returns the pool's principal-set base URL.
#[must_use]
pub fn pool_principal_base(pool: &PoolSettings) -> String {
    format!(
        "{PRINCIPAL_SET_PREFIX}/{}/locations/global/workloadIdentityPools/{}",
        pool.project_number.trim(),
        pool.id
    )
}

/// Builds the principal member for one binding.
///
/// With an extra condition and pool conditions enabled the member narrows to
/// `attribute.<name>/<value>`; otherwise it is the pool wildcard.
///
/// # Errors
///
/// Returns a description when the extra condition is malformed or names an
/// attribute the provider does not map.
pub fn principal_member(
    pool: &PoolSettings,
    provider: &NormalizedProvider,
    extra_condition: Option<&str>,
) -> Result<PrincipalMember, String> {
    let base = pool_principal_base(pool);
    let Some(extra) = extra_condition.map(str::trim).filter(|extra| !extra.is_empty()) else {
        return Ok(PrincipalMember::new(format!("{base}/*")));
    };
    let Some((name, value)) = extra.split_once('/') else {
        return Err(format!("extra_condition `{extra}` must be <attribute>/<value>"));
    };
    if !is_attribute_name(name) || value.is_empty() {
        return Err(format!("extra_condition `{extra}` must be <attribute>/<value>"));
    }
    if !provider.maps_attribute(name) {
        return Err(format!(
            "extra_condition uses attribute.{name} but provider {} does not map it",
            provider.id
        ));
    }
    if !pool.attribute_conditions {
        return Ok(PrincipalMember::new(format!("{base}/*")));
    }
    Ok(PrincipalMember::new(format!("{base}/attribute.{name}/{value}")))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Trims, drops blanks, sorts, and deduplicates roles.
fn clean_roles(roles: &[String]) -> Vec<String> {
    let set: BTreeSet<&str> =
        roles.iter().map(|role| role.trim()).filter(|role| !role.is_empty()).collect();
    set.into_iter().map(str::to_string).collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
