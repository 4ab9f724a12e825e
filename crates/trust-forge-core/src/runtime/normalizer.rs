// trust-forge-core/src/runtime/normalizer.rs
// ============================================================================
// Module: Provider Normalizer
// Description: Resolves type, issuer, audiences, and attribute mapping per provider.
// Purpose: Turn one ProviderSpec into a NormalizedProvider through auditable precedence.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Every resolved value comes from an explicit, ordered resolver table:
//!
//! | Value | Order |
//! |-------|-------|
//! | issuer | override -> platform field -> catalog template -> empty |
//! | audiences | override -> platform field -> catalog templates -> empty |
//! | mapping | catalog -> platform custom claims -> override (merged, later wins) |
//!
//! Each level is a standalone function so precedence can be tested one level
//! at a time. Normalization is pure; the condition is attached later by the
//! materializer.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::core::ClaimPath;
use crate::core::CompileError;
use crate::core::NormalizedProvider;
use crate::core::PlatformDefaults;
use crate::core::PlatformKind;
use crate::core::PlatformVariant;
use crate::core::ProviderSpec;
use crate::core::platform::interpolate;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Mapping key every OIDC provider must define.
pub const SUBJECT_MAPPING_KEY: &str = "google.subject";
/// Prefix of custom attribute mapping keys.
const ATTRIBUTE_PREFIX: &str = "attribute.";
/// Prefix of built-in mapping keys.
const GOOGLE_PREFIX: &str = "google.";
/// Maximum length of a mapped attribute name.
const MAX_ATTRIBUTE_NAME_LENGTH: usize = 100;

// ============================================================================
// SECTION: Resolution Types
// ============================================================================

/// Precedence level a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResolutionSource {
    /// Explicit override on the provider spec.
    Override,
    /// The platform variant's own fields.
    Platform,
    /// Platform catalog defaults.
    Catalog,
    /// Nothing resolved; empty fallback.
    Fallback,
}

/// A resolved value plus the precedence level that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    /// Resolved value.
    pub value: T,
    /// Level that produced the value.
    pub source: ResolutionSource,
}

/// Inputs shared by every resolver.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    /// Provider spec being normalized.
    pub spec: &'a ProviderSpec,
    /// Resolved platform variant.
    pub variant: PlatformVariant<'a>,
    /// Catalog defaults for the variant.
    pub defaults: &'static PlatformDefaults,
}

impl<'a> ResolveContext<'a> {
    /// Builds a context, resolving the platform variant.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::ConfigAmbiguity`] when several platforms are set.
    pub fn new(spec: &'a ProviderSpec) -> Result<Self, CompileError> {
        let variant = spec.variant()?;
        Ok(Self {
            spec,
            variant,
            defaults: variant.kind().defaults(),
        })
    }

    /// Returns the resolved platform kind.
    #[must_use]
    pub const fn kind(&self) -> PlatformKind {
        self.defaults.kind
    }
}

/// Single-value resolver signature.
type Resolver<T> = fn(&ResolveContext<'_>) -> Option<T>;
/// Mapping layer signature.
type MappingLayer = fn(&ResolveContext<'_>) -> Vec<(String, String)>;

/// Issuer precedence, first match wins.
const ISSUER_RESOLVERS: [(ResolutionSource, Resolver<String>); 3] = [
    (ResolutionSource::Override, issuer_from_override),
    (ResolutionSource::Platform, issuer_from_platform),
    (ResolutionSource::Catalog, issuer_from_catalog),
];

/// Audience precedence, first match wins.
const AUDIENCE_RESOLVERS: [(ResolutionSource, Resolver<Vec<String>>); 3] = [
    (ResolutionSource::Override, audiences_from_override),
    (ResolutionSource::Platform, audiences_from_platform),
    (ResolutionSource::Catalog, audiences_from_catalog),
];

/// Mapping layers, merged in order so later layers win.
const MAPPING_LAYERS: [(ResolutionSource, MappingLayer); 3] = [
    (ResolutionSource::Catalog, mapping_from_catalog),
    (ResolutionSource::Platform, mapping_from_platform),
    (ResolutionSource::Override, mapping_from_override),
];

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Normalizes one provider spec.
///
/// # Errors
///
/// Returns every problem found in the spec: platform ambiguity, a missing
/// issuer or AWS account, invalid mapping keys or claim names, or a mapping
/// without `google.subject`.
pub fn normalize_provider(spec: &ProviderSpec) -> Result<NormalizedProvider, Vec<CompileError>> {
    let ctx = ResolveContext::new(spec).map_err(|err| vec![err])?;
    let subject = format!("provider {}", spec.id);
    let kind = ctx.kind();
    let mut errors = Vec::new();

    let issuer = resolve_issuer(&ctx);
    let aws_account_id = match ctx.variant {
        PlatformVariant::AwsCodebuild(config) => non_blank(config.account_id.as_deref()),
        _ => None,
    };
    if kind.is_aws() {
        if aws_account_id.is_none() {
            errors.push(CompileError::incomplete(&subject, "aws_codebuild requires account_id"));
        }
        if issuer.source == ResolutionSource::Override {
            errors.push(CompileError::ambiguity(
                &subject,
                "aws providers are keyed by account id and do not accept issuer_uri",
            ));
        }
    } else if kind == PlatformKind::CustomOidc && issuer.value.is_empty() {
        errors.push(CompileError::incomplete(&subject, "custom_oidc requires an issuer_uri"));
    }

    errors.extend(validate_mapping_inputs(&ctx, &subject));
    let attribute_mapping = resolve_attribute_mapping(&ctx);
    if !kind.is_aws() && !attribute_mapping.contains_key(SUBJECT_MAPPING_KEY) {
        errors.push(CompileError::incomplete(
            &subject,
            format!("attribute mapping must define {SUBJECT_MAPPING_KEY}"),
        ));
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(NormalizedProvider {
        id: spec.id.clone(),
        kind,
        display_name: non_blank(spec.display_name.as_deref())
            .unwrap_or_else(|| spec.id.as_str().to_string()),
        description: spec.description.clone().unwrap_or_default(),
        disabled: spec.disabled,
        issuer_uri: issuer.value,
        allowed_audiences: resolve_audiences(&ctx).value,
        attribute_mapping,
        aws_account_id,
        condition: None,
    })
}

// ============================================================================
// SECTION: Issuer Resolution
// ============================================================================

/// Resolves the issuer through [`ISSUER_RESOLVERS`].
#[must_use]
pub fn resolve_issuer(ctx: &ResolveContext<'_>) -> Resolved<String> {
    first_match(ctx, &ISSUER_RESOLVERS).unwrap_or_else(|| Resolved {
        value: String::new(),
        source: ResolutionSource::Fallback,
    })
}

/// Issuer from the explicit `issuer_uri` override.
#[must_use]
pub fn issuer_from_override(ctx: &ResolveContext<'_>) -> Option<String> {
    non_blank(ctx.spec.issuer_uri.as_deref())
}

/// Issuer declared by the platform variant itself.
#[must_use]
pub fn issuer_from_platform(ctx: &ResolveContext<'_>) -> Option<String> {
    match ctx.variant {
        PlatformVariant::CustomOidc(config) => non_blank(config.issuer_uri.as_deref()),
        _ => None,
    }
}

/// Issuer from the catalog template, interpolated with platform fields.
#[must_use]
pub fn issuer_from_catalog(ctx: &ResolveContext<'_>) -> Option<String> {
    let template = ctx.defaults.issuer_template?;
    interpolate(template, |key| ctx.variant.template_value(key))
        .map(|issuer| issuer.trim_end_matches('/').to_string())
        .filter(|issuer| !issuer.is_empty())
}

// ============================================================================
// SECTION: Audience Resolution
// ============================================================================

/// Resolves allowed audiences through [`AUDIENCE_RESOLVERS`].
#[must_use]
pub fn resolve_audiences(ctx: &ResolveContext<'_>) -> Resolved<Vec<String>> {
    first_match(ctx, &AUDIENCE_RESOLVERS).unwrap_or_else(|| Resolved {
        value: Vec::new(),
        source: ResolutionSource::Fallback,
    })
}

/// Audiences from the explicit override, when non-empty.
#[must_use]
pub fn audiences_from_override(ctx: &ResolveContext<'_>) -> Option<Vec<String>> {
    non_empty_list(&ctx.spec.allowed_audiences)
}

/// Audiences declared by the platform variant itself.
#[must_use]
pub fn audiences_from_platform(ctx: &ResolveContext<'_>) -> Option<Vec<String>> {
    match ctx.variant {
        PlatformVariant::CustomOidc(config) => non_empty_list(&config.allowed_audiences),
        _ => None,
    }
}

/// Audiences from catalog templates that fully interpolate.
#[must_use]
pub fn audiences_from_catalog(ctx: &ResolveContext<'_>) -> Option<Vec<String>> {
    let audiences: Vec<String> = ctx
        .defaults
        .audience_templates
        .iter()
        .filter_map(|template| interpolate(template, |key| ctx.variant.template_value(key)))
        .collect();
    non_empty_list(&audiences)
}

// ============================================================================
// SECTION: Attribute Mapping
// ============================================================================

/// Merges [`MAPPING_LAYERS`] in order; later layers override identical keys.
#[must_use]
pub fn resolve_attribute_mapping(ctx: &ResolveContext<'_>) -> BTreeMap<String, String> {
    let mut mapping = BTreeMap::new();
    for (_, layer) in MAPPING_LAYERS {
        mapping.extend(layer(ctx));
    }
    mapping
}

/// Catalog default mapping.
#[must_use]
pub fn mapping_from_catalog(ctx: &ResolveContext<'_>) -> Vec<(String, String)> {
    ctx.defaults
        .claim_mapping
        .iter()
        .map(|(target, expression)| ((*target).to_string(), (*expression).to_string()))
        .collect()
}

/// One-to-one mapping for custom OIDC claims.
#[must_use]
pub fn mapping_from_platform(ctx: &ResolveContext<'_>) -> Vec<(String, String)> {
    let PlatformVariant::CustomOidc(config) = ctx.variant else {
        return Vec::new();
    };
    let claims: BTreeSet<&str> = config
        .claims
        .iter()
        .map(String::as_str)
        .chain(config.allowed_claims.keys().map(String::as_str))
        .collect();
    claims
        .into_iter()
        .map(|claim| {
            (format!("{ATTRIBUTE_PREFIX}{claim}"), ClaimPath::assertion(claim).to_string())
        })
        .collect()
}

/// Explicit mapping override.
#[must_use]
pub fn mapping_from_override(ctx: &ResolveContext<'_>) -> Vec<(String, String)> {
    ctx.spec
        .attribute_mapping
        .iter()
        .map(|(target, expression)| (target.clone(), expression.clone()))
        .collect()
}

/// Checks override keys and custom claim names before they are merged.
fn validate_mapping_inputs(ctx: &ResolveContext<'_>, subject: &str) -> Vec<CompileError> {
    let mut errors = Vec::new();
    for (target, expression) in &ctx.spec.attribute_mapping {
        let valid_key = target
            .strip_prefix(ATTRIBUTE_PREFIX)
            .map_or_else(|| target.starts_with(GOOGLE_PREFIX), is_attribute_name);
        if !valid_key {
            errors.push(CompileError::invalid_identifier(
                subject,
                format!("mapping key `{target}` must be google.* or attribute.<name>"),
            ));
        }
        if expression.trim().is_empty() {
            errors.push(CompileError::incomplete(
                subject,
                format!("mapping for `{target}` has an empty expression"),
            ));
        }
    }
    if let PlatformVariant::CustomOidc(config) = ctx.variant {
        let claims = config.claims.iter().chain(config.allowed_claims.keys());
        for claim in claims.filter(|claim| !is_attribute_name(claim)) {
            errors.push(CompileError::invalid_identifier(
                subject,
                format!("claim `{claim}` cannot be mapped to an attribute name"),
            ));
        }
    }
    errors
}

/// Returns true for names allowed after `attribute.`.
pub(crate) fn is_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_ATTRIBUTE_NAME_LENGTH
        && name.chars().all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_')
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the first resolver result in table order.
fn first_match<T, const N: usize>(
    ctx: &ResolveContext<'_>,
    resolvers: &[(ResolutionSource, Resolver<T>); N],
) -> Option<Resolved<T>> {
    resolvers.iter().find_map(|(source, resolver)| {
        resolver(ctx).map(|value| Resolved {
            value,
            source: *source,
        })
    })
}

/// Trims a value, treating blank as absent.
fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|value| !value.is_empty()).map(str::to_string)
}

/// Trims list entries, dropping blanks; `None` when nothing remains.
fn non_empty_list(values: &[String]) -> Option<Vec<String>> {
    let cleaned: Vec<String> = values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect();
    if cleaned.is_empty() { None } else { Some(cleaned) }
}
