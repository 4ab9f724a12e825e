// trust-forge-core/src/core/mod.rs
// ============================================================================
// Module: Trust Forge Core Types
// Description: Input specs, platform catalog, trust expressions, and descriptors.
// Purpose: Provide stable, serializable types shared by every compile stage.
// Dependencies: serde, smallvec, sha2, serde_jcs
// ============================================================================

//! ## Overview
//! Core types define what the compiler consumes (specs), the static platform
//! catalog, the trust expression algebra, and what it emits (descriptors).

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod descriptors;
pub mod error;
pub mod expr;
pub mod hashing;
pub mod identifiers;
pub mod platform;
pub mod spec;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use descriptors::BindingDescriptor;
pub use descriptors::DescriptorSet;
pub use descriptors::NormalizedProvider;
pub use descriptors::PoolDescriptor;
pub use descriptors::PrincipalMember;
pub use descriptors::ProviderDescriptor;
pub use descriptors::RoleGrant;
pub use descriptors::TrustCondition;
pub use error::CompileError;
pub use error::CompileErrors;
pub use expr::ClaimPath;
pub use expr::ClaimRoot;
pub use expr::Clause;
pub use expr::ClauseOp;
pub use expr::TrustExpr;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use identifiers::PoolId;
pub use identifiers::ProviderId;
pub use identifiers::ServiceAccountId;
pub use platform::PlatformCatalog;
pub use platform::PlatformDefaults;
pub use platform::PlatformKind;
pub use spec::AwsCodebuildConfig;
pub use spec::AzureDevopsConfig;
pub use spec::Binding;
pub use spec::BitbucketConfig;
pub use spec::CircleciConfig;
pub use spec::CompileInput;
pub use spec::CustomOidcConfig;
pub use spec::GithubConfig;
pub use spec::GitlabConfig;
pub use spec::HarnessConfig;
pub use spec::JenkinsConfig;
pub use spec::PlatformVariant;
pub use spec::PoolSettings;
pub use spec::ProviderSpec;
pub use spec::ServiceAccountSpec;
pub use spec::SpinnakerConfig;
pub use spec::TerraformCloudConfig;
