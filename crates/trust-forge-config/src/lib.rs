// trust-forge-config/src/lib.rs
// ============================================================================
// Module: Trust Forge Config Library
// Description: Canonical config model, validation, and example generation.
// Purpose: Single source of truth for trust-forge.toml semantics.
// Dependencies: trust-forge-core, serde, toml
// ============================================================================

//! ## Overview
//! `trust-forge-config` defines the TOML configuration model for federation
//! compiles. It provides strict, fail-closed loading with structural limits,
//! audit sink selection, and a canonical example configuration.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
