// trust-forge-config/src/config.rs
// ============================================================================
// Module: Trust Forge Configuration
// Description: Configuration loading and validation for federation compiles.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: trust-forge-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Only structural limits are enforced here; semantic checks belong to the
//! compiler so one compile reports every semantic problem together.
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;
use trust_forge_core::CompileAuditSink;
use trust_forge_core::CompileInput;
use trust_forge_core::FederationCompiler;
use trust_forge_core::FileAuditSink;
use trust_forge_core::NoopAuditSink;
use trust_forge_core::PoolSettings;
use trust_forge_core::ProviderSpec;
use trust_forge_core::ServiceAccountSpec;
use trust_forge_core::StderrAuditSink;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "trust-forge.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "TRUST_FORGE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of providers in one pool.
pub(crate) const MAX_PROVIDERS: usize = 200;
/// Maximum number of service accounts.
pub(crate) const MAX_SERVICE_ACCOUNTS: usize = 256;
/// Maximum number of bindings per service account.
pub(crate) const MAX_BINDINGS_PER_ACCOUNT: usize = 64;
/// Maximum number of roles in one role list.
pub(crate) const MAX_ROLES: usize = 64;
/// Maximum number of allowed audiences per provider.
pub(crate) const MAX_AUDIENCES: usize = 10;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Trust Forge federation configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FederationConfig {
    /// Pool settings.
    pub pool: PoolSettings,
    /// Provider specifications.
    #[serde(default)]
    pub providers: Vec<ProviderSpec>,
    /// Service accounts and their bindings.
    #[serde(default)]
    pub service_accounts: Vec<ServiceAccountSpec>,
    /// Audit sink configuration.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl FederationConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates structural limits.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_pool(&self.pool)?;
        if self.providers.len() > MAX_PROVIDERS {
            return Err(ConfigError::Invalid(format!(
                "providers exceeds max entries ({MAX_PROVIDERS})"
            )));
        }
        for provider in &self.providers {
            validate_provider(provider)?;
        }
        if self.service_accounts.len() > MAX_SERVICE_ACCOUNTS {
            return Err(ConfigError::Invalid(format!(
                "service_accounts exceeds max entries ({MAX_SERVICE_ACCOUNTS})"
            )));
        }
        for account in &self.service_accounts {
            validate_service_account(account)?;
        }
        self.audit.validate()
    }

    /// Returns the compile input described by this configuration.
    #[must_use]
    pub fn compile_input(&self) -> CompileInput {
        CompileInput {
            pool: self.pool.clone(),
            providers: self.providers.clone(),
            service_accounts: self.service_accounts.clone(),
        }
    }

    /// Builds an audited compiler using the configured sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the audit file cannot be opened.
    pub fn compiler(&self) -> Result<FederationCompiler<Box<dyn CompileAuditSink>>, ConfigError> {
        Ok(FederationCompiler::new(self.audit.build_sink()?))
    }
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Discard audit events.
    None,
}

/// Audit configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Sink selection.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// File path for the `file` sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", path),
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for sink = \"file\"".to_string()))
            }
            (_, Some(_)) => Err(ConfigError::Invalid(
                "audit.path is only valid with sink = \"file\"".to_string(),
            )),
            (_, None) => Ok(()),
        }
    }

    /// Builds the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the sink cannot be constructed.
    pub fn build_sink(&self) -> Result<Box<dyn CompileAuditSink>, ConfigError> {
        match self.sink {
            AuditSinkKind::Stderr => Ok(Box::new(StderrAuditSink)),
            AuditSinkKind::None => Ok(Box::new(NoopAuditSink)),
            AuditSinkKind::File => {
                let path = self.path.as_deref().ok_or_else(|| {
                    ConfigError::Invalid("audit.path is required for sink = \"file\"".to_string())
                })?;
                let sink = FileAuditSink::new(Path::new(path.trim()))
                    .map_err(|err| ConfigError::Io(err.to_string()))?;
                Ok(Box::new(sink))
            }
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the argument or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates the pool project number.
fn validate_pool(pool: &PoolSettings) -> Result<(), ConfigError> {
    let number = pool.project_number.trim();
    if number.is_empty() {
        return Err(ConfigError::Invalid("pool.project_number must be non-empty".to_string()));
    }
    if !number.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ConfigError::Invalid(
            "pool.project_number must contain only digits".to_string(),
        ));
    }
    Ok(())
}

/// Validates per-provider list limits.
fn validate_provider(provider: &ProviderSpec) -> Result<(), ConfigError> {
    let custom_audiences =
        provider.custom_oidc.as_ref().map_or(0, |config| config.allowed_audiences.len());
    if provider.allowed_audiences.len() > MAX_AUDIENCES || custom_audiences > MAX_AUDIENCES {
        return Err(ConfigError::Invalid(format!(
            "provider {} allowed_audiences exceeds max entries ({MAX_AUDIENCES})",
            provider.id
        )));
    }
    Ok(())
}

/// Validates per-account binding and role limits.
fn validate_service_account(account: &ServiceAccountSpec) -> Result<(), ConfigError> {
    if account.bindings.len() > MAX_BINDINGS_PER_ACCOUNT {
        return Err(ConfigError::Invalid(format!(
            "service account {} bindings exceeds max entries ({MAX_BINDINGS_PER_ACCOUNT})",
            account.id
        )));
    }
    let oversized = account.roles.len() > MAX_ROLES
        || account.bindings.iter().any(|binding| binding.roles.len() > MAX_ROLES);
    if oversized {
        return Err(ConfigError::Invalid(format!(
            "service account {} roles exceeds max entries ({MAX_ROLES})",
            account.id
        )));
    }
    Ok(())
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
        reason = "Test-only assertions are permitted."
    )]

    use super::*;

    #[test]
    fn validate_path_string_rejects_whitespace_only() {
        let result = validate_path_string("audit.path", "   ");
        assert!(result.unwrap_err().to_string().contains("non-empty"));
    }

    #[test]
    fn validate_path_string_rejects_long_component() {
        let long_component = format!("logs/{}", "a".repeat(MAX_PATH_COMPONENT_LENGTH + 1));
        let result = validate_path_string("audit.path", &long_component);
        assert!(result.unwrap_err().to_string().contains("path component too long"));
    }

    #[test]
    fn explicit_path_wins_over_default() {
        let resolved = resolve_path(Some(Path::new("custom.toml"))).unwrap();
        assert_eq!(resolved, PathBuf::from("custom.toml"));
    }

    #[test]
    fn project_number_must_be_digits() {
        let mut pool = PoolSettings {
            id: trust_forge_core::PoolId::new("ci-pool"),
            project_number: "12ab".to_string(),
            display_name: None,
            description: None,
            disabled: false,
            attribute_conditions: true,
        };
        assert!(validate_pool(&pool).unwrap_err().to_string().contains("only digits"));
        pool.project_number = "  ".to_string();
        assert!(validate_pool(&pool).unwrap_err().to_string().contains("non-empty"));
    }
}
