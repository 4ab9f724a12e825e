// trust-forge-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for trust-forge-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use trust_forge_config::ConfigError;
use trust_forge_config::FederationConfig;

/// Parses a TOML string into a `FederationConfig` for tests.
pub fn config_from_toml(toml_str: &str) -> Result<FederationConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a minimal config with only the pool table.
pub fn minimal_config() -> Result<FederationConfig, toml::de::Error> {
    config_from_toml(
        r#"
[pool]
id = "ci-pool"
project_number = "123456789012"
"#,
    )
}

/// Asserts that a result is an error whose message contains `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> Result<(), String> {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error '{message}' did not contain '{needle}'"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}
