//! Config load validation tests for trust-forge-config.
// trust-forge-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

#![allow(
    clippy::use_debug,
    reason = "Test failure messages include debug output of unexpected results."
)]

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use trust_forge_config::ConfigError;
use trust_forge_config::FederationConfig;

mod common;

use common::assert_invalid;

type TestResult = Result<(), String>;

fn write_config(contents: &[u8]) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(contents).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(FederationConfig::load(Some(path)), "config path exceeds max length")
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(FederationConfig::load(Some(path)), "config path component too long")
}

#[test]
fn load_reports_missing_file_as_io() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let missing = dir.path().join("absent.toml");
    match FederationConfig::load(Some(&missing)) {
        Err(ConfigError::Io(_)) => Ok(()),
        other => Err(format!("expected io error, got {other:?}")),
    }
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let file = write_config(&vec![b'#'; 1_048_577])?;
    assert_invalid(FederationConfig::load(Some(file.path())), "config file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let file = write_config(&[0xFF, 0xFE, 0xFF])?;
    assert_invalid(FederationConfig::load(Some(file.path())), "config file must be utf-8")
}

#[test]
fn load_rejects_unknown_top_level_tables() -> TestResult {
    let file = write_config(
        b"[pool]\nid = \"ci-pool\"\nproject_number = \"1\"\n\n[server]\nbind = \"0.0.0.0\"\n",
    )?;
    match FederationConfig::load(Some(file.path())) {
        Err(ConfigError::Parse(message)) if message.contains("server") => Ok(()),
        other => Err(format!("expected parse error naming server, got {other:?}")),
    }
}

#[test]
fn load_rejects_missing_pool() -> TestResult {
    let file = write_config(b"[[providers]]\nid = \"github-actions\"\n")?;
    match FederationConfig::load(Some(file.path())) {
        Err(ConfigError::Parse(_)) => Ok(()),
        other => Err(format!("expected parse error, got {other:?}")),
    }
}

#[test]
fn load_validates_after_parsing() -> TestResult {
    let file = write_config(b"[pool]\nid = \"ci-pool\"\nproject_number = \"my-project\"\n")?;
    assert_invalid(FederationConfig::load(Some(file.path())), "only digits")
}

#[test]
fn load_accepts_minimal_config() -> TestResult {
    let file = write_config(b"[pool]\nid = \"ci-pool\"\nproject_number = \"42\"\n")?;
    let config = FederationConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.providers.is_empty() && config.pool.attribute_conditions {
        Ok(())
    } else {
        Err("minimal config should default to no providers and enabled conditions".to_string())
    }
}

#[test]
fn load_rejects_misspelled_platform_fields() -> TestResult {
    let file = write_config(
        br#"[pool]
id = "ci-pool"
project_number = "42"

[[providers]]
id = "github-actions"

[providers.github]
organization = "acme"
branchs = ["main"]
"#,
    )?;
    match FederationConfig::load(Some(file.path())) {
        Err(ConfigError::Parse(message)) if message.contains("branchs") => Ok(()),
        other => Err(format!("expected parse error naming branchs, got {other:?}")),
    }
}

#[test]
fn load_rejects_misspelled_provider_and_binding_fields() -> TestResult {
    let provider = write_config(
        b"[pool]\nid = \"ci-pool\"\nproject_number = \"42\"\n\n[[providers]]\n\
          id = \"github-actions\"\nunrestriced = true\n",
    )?;
    assert_parse_error(FederationConfig::load(Some(provider.path())), "unrestriced")?;
    let binding = write_config(
        b"[pool]\nid = \"ci-pool\"\nproject_number = \"42\"\n\n[[service_accounts]]\n\
          id = \"deployer\"\n\n[[service_accounts.bindings]]\nprovider_id = \"github-actions\"\n\
          extra_conditon = \"repository/acme/app\"\n",
    )?;
    assert_parse_error(FederationConfig::load(Some(binding.path())), "extra_conditon")
}

fn assert_parse_error(result: Result<FederationConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(ConfigError::Parse(message)) if message.contains(needle) => Ok(()),
        other => Err(format!("expected parse error naming {needle}, got {other:?}")),
    }
}
