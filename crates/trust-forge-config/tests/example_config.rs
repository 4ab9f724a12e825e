//! Example config tests for trust-forge-config.
// trust-forge-config/tests/example_config.rs
// =============================================================================
// Module: Example Config Tests
// Description: The canonical example parses, validates, and compiles.
// Purpose: Keep the published example usable end to end.
// =============================================================================

use trust_forge_config::AuditSinkKind;
use trust_forge_config::config_toml_example;

mod common;

type TestResult = Result<(), String>;

#[test]
fn example_config_parses_and_validates() -> TestResult {
    let config = common::config_from_toml(&config_toml_example()).map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    if config.providers.len() != 3 || config.service_accounts.len() != 2 {
        return Err("example should declare three providers and two accounts".to_string());
    }
    if config.audit.sink != AuditSinkKind::None {
        return Err("example should default to a silent audit sink".to_string());
    }
    Ok(())
}

#[test]
fn example_config_compiles() -> TestResult {
    let config = common::config_from_toml(&config_toml_example()).map_err(|err| err.to_string())?;
    let compiler = config.compiler().map_err(|err| err.to_string())?;
    let set = compiler.compile(&config.compile_input()).map_err(|err| err.to_string())?;
    let providers: Vec<&str> =
        set.providers.iter().map(|provider| provider.provider_id.as_str()).collect();
    if providers != ["corp-idp", "github-actions", "gitlab-ci"] {
        return Err(format!("unexpected provider order: {}", providers.join(", ")));
    }
    if set.bindings.len() != 4 {
        return Err(format!("expected 4 bindings, got {}", set.bindings.len()));
    }
    let gitlab = set
        .providers
        .iter()
        .find(|provider| provider.provider_id.as_str() == "gitlab-ci")
        .and_then(|provider| provider.condition.as_ref())
        .ok_or_else(|| "gitlab provider should carry a condition".to_string())?;
    if !gitlab.as_str().ends_with("assertion.ref_protected == 'true'") {
        return Err(format!("gitlab condition lacks protected clause: {}", gitlab.as_str()));
    }
    Ok(())
}

#[test]
fn example_config_with_file_sink_writes_audit_line() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let audit_path = dir.path().join("audit.jsonl");
    let mut config =
        common::config_from_toml(&config_toml_example()).map_err(|err| err.to_string())?;
    config.audit.sink = AuditSinkKind::File;
    config.audit.path = Some(audit_path.to_string_lossy().into_owned());
    config.validate().map_err(|err| err.to_string())?;
    let compiler = config.compiler().map_err(|err| err.to_string())?;
    compiler.compile(&config.compile_input()).map_err(|err| err.to_string())?;

    let contents = std::fs::read_to_string(&audit_path).map_err(|err| err.to_string())?;
    let line = contents.lines().next().ok_or_else(|| "audit file is empty".to_string())?;
    let event: serde_json::Value = serde_json::from_str(line).map_err(|err| err.to_string())?;
    if event["event"] != "trust_compile" || event["provider_count"] != 3 {
        return Err(format!("unexpected audit event: {line}"));
    }
    Ok(())
}
