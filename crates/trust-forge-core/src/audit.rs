// trust-forge-core/src/audit.rs
// ============================================================================
// Module: Compile Audit Logging
// Description: Structured audit events for federation compiles and applies.
// Purpose: Emit JSON-line audit records without a logging framework dependency.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! One [`CompileAuditEvent`] is recorded per compile and one
//! [`ApplyAuditEvent`] per backend apply. Events carry counts, error kinds,
//! and the descriptor digest; rendered trust conditions and principal
//! members are never logged. Sinks are chosen by the caller so deployments
//! can route events to their own pipeline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::HashDigest;
use crate::core::HashError;
use crate::core::PoolId;
use crate::interfaces::ApplyReport;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Error kind recorded when the descriptor digest cannot be computed.
pub const DESCRIPTOR_HASH_FAILED: &str = "descriptor_hash_failed";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Result classification for audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// Operation completed.
    Success,
    /// Operation rejected or failed.
    Rejected,
}

/// Compile audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct CompileAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Pool being compiled.
    pub pool_id: PoolId,
    /// Compile outcome.
    pub outcome: AuditOutcome,
    /// Providers in the emitted descriptor set.
    pub provider_count: usize,
    /// Bindings in the emitted descriptor set.
    pub binding_count: usize,
    /// Role grants in the emitted descriptor set.
    pub role_grant_count: usize,
    /// Error kind labels in discovery order.
    ///
    /// A successful compile carries [`DESCRIPTOR_HASH_FAILED`] when its digest
    /// could not be computed.
    pub error_kinds: Vec<&'static str>,
    /// Digest of the emitted descriptor set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor_hash: Option<HashDigest>,
}

/// Compile audit event inputs.
#[derive(Debug, Clone)]
pub struct CompileAuditEventParams {
    /// Pool being compiled.
    pub pool_id: PoolId,
    /// Compile outcome.
    pub outcome: AuditOutcome,
    /// Providers emitted.
    pub provider_count: usize,
    /// Bindings emitted.
    pub binding_count: usize,
    /// Role grants emitted.
    pub role_grant_count: usize,
    /// Error kind labels.
    pub error_kinds: Vec<&'static str>,
    /// Descriptor digest.
    pub descriptor_hash: Option<HashDigest>,
}

impl CompileAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: CompileAuditEventParams) -> Self {
        Self {
            event: "trust_compile",
            timestamp_ms: now_ms(),
            pool_id: params.pool_id,
            outcome: params.outcome,
            provider_count: params.provider_count,
            binding_count: params.binding_count,
            role_grant_count: params.role_grant_count,
            error_kinds: params.error_kinds,
            descriptor_hash: params.descriptor_hash,
        }
    }
}

/// Backend apply audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Pool being applied.
    pub pool_id: PoolId,
    /// Apply outcome.
    pub outcome: AuditOutcome,
    /// Resources the backend applied.
    pub applied_count: usize,
    /// Resources the backend reported as failed.
    pub failed_count: usize,
    /// Digest of the applied descriptor set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor_hash: Option<HashDigest>,
    /// Error kind labels for the apply itself.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub error_kinds: Vec<&'static str>,
}

impl ApplyAuditEvent {
    /// Creates a new apply event with a consistent timestamp.
    ///
    /// A missing report means the backend could not run the apply.
    #[must_use]
    pub fn new(
        pool_id: PoolId,
        report: Option<&ApplyReport>,
        digest: Result<HashDigest, HashError>,
    ) -> Self {
        let (descriptor_hash, error_kinds) = audited_digest(digest);
        let (applied_count, failed_count) =
            report.map_or((0, 0), |report| (report.applied_count(), report.failed_count()));
        let outcome = match report {
            Some(report) if report.is_success() => AuditOutcome::Success,
            _ => AuditOutcome::Rejected,
        };
        Self {
            event: "trust_apply",
            timestamp_ms: now_ms(),
            pool_id,
            outcome,
            applied_count,
            failed_count,
            descriptor_hash,
            error_kinds,
        }
    }
}

/// Splits a digest result into the audited hash and its error kinds.
#[must_use]
pub fn audited_digest(
    digest: Result<HashDigest, HashError>,
) -> (Option<HashDigest>, Vec<&'static str>) {
    match digest {
        Ok(digest) => (Some(digest), Vec::new()),
        Err(_) => (None, vec![DESCRIPTOR_HASH_FAILED]),
    }
}

/// Milliseconds since the Unix epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for compile events.
pub trait CompileAuditSink: Send + Sync {
    /// Record a compile event.
    fn record(&self, event: &CompileAuditEvent);

    /// Record a backend apply event.
    fn record_apply(&self, _event: &ApplyAuditEvent) {}
}

impl<S: CompileAuditSink + ?Sized> CompileAuditSink for Box<S> {
    fn record(&self, event: &CompileAuditEvent) {
        (**self).record(event);
    }

    fn record_apply(&self, event: &ApplyAuditEvent) {
        (**self).record_apply(event);
    }
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl CompileAuditSink for StderrAuditSink {
    fn record(&self, event: &CompileAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_apply(&self, event: &ApplyAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one serialized line.
    fn write_line<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl CompileAuditSink for FileAuditSink {
    fn record(&self, event: &CompileAuditEvent) {
        self.write_line(event);
    }

    fn record_apply(&self, event: &ApplyAuditEvent) {
        self.write_line(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl CompileAuditSink for NoopAuditSink {
    fn record(&self, _event: &CompileAuditEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================
