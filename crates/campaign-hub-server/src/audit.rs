// crates/campaign-hub-server/src/audit.rs
// ============================================================================
// Module: API Audit Logging
// Description: Structured audit events for campaign API requests.
// Purpose: Emit JSON-line audit records without hard logging dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Mutating handlers emit one audit event per request describing the
//! operation, its outcome, and the acting party. Events are JSON lines so
//! deployments can route them to any log pipeline. Payload bodies are never
//! logged; only identifiers and outcome labels appear.

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

// ============================================================================
// SECTION: Types
// ============================================================================

/// Campaign API audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct ApiAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Operation label, such as `contact_submit` or `event_register`.
    pub operation: &'static str,
    /// Outcome label: `ok`, `rejected`, or `error`.
    pub outcome: &'static str,
    /// Affected record identifier when known.
    pub record_id: Option<i64>,
    /// Acting admin username for admin operations.
    pub actor: Option<String>,
    /// Short detail label; never raw payload content.
    pub detail: Option<String>,
}

impl ApiAuditEvent {
    /// Creates an audit event with a consistent timestamp.
    #[must_use]
    pub fn new(operation: &'static str, outcome: &'static str) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "campaign_api",
            timestamp_ms,
            operation,
            outcome,
            record_id: None,
            actor: None,
            detail: None,
        }
    }

    /// Attaches the affected record identifier.
    #[must_use]
    pub const fn with_record(mut self, record_id: i64) -> Self {
        self.record_id = Some(record_id);
        self
    }

    /// Attaches the acting admin username.
    #[must_use]
    pub fn with_actor(mut self, actor: &str) -> Self {
        self.actor = Some(actor.to_string());
        self
    }

    /// Attaches a short detail label.
    #[must_use]
    pub fn with_detail(mut self, detail: &str) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for campaign API events.
pub trait ApiAuditSink: Send + Sync {
    /// Records an audit event.
    fn record(&self, event: &ApiAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl ApiAuditSink for StderrAuditSink {
    fn record(&self, event: &ApiAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to an append-only file.
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
}

impl ApiAuditSink for FileAuditSink {
    fn record(&self, event: &ApiAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl ApiAuditSink for NoopAuditSink {
    fn record(&self, _event: &ApiAuditEvent) {}
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

    use super::ApiAuditEvent;
    use super::ApiAuditSink;
    use super::FileAuditSink;

    #[test]
    fn events_serialize_with_operation_and_outcome() {
        let event = ApiAuditEvent::new("contact_submit", "ok")
            .with_record(7)
            .with_detail("notified");
        let json = serde_json::to_string(&event).expect("serialize");
        assert!(json.contains("\"operation\":\"contact_submit\""));
        assert!(json.contains("\"outcome\":\"ok\""));
        assert!(json.contains("\"record_id\":7"));
    }

    #[test]
    fn file_sink_appends_json_lines() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("audit.log");
        let sink = FileAuditSink::new(&path).expect("open sink");
        sink.record(&ApiAuditEvent::new("admin_login", "ok").with_actor("chair"));
        sink.record(&ApiAuditEvent::new("admin_login", "rejected"));
        let contents = std::fs::read_to_string(&path).expect("read log");
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.contains("\"actor\":\"chair\""));
    }
}
