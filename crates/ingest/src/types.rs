//! Core data model types for the ingestion gateway.
//!
//! These types represent the shape of ingestion requests as they arrive at the
//! gateway, before any security or compliance gate has looked at them. They are
//! designed to be:
//!
//! - **Serializable**: JSON in and out via serde
//! - **Cloneable**: Cheap to clone for pipeline processing
//! - **Comparable**: Support equality checks for testing
//! - **Extensible**: Marked `#[non_exhaustive]` where the surface may grow
//!
//! # Type Hierarchy
//!
//! ```text
//! IngestRequest
//! ├── metadata: IngestionMetadata
//! │   ├── source_id: String
//! │   ├── source: String
//! │   ├── environment: Environment
//! │   └── timestamp: DateTime<Utc>
//! ├── envelope: ComplianceEnvelope      (see envelope.rs)
//! └── body: RequestBody
//!     ├── Metrics(Vec<MetricPoint>)
//!     ├── Logs(Vec<LogRecord>)
//!     ├── Events(Vec<EventRecord>)
//!     ├── Batch { metrics, logs, events }
//!     └── SecurityTest { authorized_by, authorization_ticket, dry_run, payloads }
//! ```
//!
//! The gateway never mutates a request: the three gates read it, and only an
//! accepted request is forwarded to the storage collaborators.
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::envelope::ComplianceEnvelope;

/// Deployment environment a producer reports from.
///
/// Typed instead of free-form so downstream stores can partition on it
/// without string sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Environment {
    Production,
    Staging,
    Development,
    Test,
}

impl Environment {
    /// Stable lowercase name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Staging => "staging",
            Environment::Development => "development",
            Environment::Test => "test",
        }
    }
}

/// Identity and provenance attached to every ingestion request.
///
/// # Invariants (enforced by the threat detector's structural checks)
///
/// - `source_id` matches `^[A-Za-z0-9][A-Za-z0-9._-]{0,127}$`
/// - `timestamp` lies within `[now - 7 days, now + 5 minutes]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionMetadata {
    /// Stable identifier of the producing source. This is the admission
    /// control key: each distinct `source_id` gets its own rate budget.
    pub source_id: String,

    /// Human-readable description of the producer (service name, agent,
    /// collector). Free text, so it is scanned like any other text field.
    pub source: String,

    /// Which environment the producer reports from.
    pub environment: Environment,

    /// Producer-side timestamp of the request.
    pub timestamp: DateTime<Utc>,
}

/// One numeric sample destined for the time-series store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    /// Metric name, e.g. `cpu_usage_percentage`.
    pub name: String,
    /// Sample value. NaN/Infinity are rejected by validation; magnitudes
    /// above 1e15 are flagged.
    pub value: f64,
    /// Sample timestamp.
    pub timestamp: DateTime<Utc>,
    /// Dimension labels. Ordered map so serialization is deterministic.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

/// Log severity, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
}

/// One structured log record destined for the log store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Arbitrary structured context. Serialized to JSON before scanning so
    /// injection payloads embedded in nested values are still caught.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
    /// Exception text (message plus traceback) if the record carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
}

/// Severity classification of a platform event.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EventSeverity {
    #[default]
    Info,
    Low,
    Medium,
    High,
    Critical,
}

/// One discrete event destined for the pub/sub collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Event type tag, e.g. `deployment.finished`.
    pub event_type: String,
    pub severity: EventSeverity,
    pub title: String,
    pub description: String,
    /// Arbitrary structured payload, scanned as serialized JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

/// The kind-specific body of an ingestion request.
///
/// `Batch` carries several kinds at once; each kind is forwarded to its own
/// store independently, so a batch can partially succeed. `SecurityTest`
/// carries deliberate attack payloads and is handled specially by the
/// gateway: content scanning is skipped, authorization is required, and the
/// payloads are never forwarded to production storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
#[non_exhaustive]
pub enum RequestBody {
    Metrics(Vec<MetricPoint>),
    Logs(Vec<LogRecord>),
    Events(Vec<EventRecord>),
    Batch {
        #[serde(default)]
        metrics: Vec<MetricPoint>,
        #[serde(default)]
        logs: Vec<LogRecord>,
        #[serde(default)]
        events: Vec<EventRecord>,
    },
    SecurityTest {
        /// Who authorized this test run. Must be non-empty.
        authorized_by: String,
        /// Ticket reference for the authorization. Must be non-empty.
        authorization_ticket: String,
        /// When true the request is recorded to audit only.
        dry_run: bool,
        /// The attack payloads under test.
        payloads: Vec<String>,
    },
}

impl RequestBody {
    /// Item counts as `(metrics, logs, events)`.
    pub fn counts(&self) -> (usize, usize, usize) {
        match self {
            RequestBody::Metrics(points) => (points.len(), 0, 0),
            RequestBody::Logs(records) => (0, records.len(), 0),
            RequestBody::Events(events) => (0, 0, events.len()),
            RequestBody::Batch {
                metrics,
                logs,
                events,
            } => (metrics.len(), logs.len(), events.len()),
            RequestBody::SecurityTest { .. } => (0, 0, 0),
        }
    }

    /// Total item count across kinds. Security tests count their payloads.
    pub fn item_count(&self) -> usize {
        match self {
            RequestBody::SecurityTest { payloads, .. } => payloads.len(),
            _ => {
                let (m, l, e) = self.counts();
                m + l + e
            }
        }
    }

    /// Stable name of the request kind for logging and audit entries.
    pub fn kind_name(&self) -> &'static str {
        match self {
            RequestBody::Metrics(_) => "metrics",
            RequestBody::Logs(_) => "logs",
            RequestBody::Events(_) => "events",
            RequestBody::Batch { .. } => "batch",
            RequestBody::SecurityTest { .. } => "security_test",
        }
    }
}

/// A complete typed ingestion request: who sent it, under what data-handling
/// declaration, and what it carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestRequest {
    pub metadata: IngestionMetadata,
    pub envelope: ComplianceEnvelope,
    pub body: RequestBody,
}

impl IngestRequest {
    /// Estimated wire size in bytes, used for admission byte budgets.
    ///
    /// Serialization cannot fail for these types (no non-string map keys,
    /// no NaN-rejecting serializer), but we fall back to a conservative
    /// per-item estimate rather than panic if it ever does.
    pub fn estimated_size(&self) -> u64 {
        match serde_json::to_vec(&self.body) {
            Ok(bytes) => bytes.len() as u64,
            Err(_) => (self.body.item_count() as u64).saturating_mul(256),
        }
    }
}
