//! Telgate request data model.
//!
//! This crate defines the shapes that flow through the ingestion gateway:
//! typed requests (metrics, logs, events, batches, security tests), the
//! metadata and compliance envelope attached to each, and the validation
//! issue/result types every gate reports in.
//!
//! It deliberately contains no gate logic. The threat detector, policy
//! engine, and admission controller each live in their own crate and share
//! this vocabulary; the gateway crate stitches them together.
//!
//! ## Example
//!
//! ```
//! use ingest::{
//!     ComplianceEnvelope, Environment, IngestRequest, IngestionMetadata, MetricPoint,
//!     RequestBody,
//! };
//! use chrono::Utc;
//! use std::collections::BTreeMap;
//!
//! let request = IngestRequest {
//!     metadata: IngestionMetadata {
//!         source_id: "svc-api-01".into(),
//!         source: "api gateway".into(),
//!         environment: Environment::Production,
//!         timestamp: Utc::now(),
//!     },
//!     envelope: ComplianceEnvelope::telemetry_default(),
//!     body: RequestBody::Metrics(vec![MetricPoint {
//!         name: "cpu_usage_percentage".into(),
//!         value: 42.5,
//!         timestamp: Utc::now(),
//!         labels: BTreeMap::new(),
//!     }]),
//! };
//!
//! assert_eq!(request.body.kind_name(), "metrics");
//! ```
mod config;
mod envelope;
mod issue;
mod types;

pub use crate::config::{
    source_id_is_valid, BoundsError, ValidationBounds, MAX_SOURCE_ID_LEN,
};
pub use crate::envelope::{ComplianceEnvelope, DataCategory, RetentionPolicy, Sensitivity};
pub use crate::issue::{IssueSeverity, ValidationIssue, ValidationResult};
pub use crate::types::{
    Environment, EventRecord, EventSeverity, IngestRequest, IngestionMetadata, LogLevel,
    LogRecord, MetricPoint, RequestBody,
};
