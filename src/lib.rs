//! Telgate: the telemetry ingestion security and compliance gateway.
//!
//! Telemetry from many independent producers (metrics, logs, events) passes
//! through three gates before it reaches any store, in increasing cost
//! order, short-circuiting on the first failure:
//!
//! 1. **Admission control** ([`AdmissionController`]) — per-source and
//!    global request/byte budgets; token bucket by default, sliding or
//!    fixed window by configuration, with adaptive and distributed
//!    variants.
//! 2. **Threat detection** ([`ThreatDetector`]) — precompiled pattern
//!    tables for prompt/SQL/XSS/command injection and eight sensitive-data
//!    classes, plus structural and numeric sanity checks.
//! 3. **Compliance verification** ([`CompliancePolicyEngine`]) — the
//!    data-handling envelope checked against a category-keyed rule table.
//!
//! [`IngestionGateway`] sequences the gates, forwards accepted payloads to
//! the storage collaborators (consumed as traits — the HTTP layer and the
//! stores themselves live elsewhere), tracks process-wide statistics, and
//! batches audit writes off the hot path.
//!
//! ## Example
//!
//! The gateway is embedded by a service that wires in real stores; tests
//! use in-memory fakes (see `tests/`).
//!
//! ```no_run
//! use std::sync::Arc;
//! use telgate::{GatewayConfig, GatewayStores, IngestionGateway};
//! # fn stores() -> GatewayStores { unimplemented!() }
//!
//! # async fn run() -> Result<(), telgate::GatewayError> {
//! let gateway = Arc::new(IngestionGateway::new(GatewayConfig::default(), stores())?);
//! let maintenance = gateway.spawn_maintenance();
//!
//! // ... serve traffic: gateway.process(request).await ...
//!
//! maintenance.abort();
//! gateway.shutdown().await;
//! # Ok(())
//! # }
//! ```
mod audit;
mod config;
mod error;
mod gateway;
mod response;
mod stats;
mod storage;

pub use crate::audit::AuditEntry;
pub use crate::config::{GatewayConfig, GatewayConfigError};
pub use crate::error::{GatewayError, StoreError};
pub use crate::gateway::{GatewayStores, IngestionGateway};
pub use crate::response::{IngestionResponse, IngestionStatus, ResponseError};
pub use crate::stats::StatsSnapshot;
pub use crate::storage::{
    AuditSink, ComponentHealth, EventBus, HealthReport, LogStore, MetricStore,
};

pub use admission::{
    AdaptiveAdmissionController, AdmissionConfig, AdmissionConfigError, AdmissionController,
    AdmissionStrategy, BackoffConfig, CounterStore, CounterStoreError, DenyReason,
    DistributedAdmissionController, DistributedConfig, RateLimitResult, RateLimitState,
};
pub use detect::{
    correlation_hash, DetectorConfig, PatternError, PatternLibrary, SensitiveClass,
    ThreatDetector, ThreatFamily,
};
pub use ingest::{
    source_id_is_valid, ComplianceEnvelope, DataCategory, Environment, EventRecord,
    EventSeverity, IngestRequest, IngestionMetadata, IssueSeverity, LogLevel, LogRecord,
    MetricPoint, RequestBody, RetentionPolicy, Sensitivity, ValidationBounds, ValidationIssue,
    ValidationResult,
};
pub use policy::{
    CompliancePolicyEngine, ComplianceReport, IssueFrequency, PolicyAuditRecord, PolicyConfig,
    PolicyConfigError, PolicyOutcome,
};
