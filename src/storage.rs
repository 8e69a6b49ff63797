//! Storage collaborator interfaces.
//!
//! The gateway owns none of the storage backends; it forwards accepted
//! payloads through these traits and the embedding service wires in the
//! real time-series store, log store, cache/pub-sub, and audit sink.
//! Write methods return how many items the store accepted so a kind can
//! partially succeed; `Err` means the whole write for that kind failed.
use async_trait::async_trait;
use ingest::{EventRecord, LogRecord, MetricPoint};
use serde::Serialize;

use crate::audit::AuditEntry;
use crate::error::StoreError;

/// Time-series write API.
#[async_trait]
pub trait MetricStore: Send + Sync {
    /// Write points for one source; returns how many were accepted.
    async fn write_points(
        &self,
        source_id: &str,
        points: &[MetricPoint],
    ) -> Result<usize, StoreError>;

    /// Cheap reachability probe for health checks.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Structured log-store write API.
#[async_trait]
pub trait LogStore: Send + Sync {
    async fn write_records(
        &self,
        source_id: &str,
        records: &[LogRecord],
    ) -> Result<usize, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Cache/pub-sub event API: publish plus ring-buffer retention, both the
/// collaborator's concern.
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish_events(
        &self,
        source_id: &str,
        events: &[EventRecord],
    ) -> Result<usize, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Audit sink: receives batched audit entries.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn write_batch(&self, entries: &[AuditEntry]) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Health of one collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: &'static str,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Aggregated collaborator reachability.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// True iff every component is healthy.
    pub healthy: bool,
    pub components: Vec<ComponentHealth>,
}
