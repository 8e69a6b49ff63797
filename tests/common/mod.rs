//! Shared fixtures for the gateway integration suites: an in-memory fake
//! for every storage collaborator plus request builders.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use telgate::{
    AuditEntry, AuditSink, ComplianceEnvelope, Environment, EventBus, EventRecord,
    EventSeverity, GatewayStores, IngestRequest, IngestionMetadata, LogLevel, LogRecord,
    LogStore, MetricPoint, MetricStore, RequestBody, StoreError,
};

/// One fake backing all four collaborator traits, with failure and
/// partial-accept knobs per kind.
pub struct FakeStore {
    pub metric_calls: AtomicUsize,
    pub metric_points: AtomicUsize,
    pub log_records: AtomicUsize,
    pub event_records: AtomicUsize,
    pub audit_entries: AtomicUsize,
    pub audit_batches: Mutex<Vec<usize>>,

    pub fail_metrics: AtomicBool,
    pub fail_logs: AtomicBool,
    pub fail_events: AtomicBool,
    pub unhealthy_logs: AtomicBool,

    /// Log store accepts at most this many records per call.
    pub logs_accept_at_most: AtomicUsize,
    /// Artificial latency on metric writes, for timeout tests.
    pub metric_delay: Mutex<Option<Duration>>,
}

impl FakeStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            metric_calls: AtomicUsize::new(0),
            metric_points: AtomicUsize::new(0),
            log_records: AtomicUsize::new(0),
            event_records: AtomicUsize::new(0),
            audit_entries: AtomicUsize::new(0),
            audit_batches: Mutex::new(Vec::new()),
            fail_metrics: AtomicBool::new(false),
            fail_logs: AtomicBool::new(false),
            fail_events: AtomicBool::new(false),
            unhealthy_logs: AtomicBool::new(false),
            logs_accept_at_most: AtomicUsize::new(usize::MAX),
            metric_delay: Mutex::new(None),
        })
    }

    pub fn stores(self: &Arc<Self>) -> GatewayStores {
        GatewayStores {
            metrics: Arc::clone(self) as Arc<dyn MetricStore>,
            logs: Arc::clone(self) as Arc<dyn LogStore>,
            events: Arc::clone(self) as Arc<dyn EventBus>,
            audit: Arc::clone(self) as Arc<dyn AuditSink>,
        }
    }
}

#[async_trait]
impl MetricStore for FakeStore {
    async fn write_points(
        &self,
        _source_id: &str,
        points: &[MetricPoint],
    ) -> Result<usize, StoreError> {
        self.metric_calls.fetch_add(1, Ordering::Relaxed);
        let delay = *self.metric_delay.lock().expect("metric_delay lock");
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_metrics.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("metric store down".into()));
        }
        self.metric_points.fetch_add(points.len(), Ordering::Relaxed);
        Ok(points.len())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl LogStore for FakeStore {
    async fn write_records(
        &self,
        _source_id: &str,
        records: &[LogRecord],
    ) -> Result<usize, StoreError> {
        if self.fail_logs.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("log store down".into()));
        }
        let accepted = records
            .len()
            .min(self.logs_accept_at_most.load(Ordering::Relaxed));
        self.log_records.fetch_add(accepted, Ordering::Relaxed);
        Ok(accepted)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.unhealthy_logs.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("log store down".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl EventBus for FakeStore {
    async fn publish_events(
        &self,
        _source_id: &str,
        events: &[EventRecord],
    ) -> Result<usize, StoreError> {
        if self.fail_events.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("event bus down".into()));
        }
        self.event_records.fetch_add(events.len(), Ordering::Relaxed);
        Ok(events.len())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl AuditSink for FakeStore {
    async fn write_batch(&self, entries: &[AuditEntry]) -> Result<(), StoreError> {
        self.audit_entries.fetch_add(entries.len(), Ordering::Relaxed);
        self.audit_batches
            .lock()
            .expect("audit_batches lock")
            .push(entries.len());
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

pub fn metadata(source_id: &str) -> IngestionMetadata {
    IngestionMetadata {
        source_id: source_id.into(),
        source: "integration harness".into(),
        environment: Environment::Test,
        timestamp: Utc::now(),
    }
}

pub fn metric(name: &str) -> MetricPoint {
    MetricPoint {
        name: name.into(),
        value: 42.0,
        timestamp: Utc::now(),
        labels: BTreeMap::new(),
    }
}

pub fn log(message: &str) -> LogRecord {
    LogRecord {
        level: LogLevel::Info,
        message: message.into(),
        timestamp: Utc::now(),
        context: None,
        exception: None,
    }
}

pub fn event(title: &str) -> EventRecord {
    EventRecord {
        event_type: "test.event".into(),
        severity: EventSeverity::Info,
        title: title.into(),
        description: "integration test event".into(),
        payload: None,
    }
}

pub fn metrics_request(source_id: &str, names: &[&str]) -> IngestRequest {
    IngestRequest {
        metadata: metadata(source_id),
        envelope: ComplianceEnvelope::telemetry_default(),
        body: RequestBody::Metrics(names.iter().map(|n| metric(n)).collect()),
    }
}

pub fn logs_request(source_id: &str, messages: &[&str]) -> IngestRequest {
    IngestRequest {
        metadata: metadata(source_id),
        envelope: ComplianceEnvelope::telemetry_default(),
        body: RequestBody::Logs(messages.iter().map(|m| log(m)).collect()),
    }
}

pub fn batch_request(source_id: &str, metrics: usize, logs_count: usize) -> IngestRequest {
    IngestRequest {
        metadata: metadata(source_id),
        envelope: ComplianceEnvelope::telemetry_default(),
        body: RequestBody::Batch {
            metrics: (0..metrics).map(|i| metric(&format!("metric_{i}"))).collect(),
            logs: (0..logs_count).map(|i| log(&format!("log line {i}"))).collect(),
            events: Vec::new(),
        },
    }
}

/// Poll until `predicate` holds or the timeout elapses. Used for effects
/// dispatched off the hot path (spawned audit flushes).
pub async fn wait_for(mut predicate: impl FnMut() -> bool, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if predicate() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
