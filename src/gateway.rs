//! The ingestion gateway: sequences admission control, threat detection,
//! and compliance verification in increasing cost order, forwards accepted
//! payloads to the storage collaborators, and keeps statistics and the
//! batched audit trail.
//!
//! The three gates are pure and fast; only the final collaborator writes
//! do I/O, and each one runs under the configured timeout so a hung store
//! surfaces as a write error instead of stalling producers.
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use admission::{AdmissionController, RateLimitResult};
use chrono::Utc;
use detect::ThreatDetector;
use ingest::{IngestRequest, RequestBody, ValidationIssue};
use policy::{CompliancePolicyEngine, ComplianceReport};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::audit::{AuditBuffer, AuditEntry};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, StoreError};
use crate::response::{IngestionResponse, IngestionStatus, ResponseError};
use crate::stats::{IngestionStats, StatsSnapshot};
use crate::storage::{
    AuditSink, ComponentHealth, EventBus, HealthReport, LogStore, MetricStore,
};

/// The storage collaborators the gateway forwards to. All shared handles;
/// the gateway owns none of the backends.
#[derive(Clone)]
pub struct GatewayStores {
    pub metrics: Arc<dyn MetricStore>,
    pub logs: Arc<dyn LogStore>,
    pub events: Arc<dyn EventBus>,
    pub audit: Arc<dyn AuditSink>,
}

/// Orchestrates the ingestion pipeline. One instance serves all producers;
/// every method is safe to call concurrently.
pub struct IngestionGateway {
    config: GatewayConfig,
    admission: AdmissionController,
    detector: ThreatDetector,
    policy: CompliancePolicyEngine,
    stores: GatewayStores,
    stats: IngestionStats,
    audit_buffer: AuditBuffer,
    started_at: Instant,
}

impl IngestionGateway {
    /// Build a gateway. Configuration and pattern-table problems are fatal
    /// here, before any traffic is served.
    pub fn new(config: GatewayConfig, stores: GatewayStores) -> Result<Self, GatewayError> {
        config.validate().map_err(GatewayError::Configuration)?;
        let admission = AdmissionController::new(config.admission.clone())
            .map_err(|err| GatewayError::Configuration(err.into()))?;
        let detector = ThreatDetector::new(config.detector.clone())?;
        let policy = CompliancePolicyEngine::new(config.policy.clone())
            .map_err(|err| GatewayError::Configuration(err.into()))?;
        let audit_buffer = AuditBuffer::new(config.audit_flush_threshold);

        Ok(Self {
            config,
            admission,
            detector,
            policy,
            stores,
            stats: IngestionStats::default(),
            audit_buffer,
            started_at: Instant::now(),
        })
    }

    /// Process one request through the three gates and, if accepted,
    /// forward it to storage. Expected-bad input (rate limited, invalid,
    /// non-compliant) comes back as a response status, never a panic or
    /// `Err`.
    pub async fn process(&self, request: IngestRequest) -> IngestionResponse {
        self.stats.requests.fetch_add(1, Ordering::Relaxed);

        let audit_id = Uuid::new_v4().to_string();
        let source_id = request.metadata.source_id.clone();
        let received = request.body.counts();
        let estimated_size = request.estimated_size();

        // Gate 1: admission, before any payload inspection.
        let admission = self.admission.check(&source_id, estimated_size);
        if !admission.allowed {
            self.stats.rate_limited.fetch_add(1, Ordering::Relaxed);
            warn!(
                %audit_id,
                %source_id,
                reason = ?admission.reason,
                retry_after = ?admission.retry_after,
                "request_rate_limited"
            );
            let message = match admission.retry_after {
                Some(wait) => format!("rate limit exceeded; retry after {:.1}s", wait.as_secs_f64()),
                None => "rate limit exceeded".to_string(),
            };
            return self.respond(
                IngestionStatus::RateLimited,
                audit_id,
                received,
                (0, 0, 0),
                vec![ResponseError {
                    code: "rate_limit_exceeded".into(),
                    message,
                    field: None,
                }],
                Vec::new(),
                &admission,
                None,
            );
        }

        // Gate 2: threat detection (structural checks plus content scan;
        // security tests get structural checks only).
        let validation = self.detector.validate(&request);
        let mut warnings: Vec<String> = validation.advisory_issues().map(format_issue).collect();
        if !validation.is_valid {
            self.stats.validation_failures.fetch_add(1, Ordering::Relaxed);
            self.stats.failures.fetch_add(1, Ordering::Relaxed);
            warn!(
                %audit_id,
                %source_id,
                audit_trail = %validation.audit_trail,
                "request_validation_failed"
            );
            let errors = validation.blocking_issues().map(issue_to_error).collect();
            return self.respond(
                IngestionStatus::Failed,
                audit_id,
                received,
                (0, 0, 0),
                errors,
                warnings,
                &admission,
                None,
            );
        }

        // Security tests are audited, never forwarded.
        if let RequestBody::SecurityTest {
            authorized_by,
            authorization_ticket,
            dry_run,
            payloads,
        } = &request.body
        {
            if authorized_by.trim().is_empty() || authorization_ticket.trim().is_empty() {
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                warn!(%audit_id, %source_id, "security_test_unauthorized");
                return self.respond(
                    IngestionStatus::Failed,
                    audit_id,
                    received,
                    (0, 0, 0),
                    vec![ResponseError {
                        code: "unauthorized_security_test".into(),
                        message: "security-test requests require non-empty authorized_by and authorization_ticket".into(),
                        field: None,
                    }],
                    warnings,
                    &admission,
                    None,
                );
            }

            self.append_audit(AuditEntry {
                timestamp: Utc::now(),
                action: "security_test".into(),
                source_id: source_id.clone(),
                count: payloads.len(),
                details: serde_json::json!({
                    "dry_run": dry_run,
                    "authorized_by": authorized_by,
                    "authorization_ticket": authorization_ticket,
                    "audit_trail": validation.audit_trail,
                }),
            });
            self.stats.successes.fetch_add(1, Ordering::Relaxed);
            info!(
                %audit_id,
                %source_id,
                dry_run = *dry_run,
                payloads = payloads.len(),
                "security_test_recorded"
            );
            return self.respond(
                IngestionStatus::Success,
                audit_id,
                received,
                (0, 0, 0),
                Vec::new(),
                warnings,
                &admission,
                Some(validation.audit_trail.clone()),
            );
        }

        // Gate 3: compliance verification of the data-handling envelope.
        let outcome = self.policy.verify(&request.envelope);
        warnings.extend(
            outcome
                .issues
                .iter()
                .filter(|issue| !issue.severity.is_blocking())
                .map(|issue| format_issue(issue)),
        );
        if !outcome.compliant {
            self.stats.compliance_failures.fetch_add(1, Ordering::Relaxed);
            self.stats.failures.fetch_add(1, Ordering::Relaxed);
            warn!(%audit_id, %source_id, "request_compliance_rejected");
            let errors = outcome
                .issues
                .iter()
                .filter(|issue| issue.severity.is_blocking())
                .map(issue_to_error)
                .collect();
            return self.respond(
                IngestionStatus::Failed,
                audit_id,
                received,
                (0, 0, 0),
                errors,
                warnings,
                &admission,
                None,
            );
        }

        // Accepted: forward each kind to its own store. Destinations are
        // independent; one kind failing never rolls back another.
        let mut errors = Vec::new();
        let processed = match &request.body {
            RequestBody::Metrics(points) => (
                self.forward_metrics(&source_id, points, &mut errors).await,
                0,
                0,
            ),
            RequestBody::Logs(records) => (
                0,
                self.forward_logs(&source_id, records, &mut errors).await,
                0,
            ),
            RequestBody::Events(events) => (
                0,
                0,
                self.forward_events(&source_id, events, &mut errors).await,
            ),
            RequestBody::Batch {
                metrics,
                logs,
                events,
            } => (
                self.forward_metrics(&source_id, metrics, &mut errors).await,
                self.forward_logs(&source_id, logs, &mut errors).await,
                self.forward_events(&source_id, events, &mut errors).await,
            ),
            // Returned above.
            RequestBody::SecurityTest { .. } => (0, 0, 0),
            // `RequestBody` is `#[non_exhaustive]`; all known variants are
            // handled above. This arm satisfies exhaustiveness for variants
            // added in future versions of the `ingest` crate.
            _ => (0, 0, 0),
        };

        let total_received = received.0 + received.1 + received.2;
        let total_processed = processed.0 + processed.1 + processed.2;
        let status = if errors.is_empty() && total_processed == total_received {
            IngestionStatus::Success
        } else if total_processed > 0 {
            IngestionStatus::Partial
        } else {
            IngestionStatus::Failed
        };

        if !errors.is_empty() {
            self.stats.write_failures.fetch_add(1, Ordering::Relaxed);
        }

        if status == IngestionStatus::Failed {
            self.stats.failures.fetch_add(1, Ordering::Relaxed);
            warn!(%audit_id, %source_id, "request_write_failed");
            return self.respond(
                status, audit_id, received, processed, errors, warnings, &admission, None,
            );
        }

        self.stats.successes.fetch_add(1, Ordering::Relaxed);
        self.stats
            .metrics_ingested
            .fetch_add(processed.0 as u64, Ordering::Relaxed);
        self.stats
            .logs_ingested
            .fetch_add(processed.1 as u64, Ordering::Relaxed);
        self.stats
            .events_ingested
            .fetch_add(processed.2 as u64, Ordering::Relaxed);
        self.stats
            .bytes_ingested
            .fetch_add(estimated_size, Ordering::Relaxed);

        self.append_audit(AuditEntry {
            timestamp: Utc::now(),
            action: "ingest".into(),
            source_id: source_id.clone(),
            count: total_processed,
            details: serde_json::json!({
                "kind": request.body.kind_name(),
                "audit_trail": validation.audit_trail,
                "metrics": processed.0,
                "logs": processed.1,
                "events": processed.2,
            }),
        });

        info!(
            %audit_id,
            %source_id,
            status = ?status,
            items = total_processed,
            bytes = estimated_size,
            "request_ingested"
        );
        self.respond(
            status,
            audit_id,
            received,
            processed,
            errors,
            warnings,
            &admission,
            Some(validation.audit_trail.clone()),
        )
    }

    /// Point-in-time statistics snapshot.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.started_at.elapsed())
    }

    /// Aggregate compliance report from the policy engine's audit window.
    pub fn compliance_report(&self) -> ComplianceReport {
        self.policy.report()
    }

    /// Audit entries currently buffered and not yet flushed.
    pub fn pending_audit_entries(&self) -> usize {
        self.audit_buffer.len()
    }

    /// Aggregated collaborator reachability.
    pub async fn health_check(&self) -> HealthReport {
        let (metrics, logs, events, audit) = tokio::join!(
            self.stores.metrics.ping(),
            self.stores.logs.ping(),
            self.stores.events.ping(),
            self.stores.audit.ping(),
        );
        let components = vec![
            component("metric_store", metrics),
            component("log_store", logs),
            component("event_bus", events),
            component("audit_sink", audit),
        ];
        HealthReport {
            healthy: components.iter().all(|c| c.healthy),
            components,
        }
    }

    /// One maintenance pass: evict idle admission buckets and flush the
    /// audit buffer. Takes hot-path locks only briefly.
    pub async fn run_maintenance(&self) {
        let evicted = self.admission.evict_idle();
        let batch = self.audit_buffer.drain();
        let flushed = batch.len();
        if !batch.is_empty() {
            if let Err(err) = self.stores.audit.write_batch(&batch).await {
                warn!(error = %err, entries = flushed, "audit_flush_failed");
            }
        }
        debug!(evicted, flushed, "maintenance_sweep");
    }

    /// Spawn the periodic maintenance task. Abort the handle on shutdown.
    pub fn spawn_maintenance(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let gateway = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(gateway.config.maintenance_interval());
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                gateway.run_maintenance().await;
            }
        })
    }

    /// Drain the audit buffer before the process exits.
    pub async fn shutdown(&self) {
        let batch = self.audit_buffer.drain();
        if !batch.is_empty() {
            if let Err(err) = self.stores.audit.write_batch(&batch).await {
                warn!(error = %err, entries = batch.len(), "audit_flush_failed");
            }
        }
        info!("gateway_shutdown");
    }

    async fn forward_metrics(
        &self,
        source_id: &str,
        points: &[ingest::MetricPoint],
        errors: &mut Vec<ResponseError>,
    ) -> usize {
        if points.is_empty() {
            return 0;
        }
        let result = tokio::time::timeout(
            self.config.write_timeout(),
            self.stores.metrics.write_points(source_id, points),
        )
        .await;
        self.handle_write("metrics", points.len(), result, errors)
    }

    async fn forward_logs(
        &self,
        source_id: &str,
        records: &[ingest::LogRecord],
        errors: &mut Vec<ResponseError>,
    ) -> usize {
        if records.is_empty() {
            return 0;
        }
        let result = tokio::time::timeout(
            self.config.write_timeout(),
            self.stores.logs.write_records(source_id, records),
        )
        .await;
        self.handle_write("logs", records.len(), result, errors)
    }

    async fn forward_events(
        &self,
        source_id: &str,
        events: &[ingest::EventRecord],
        errors: &mut Vec<ResponseError>,
    ) -> usize {
        if events.is_empty() {
            return 0;
        }
        let result = tokio::time::timeout(
            self.config.write_timeout(),
            self.stores.events.publish_events(source_id, events),
        )
        .await;
        self.handle_write("events", events.len(), result, errors)
    }

    fn handle_write(
        &self,
        kind: &str,
        expected: usize,
        result: Result<Result<usize, StoreError>, tokio::time::error::Elapsed>,
        errors: &mut Vec<ResponseError>,
    ) -> usize {
        match result {
            Ok(Ok(accepted)) => {
                let accepted = accepted.min(expected);
                if accepted < expected {
                    errors.push(write_error(
                        kind,
                        format!("{kind} store accepted {accepted} of {expected} items"),
                    ));
                }
                accepted
            }
            Ok(Err(err)) => {
                error!(kind, error = %err, "store_write_failed");
                errors.push(write_error(kind, err.to_string()));
                0
            }
            Err(_) => {
                let err = StoreError::Timeout(self.config.write_timeout());
                error!(kind, error = %err, "store_write_failed");
                errors.push(write_error(kind, err.to_string()));
                0
            }
        }
    }

    fn append_audit(&self, entry: AuditEntry) {
        if let Some(batch) = self.audit_buffer.push(entry) {
            // Flush off the hot path; the request never waits on the sink.
            let sink = Arc::clone(&self.stores.audit);
            tokio::spawn(async move {
                if let Err(err) = sink.write_batch(&batch).await {
                    warn!(error = %err, entries = batch.len(), "audit_flush_failed");
                }
            });
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn respond(
        &self,
        status: IngestionStatus,
        audit_id: String,
        received: (usize, usize, usize),
        processed: (usize, usize, usize),
        errors: Vec<ResponseError>,
        warnings: Vec<String>,
        admission: &RateLimitResult,
        integrity_hash: Option<String>,
    ) -> IngestionResponse {
        IngestionResponse {
            status,
            metrics_received: received.0,
            metrics_processed: processed.0,
            logs_received: received.1,
            logs_processed: processed.1,
            events_received: received.2,
            events_processed: processed.2,
            errors,
            warnings,
            audit_id,
            rate_limit_remaining: admission.remaining_requests,
            rate_limit_reset: admission.reset_after,
            retry_after: admission.retry_after,
            integrity_hash,
        }
    }
}

fn component(name: &'static str, result: Result<(), StoreError>) -> ComponentHealth {
    match result {
        Ok(()) => ComponentHealth {
            name,
            healthy: true,
            detail: None,
        },
        Err(err) => ComponentHealth {
            name,
            healthy: false,
            detail: Some(err.to_string()),
        },
    }
}

fn format_issue(issue: &ValidationIssue) -> String {
    format!("{}: {} ({})", issue.code, issue.message, issue.field)
}

fn issue_to_error(issue: &ValidationIssue) -> ResponseError {
    ResponseError {
        code: issue.code.clone(),
        message: issue.message.clone(),
        field: Some(issue.field.clone()),
    }
}

fn write_error(kind: &str, message: String) -> ResponseError {
    ResponseError {
        code: "write_error".into(),
        message,
        field: Some(kind.to_string()),
    }
}
