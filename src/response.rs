//! Gateway response types.
use std::time::Duration;

use serde::Serialize;

/// Overall outcome of one ingestion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestionStatus {
    /// Every item was accepted and forwarded.
    Success,
    /// Some kinds (or some items within a kind) were forwarded, others
    /// failed. Per-kind counts and errors tell which.
    Partial,
    /// Nothing was forwarded: validation, compliance, or every write failed.
    Failed,
    /// Denied by admission control before any inspection. Retry after
    /// `retry_after`.
    RateLimited,
}

/// One machine-readable error in a response.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseError {
    /// Stable code: an issue code (`prompt_injection`, `missing_consent`),
    /// `rate_limit_exceeded`, `write_error`, or
    /// `unauthorized_security_test`.
    pub code: String,
    pub message: String,
    /// The offending field or, for write errors, the failing kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Response returned for every processed request, whatever its outcome.
#[derive(Debug, Clone, Serialize)]
pub struct IngestionResponse {
    pub status: IngestionStatus,

    pub metrics_received: usize,
    pub metrics_processed: usize,
    pub logs_received: usize,
    pub logs_processed: usize,
    pub events_received: usize,
    pub events_processed: usize,

    pub errors: Vec<ResponseError>,
    /// Advisory findings (sensitive data, cross-border review, truncated
    /// scans). Never the reason for a rejection.
    pub warnings: Vec<String>,

    /// Unique id of this request in the audit trail.
    pub audit_id: String,

    /// Requests still admissible for this source.
    pub rate_limit_remaining: u64,
    /// Time until the source's budget is fully replenished.
    pub rate_limit_reset: Duration,
    /// Present when rate limited: wait at least this long.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<Duration>,

    /// Correlation hash from validation, present when the payload was
    /// scanned and accepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrity_hash: Option<String>,
}

impl IngestionResponse {
    /// Total items forwarded across kinds.
    pub fn total_processed(&self) -> usize {
        self.metrics_processed + self.logs_processed + self.events_processed
    }
}
