//! Distributed admission control over a shared counter store.
//!
//! When several gateway instances front the same producers, local buckets
//! would each grant the full budget. This variant replaces them with atomic
//! increment-and-expire operations against a shared store (the cache
//! collaborator in production, an in-memory fake in tests).
//!
//! Fixed 1-minute windows only: the shared-counter model cannot express
//! continuous refill without far chattier coordination, so this variant is
//! simpler and fair across instances at the cost of per-request store
//! latency and boundary bursts. Pick local or distributed per deployment
//! mode; never mix the two across instances of one deployment.
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::bucket::{DenyReason, RateLimitResult};
use crate::config::AdmissionConfigError;

/// Seconds per distributed window. Fixed by design.
const WINDOW_SECS: u64 = 60;

/// Atomic counter storage shared by all gateway instances.
///
/// `increment` must atomically add one to the counter at `key`, create it
/// at 1 with the given expiry if absent, and return the post-increment
/// value. The cache/pub-sub collaborator implements this.
#[async_trait]
pub trait CounterStore: Send + Sync {
    async fn increment(&self, key: &str, expire_after: Duration) -> Result<u64, CounterStoreError>;
}

/// Counter store failures. These are collaborator errors, not admission
/// decisions; the gateway surfaces them as write errors.
#[derive(Debug, Error)]
#[error("counter store unavailable: {0}")]
pub struct CounterStoreError(pub String);

/// Configuration for the distributed variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributedConfig {
    /// Per-source request budget per 1-minute window, shared across every
    /// gateway instance.
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u64,

    /// Namespace prefix for counter keys, so several deployments can share
    /// one store.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

fn default_requests_per_minute() -> u64 {
    600
}

fn default_key_prefix() -> String {
    "telgate:admission".into()
}

impl Default for DistributedConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: default_requests_per_minute(),
            key_prefix: default_key_prefix(),
        }
    }
}

impl DistributedConfig {
    pub fn validate(&self) -> Result<(), AdmissionConfigError> {
        if self.requests_per_minute == 0 {
            return Err(AdmissionConfigError::NonPositive {
                field: "requests_per_minute",
                value: 0.0,
            });
        }
        Ok(())
    }
}

/// Admission controller backed by a shared counter store.
pub struct DistributedAdmissionController<S: CounterStore> {
    store: S,
    config: DistributedConfig,
}

impl<S: CounterStore> DistributedAdmissionController<S> {
    pub fn new(store: S, config: DistributedConfig) -> Result<Self, AdmissionConfigError> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// Check one request against the shared per-source window counter.
    ///
    /// A store failure is returned as an error: admission cannot be decided
    /// without the shared counter, and failing open or closed is the
    /// caller's policy, not this type's.
    pub async fn check(&self, source_id: &str) -> Result<RateLimitResult, CounterStoreError> {
        let now_secs = unix_now_secs();
        self.check_at(source_id, now_secs).await
    }

    async fn check_at(
        &self,
        source_id: &str,
        now_secs: u64,
    ) -> Result<RateLimitResult, CounterStoreError> {
        let window_index = now_secs / WINDOW_SECS;
        let secs_into_window = now_secs % WINDOW_SECS;
        let reset_after = Duration::from_secs(WINDOW_SECS - secs_into_window);

        let key = format!("{}:{}:{}", self.config.key_prefix, source_id, window_index);
        // Expire two windows out so a straggling read at the boundary still
        // sees the counter.
        let count = self
            .store
            .increment(&key, Duration::from_secs(WINDOW_SECS * 2))
            .await?;

        let limit = self.config.requests_per_minute;
        if count <= limit {
            Ok(RateLimitResult {
                allowed: true,
                remaining_requests: limit - count,
                remaining_bytes: u64::MAX,
                reset_after,
                retry_after: None,
                reason: None,
            })
        } else {
            debug!(source_id, count, limit, "admission_denied_distributed");
            Ok(RateLimitResult {
                allowed: false,
                remaining_requests: 0,
                remaining_bytes: u64::MAX,
                reset_after,
                retry_after: Some(reset_after),
                reason: Some(DenyReason::RequestBudget),
            })
        }
    }
}

fn unix_now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
