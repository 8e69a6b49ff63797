//! Telgate admission control.
//!
//! The first and cheapest gate of the ingestion pipeline: per-source and
//! global request/byte budgets, enforced by a pluggable strategy (token
//! bucket by default, sliding or fixed window by configuration).
//!
//! ## Concurrency model
//!
//! Bucket state lives in a [`dashmap::DashMap`] keyed by `source_id`, so
//! unrelated sources land on different internal shards and never serialize
//! against each other; the map-level lock is only touched on bucket insert
//! and eviction. The global budget is a single mutex by design — it is the
//! one intentional contention point, and its critical section is O(1).
//!
//! Buckets advance lazily at check time; no background ticking. The idle
//! sweep ([`AdmissionController::evict_idle`]) is driven by the gateway's
//! maintenance interval.
//!
//! ## Example
//!
//! ```
//! use admission::{AdmissionConfig, AdmissionController};
//!
//! let controller = AdmissionController::new(AdmissionConfig::default()).unwrap();
//! let result = controller.check("svc-api-01", 1024);
//! assert!(result.allowed);
//! ```
use std::sync::Mutex;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

mod adaptive;
mod bucket;
mod config;
mod distributed;

pub use crate::adaptive::AdaptiveAdmissionController;
pub use crate::bucket::{DenyReason, Limits, RateLimitResult, RateLimitState};
pub use crate::config::{
    AdmissionConfig, AdmissionConfigError, AdmissionStrategy, BackoffConfig,
};
pub use crate::distributed::{
    CounterStore, CounterStoreError, DistributedAdmissionController, DistributedConfig,
};

/// Local admission controller: per-source buckets plus one global budget.
pub struct AdmissionController {
    config: AdmissionConfig,
    buckets: DashMap<String, RateLimitState>,
    global: Mutex<RateLimitState>,
}

impl AdmissionController {
    pub fn new(config: AdmissionConfig) -> Result<Self, AdmissionConfigError> {
        config.validate()?;
        let now = Instant::now();
        let global_capacity = config.global_requests_per_second * config.global_burst_multiplier;
        Ok(Self {
            buckets: DashMap::new(),
            global: Mutex::new(RateLimitState::new(now, global_capacity)),
            config,
        })
    }

    /// Check whether one request of `bytes` from `source_id` is admitted.
    /// Both the per-source and the global budget must pass.
    pub fn check(&self, source_id: &str, bytes: u64) -> RateLimitResult {
        self.check_at(source_id, bytes, Instant::now(), 1.0)
    }

    /// Deterministic core used by tests and the adaptive wrapper. `scale`
    /// multiplies the configured per-source rate (global limits are not
    /// scaled: load shedding protects the aggregate, which is the fixed
    /// capacity of the deployment).
    pub(crate) fn check_at(
        &self,
        source_id: &str,
        bytes: u64,
        now: Instant,
        scale: f64,
    ) -> RateLimitResult {
        let limits = self.source_limits(scale);
        let strategy = self.config.strategy;

        let mut entry = self
            .buckets
            .entry(source_id.to_string())
            .or_insert_with(|| RateLimitState::new(now, limits.capacity));

        let source = entry
            .value_mut()
            .check(strategy, &limits, &self.config.backoff, bytes, now);
        if !source.allowed {
            debug!(source_id, reason = ?source.reason, "admission_denied");
            return source;
        }

        let global_limits = self.global_limits();
        let global = {
            let mut global_state = self
                .global
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            global_state.check(strategy, &global_limits, &self.config.backoff, bytes, now)
        };

        if !global.allowed {
            // The source never got its capacity; give the token back so a
            // global squeeze does not also burn per-source budgets.
            entry.value_mut().refund(strategy, &limits, bytes);
            debug!(source_id, reason = ?global.reason, "admission_denied");
            return RateLimitResult {
                reason: global.reason.map(DenyReason::into_global),
                ..global
            };
        }

        RateLimitResult {
            allowed: true,
            remaining_requests: source.remaining_requests.min(global.remaining_requests),
            remaining_bytes: source.remaining_bytes.min(global.remaining_bytes),
            reset_after: source.reset_after.max(global.reset_after),
            retry_after: None,
            reason: None,
        }
    }

    /// Evict buckets idle past the configured TTL. Returns how many were
    /// removed. The next request from an evicted source starts a fresh
    /// bucket at full burst capacity.
    pub fn evict_idle(&self) -> usize {
        self.evict_idle_at(Instant::now())
    }

    pub(crate) fn evict_idle_at(&self, now: Instant) -> usize {
        let ttl = Duration::from_secs(self.config.idle_ttl_secs);
        let before = self.buckets.len();
        self.buckets
            .retain(|_, state| now.saturating_duration_since(state.last_update) <= ttl);
        let evicted = before.saturating_sub(self.buckets.len());
        if evicted > 0 {
            debug!(evicted, remaining = self.buckets.len(), "bucket_sweep");
        }
        evicted
    }

    /// Number of live per-source buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    fn source_limits(&self, scale: f64) -> Limits {
        let rate = self.config.requests_per_second * scale;
        Limits {
            rate,
            capacity: rate * self.config.burst_multiplier,
            window_limit: (rate * self.config.window_secs as f64) as u64,
            max_bytes: self.config.max_bytes_per_window,
            window: Duration::from_secs(self.config.window_secs),
        }
    }

    fn global_limits(&self) -> Limits {
        let rate = self.config.global_requests_per_second;
        Limits {
            rate,
            capacity: rate * self.config.global_burst_multiplier,
            window_limit: (rate * self.config.window_secs as f64) as u64,
            max_bytes: self.config.global_max_bytes_per_window,
            window: Duration::from_secs(self.config.window_secs),
        }
    }
}
