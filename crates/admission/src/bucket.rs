//! Per-source rate-limit state and the strategy arithmetic.
//!
//! A bucket is advanced lazily at check time; nothing ticks in the
//! background. All three local strategies share one state struct so a
//! bucket map never has to know which strategy is active.
use std::time::{Duration, Instant};

use crate::config::{AdmissionStrategy, BackoffConfig};

/// Mutable admission state for one source (or for the global budget).
///
/// Created lazily on the first request from a source and evicted by the
/// idle sweep; a re-created bucket starts at full burst capacity.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    /// Token-bucket fill. Unused by the window strategies.
    pub tokens: f64,
    /// Last time this bucket was advanced. Doubles as the idle timestamp
    /// for TTL eviction.
    pub last_update: Instant,
    /// Requests admitted in the current window.
    pub request_count: u64,
    /// Requests admitted in the previous window; sliding-window smoothing.
    pub prev_window_count: u64,
    /// Bytes admitted in the current window.
    pub bytes_count: u64,
    pub window_start: Instant,
    /// Consecutive denials; drives exponential backoff. Reset on the next
    /// admitted request.
    pub violations: u32,
}

impl RateLimitState {
    pub fn new(now: Instant, capacity: f64) -> Self {
        Self {
            tokens: capacity,
            last_update: now,
            request_count: 0,
            prev_window_count: 0,
            bytes_count: 0,
            window_start: now,
            violations: 0,
        }
    }
}

/// Effective numeric limits for one check, after any adaptive scaling.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Sustained request rate (tokens per second).
    pub rate: f64,
    /// Token-bucket capacity.
    pub capacity: f64,
    /// Per-window request budget for the window strategies.
    pub window_limit: u64,
    /// Per-window byte budget.
    pub max_bytes: u64,
    pub window: Duration,
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// The per-source request budget is exhausted.
    RequestBudget,
    /// The per-source byte budget is exhausted.
    ByteBudget,
    /// The shared global request budget is exhausted.
    GlobalRequestBudget,
    /// The shared global byte budget is exhausted.
    GlobalByteBudget,
}

impl DenyReason {
    /// Lift a per-source reason to its global counterpart.
    pub(crate) fn into_global(self) -> DenyReason {
        match self {
            DenyReason::RequestBudget => DenyReason::GlobalRequestBudget,
            DenyReason::ByteBudget => DenyReason::GlobalByteBudget,
            other => other,
        }
    }
}

/// Outcome of one admission check.
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    pub allowed: bool,
    /// Requests still admissible before the budget is exhausted.
    pub remaining_requests: u64,
    /// Bytes still admissible in the current window.
    pub remaining_bytes: u64,
    /// Time until the budget is fully replenished (bucket full, or window
    /// boundary for the window strategies).
    pub reset_after: Duration,
    /// Present on denial: how long the source should wait before retrying.
    pub retry_after: Option<Duration>,
    pub reason: Option<DenyReason>,
}

impl RateLimitState {
    /// Advance the bucket to `now` and try to admit one request of `bytes`.
    pub(crate) fn check(
        &mut self,
        strategy: AdmissionStrategy,
        limits: &Limits,
        backoff: &BackoffConfig,
        bytes: u64,
        now: Instant,
    ) -> RateLimitResult {
        self.advance(strategy, limits, now);
        self.last_update = now;

        let request_ok = match strategy {
            AdmissionStrategy::TokenBucket => self.tokens >= 1.0,
            AdmissionStrategy::SlidingWindow => {
                self.weighted_count(limits, now) + 1.0 <= limits.window_limit as f64
            }
            AdmissionStrategy::FixedWindow => self.request_count < limits.window_limit,
        };
        let bytes_ok = self.bytes_count.saturating_add(bytes) <= limits.max_bytes;

        if request_ok && bytes_ok {
            if let AdmissionStrategy::TokenBucket = strategy {
                self.tokens -= 1.0;
            }
            self.request_count += 1;
            self.bytes_count += bytes;
            self.violations = 0;

            RateLimitResult {
                allowed: true,
                remaining_requests: self.remaining_requests(strategy, limits, now),
                remaining_bytes: limits.max_bytes.saturating_sub(self.bytes_count),
                reset_after: self.reset_after(strategy, limits, now),
                retry_after: None,
                reason: None,
            }
        } else {
            let retry_after = retry_after(backoff, self.violations);
            self.violations = self.violations.saturating_add(1);

            RateLimitResult {
                allowed: false,
                remaining_requests: self.remaining_requests(strategy, limits, now),
                remaining_bytes: limits.max_bytes.saturating_sub(self.bytes_count),
                reset_after: self.reset_after(strategy, limits, now),
                retry_after: Some(retry_after),
                reason: Some(if request_ok {
                    DenyReason::ByteBudget
                } else {
                    DenyReason::RequestBudget
                }),
            }
        }
    }

    /// Return one admitted request to the bucket. Used when the per-source
    /// check passed but the global check then denied: the source should not
    /// pay for capacity it never used.
    pub(crate) fn refund(&mut self, strategy: AdmissionStrategy, limits: &Limits, bytes: u64) {
        if let AdmissionStrategy::TokenBucket = strategy {
            self.tokens = (self.tokens + 1.0).min(limits.capacity);
        }
        self.request_count = self.request_count.saturating_sub(1);
        self.bytes_count = self.bytes_count.saturating_sub(bytes);
    }

    fn advance(&mut self, strategy: AdmissionStrategy, limits: &Limits, now: Instant) {
        if let AdmissionStrategy::TokenBucket = strategy {
            let elapsed = now.saturating_duration_since(self.last_update).as_secs_f64();
            self.tokens = (self.tokens + elapsed * limits.rate).min(limits.capacity);
        }

        let since_window = now.saturating_duration_since(self.window_start);
        if since_window < limits.window {
            return;
        }

        match strategy {
            AdmissionStrategy::TokenBucket => {
                // Only the byte budget is windowed; drift is fine here.
                self.window_start = now;
                self.bytes_count = 0;
            }
            AdmissionStrategy::SlidingWindow | AdmissionStrategy::FixedWindow => {
                // Align to the boundary that was just crossed so resets are
                // exact regardless of when the next request lands.
                let windows_passed =
                    (since_window.as_secs_f64() / limits.window.as_secs_f64()) as u32;
                self.prev_window_count = if windows_passed > 1 {
                    0
                } else {
                    self.request_count
                };
                self.request_count = 0;
                self.bytes_count = 0;
                self.window_start += limits.window * windows_passed;
            }
        }
    }

    /// Sliding-window effective count: the previous window's admissions
    /// decay linearly as the current window progresses.
    fn weighted_count(&self, limits: &Limits, now: Instant) -> f64 {
        let frac = now
            .saturating_duration_since(self.window_start)
            .as_secs_f64()
            / limits.window.as_secs_f64();
        self.prev_window_count as f64 * (1.0 - frac.min(1.0)) + self.request_count as f64
    }

    fn remaining_requests(
        &self,
        strategy: AdmissionStrategy,
        limits: &Limits,
        now: Instant,
    ) -> u64 {
        match strategy {
            AdmissionStrategy::TokenBucket => self.tokens.max(0.0) as u64,
            AdmissionStrategy::SlidingWindow => {
                let used = self.weighted_count(limits, now);
                (limits.window_limit as f64 - used).max(0.0) as u64
            }
            AdmissionStrategy::FixedWindow => {
                limits.window_limit.saturating_sub(self.request_count)
            }
        }
    }

    fn reset_after(&self, strategy: AdmissionStrategy, limits: &Limits, now: Instant) -> Duration {
        match strategy {
            AdmissionStrategy::TokenBucket => {
                let deficit = (limits.capacity - self.tokens).max(0.0);
                Duration::from_secs_f64(deficit / limits.rate)
            }
            AdmissionStrategy::SlidingWindow | AdmissionStrategy::FixedWindow => {
                (self.window_start + limits.window).saturating_duration_since(now)
            }
        }
    }
}

/// `min(base × multiplier^violations, max)`, with `violations` counted
/// before the current denial.
fn retry_after(backoff: &BackoffConfig, violations: u32) -> Duration {
    let exp = violations.min(32); // powi overflow guard; max caps it anyway
    let secs = (backoff.base_secs * backoff.multiplier.powi(exp as i32)).min(backoff.max_secs);
    Duration::from_secs_f64(secs.max(0.0))
}
