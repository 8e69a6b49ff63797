//! Load-adaptive admission control.
//!
//! Wraps the local controller and scales the per-source rate by an
//! externally supplied load factor (CPU, queue depth, whatever the
//! embedding service measures): generous when the node is idle, shedding
//! when it is saturated.
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::bucket::RateLimitResult;
use crate::config::{AdmissionConfig, AdmissionConfigError};
use crate::AdmissionController;

/// Scale applied below the low-load threshold.
const LOW_LOAD_SCALE: f64 = 1.5;
/// Scale applied above the high-load threshold.
const HIGH_LOAD_SCALE: f64 = 0.5;
const LOW_LOAD_THRESHOLD: f64 = 0.3;
const HIGH_LOAD_THRESHOLD: f64 = 0.7;

/// An [`AdmissionController`] whose per-source rate follows system load.
pub struct AdaptiveAdmissionController {
    inner: AdmissionController,
    /// Current load factor in `[0, 1]`, stored as f64 bits.
    load_factor: AtomicU64,
}

impl AdaptiveAdmissionController {
    pub fn new(config: AdmissionConfig) -> Result<Self, AdmissionConfigError> {
        Ok(Self {
            inner: AdmissionController::new(config)?,
            load_factor: AtomicU64::new(0.5f64.to_bits()),
        })
    }

    /// Update the load factor. Values are clamped into `[0, 1]`; NaN is
    /// treated as neutral load.
    pub fn set_load_factor(&self, load: f64) {
        let load = if load.is_nan() { 0.5 } else { load.clamp(0.0, 1.0) };
        self.load_factor.store(load.to_bits(), Ordering::Relaxed);
    }

    pub fn load_factor(&self) -> f64 {
        f64::from_bits(self.load_factor.load(Ordering::Relaxed))
    }

    /// Admission check at the load-scaled rate.
    pub fn check(&self, source_id: &str, bytes: u64) -> RateLimitResult {
        self.check_at(source_id, bytes, Instant::now())
    }

    pub(crate) fn check_at(&self, source_id: &str, bytes: u64, now: Instant) -> RateLimitResult {
        self.inner.check_at(source_id, bytes, now, self.current_scale())
    }

    /// Drive the idle sweep on the wrapped controller.
    pub fn evict_idle(&self) -> usize {
        self.inner.evict_idle()
    }

    fn current_scale(&self) -> f64 {
        let load = self.load_factor();
        if load < LOW_LOAD_THRESHOLD {
            LOW_LOAD_SCALE
        } else if load > HIGH_LOAD_THRESHOLD {
            HIGH_LOAD_SCALE
        } else {
            1.0
        }
    }
}
