//! Admission controller configuration.
//!
//! One strategy is selected per deployment and never mixed mid-deployment:
//! the strategies make different admission decisions for nominally the same
//! configured rate (a token bucket refills continuously, a fixed window
//! resets at boundaries), so mixing them across instances of one deployment
//! would make fairness depend on which instance a producer hits.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which local admission algorithm buckets use.
///
/// Multi-instance deployments that need shared fairness use
/// `DistributedAdmissionController` instead; it is a separate type rather
/// than a variant here because it is async and needs a counter store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionStrategy {
    /// Continuous refill, burst up to `requests_per_second × burst_multiplier`.
    #[default]
    TokenBucket,
    /// Weighted count across the previous and current window; smooths
    /// boundary bursts at the cost of slight over-rejection after spikes.
    SlidingWindow,
    /// Counter reset exactly at window boundaries; cheapest, but admits up
    /// to twice the per-window budget across a boundary.
    FixedWindow,
}

/// Exponential backoff applied to repeat offenders:
/// `retry_after = min(base × multiplier^violations, max)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    #[serde(default = "default_backoff_base_secs")]
    pub base_secs: f64,
    #[serde(default = "default_backoff_multiplier")]
    pub multiplier: f64,
    #[serde(default = "default_backoff_max_secs")]
    pub max_secs: f64,
}

fn default_backoff_base_secs() -> f64 {
    1.0
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_backoff_max_secs() -> f64 {
    300.0
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_secs: default_backoff_base_secs(),
            multiplier: default_backoff_multiplier(),
            max_secs: default_backoff_max_secs(),
        }
    }
}

/// Runtime configuration for local admission control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionConfig {
    #[serde(default)]
    pub strategy: AdmissionStrategy,

    /// Per-source sustained request rate.
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,

    /// Token-bucket capacity is `requests_per_second × burst_multiplier`.
    #[serde(default = "default_burst_multiplier")]
    pub burst_multiplier: f64,

    /// Per-source byte budget per window.
    #[serde(default = "default_max_bytes_per_window")]
    pub max_bytes_per_window: u64,

    /// Aggregate request rate across all sources.
    #[serde(default = "default_global_requests_per_second")]
    pub global_requests_per_second: f64,

    #[serde(default = "default_burst_multiplier")]
    pub global_burst_multiplier: f64,

    /// Aggregate byte budget per window.
    #[serde(default = "default_global_max_bytes_per_window")]
    pub global_max_bytes_per_window: u64,

    /// Byte-budget and window-strategy period.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Buckets idle longer than this are evicted by the sweep; the next
    /// request from that source starts a fresh bucket at full burst.
    #[serde(default = "default_idle_ttl_secs")]
    pub idle_ttl_secs: u64,

    #[serde(default)]
    pub backoff: BackoffConfig,
}

fn default_requests_per_second() -> f64 {
    10.0
}

fn default_burst_multiplier() -> f64 {
    2.0
}

fn default_max_bytes_per_window() -> u64 {
    10 * 1024 * 1024
}

fn default_global_requests_per_second() -> f64 {
    1_000.0
}

fn default_global_max_bytes_per_window() -> u64 {
    512 * 1024 * 1024
}

fn default_window_secs() -> u64 {
    60
}

fn default_idle_ttl_secs() -> u64 {
    300
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            strategy: AdmissionStrategy::default(),
            requests_per_second: default_requests_per_second(),
            burst_multiplier: default_burst_multiplier(),
            max_bytes_per_window: default_max_bytes_per_window(),
            global_requests_per_second: default_global_requests_per_second(),
            global_burst_multiplier: default_burst_multiplier(),
            global_max_bytes_per_window: default_global_max_bytes_per_window(),
            window_secs: default_window_secs(),
            idle_ttl_secs: default_idle_ttl_secs(),
            backoff: BackoffConfig::default(),
        }
    }
}

impl AdmissionConfig {
    /// Validates internal consistency. Run once at startup; a failure means
    /// the deployment must not serve traffic.
    pub fn validate(&self) -> Result<(), AdmissionConfigError> {
        for (field, value) in [
            ("requests_per_second", self.requests_per_second),
            ("global_requests_per_second", self.global_requests_per_second),
            ("backoff.base_secs", self.backoff.base_secs),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(AdmissionConfigError::NonPositive { field, value });
            }
        }
        for (field, value) in [
            ("burst_multiplier", self.burst_multiplier),
            ("global_burst_multiplier", self.global_burst_multiplier),
            ("backoff.multiplier", self.backoff.multiplier),
        ] {
            if !value.is_finite() || value < 1.0 {
                return Err(AdmissionConfigError::MultiplierBelowOne { field, value });
            }
        }
        if self.window_secs == 0 {
            return Err(AdmissionConfigError::ZeroWindow);
        }
        if self.idle_ttl_secs == 0 {
            return Err(AdmissionConfigError::ZeroIdleTtl);
        }
        if self.backoff.max_secs < self.backoff.base_secs {
            return Err(AdmissionConfigError::BackoffMaxBelowBase {
                max: self.backoff.max_secs,
                base: self.backoff.base_secs,
            });
        }
        Ok(())
    }
}

/// Start-up configuration errors for admission control.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum AdmissionConfigError {
    #[error("{field} must be positive and finite, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be at least 1.0, got {value}")]
    MultiplierBelowOne { field: &'static str, value: f64 },

    #[error("window_secs must be non-zero")]
    ZeroWindow,

    #[error("idle_ttl_secs must be non-zero")]
    ZeroIdleTtl,

    #[error("backoff max_secs ({max}) must not be below base_secs ({base})")]
    BackoffMaxBelowBase { max: f64, base: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = AdmissionConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.strategy, AdmissionStrategy::TokenBucket);
        assert_eq!(cfg.window_secs, 60);
    }

    #[test]
    fn zero_rate_rejected() {
        let cfg = AdmissionConfig {
            requests_per_second: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(AdmissionConfigError::NonPositive {
                field: "requests_per_second",
                ..
            })
        ));
    }

    #[test]
    fn burst_below_one_rejected() {
        let cfg = AdmissionConfig {
            burst_multiplier: 0.5,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(AdmissionConfigError::MultiplierBelowOne { .. })
        ));
    }

    #[test]
    fn backoff_max_below_base_rejected() {
        let cfg = AdmissionConfig {
            backoff: BackoffConfig {
                base_secs: 10.0,
                max_secs: 5.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(AdmissionConfigError::BackoffMaxBelowBase { .. })
        ));
    }
}
