//! Gateway configuration.
//!
//! One struct aggregating the three gate configs plus the gateway's own
//! knobs. The embedding service builds it (from file, env, flags — its
//! choice), calls `validate()` once at startup, and treats any error as
//! fatal.
use admission::{AdmissionConfig, AdmissionConfigError};
use detect::DetectorConfig;
use ingest::BoundsError;
use policy::{PolicyConfig, PolicyConfigError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Runtime configuration for the ingestion gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub admission: AdmissionConfig,

    #[serde(default)]
    pub detector: DetectorConfig,

    #[serde(default)]
    pub policy: PolicyConfig,

    /// Upper bound on any single collaborator write.
    #[serde(default = "default_write_timeout_secs")]
    pub write_timeout_secs: u64,

    /// Audit entries buffered before a batch flush is dispatched.
    #[serde(default = "default_audit_flush_threshold")]
    pub audit_flush_threshold: usize,

    /// Cadence of the maintenance sweep (bucket eviction + audit flush).
    #[serde(default = "default_maintenance_interval_secs")]
    pub maintenance_interval_secs: u64,
}

fn default_write_timeout_secs() -> u64 {
    5
}

fn default_audit_flush_threshold() -> usize {
    64
}

fn default_maintenance_interval_secs() -> u64 {
    30
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            admission: AdmissionConfig::default(),
            detector: DetectorConfig::default(),
            policy: PolicyConfig::default(),
            write_timeout_secs: default_write_timeout_secs(),
            audit_flush_threshold: default_audit_flush_threshold(),
            maintenance_interval_secs: default_maintenance_interval_secs(),
        }
    }
}

impl GatewayConfig {
    /// Validates the whole configuration tree. Run once at startup.
    pub fn validate(&self) -> Result<(), GatewayConfigError> {
        self.admission.validate()?;
        self.detector.validate()?;
        self.policy.validate()?;
        if self.write_timeout_secs == 0 {
            return Err(GatewayConfigError::ZeroWriteTimeout);
        }
        if self.audit_flush_threshold == 0 {
            return Err(GatewayConfigError::ZeroFlushThreshold);
        }
        if self.maintenance_interval_secs == 0 {
            return Err(GatewayConfigError::ZeroMaintenanceInterval);
        }
        Ok(())
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    pub fn maintenance_interval(&self) -> Duration {
        Duration::from_secs(self.maintenance_interval_secs)
    }
}

/// Start-up configuration errors, aggregated across the gate configs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayConfigError {
    #[error("admission: {0}")]
    Admission(#[from] AdmissionConfigError),

    #[error("detector: {0}")]
    Detector(#[from] BoundsError),

    #[error("policy: {0}")]
    Policy(#[from] PolicyConfigError),

    #[error("write_timeout_secs must be non-zero")]
    ZeroWriteTimeout,

    #[error("audit_flush_threshold must be non-zero")]
    ZeroFlushThreshold,

    #[error("maintenance_interval_secs must be non-zero")]
    ZeroMaintenanceInterval,
}
