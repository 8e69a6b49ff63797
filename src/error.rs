//! Gateway error taxonomy.
//!
//! Expected-bad input never surfaces as `Err`: rate-limit denials,
//! validation failures, and compliance violations are policy decisions and
//! come back inside `IngestionResponse` where the status and error codes let
//! callers distinguish "slow down", "fix payload", and "fix declaration".
//! The types here cover what remains: startup misconfiguration (fatal) and
//! collaborator failures ("try later", scoped to the failing store).
use std::time::Duration;

use thiserror::Error;

use crate::config::GatewayConfigError;

/// Errors from constructing or operating the gateway itself.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// Malformed configuration or pattern table at startup. Fatal: the
    /// process must not serve traffic.
    #[error("configuration error: {0}")]
    Configuration(#[from] GatewayConfigError),

    /// Pattern table failed to compile at startup. Fatal.
    #[error("pattern table error: {0}")]
    Patterns(#[from] detect::PatternError),
}

/// Collaborator (storage) failures. Terminal for the call that hit them;
/// retry policy belongs to the collaborator, not the gateway.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected the write.
    #[error("write rejected: {0}")]
    Rejected(String),

    /// The write did not complete within the configured timeout. Raised by
    /// the gateway, not the store, so a hung collaborator cannot stall the
    /// pipeline.
    #[error("write timed out after {0:?}")]
    Timeout(Duration),
}
