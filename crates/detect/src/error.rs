//! Error types produced by the detect crate.
//!
//! The only fallible operation here is pattern compilation, and it can only
//! fail at startup: request-time validation reports findings through
//! `ValidationResult`, never through `Err`. A [`PatternError`] therefore
//! means the deployment is broken and the process must not serve traffic.
use thiserror::Error;

/// Pattern table compilation failures.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PatternError {
    /// A rule in the given family failed to compile.
    #[error("invalid {family} pattern `{pattern}`: {source}")]
    InvalidPattern {
        family: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
