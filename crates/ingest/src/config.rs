//! Structural bounds for incoming requests.
//!
//! [`ValidationBounds`] holds the limits the structural checks enforce:
//! how old or how far in the future a request timestamp may be, and how much
//! of an oversized text field is scanned. The bounds are plain serde structs
//! so they can be loaded from whatever configuration format the embedding
//! service uses; `validate()` is cheap and should run once at startup.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Limits applied by structural validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationBounds {
    /// Oldest acceptable request timestamp, seconds before now.
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: i64,

    /// Furthest acceptable future timestamp, seconds after now. Allows for
    /// producer clock skew.
    #[serde(default = "default_max_skew_secs")]
    pub max_skew_secs: i64,

    /// Maximum bytes of any single text field fed to the pattern scanner.
    /// Longer fields are scanned over this prefix and flagged with an
    /// informational `scan_truncated` issue, keeping scan cost bounded.
    #[serde(default = "default_max_scan_bytes")]
    pub max_scan_bytes: usize,
}

fn default_max_age_secs() -> i64 {
    7 * 24 * 60 * 60
}

fn default_max_skew_secs() -> i64 {
    5 * 60
}

fn default_max_scan_bytes() -> usize {
    64 * 1024
}

impl Default for ValidationBounds {
    fn default() -> Self {
        Self {
            max_age_secs: default_max_age_secs(),
            max_skew_secs: default_max_skew_secs(),
            max_scan_bytes: default_max_scan_bytes(),
        }
    }
}

impl ValidationBounds {
    /// Validates internal consistency. Intended for process start-up; a
    /// failure here means the deployment is misconfigured and must not
    /// serve traffic.
    pub fn validate(&self) -> Result<(), BoundsError> {
        if self.max_age_secs <= 0 {
            return Err(BoundsError::NonPositive {
                field: "max_age_secs",
                value: self.max_age_secs,
            });
        }
        if self.max_skew_secs <= 0 {
            return Err(BoundsError::NonPositive {
                field: "max_skew_secs",
                value: self.max_skew_secs,
            });
        }
        if self.max_scan_bytes == 0 {
            return Err(BoundsError::ZeroScanBudget);
        }
        Ok(())
    }
}

/// Start-up configuration errors for [`ValidationBounds`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BoundsError {
    /// A window bound was zero or negative.
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: i64 },

    /// A zero scan budget would disable content scanning entirely.
    #[error("max_scan_bytes must be non-zero")]
    ZeroScanBudget,
}

/// Maximum length accepted for a `source_id`, including the first character.
pub const MAX_SOURCE_ID_LEN: usize = 128;

/// Checks a source identifier against the accepted format:
/// an ASCII alphanumeric first character followed by up to 127 characters
/// from `[A-Za-z0-9._-]`.
pub fn source_id_is_valid(source_id: &str) -> bool {
    let mut chars = source_id.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphanumeric() {
        return false;
    }
    if source_id.len() > MAX_SOURCE_ID_LEN {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bounds_validate() {
        let bounds = ValidationBounds::default();
        assert!(bounds.validate().is_ok());
        assert_eq!(bounds.max_age_secs, 604_800);
        assert_eq!(bounds.max_skew_secs, 300);
    }

    #[test]
    fn non_positive_window_rejected() {
        let bounds = ValidationBounds {
            max_age_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            bounds.validate(),
            Err(BoundsError::NonPositive {
                field: "max_age_secs",
                ..
            })
        ));
    }

    #[test]
    fn zero_scan_budget_rejected() {
        let bounds = ValidationBounds {
            max_scan_bytes: 0,
            ..Default::default()
        };
        assert_eq!(bounds.validate(), Err(BoundsError::ZeroScanBudget));
    }

    #[test]
    fn source_id_format() {
        assert!(source_id_is_valid("svc-api-01"));
        assert!(source_id_is_valid("a"));
        assert!(source_id_is_valid("Agent.v2_prod"));

        assert!(!source_id_is_valid(""));
        assert!(!source_id_is_valid("-leading-dash"));
        assert!(!source_id_is_valid(".leading-dot"));
        assert!(!source_id_is_valid("has space"));
        assert!(!source_id_is_valid("semi;colon"));
        assert!(!source_id_is_valid(&"x".repeat(MAX_SOURCE_ID_LEN + 1)));
    }
}
