//! Validation issues and results.
//!
//! Every gate in the pipeline reports findings as [`ValidationIssue`]s with a
//! stable code, a severity, and the path of the offending field. Issues are
//! aggregated into a [`ValidationResult`]; a request is invalid iff any issue
//! is `Error` or `Critical`. `Warning` and `Info` issues always surface to the
//! caller and never block on their own.
use serde::{Deserialize, Serialize};

/// Severity of a single validation finding, least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl IssueSeverity {
    /// True for severities that make the whole request invalid.
    pub fn is_blocking(&self) -> bool {
        matches!(self, IssueSeverity::Error | IssueSeverity::Critical)
    }
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Stable machine-readable code, e.g. `prompt_injection`,
    /// `sensitive_email`, `invalid_numeric`.
    pub code: String,
    /// Human-readable explanation.
    pub message: String,
    pub severity: IssueSeverity,
    /// Path of the offending field, e.g. `metrics[3].name`.
    pub field: String,
    /// Optional structured detail (matched pattern family, offending value).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ValidationIssue {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        severity: IssueSeverity,
        field: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity,
            field: field.into(),
            details: None,
        }
    }

    pub fn info(code: impl Into<String>, message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(code, message, IssueSeverity::Info, field)
    }

    pub fn warning(
        code: impl Into<String>,
        message: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self::new(code, message, IssueSeverity::Warning, field)
    }

    pub fn error(
        code: impl Into<String>,
        message: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self::new(code, message, IssueSeverity::Error, field)
    }

    pub fn critical(
        code: impl Into<String>,
        message: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self::new(code, message, IssueSeverity::Critical, field)
    }

    /// Attach structured detail to the issue.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Aggregated outcome of validating one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// False iff any issue is `Error` or `Critical`.
    pub is_valid: bool,
    pub issues: Vec<ValidationIssue>,
    /// Truncated correlation hash tying this result to the audit trail.
    pub audit_trail: String,
}

impl ValidationResult {
    /// Build a result from collected issues; validity is derived, never set
    /// by hand.
    pub fn from_issues(issues: Vec<ValidationIssue>, audit_trail: String) -> Self {
        let is_valid = !issues.iter().any(|issue| issue.severity.is_blocking());
        Self {
            is_valid,
            issues,
            audit_trail,
        }
    }

    /// Issues that invalidate the request (`Error` and `Critical`).
    pub fn blocking_issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|issue| issue.severity.is_blocking())
    }

    /// Non-blocking issues (`Info` and `Warning`).
    pub fn advisory_issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|issue| !issue.severity.is_blocking())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_do_not_invalidate() {
        let result = ValidationResult::from_issues(
            vec![
                ValidationIssue::warning("sensitive_email", "email detected", "logs[0].message"),
                ValidationIssue::info("scan_truncated", "field truncated for scan", "logs[1].context"),
            ],
            "abcd1234".into(),
        );

        assert!(result.is_valid);
        assert_eq!(result.advisory_issues().count(), 2);
        assert_eq!(result.blocking_issues().count(), 0);
    }

    #[test]
    fn error_invalidates() {
        let result = ValidationResult::from_issues(
            vec![
                ValidationIssue::warning("sensitive_phone", "phone detected", "events[0].title"),
                ValidationIssue::error("xss", "script tag", "events[0].description"),
            ],
            "abcd1234".into(),
        );

        assert!(!result.is_valid);
        assert_eq!(result.blocking_issues().count(), 1);
    }

    #[test]
    fn severity_ordering_and_blocking() {
        assert!(IssueSeverity::Info < IssueSeverity::Warning);
        assert!(IssueSeverity::Warning < IssueSeverity::Error);
        assert!(IssueSeverity::Error < IssueSeverity::Critical);
        assert!(!IssueSeverity::Warning.is_blocking());
        assert!(IssueSeverity::Critical.is_blocking());
    }
}
