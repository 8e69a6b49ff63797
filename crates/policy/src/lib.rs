//! Telgate compliance policy engine.
//!
//! The third gate of the ingestion pipeline. The engine verifies a request's
//! data-handling declaration (its [`ComplianceEnvelope`]) against a static
//! rule table: category-specific required declarations plus cross-cutting
//! rules for cross-border transfers, restricted data, and personal-data
//! retention. It never looks at payload content.
//!
//! Every verification is appended to a capped rolling audit log from which
//! [`CompliancePolicyEngine::report`] computes the aggregate compliance rate
//! and the most recurrent issues on demand.
//!
//! ## Example
//!
//! ```
//! use policy::{CompliancePolicyEngine, PolicyConfig};
//! use ingest::ComplianceEnvelope;
//!
//! let engine = CompliancePolicyEngine::new(PolicyConfig::default()).unwrap();
//! let outcome = engine.verify(&ComplianceEnvelope::telemetry_default());
//! assert!(outcome.compliant);
//! ```
use std::sync::Mutex;

use chrono::Utc;
use ingest::{
    ComplianceEnvelope, DataCategory, RetentionPolicy, Sensitivity, ValidationIssue,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

mod audit;
mod rules;

pub use crate::audit::{ComplianceReport, IssueFrequency, PolicyAuditRecord};
pub use crate::rules::{required_declarations, RequiredDeclaration};

use crate::audit::RollingAuditLog;

/// Legal basis that is insufficient for restricted data.
const LEGITIMATE_INTEREST: &str = "legitimate_interest";

/// Runtime configuration for the policy engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Cap on retained audit records; oldest are dropped past this.
    #[serde(default = "default_max_audit_records")]
    pub max_audit_records: usize,

    /// How many recurring issue codes a report lists.
    #[serde(default = "default_top_issue_count")]
    pub top_issue_count: usize,
}

fn default_max_audit_records() -> usize {
    10_000
}

fn default_top_issue_count() -> usize {
    5
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_audit_records: default_max_audit_records(),
            top_issue_count: default_top_issue_count(),
        }
    }
}

impl PolicyConfig {
    /// Validates internal consistency. Run once at startup.
    pub fn validate(&self) -> Result<(), PolicyConfigError> {
        if self.max_audit_records == 0 {
            return Err(PolicyConfigError::ZeroAuditCap);
        }
        Ok(())
    }
}

/// Start-up configuration errors for the policy engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PolicyConfigError {
    /// A zero cap would drop every audit record on arrival.
    #[error("max_audit_records must be non-zero")]
    ZeroAuditCap,
}

/// Outcome of verifying one envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyOutcome {
    /// False iff any issue is blocking (`Error`/`Critical`).
    pub compliant: bool,
    pub issues: Vec<ValidationIssue>,
}

/// Verifies data-handling declarations against the rule table and keeps the
/// rolling audit log. Stateless apart from that log; the rule table is
/// static and shared.
pub struct CompliancePolicyEngine {
    config: PolicyConfig,
    audit: Mutex<RollingAuditLog>,
}

impl CompliancePolicyEngine {
    pub fn new(config: PolicyConfig) -> Result<Self, PolicyConfigError> {
        config.validate()?;
        let audit = Mutex::new(RollingAuditLog::new(config.max_audit_records));
        Ok(Self { config, audit })
    }

    /// Verify one envelope. Expected-bad declarations come back as a
    /// non-compliant outcome, never as an error.
    pub fn verify(&self, envelope: &ComplianceEnvelope) -> PolicyOutcome {
        let mut issues = Vec::new();

        for declaration in required_declarations(envelope.data_category) {
            if !declaration.is_satisfied(envelope) {
                issues.push(ValidationIssue::error(
                    declaration.code(),
                    format!(
                        "{:?} data requires the {} declaration",
                        envelope.data_category,
                        declaration.field()
                    ),
                    declaration.field(),
                ));
            }
        }

        if envelope.legal_basis.trim().is_empty() {
            issues.push(ValidationIssue::error(
                "missing_legal_basis",
                "a legal basis must be declared for every payload",
                "envelope.legal_basis",
            ));
        } else if envelope.sensitivity == Sensitivity::Restricted
            && envelope.legal_basis == LEGITIMATE_INTEREST
        {
            issues.push(ValidationIssue::error(
                "restricted_requires_explicit_basis",
                "restricted data cannot rely on legitimate interest; declare an explicit basis",
                "envelope.legal_basis",
            ));
        }

        if envelope.data_category == DataCategory::Personal
            && matches!(
                envelope.retention_policy,
                RetentionPolicy::Archive | RetentionPolicy::Permanent
            )
        {
            issues.push(ValidationIssue::error(
                "personal_retention_forbidden",
                "personal data may not be declared for archive or permanent retention",
                "envelope.retention_policy",
            ));
        }

        // Flag for review only; whether this should hard-block is an open
        // product decision, so it stays a warning.
        if envelope.cross_border_transfer
            && envelope.sensitivity >= Sensitivity::Confidential
        {
            issues.push(ValidationIssue::warning(
                "cross_border_review",
                "cross-border transfer of confidential or restricted data; additional safeguards apply",
                "envelope.cross_border_transfer",
            ));
        }

        let compliant = !issues.iter().any(|issue| issue.severity.is_blocking());
        self.append_audit(envelope, compliant, &issues);

        if compliant {
            debug!(
                category = ?envelope.data_category,
                issues = issues.len(),
                "policy_check_passed"
            );
        } else {
            warn!(
                category = ?envelope.data_category,
                issues = issues.len(),
                "policy_check_rejected"
            );
        }

        PolicyOutcome { compliant, issues }
    }

    /// Aggregate compliance report over the retained audit window.
    pub fn report(&self) -> ComplianceReport {
        let log = self
            .audit
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        log.report(self.config.top_issue_count)
    }

    /// Number of audit records currently retained.
    pub fn audit_len(&self) -> usize {
        let log = self
            .audit
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        log.len()
    }

    fn append_audit(
        &self,
        envelope: &ComplianceEnvelope,
        compliant: bool,
        issues: &[ValidationIssue],
    ) {
        let record = PolicyAuditRecord {
            verified_at: Utc::now(),
            category: envelope.data_category,
            compliant,
            issue_codes: issues.iter().map(|issue| issue.code.clone()).collect(),
        };
        let mut log = self
            .audit
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        log.push(record);
    }
}
