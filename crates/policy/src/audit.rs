//! The policy engine's rolling audit log and aggregate reporting.
//!
//! Every `verify` call appends one record. The log is capped: when it
//! reaches `max_records` the oldest record is dropped, so the engine's
//! memory use is bounded no matter how long the process runs. Reports are
//! computed on demand from whatever the log currently holds.
use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use ingest::DataCategory;
use serde::Serialize;

/// One verification outcome, as retained for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyAuditRecord {
    pub verified_at: DateTime<Utc>,
    pub category: DataCategory,
    pub compliant: bool,
    /// Codes of every issue raised, including non-blocking warnings.
    pub issue_codes: Vec<String>,
}

/// Aggregate view over the retained audit window.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ComplianceReport {
    /// Records currently retained (≤ the configured cap).
    pub total_checks: usize,
    pub compliant_checks: usize,
    /// `compliant_checks / total_checks`, or 1.0 for an empty window.
    pub compliance_rate: f64,
    /// Most frequent issue codes, descending, ties broken alphabetically.
    pub top_issues: Vec<IssueFrequency>,
}

/// How often one issue code occurred in the retained window.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IssueFrequency {
    pub code: String,
    pub count: usize,
}

/// Capped FIFO of audit records.
pub(crate) struct RollingAuditLog {
    records: VecDeque<PolicyAuditRecord>,
    max_records: usize,
}

impl RollingAuditLog {
    pub(crate) fn new(max_records: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(max_records.min(1024)),
            max_records,
        }
    }

    pub(crate) fn push(&mut self, record: PolicyAuditRecord) {
        if self.records.len() == self.max_records {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn report(&self, top_n: usize) -> ComplianceReport {
        let total_checks = self.records.len();
        let compliant_checks = self.records.iter().filter(|r| r.compliant).count();
        let compliance_rate = if total_checks == 0 {
            1.0
        } else {
            compliant_checks as f64 / total_checks as f64
        };

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in &self.records {
            for code in &record.issue_codes {
                *counts.entry(code.as_str()).or_default() += 1;
            }
        }
        let mut top_issues: Vec<IssueFrequency> = counts
            .into_iter()
            .map(|(code, count)| IssueFrequency {
                code: code.to_string(),
                count,
            })
            .collect();
        top_issues.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.code.cmp(&b.code)));
        top_issues.truncate(top_n);

        ComplianceReport {
            total_checks,
            compliant_checks,
            compliance_rate,
            top_issues,
        }
    }
}
