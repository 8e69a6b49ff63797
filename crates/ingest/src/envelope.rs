//! The compliance envelope: the data-handling declaration attached to every
//! ingestion request.
//!
//! The envelope is the producer's statement of what the payload contains and
//! how it may be handled — category, sensitivity, retention, and legal basis.
//! The policy engine verifies the declaration against its rule table; the
//! gateway rejects the request if verification fails. Nothing here inspects
//! payload content (that is the threat detector's job).
use serde::{Deserialize, Serialize};

/// What class of data the payload is declared to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum DataCategory {
    /// Data relating to an identifiable person. Carries the strictest
    /// declaration requirements (consent, subject rights, purpose).
    Personal,
    /// Operational telemetry: metrics, traces, resource usage.
    Telemetry,
    /// Diagnostic output: logs, crash dumps, debug captures.
    Diagnostic,
    /// Security-relevant records: audit trails, detections, access logs.
    Security,
    /// Everything else produced in the course of operations.
    Operational,
}

/// Declared sensitivity, ordered from least to most sensitive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Sensitivity {
    Public,
    Internal,
    Confidential,
    Restricted,
}

/// How long the payload may be kept downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionPolicy {
    /// Hours to days; dropped after immediate use.
    Ephemeral,
    /// The platform default retention window.
    Standard,
    /// Extended retention for trend analysis.
    Extended,
    /// Long-term archive storage.
    Archive,
    /// Never deleted. Incompatible with personal data.
    Permanent,
}

/// Data-handling declaration carried by every request.
///
/// Category-specific required fields are enforced by the policy engine's
/// rule table; see the `policy` crate. The optional declaration fields here
/// exist so producers of personal or security data can satisfy those rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceEnvelope {
    pub data_category: DataCategory,
    pub sensitivity: Sensitivity,
    pub retention_policy: RetentionPolicy,
    /// Legal basis for processing, e.g. `"contract"`, `"consent"`,
    /// `"legitimate_interest"`. Free text by design: the rule table matches
    /// on known values and flags what it does not recognize.
    pub legal_basis: String,
    /// Whether this data crosses a jurisdictional border downstream.
    pub cross_border_transfer: bool,
    /// Whether subject consent has been verified for this payload.
    pub consent_verified: bool,
    /// Statement of how data-subject rights are honored. Required for
    /// `Personal`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_subject_rights: Option<String>,
    /// Stated purpose of processing. Required for `Personal` and `Security`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_purpose: Option<String>,
}

impl ComplianceEnvelope {
    /// A baseline envelope for internal operational telemetry. Useful as a
    /// starting point in producers and tests.
    pub fn telemetry_default() -> Self {
        Self {
            data_category: DataCategory::Telemetry,
            sensitivity: Sensitivity::Internal,
            retention_policy: RetentionPolicy::Standard,
            legal_basis: "legitimate_interest".into(),
            cross_border_transfer: false,
            consent_verified: false,
            data_subject_rights: None,
            processing_purpose: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensitivity_is_ordered() {
        assert!(Sensitivity::Public < Sensitivity::Internal);
        assert!(Sensitivity::Confidential < Sensitivity::Restricted);
    }

    #[test]
    fn envelope_serializes_snake_case() {
        let envelope = ComplianceEnvelope::telemetry_default();
        let json = serde_json::to_value(&envelope).expect("serialize");

        assert_eq!(json["data_category"], "telemetry");
        assert_eq!(json["sensitivity"], "internal");
        assert_eq!(json["retention_policy"], "standard");
        // Optional declarations are omitted when absent.
        assert!(json.get("data_subject_rights").is_none());
    }
}
