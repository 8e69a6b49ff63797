//! The category rule table.
//!
//! Required declarations are keyed by data category. The table is static by
//! design: rules change by deployment, not at runtime, and an immutable
//! table keeps `verify` lock-free.
use ingest::{ComplianceEnvelope, DataCategory};

/// A declaration field the envelope must carry for a given category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredDeclaration {
    ConsentVerified,
    DataSubjectRights,
    ProcessingPurpose,
}

impl RequiredDeclaration {
    /// Issue code reported when the declaration is missing.
    pub fn code(&self) -> &'static str {
        match self {
            RequiredDeclaration::ConsentVerified => "missing_consent",
            RequiredDeclaration::DataSubjectRights => "missing_data_subject_rights",
            RequiredDeclaration::ProcessingPurpose => "missing_processing_purpose",
        }
    }

    /// Envelope field path for the issue.
    pub fn field(&self) -> &'static str {
        match self {
            RequiredDeclaration::ConsentVerified => "envelope.consent_verified",
            RequiredDeclaration::DataSubjectRights => "envelope.data_subject_rights",
            RequiredDeclaration::ProcessingPurpose => "envelope.processing_purpose",
        }
    }

    /// Whether the envelope satisfies this declaration.
    pub fn is_satisfied(&self, envelope: &ComplianceEnvelope) -> bool {
        match self {
            RequiredDeclaration::ConsentVerified => envelope.consent_verified,
            RequiredDeclaration::DataSubjectRights => envelope
                .data_subject_rights
                .as_deref()
                .is_some_and(|s| !s.trim().is_empty()),
            RequiredDeclaration::ProcessingPurpose => envelope
                .processing_purpose
                .as_deref()
                .is_some_and(|s| !s.trim().is_empty()),
        }
    }
}

/// Declarations required for a category.
pub fn required_declarations(category: DataCategory) -> &'static [RequiredDeclaration] {
    match category {
        DataCategory::Personal => &[
            RequiredDeclaration::ConsentVerified,
            RequiredDeclaration::DataSubjectRights,
            RequiredDeclaration::ProcessingPurpose,
        ],
        DataCategory::Security => &[RequiredDeclaration::ProcessingPurpose],
        DataCategory::Telemetry | DataCategory::Diagnostic | DataCategory::Operational => &[],
        // `DataCategory` is `#[non_exhaustive]`; all known variants are
        // handled above. This arm satisfies exhaustiveness for variants added
        // in future versions of the `ingest` crate.
        _ => &[],
    }
}
