//! Telgate threat detection.
//!
//! This is the second gate of the ingestion pipeline (after admission,
//! before compliance): every free-text field of a request is scanned against
//! precompiled pattern tables for four injection families and eight
//! sensitive-data classes, alongside structural and numeric sanity checks.
//!
//! ## What we do here
//!
//! - **Injection scanning** - prompt, SQL, XSS, and command injection, each
//!   a prioritized case-insensitive rule list; first match per family wins
//! - **Sensitive-data flagging** - cards, SSNs, emails, phones, keys,
//!   passwords, bearer tokens, JWTs raise warnings for downstream redaction,
//!   never rejections
//! - **Structural checks** - source_id format, timestamp freshness window
//! - **Numeric checks** - NaN/Infinity rejected, extreme magnitudes flagged
//!
//! Validation is a pure function over immutable compiled state: no locks,
//! no I/O, no mutation. Pattern-compile failures are startup errors.
//!
//! ## Example
//!
//! ```
//! use detect::{DetectorConfig, ThreatDetector};
//! use ingest::{ComplianceEnvelope, Environment, IngestRequest, IngestionMetadata, RequestBody};
//! use chrono::Utc;
//!
//! let detector = ThreatDetector::new(DetectorConfig::default()).unwrap();
//! let request = IngestRequest {
//!     metadata: IngestionMetadata {
//!         source_id: "svc-api-01".into(),
//!         source: "api gateway".into(),
//!         environment: Environment::Production,
//!         timestamp: Utc::now(),
//!     },
//!     envelope: ComplianceEnvelope::telemetry_default(),
//!     body: RequestBody::Logs(vec![]),
//! };
//!
//! let result = detector.validate(&request);
//! assert!(result.is_valid);
//! ```
mod config;
mod detector;
mod error;
mod hash;
mod patterns;

pub use crate::config::DetectorConfig;
pub use crate::detector::ThreatDetector;
pub use crate::error::PatternError;
pub use crate::hash::{correlation_hash, CORRELATION_HASH_LEN};
pub use crate::patterns::{InjectionMatch, PatternLibrary, SensitiveClass, ThreatFamily};
