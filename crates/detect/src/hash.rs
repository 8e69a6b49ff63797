//! Correlation hashing for validation audit trails.
//!
//! Every validation result carries a short correlation hash so a response,
//! a log line, and an audit entry can be tied together without storing the
//! payload itself.
//!
//! # Algorithm
//!
//! ```text
//! hex(SHA-256(source_id || '\n' || timestamp_micros))[..16]
//! ```
//!
//! Truncation to 64 bits is deliberate: the hash is a correlation id, not
//! an integrity proof, and short ids keep log lines readable.
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Number of hex characters kept from the full digest.
pub const CORRELATION_HASH_LEN: usize = 16;

/// Compute the truncated correlation hash for one validation pass.
pub fn correlation_hash(source_id: &str, validated_at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source_id.as_bytes());
    hasher.update([b'\n']);
    hasher.update(validated_at.timestamp_micros().to_be_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(CORRELATION_HASH_LEN);
    digest
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn hash_is_deterministic_and_truncated() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let a = correlation_hash("svc-api-01", at);
        let b = correlation_hash("svc-api-01", at);

        assert_eq!(a, b);
        assert_eq!(a.len(), CORRELATION_HASH_LEN);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn hash_varies_with_source_and_time() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let later = at + chrono::Duration::microseconds(1);

        assert_ne!(
            correlation_hash("svc-a", at),
            correlation_hash("svc-b", at)
        );
        assert_ne!(
            correlation_hash("svc-a", at),
            correlation_hash("svc-a", later)
        );
    }
}
