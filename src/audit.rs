//! Batched audit writing.
//!
//! Audit entries are appended to an in-memory buffer on the hot path (one
//! short mutex, no I/O) and written to the audit sink in batches: when the
//! buffer reaches the flush threshold, or from the maintenance sweep, or on
//! shutdown. The flush itself never runs on the request path.
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One audit record.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    /// What happened: `ingest`, `security_test`.
    pub action: String,
    pub source_id: String,
    /// Items covered by this entry.
    pub count: usize,
    pub details: serde_json::Value,
}

/// Threshold-triggered audit buffer.
pub(crate) struct AuditBuffer {
    entries: Mutex<Vec<AuditEntry>>,
    flush_threshold: usize,
}

impl AuditBuffer {
    pub(crate) fn new(flush_threshold: usize) -> Self {
        Self {
            entries: Mutex::new(Vec::with_capacity(flush_threshold)),
            flush_threshold,
        }
    }

    /// Append one entry. When the buffer reaches the threshold the full
    /// batch is handed back to the caller to dispatch off the hot path.
    pub(crate) fn push(&self, entry: AuditEntry) -> Option<Vec<AuditEntry>> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.push(entry);
        if entries.len() >= self.flush_threshold {
            Some(std::mem::take(&mut *entries))
        } else {
            None
        }
    }

    /// Take everything currently buffered (maintenance sweep, shutdown).
    pub(crate) fn drain(&self) -> Vec<AuditEntry> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::take(&mut *entries)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(i: usize) -> AuditEntry {
        AuditEntry {
            timestamp: Utc::now(),
            action: "ingest".into(),
            source_id: format!("svc-{i}"),
            count: 1,
            details: serde_json::json!({}),
        }
    }

    #[test]
    fn flush_fires_exactly_at_threshold() {
        let buffer = AuditBuffer::new(3);
        assert!(buffer.push(entry(0)).is_none());
        assert!(buffer.push(entry(1)).is_none());

        let batch = buffer.push(entry(2)).expect("threshold reached");
        assert_eq!(batch.len(), 3);
        assert_eq!(buffer.len(), 0);

        // Counter restarts after the flush.
        assert!(buffer.push(entry(3)).is_none());
    }

    #[test]
    fn drain_empties_the_buffer() {
        let buffer = AuditBuffer::new(100);
        buffer.push(entry(0));
        buffer.push(entry(1));

        let drained = buffer.drain();
        assert_eq!(drained.len(), 2);
        assert!(buffer.drain().is_empty());
    }
}
