//! Audit log for raw gateway callbacks.
//!
//! Every webhook body is persisted verbatim with a SHA-256 digest and a
//! receive timestamp, before any parsing is attempted. Malformed payloads
//! are audited the same as well-formed ones; the log is how operators
//! reconcile gateway deliveries after the fact. Payload authenticity is not
//! verified anywhere in this design.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use wakili_types::constants;

/// One recorded gateway callback.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    /// Hex SHA-256 of the raw body.
    pub digest: String,
    /// The body exactly as received.
    pub body: String,
    pub received_at: DateTime<Utc>,
}

/// Bounded in-memory audit store; oldest entries are pruned at capacity.
pub struct AuditLog {
    entries: Mutex<VecDeque<AuditEntry>>,
    max_entries: usize,
}

impl AuditLog {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(constants::MAX_AUDIT_ENTRIES)
    }

    /// # Panics
    /// Panics if `max_entries` is zero.
    #[must_use]
    pub fn with_capacity(max_entries: usize) -> Self {
        assert!(max_entries > 0, "AuditLog max_entries must be > 0");
        Self {
            entries: Mutex::new(VecDeque::new()),
            max_entries,
        }
    }

    /// Persist a raw callback body. Never fails: garbage is audited too.
    pub fn record(&self, body: &str) -> AuditEntry {
        let digest = hex::encode(Sha256::digest(body.as_bytes()));
        let entry = AuditEntry {
            digest: digest.clone(),
            body: body.to_string(),
            received_at: Utc::now(),
        };

        let mut entries = self.entries.lock();
        if entries.len() >= self.max_entries {
            entries.pop_front();
        }
        entries.push_back(entry.clone());
        tracing::debug!(%digest, bytes = body.len(), "gateway callback audited");
        entry
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Look up a retained entry by digest.
    #[must_use]
    pub fn find(&self, digest: &str) -> Option<AuditEntry> {
        self.entries
            .lock()
            .iter()
            .find(|e| e.digest == digest)
            .cloned()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}
