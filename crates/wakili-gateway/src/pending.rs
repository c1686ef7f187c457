//! In-flight push tracking for callback correlation.
//!
//! The asynchronous payment-result callback only carries the gateway's
//! checkout request id, not our account reference. This bounded map
//! remembers the reference for each initiated push so the webhook handler
//! can credit the right wallet. Entries are consumed on first match;
//! overflow evicts the oldest, which at worst downgrades a very late
//! callback to audit-only.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use wakili_types::constants;

struct PendingInner {
    by_checkout_id: HashMap<String, String>,
    /// Insertion order for eviction (front = oldest).
    order: VecDeque<String>,
}

/// Bounded checkout-request-id → account-reference map.
pub struct PendingPushes {
    inner: Mutex<PendingInner>,
    max_size: usize,
}

impl PendingPushes {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(constants::MAX_PENDING_PUSHES)
    }

    /// # Panics
    /// Panics if `max_size` is zero.
    #[must_use]
    pub fn with_capacity(max_size: usize) -> Self {
        assert!(max_size > 0, "PendingPushes max_size must be > 0");
        Self {
            inner: Mutex::new(PendingInner {
                by_checkout_id: HashMap::new(),
                order: VecDeque::new(),
            }),
            max_size,
        }
    }

    /// Remember an initiated push. A repeated checkout id overwrites the
    /// stored reference (the gateway treats the id as unique).
    pub fn track(&self, checkout_request_id: impl Into<String>, account_reference: impl Into<String>) {
        let id = checkout_request_id.into();
        let mut inner = self.inner.lock();
        if !inner.by_checkout_id.contains_key(&id) && inner.by_checkout_id.len() >= self.max_size {
            if let Some(oldest) = inner.order.pop_front() {
                inner.by_checkout_id.remove(&oldest);
            }
        }
        if inner.by_checkout_id.insert(id.clone(), account_reference.into()).is_none() {
            inner.order.push_back(id);
        }
    }

    /// Consume the tracked reference for a callback, if any.
    #[must_use]
    pub fn take(&self, checkout_request_id: &str) -> Option<String> {
        let mut inner = self.inner.lock();
        let reference = inner.by_checkout_id.remove(checkout_request_id)?;
        inner.order.retain(|id| id != checkout_request_id);
        Some(reference)
    }

    /// Number of in-flight pushes being tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().by_checkout_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().by_checkout_id.is_empty()
    }
}

impl Default for PendingPushes {
    fn default() -> Self {
        Self::new()
    }
}
