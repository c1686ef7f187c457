//! Rating log — insert-only rows, mean recomputed from the full log.
//!
//! The displayed provider rating is always `Σ stars / count` over every row
//! ever logged for that provider. There is no incremental running average,
//! so the displayed value can never drift from the true mean.

use std::collections::HashMap;

use parking_lot::Mutex;
use rust_decimal::Decimal;
use wakili_types::{ProviderId, Rating, Result};

/// Authoritative store of all ratings ever submitted.
pub struct RatingLog {
    by_provider: Mutex<HashMap<ProviderId, Vec<Rating>>>,
}

impl RatingLog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_provider: Mutex::new(HashMap::new()),
        }
    }

    /// Append a rating and return the provider's recomputed mean. Insert
    /// and recompute happen under one lock, so two concurrent ratings for
    /// the same provider both observe a log containing their own row.
    ///
    /// # Errors
    /// Propagates validation errors from [`Rating::new`] callers; the log
    /// itself accepts any constructed `Rating`.
    pub fn record(&self, rating: Rating) -> Result<Decimal> {
        let mut log = self.by_provider.lock();
        let rows = log.entry(rating.provider_id).or_default();
        rows.push(rating);

        let sum: u32 = rows.iter().map(|r| u32::from(r.stars)).sum();
        let mean = Decimal::from(sum) / Decimal::from(rows.len() as u64);
        Ok(mean)
    }

    /// Number of ratings logged for a provider.
    #[must_use]
    pub fn count_for(&self, provider_id: ProviderId) -> usize {
        self.by_provider
            .lock()
            .get(&provider_id)
            .map_or(0, Vec::len)
    }
}

impl Default for RatingLog {
    fn default() -> Self {
        Self::new()
    }
}
