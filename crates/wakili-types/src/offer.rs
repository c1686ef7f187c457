//! Offer types — the ephemeral unit of dispatch.
//!
//! An `Offer` exists only in flight: it is pushed to a candidate provider's
//! channel and never persisted. Acceptance is validated against the case
//! registry, not against any offer record, so a stale or replayed offer
//! cannot win a case that has already been assigned.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CaseId, ProviderId};

/// A targeted invitation for one provider to take one case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub case_id: CaseId,
    pub provider_id: ProviderId,
    /// Advisory fee for the consultation, from the case-type fee table.
    pub fee_estimate: Decimal,
    pub issued_at: DateTime<Utc>,
}

impl Offer {
    #[must_use]
    pub fn new(case_id: CaseId, provider_id: ProviderId, fee_estimate: Decimal) -> Self {
        Self {
            case_id,
            provider_id,
            fee_estimate,
            issued_at: Utc::now(),
        }
    }
}
