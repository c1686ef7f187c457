//! Matching engine — persist first, then offer to the ranked reachable set.
//!
//! Durability before notification: the case is written to the registry
//! before any offer goes out, so a crash mid-dispatch never loses the
//! request, only some offers. Offers are targeted (one payload per
//! candidate, addressed to that candidate's own channel) and fire-and-
//! forget; a candidate whose channel is gone simply never hears about the
//! case, which is accepted best-effort semantics.

use std::sync::Arc;

use wakili_types::{CaseId, CaseRequest, DispatchConfig, NewCase, Offer};
use wakili_registry::CaseRegistry;

use crate::notifier::Notifier;
use crate::presence::PresenceTracker;

/// What `dispatch` returns to the caller, immediately after enqueuing
/// notifications. Empty `offers` is a normal outcome, not an error.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub case_id: CaseId,
    pub case: CaseRequest,
    pub offers: Vec<Offer>,
}

/// Ranks reachable providers for a new case and emits targeted offers.
pub struct MatchingEngine {
    registry: Arc<CaseRegistry>,
    presence: Arc<PresenceTracker>,
    notifier: Arc<dyn Notifier>,
    config: DispatchConfig,
}

impl MatchingEngine {
    #[must_use]
    pub fn new(
        registry: Arc<CaseRegistry>,
        presence: Arc<PresenceTracker>,
        notifier: Arc<dyn Notifier>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            registry,
            presence,
            notifier,
            config,
        }
    }

    /// Persist the case, rank the top-K reachable providers, push one
    /// targeted offer per candidate, and return without waiting on
    /// delivery.
    pub fn dispatch(&self, new_case: NewCase) -> DispatchOutcome {
        let case = self.registry.create(new_case);
        let fee = self.config.fee_for(&case.case_type);

        let candidates = self.presence.ranked_reachable(self.config.top_k);
        let mut offers = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let offer = Offer::new(case.id, candidate.id, fee);
            self.notifier.notify_case_offer(candidate.user_id, &offer);
            offers.push(offer);
        }

        tracing::info!(
            case_id = %case.id,
            case_type = %case.case_type,
            offered = offers.len(),
            %fee,
            "case dispatched"
        );
        DispatchOutcome {
            case_id: case.id,
            case,
            offers,
        }
    }
}
