//! Acceptance arbiter — exactly one winner per case.
//!
//! The arbiter validates the caller, then delegates the contended decision
//! to [`CaseRegistry::try_assign`], the storage layer's atomic conditional
//! update. Losing an already-decided race is a normal outcome reported in
//! the result body; it is not an error. The winner's client is notified
//! best-effort; that notification carries no ordering guarantee relative to
//! the winner's own synchronous reply.

use std::sync::Arc;

use wakili_types::{CaseId, CaseRequest, Result, UserId, WakiliError};
use wakili_registry::{CaseRegistry, ProviderDirectory};

use crate::notifier::Notifier;

/// Result of one accept attempt.
#[derive(Debug, Clone)]
pub struct AcceptOutcome {
    pub accepted: bool,
    /// `already_assigned` for race losers; `None` for the winner.
    pub reason: Option<String>,
    /// The case as of this attempt. Present for winners and for losers of
    /// a decided race (showing the actual assignee), absent otherwise.
    pub case: Option<CaseRequest>,
}

impl AcceptOutcome {
    fn won(case: CaseRequest) -> Self {
        Self {
            accepted: true,
            reason: None,
            case: Some(case),
        }
    }

    fn lost(case: Option<CaseRequest>) -> Self {
        Self {
            accepted: false,
            reason: Some("already_assigned".to_string()),
            case,
        }
    }
}

/// Resolves concurrent accept attempts for one case to exactly one winner.
pub struct AcceptanceArbiter {
    directory: Arc<ProviderDirectory>,
    registry: Arc<CaseRegistry>,
    notifier: Arc<dyn Notifier>,
}

impl AcceptanceArbiter {
    #[must_use]
    pub fn new(
        directory: Arc<ProviderDirectory>,
        registry: Arc<CaseRegistry>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            directory,
            registry,
            notifier,
        }
    }

    /// Attempt to accept a case on behalf of the provider owned by
    /// `provider_user`. Exactly one concurrent caller per case gets
    /// `accepted: true`.
    ///
    /// # Errors
    /// - `ProviderNotRegistered` if the account has no provider profile
    ///   (no state is mutated)
    /// - `CaseNotFound` if the case does not exist
    pub fn accept(&self, case_id: CaseId, provider_user: UserId) -> Result<AcceptOutcome> {
        let provider = self.directory.by_user(provider_user)?;

        match self.registry.try_assign(case_id, provider.id) {
            Ok(case) => {
                // Best-effort: the client may learn of the win late or not
                // at all; the synchronous reply to the provider does not
                // depend on it.
                self.notifier.notify_offer_accepted(case.client_id, &case);
                Ok(AcceptOutcome::won(case))
            }
            Err(WakiliError::CaseAlreadyAssigned(_)) => {
                tracing::debug!(case_id = %case_id, provider_id = %provider.id, "accept lost race");
                Ok(AcceptOutcome::lost(self.registry.get(case_id)))
            }
            Err(err) => Err(err),
        }
    }
}
