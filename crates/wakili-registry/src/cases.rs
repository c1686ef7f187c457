//! Case registry — durable case state and the accept-race arbiter.
//!
//! The registry owns the one operation in the system that must be atomic
//! under contention: [`CaseRegistry::try_assign`], the conditional
//! `SEARCHING → ACCEPTED` update. `DashMap::get_mut` holds the shard lock
//! for the duration of the read-check-write, so concurrent accepts for one
//! case serialize at this single point and exactly one wins. No other lock
//! layer exists or is needed.

use chrono::Utc;
use dashmap::DashMap;
use wakili_types::{CaseId, CaseRequest, CaseStatus, NewCase, ProviderId, Result, WakiliError};

/// Durable record of case requests and their lifecycle state.
pub struct CaseRegistry {
    cases: DashMap<CaseId, CaseRequest>,
}

impl CaseRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cases: DashMap::new(),
        }
    }

    /// Persist a new case in SEARCHING state. Persistence happens before any
    /// offer goes out, so a crash after this call never loses the request.
    pub fn create(&self, new_case: NewCase) -> CaseRequest {
        let case = CaseRequest::open(new_case);
        self.cases.insert(case.id, case.clone());
        tracing::info!(case_id = %case.id, case_type = %case.case_type, "case created");
        case
    }

    /// Look up a case by id.
    #[must_use]
    pub fn get(&self, case_id: CaseId) -> Option<CaseRequest> {
        self.cases.get(&case_id).map(|c| c.clone())
    }

    /// The accept-race arbiter: assign the case to `provider` iff it is
    /// still SEARCHING. The shard lock held by `get_mut` makes the
    /// read-check-write atomic relative to concurrent callers, so at most
    /// one accept per case ever succeeds.
    ///
    /// # Errors
    /// - `CaseNotFound` if no such case exists
    /// - `CaseAlreadyAssigned` if the race was already won (or the case
    ///   left SEARCHING some other way)
    pub fn try_assign(&self, case_id: CaseId, provider: ProviderId) -> Result<CaseRequest> {
        let mut entry = self
            .cases
            .get_mut(&case_id)
            .ok_or(WakiliError::CaseNotFound(case_id))?;
        if !entry.is_open() {
            return Err(WakiliError::CaseAlreadyAssigned(case_id));
        }
        entry.mark_accepted(provider)?;
        tracing::info!(case_id = %case_id, provider_id = %provider, "case assigned");
        Ok(entry.clone())
    }

    /// Complete an ACCEPTED case, checking that the completing provider is
    /// the assigned one. Same atomicity as [`Self::try_assign`].
    ///
    /// # Errors
    /// - `CaseNotFound` if no such case exists
    /// - `CaseAlreadySettled` if the case is already COMPLETED
    /// - `InvalidCaseTransition` if the case is not ACCEPTED
    /// - `WrongAssignee` if a different provider holds the case
    pub fn complete_assigned(&self, case_id: CaseId, provider: ProviderId) -> Result<CaseRequest> {
        let mut entry = self
            .cases
            .get_mut(&case_id)
            .ok_or(WakiliError::CaseNotFound(case_id))?;
        if entry.status == CaseStatus::Completed {
            return Err(WakiliError::CaseAlreadySettled(case_id));
        }
        if entry.assigned_provider != Some(provider) {
            return Err(WakiliError::WrongAssignee {
                case_id,
                provider_id: provider,
            });
        }
        entry.mark_completed()?;
        Ok(entry.clone())
    }

    /// Compensation path for settlement: put a COMPLETED case back to
    /// ACCEPTED after a ledger posting failed, so no partial settlement is
    /// ever observable. This deliberately bypasses the forward-only state
    /// machine; it is the inverse of a transition that logically never
    /// happened.
    pub fn revert_completion(&self, case_id: CaseId) {
        if let Some(mut entry) = self.cases.get_mut(&case_id) {
            if entry.status == CaseStatus::Completed {
                entry.status = CaseStatus::Accepted;
                entry.updated_at = Utc::now();
                tracing::warn!(case_id = %case_id, "completion reverted after ledger failure");
            }
        }
    }

    /// Cancel a case iff it is still SEARCHING. Returns whether the
    /// transition happened.
    ///
    /// # Errors
    /// Returns `CaseNotFound` if no such case exists.
    pub fn cancel_if_searching(&self, case_id: CaseId) -> Result<bool> {
        let mut entry = self
            .cases
            .get_mut(&case_id)
            .ok_or(WakiliError::CaseNotFound(case_id))?;
        if !entry.is_open() {
            return Ok(false);
        }
        entry.mark_cancelled()?;
        Ok(true)
    }

    /// Sweep SEARCHING cases older than `ttl_secs` to CANCELLED. Returns
    /// the ids of the cases that were cancelled.
    pub fn sweep_stale(&self, ttl_secs: u64) -> Vec<CaseId> {
        let cutoff = Utc::now() - chrono::Duration::seconds(i64::try_from(ttl_secs).unwrap_or(i64::MAX));
        let mut swept = Vec::new();
        for mut entry in self.cases.iter_mut() {
            if entry.is_open() && entry.created_at < cutoff && entry.mark_cancelled().is_ok() {
                swept.push(entry.id);
            }
        }
        if !swept.is_empty() {
            tracing::info!(count = swept.len(), "stale searching cases swept");
        }
        swept
    }

    /// Number of cases in the registry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

impl Default for CaseRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wakili_types::UserId;

    use super::*;

    fn open_case(registry: &CaseRegistry) -> CaseRequest {
        registry.create(NewCase {
            client_id: UserId::new(),
            case_type: "family".to_string(),
            location: None,
        })
    }

    #[test]
    fn create_persists_searching() {
        let registry = CaseRegistry::new();
        let case = open_case(&registry);

        let stored = registry.get(case.id).unwrap();
        assert_eq!(stored.status, CaseStatus::Searching);
        assert!(stored.assigned_provider.is_none());
    }

    #[test]
    fn first_assign_wins_second_loses() {
        let registry = CaseRegistry::new();
        let case = open_case(&registry);
        let winner = ProviderId::new();

        let assigned = registry.try_assign(case.id, winner).unwrap();
        assert_eq!(assigned.assigned_provider, Some(winner));

        let err = registry.try_assign(case.id, ProviderId::new()).unwrap_err();
        assert!(matches!(err, WakiliError::CaseAlreadyAssigned(id) if id == case.id));

        // The loser's attempt changed nothing.
        let stored = registry.get(case.id).unwrap();
        assert_eq!(stored.assigned_provider, Some(winner));
    }

    #[test]
    fn assign_unknown_case_fails() {
        let registry = CaseRegistry::new();
        let err = registry.try_assign(CaseId::new(), ProviderId::new()).unwrap_err();
        assert!(matches!(err, WakiliError::CaseNotFound(_)));
    }

    #[test]
    fn concurrent_assigns_exactly_one_winner() {
        let registry = Arc::new(CaseRegistry::new());
        let case = open_case(&registry);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let case_id = case.id;
                std::thread::spawn(move || registry.try_assign(case_id, ProviderId::new()).is_ok())
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&won| won)
            .count();
        assert_eq!(wins, 1, "exactly one concurrent assign must win");
    }

    #[test]
    fn complete_requires_assignment_and_right_provider() {
        let registry = CaseRegistry::new();
        let case = open_case(&registry);
        let provider = ProviderId::new();

        // Not yet assigned.
        assert!(matches!(
            registry.complete_assigned(case.id, provider).unwrap_err(),
            WakiliError::WrongAssignee { .. }
        ));

        registry.try_assign(case.id, provider).unwrap();

        // Wrong provider.
        assert!(matches!(
            registry.complete_assigned(case.id, ProviderId::new()).unwrap_err(),
            WakiliError::WrongAssignee { .. }
        ));

        let done = registry.complete_assigned(case.id, provider).unwrap();
        assert_eq!(done.status, CaseStatus::Completed);

        // Second completion is a settle conflict.
        assert!(matches!(
            registry.complete_assigned(case.id, provider).unwrap_err(),
            WakiliError::CaseAlreadySettled(_)
        ));
    }

    #[test]
    fn revert_completion_restores_accepted() {
        let registry = CaseRegistry::new();
        let case = open_case(&registry);
        let provider = ProviderId::new();
        registry.try_assign(case.id, provider).unwrap();
        registry.complete_assigned(case.id, provider).unwrap();

        registry.revert_completion(case.id);
        let stored = registry.get(case.id).unwrap();
        assert_eq!(stored.status, CaseStatus::Accepted);
        assert_eq!(stored.assigned_provider, Some(provider));

        // Reverting a non-completed case is a no-op.
        registry.revert_completion(case.id);
        assert_eq!(registry.get(case.id).unwrap().status, CaseStatus::Accepted);
    }

    #[test]
    fn cancel_only_while_searching() {
        let registry = CaseRegistry::new();
        let case = open_case(&registry);
        assert!(registry.cancel_if_searching(case.id).unwrap());

        let case2 = open_case(&registry);
        registry.try_assign(case2.id, ProviderId::new()).unwrap();
        assert!(!registry.cancel_if_searching(case2.id).unwrap());
    }

    #[test]
    fn sweep_cancels_only_stale_searching() {
        let registry = CaseRegistry::new();
        let stale = open_case(&registry);
        let assigned = open_case(&registry);
        registry.try_assign(assigned.id, ProviderId::new()).unwrap();

        // ttl 0: everything SEARCHING is already stale.
        let swept = registry.sweep_stale(0);
        assert_eq!(swept, vec![stale.id]);
        assert_eq!(registry.get(stale.id).unwrap().status, CaseStatus::Cancelled);
        assert_eq!(registry.get(assigned.id).unwrap().status, CaseStatus::Accepted);
    }
}
