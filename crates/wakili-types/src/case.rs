//! # Consultation cases — the dispatch lifecycle primitive
//!
//! A `CaseRequest` is a client's ask for a legal consultation. It is the
//! only entity in the system with a contended state transition: many
//! providers may race to accept it, and exactly one may win.
//!
//! ## State Machine
//!
//! ```text
//!   ┌───────────┐   accept    ┌──────────┐  settlement  ┌───────────┐
//!   │ SEARCHING ├────────────▶│ ACCEPTED ├─────────────▶│ COMPLETED │
//!   └─────┬─────┘             └──────────┘              └───────────┘
//!         │ cancel/expire
//!         ▼
//!   ┌───────────┐
//!   │ CANCELLED │
//!   └───────────┘
//! ```
//!
//! ## Properties
//!
//! - **Single assignment**: SEARCHING → ACCEPTED happens at most once,
//!   decided by one atomic conditional update in the case registry
//! - **Forward-only**: no transition ever returns a case to SEARCHING
//! - **Settlement-gated**: only an ACCEPTED case can complete, and the
//!   completing provider must be the assigned one

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CaseId, ProviderId, UserId};

/// The lifecycle state of a consultation case.
///
/// Transitions are **monotonic** (never go backwards):
/// - `Searching → Accepted` (a provider won the acceptance race)
/// - `Searching → Cancelled` (client cancelled or search timed out)
/// - `Accepted → Completed` (consultation delivered and settled)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Broadcast to ranked providers; the acceptance race is open.
    Searching,
    /// Exactly one provider holds the case. **Irreversible** except by
    /// settlement. This is what makes the accept race safe.
    Accepted,
    /// The consultation was delivered and the ledger split posted.
    Completed,
    /// Abandoned before any provider accepted. Terminal.
    Cancelled,
}

impl CaseStatus {
    /// Can a case in this state transition to the given target state?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Searching, Self::Accepted | Self::Cancelled)
                | (Self::Accepted, Self::Completed)
        )
    }

    /// Whether this state is terminal (no further transitions).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Searching => write!(f, "SEARCHING"),
            Self::Accepted => write!(f, "ACCEPTED"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// An optional client location attached to a case. Used only for display
/// and future routing; ranking today is rating-ordered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Input for creating a case. The registry assigns the id and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCase {
    pub client_id: UserId,
    pub case_type: String,
    pub location: Option<GeoPoint>,
}

/// A client's consultation request, from dispatch through settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRequest {
    pub id: CaseId,
    /// The client who opened the case.
    pub client_id: UserId,
    /// Free-form case-type tag (e.g., "family", "land", "criminal").
    pub case_type: String,
    pub location: Option<GeoPoint>,
    pub status: CaseStatus,
    /// Set exactly once, by the winning accept.
    pub assigned_provider: Option<ProviderId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CaseRequest {
    /// Build a fresh case in SEARCHING state.
    #[must_use]
    pub fn open(new_case: NewCase) -> Self {
        let now = Utc::now();
        Self {
            id: CaseId::new(),
            client_id: new_case.client_id,
            case_type: new_case.case_type,
            location: new_case.location,
            status: CaseStatus::Searching,
            assigned_provider: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the acceptance race is still open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == CaseStatus::Searching
    }

    /// Transition to ACCEPTED and record the winning provider.
    ///
    /// # Errors
    /// Returns an error if the case is not currently SEARCHING.
    pub fn mark_accepted(&mut self, provider: ProviderId) -> crate::Result<()> {
        if !self.status.can_transition_to(CaseStatus::Accepted) {
            return Err(crate::WakiliError::InvalidCaseTransition {
                from: self.status,
                to: CaseStatus::Accepted,
            });
        }
        self.status = CaseStatus::Accepted;
        self.assigned_provider = Some(provider);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Transition to COMPLETED.
    ///
    /// # Errors
    /// Returns an error if the case is not currently ACCEPTED.
    pub fn mark_completed(&mut self) -> crate::Result<()> {
        if !self.status.can_transition_to(CaseStatus::Completed) {
            return Err(crate::WakiliError::InvalidCaseTransition {
                from: self.status,
                to: CaseStatus::Completed,
            });
        }
        self.status = CaseStatus::Completed;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Transition to CANCELLED.
    ///
    /// # Errors
    /// Returns an error if the case is not currently SEARCHING.
    pub fn mark_cancelled(&mut self) -> crate::Result<()> {
        if !self.status.can_transition_to(CaseStatus::Cancelled) {
            return Err(crate::WakiliError::InvalidCaseTransition {
                from: self.status,
                to: CaseStatus::Cancelled,
            });
        }
        self.status = CaseStatus::Cancelled;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl CaseRequest {
    pub fn dummy(client_id: UserId) -> Self {
        Self::open(NewCase {
            client_id,
            case_type: "family".to_string(),
            location: None,
        })
    }
}
