//! Rating types. Ratings are insert-only; a provider's displayed rating is
//! always recomputed as the mean over the full log, never adjusted
//! incrementally, so it cannot drift.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{constants, ProviderId, UserId};

/// One star rating left by a client for a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub client_id: UserId,
    pub provider_id: ProviderId,
    /// Stars in 1..=5 inclusive.
    pub stars: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Rating {
    /// Build a rating, validating the star range.
    ///
    /// # Errors
    /// Returns `RatingOutOfRange` when stars are outside 1..=5.
    pub fn new(
        client_id: UserId,
        provider_id: ProviderId,
        stars: u8,
        comment: Option<String>,
    ) -> crate::Result<Self> {
        if !(constants::MIN_STARS..=constants::MAX_STARS).contains(&stars) {
            return Err(crate::WakiliError::RatingOutOfRange { stars });
        }
        Ok(Self {
            client_id,
            provider_id,
            stars,
            comment,
            created_at: Utc::now(),
        })
    }
}
