//! Provider (lawyer) profile types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ProviderId, UserId};

/// A registered provider profile. Profiles are never deleted; reachability
/// is volatile state tracked separately by the presence layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub id: ProviderId,
    /// The platform account this profile belongs to.
    pub user_id: UserId,
    pub display_name: String,
    /// Arithmetic mean over all logged ratings. Zero until first rated.
    pub rating: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Provider {
    #[must_use]
    pub fn new(user_id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            id: ProviderId::new(),
            user_id,
            display_name: display_name.into(),
            rating: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }

    /// Whether this provider has ever been rated.
    #[must_use]
    pub fn is_rated(&self) -> bool {
        !self.rating.is_zero()
    }
}
