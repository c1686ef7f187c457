//! Provider directory — registered profiles and their rating write-back.
//!
//! Profiles are never deleted. Reachability is volatile and lives in the
//! presence layer, not here. The directory keeps a secondary index from the
//! owning user account to the profile so both id spaces resolve in O(1).

use dashmap::DashMap;
use rust_decimal::Decimal;
use wakili_types::{Provider, ProviderId, Result, UserId, WakiliError};

/// Source of truth for provider profiles.
pub struct ProviderDirectory {
    /// Primary store, keyed by profile id.
    providers: DashMap<ProviderId, Provider>,
    /// Secondary index: owning user account → profile id.
    by_user: DashMap<UserId, ProviderId>,
}

impl ProviderDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: DashMap::new(),
            by_user: DashMap::new(),
        }
    }

    /// Register a new provider profile for a user account.
    ///
    /// # Errors
    /// Returns `ProviderAlreadyRegistered` if the account already has one.
    pub fn register(&self, user_id: UserId, display_name: impl Into<String>) -> Result<Provider> {
        // The by_user entry guards the whole insert: entry() holds the shard
        // lock, so two concurrent registrations for one user cannot both win.
        match self.by_user.entry(user_id) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(WakiliError::ProviderAlreadyRegistered(user_id))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                let provider = Provider::new(user_id, display_name);
                slot.insert(provider.id);
                self.providers.insert(provider.id, provider.clone());
                tracing::info!(provider_id = %provider.id, user_id = %user_id, "provider registered");
                Ok(provider)
            }
        }
    }

    /// Look up a profile by provider id.
    ///
    /// # Errors
    /// Returns `ProviderNotFound` if no such profile exists.
    pub fn get(&self, provider_id: ProviderId) -> Result<Provider> {
        self.providers
            .get(&provider_id)
            .map(|p| p.clone())
            .ok_or(WakiliError::ProviderNotFound(provider_id))
    }

    /// Look up a profile by the owning user account.
    ///
    /// # Errors
    /// Returns `ProviderNotRegistered` if the account has no profile.
    pub fn by_user(&self, user_id: UserId) -> Result<Provider> {
        let provider_id = self
            .by_user
            .get(&user_id)
            .map(|id| *id)
            .ok_or(WakiliError::ProviderNotRegistered(user_id))?;
        self.get(provider_id)
    }

    /// Overwrite a provider's displayed rating. Called by the rating path
    /// after the mean has been recomputed from the full log.
    ///
    /// # Errors
    /// Returns `ProviderNotFound` if no such profile exists.
    pub fn set_rating(&self, provider_id: ProviderId, rating: Decimal) -> Result<()> {
        let mut entry = self
            .providers
            .get_mut(&provider_id)
            .ok_or(WakiliError::ProviderNotFound(provider_id))?;
        entry.rating = rating;
        Ok(())
    }

    /// Snapshot of all registered profiles, in no particular order.
    #[must_use]
    pub fn all(&self) -> Vec<Provider> {
        self.providers.iter().map(|p| p.clone()).collect()
    }

    /// Number of registered profiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for ProviderDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_lookup() {
        let dir = ProviderDirectory::new();
        let user = UserId::new();
        let p = dir.register(user, "Amina Odhiambo").unwrap();

        assert_eq!(dir.get(p.id).unwrap().display_name, "Amina Odhiambo");
        assert_eq!(dir.by_user(user).unwrap().id, p.id);
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn double_registration_blocked() {
        let dir = ProviderDirectory::new();
        let user = UserId::new();
        dir.register(user, "Amina Odhiambo").unwrap();

        let err = dir.register(user, "Amina O.").unwrap_err();
        assert!(
            matches!(err, WakiliError::ProviderAlreadyRegistered(u) if u == user),
            "Expected ProviderAlreadyRegistered, got: {err:?}"
        );
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn unknown_lookups_fail() {
        let dir = ProviderDirectory::new();
        assert!(matches!(
            dir.get(ProviderId::new()).unwrap_err(),
            WakiliError::ProviderNotFound(_)
        ));
        assert!(matches!(
            dir.by_user(UserId::new()).unwrap_err(),
            WakiliError::ProviderNotRegistered(_)
        ));
    }

    #[test]
    fn rating_write_back() {
        let dir = ProviderDirectory::new();
        let p = dir.register(UserId::new(), "Kamau Njoroge").unwrap();
        assert_eq!(dir.get(p.id).unwrap().rating, Decimal::ZERO);

        dir.set_rating(p.id, Decimal::new(45, 1)).unwrap();
        assert_eq!(dir.get(p.id).unwrap().rating, Decimal::new(45, 1));
    }

    #[test]
    fn set_rating_unknown_provider_fails() {
        let dir = ProviderDirectory::new();
        assert!(dir.set_rating(ProviderId::new(), Decimal::ONE).is_err());
    }
}
