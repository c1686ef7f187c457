//! Presence tracker — the volatile reachability map.
//!
//! Keyed by provider profile id, updated through the owning user account
//! (the id the provider's own client knows). Per-provider updates are
//! atomic via the dashmap entry API; last writer per provider wins, with no
//! ordering guarantee across providers. The provider directory is injected,
//! so rankings always read the current rating and there is no process-wide
//! singleton.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use wakili_types::{Provider, ProviderId, UserId};
use wakili_registry::ProviderDirectory;

#[derive(Debug, Clone, Copy)]
struct PresenceEntry {
    reachable: bool,
    last_active: DateTime<Utc>,
}

/// Tracks which providers currently have an active, available channel.
pub struct PresenceTracker {
    directory: Arc<ProviderDirectory>,
    entries: DashMap<ProviderId, PresenceEntry>,
}

impl PresenceTracker {
    #[must_use]
    pub fn new(directory: Arc<ProviderDirectory>) -> Self {
        Self {
            directory,
            entries: DashMap::new(),
        }
    }

    /// Mark the provider owned by `user_id` reachable or not. A transition
    /// to reachable refreshes `last_active`. Unknown accounts are a no-op.
    /// Returns whether a provider entry was updated.
    pub fn set_reachable(&self, user_id: UserId, reachable: bool) -> bool {
        let Ok(provider) = self.directory.by_user(user_id) else {
            tracing::debug!(user_id = %user_id, "presence update for unregistered account ignored");
            return false;
        };
        // entry() holds the shard lock: the per-provider update is atomic,
        // last writer wins.
        let mut entry = self.entries.entry(provider.id).or_insert(PresenceEntry {
            reachable: false,
            last_active: Utc::now(),
        });
        entry.reachable = reachable;
        if reachable {
            entry.last_active = Utc::now();
        }
        drop(entry);
        tracing::debug!(provider_id = %provider.id, reachable, "presence updated");
        true
    }

    /// Whether the provider owned by `user_id` is currently reachable.
    #[must_use]
    pub fn is_reachable(&self, user_id: UserId) -> bool {
        let Ok(provider) = self.directory.by_user(user_id) else {
            return false;
        };
        self.is_reachable_provider(provider.id)
    }

    /// Whether a provider profile is currently reachable.
    #[must_use]
    pub fn is_reachable_provider(&self, provider_id: ProviderId) -> bool {
        self.entries.get(&provider_id).is_some_and(|e| e.reachable)
    }

    /// The top `limit` reachable providers, ordered by rating descending,
    /// ties broken by most recent `last_active` first. Ratings are read
    /// from the directory at call time, so a provider re-ranked by new
    /// ratings shows up in the new position immediately.
    #[must_use]
    pub fn ranked_reachable(&self, limit: usize) -> Vec<Provider> {
        let mut ranked: Vec<(Provider, DateTime<Utc>)> = self
            .entries
            .iter()
            .filter(|e| e.reachable)
            .filter_map(|e| {
                // A tracked id whose profile lookup fails is skipped rather
                // than failing the whole ranking; profiles are never
                // deleted, so this only covers directory/store faults.
                self.directory
                    .get(*e.key())
                    .ok()
                    .map(|p| (p, e.last_active))
            })
            .collect();

        ranked.sort_by(|(a, a_active), (b, b_active)| {
            b.rating
                .cmp(&a.rating)
                .then_with(|| b_active.cmp(a_active))
        });
        ranked.truncate(limit);
        ranked.into_iter().map(|(p, _)| p).collect()
    }

    /// Number of providers currently marked reachable.
    #[must_use]
    pub fn reachable_count(&self) -> usize {
        self.entries.iter().filter(|e| e.reachable).count()
    }
}
