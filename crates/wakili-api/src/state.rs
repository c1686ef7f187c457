//! Application state — the wiring of all planes.

use std::sync::Arc;

use wakili_dispatch::{AcceptanceArbiter, MatchingEngine, Notifier, PresenceTracker};
use wakili_gateway::{GatewayClient, PendingPushes};
use wakili_registry::{AuditLog, CaseRegistry, LedgerStore, ProviderDirectory, RatingLog};
use wakili_settlement::SettlementEngine;
use wakili_types::{Result, UserId, WakiliConfig, WalletRole};

use crate::ws::ChannelHub;

/// Everything a handler can reach. Cheap to clone: all members are shared.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<WakiliConfig>,
    pub directory: Arc<ProviderDirectory>,
    pub cases: Arc<CaseRegistry>,
    pub ledger: Arc<LedgerStore>,
    pub ratings: Arc<RatingLog>,
    pub audit: Arc<AuditLog>,
    pub presence: Arc<PresenceTracker>,
    pub hub: Arc<ChannelHub>,
    pub matching: Arc<MatchingEngine>,
    pub arbiter: Arc<AcceptanceArbiter>,
    pub settlement: Arc<SettlementEngine>,
    pub gateway: Arc<GatewayClient>,
    pub pending_pushes: Arc<PendingPushes>,
    /// Account whose wallet collects commissions. Seeded at build time.
    pub platform_user: UserId,
}

/// Build and wire the full service state from a config, seeding the
/// platform wallet.
///
/// # Errors
/// Returns configuration errors (invalid commission rate, unbuildable
/// gateway client).
pub fn build_state(config: WakiliConfig) -> Result<AppState> {
    config.settlement.validate()?;

    let directory = Arc::new(ProviderDirectory::new());
    let cases = Arc::new(CaseRegistry::new());
    let ledger = Arc::new(LedgerStore::new());
    let ratings = Arc::new(RatingLog::new());
    let audit = Arc::new(AuditLog::new());
    let presence = Arc::new(PresenceTracker::new(Arc::clone(&directory)));
    let hub = Arc::new(ChannelHub::new());

    let platform_user = UserId::new();
    ledger.open_wallet(platform_user, WalletRole::Platform);

    let notifier: Arc<dyn Notifier> = Arc::clone(&hub) as Arc<dyn Notifier>;
    let matching = Arc::new(MatchingEngine::new(
        Arc::clone(&cases),
        Arc::clone(&presence),
        Arc::clone(&notifier),
        config.dispatch.clone(),
    ));
    let arbiter = Arc::new(AcceptanceArbiter::new(
        Arc::clone(&directory),
        Arc::clone(&cases),
        Arc::clone(&notifier),
    ));
    let settlement = Arc::new(SettlementEngine::new(
        Arc::clone(&cases),
        Arc::clone(&ledger),
        Arc::clone(&directory),
        config.settlement.clone(),
        platform_user,
    ));
    let gateway = Arc::new(GatewayClient::new(config.gateway.clone())?);

    Ok(AppState {
        config: Arc::new(config),
        directory,
        cases,
        ledger,
        ratings,
        audit,
        presence,
        hub,
        matching,
        arbiter,
        settlement,
        gateway,
        pending_pushes: Arc::new(PendingPushes::new()),
        platform_user,
    })
}
