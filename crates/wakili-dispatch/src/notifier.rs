//! Notification seam between the match plane and the transport.
//!
//! The API layer plugs its WebSocket hub in here; the engines never see a
//! socket. Delivery is best-effort, at-most-once: an identity with no open
//! channel, or a full channel, silently receives nothing. Nothing here
//! returns a delivery result, so callers cannot accidentally wait on one.

use wakili_types::{CaseRequest, Offer, UserId};

/// Fire-and-forget event push to one identity's private channel.
pub trait Notifier: Send + Sync {
    /// Push a targeted case offer to one provider's channel.
    fn notify_case_offer(&self, provider_user: UserId, offer: &Offer);

    /// Tell the requesting client their case was accepted. May arrive
    /// before, after, or never relative to the accepting provider's own
    /// synchronous reply.
    fn notify_offer_accepted(&self, client: UserId, case: &CaseRequest);
}

/// Drops every event. Used in tests and headless setups.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify_case_offer(&self, _provider_user: UserId, _offer: &Offer) {}
    fn notify_offer_accepted(&self, _client: UserId, _case: &CaseRequest) {}
}
