//! WebSocket channel hub — the concrete notifier.
//!
//! One persistent socket per client/provider. An inbound `identify` event
//! binds the socket to that identity's private channel; from then on the
//! hub can push `case_offer` and `offer_accepted` events to exactly that
//! identity. Unidentified sockets receive nothing.
//!
//! Delivery is at-most-once: pushes go through a bounded channel with
//! `try_send`, so a closed or full channel drops the event silently. A
//! provider socket also drives presence: identifying marks the provider
//! reachable, disconnecting marks them unreachable.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use wakili_dispatch::Notifier;
use wakili_types::{constants, CaseRequest, Offer, UserId};

use crate::dto::CaseView;
use crate::state::AppState;

/// Events pushed to identified sockets.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum OutboundEvent {
    CaseOffer(Offer),
    OfferAccepted(CaseView),
}

/// The only inbound event the hub understands.
#[derive(Debug, Deserialize)]
struct IdentifyEvent {
    event: String,
    role: String,
    user_id: UserId,
}

/// Maps identities to their private event channels.
pub struct ChannelHub {
    channels: DashMap<UserId, mpsc::Sender<OutboundEvent>>,
}

impl ChannelHub {
    #[must_use]
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Bind an identity to a fresh channel, returning the receiving end.
    /// A reconnect replaces the previous channel; events still queued on
    /// the old one are dropped, which at-most-once delivery permits.
    pub fn register(&self, user_id: UserId) -> mpsc::Receiver<OutboundEvent> {
        let (tx, rx) = mpsc::channel(constants::EVENT_CHANNEL_CAPACITY);
        self.channels.insert(user_id, tx);
        tracing::debug!(user_id = %user_id, "channel registered");
        rx
    }

    /// Drop an identity's channel.
    pub fn unregister(&self, user_id: UserId) {
        self.channels.remove(&user_id);
        tracing::debug!(user_id = %user_id, "channel unregistered");
    }

    /// Number of currently bound identities.
    #[must_use]
    pub fn connected(&self) -> usize {
        self.channels.len()
    }

    fn push(&self, user_id: UserId, event: OutboundEvent) {
        if let Some(tx) = self.channels.get(&user_id) {
            // Fire-and-forget: a full or closed channel drops the event.
            let _ = tx.try_send(event);
        }
    }
}

impl Default for ChannelHub {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for ChannelHub {
    fn notify_case_offer(&self, provider_user: UserId, offer: &Offer) {
        self.push(provider_user, OutboundEvent::CaseOffer(offer.clone()));
    }

    fn notify_offer_accepted(&self, client: UserId, case: &CaseRequest) {
        self.push(client, OutboundEvent::OfferAccepted(case.clone().into()));
    }
}

/// GET `/ws` — upgrade and hand the socket to the hub loop.
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    // Phase 1: wait for identify. Anything else inbound is ignored.
    let (user_id, is_provider) = loop {
        match socket.recv().await {
            Some(Ok(Message::Text(text))) => {
                if let Ok(identify) = serde_json::from_str::<IdentifyEvent>(&text) {
                    if identify.event == "identify" {
                        break (identify.user_id, identify.role == "provider");
                    }
                }
            }
            Some(Ok(Message::Ping(data))) => {
                if socket.send(Message::Pong(data)).await.is_err() {
                    return;
                }
            }
            Some(Ok(Message::Close(_))) | None => return,
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                tracing::debug!(error = %e, "websocket error before identify");
                return;
            }
        }
    };

    let mut rx = state.hub.register(user_id);
    if is_provider {
        state.presence.set_reachable(user_id, true);
    }
    tracing::info!(user_id = %user_id, provider = is_provider, "socket identified");

    // Phase 2: pump events out, watch the socket for close.
    loop {
        tokio::select! {
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "websocket error");
                        break;
                    }
                }
            }
            event = rx.recv() => {
                let Some(event) = event else { break };
                let Ok(json) = serde_json::to_string(&event) else { continue };
                if socket.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
        }
    }

    state.hub.unregister(user_id);
    if is_provider {
        state.presence.set_reachable(user_id, false);
    }
    tracing::info!(user_id = %user_id, "socket closed");
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use wakili_types::{CaseId, NewCase, ProviderId};

    use super::*;

    #[tokio::test]
    async fn push_reaches_only_the_addressed_identity() {
        let hub = ChannelHub::new();
        let target = UserId::new();
        let bystander = UserId::new();
        let mut target_rx = hub.register(target);
        let mut bystander_rx = hub.register(bystander);

        let offer = Offer::new(CaseId::new(), ProviderId::new(), Decimal::new(1500, 0));
        hub.notify_case_offer(target, &offer);

        let event = target_rx.recv().await.unwrap();
        assert!(matches!(event, OutboundEvent::CaseOffer(o) if o.case_id == offer.case_id));
        assert!(
            bystander_rx.try_recv().is_err(),
            "bystander must receive nothing"
        );
    }

    #[tokio::test]
    async fn push_to_unknown_identity_is_silent() {
        let hub = ChannelHub::new();
        let offer = Offer::new(CaseId::new(), ProviderId::new(), Decimal::new(1000, 0));
        // No channel registered: nothing happens, nothing panics.
        hub.notify_case_offer(UserId::new(), &offer);
    }

    #[tokio::test]
    async fn overflow_drops_events() {
        let hub = ChannelHub::new();
        let user = UserId::new();
        let mut rx = hub.register(user);

        let offer = Offer::new(CaseId::new(), ProviderId::new(), Decimal::ONE);
        for _ in 0..(constants::EVENT_CHANNEL_CAPACITY + 10) {
            hub.notify_case_offer(user, &offer);
        }

        let mut received = 0;
        while rx.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, constants::EVENT_CHANNEL_CAPACITY, "excess dropped");
    }

    #[tokio::test]
    async fn offer_accepted_serializes_with_event_tag() {
        let case = CaseRequest::open(NewCase {
            client_id: UserId::new(),
            case_type: "family".to_string(),
            location: None,
        });
        let event = OutboundEvent::OfferAccepted(case.into());
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"offer_accepted\""));
        assert!(json.contains("\"data\""));
    }

    #[tokio::test]
    async fn reconnect_replaces_channel() {
        let hub = ChannelHub::new();
        let user = UserId::new();
        let _old_rx = hub.register(user);
        let mut new_rx = hub.register(user);
        assert_eq!(hub.connected(), 1);

        let offer = Offer::new(CaseId::new(), ProviderId::new(), Decimal::ONE);
        hub.notify_case_offer(user, &offer);
        assert!(new_rx.try_recv().is_ok(), "event lands on the new channel");
    }
}
