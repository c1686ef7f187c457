//! REST handlers, one per endpoint of the external contract.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use uuid::Uuid;
use wakili_gateway::parse_callback;
use wakili_types::{constants, CaseId, GeoPoint, NewCase, PushRequest, Rating, UserId};

use crate::dto::{
    AcceptBody, AcceptResponse, CaseView, CompleteBody, DispatchRequestBody, DispatchResponse,
    HealthResponse, OfferedProvider, ProviderStatusBody, ProviderView, PushBody, RateBody,
    RateResponse, ReceiptView, RegisterProviderBody, StatusAck, WalletView, WebhookAck,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::ws::ws_handler;

/// Map the endpoint surface onto the app state.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Dispatch
        .route("/dispatch/request", post(dispatch_request))
        .route("/dispatch/:request_id", get(get_case))
        .route("/dispatch/:request_id/accept", post(accept_case))
        // Providers
        .route("/provider/register", post(register_provider))
        .route("/provider/status", post(provider_status))
        .route("/provider/list", get(provider_list))
        // Settlement & ratings
        .route("/case/complete", post(complete_case))
        .route("/rate", post(rate_provider))
        // Wallets
        .route("/wallet/:user_id", get(get_wallet))
        .route("/wallet/:user_id/transactions", get(get_wallet_transactions))
        // Payments
        .route("/payments/push", post(payments_push))
        .route("/payments/webhook", post(payments_webhook))
        // Plumbing
        .route("/health", get(health))
        .route("/ws", get(ws_handler))
        .with_state(state)
}

fn required<T>(value: Option<T>, field: &str) -> ApiResult<T> {
    value.ok_or_else(|| ApiError::Validation(format!("{field} is required")))
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

async fn dispatch_request(
    State(state): State<AppState>,
    Json(body): Json<DispatchRequestBody>,
) -> ApiResult<Json<DispatchResponse>> {
    let client_id = required(body.client_id, "client_id")?;
    let case_type = required(
        body.case_type.filter(|t| !t.trim().is_empty()),
        "case_type",
    )?;
    let location = match (body.lat, body.lng) {
        (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
        _ => None,
    };

    let outcome = state.matching.dispatch(NewCase {
        client_id: UserId(client_id),
        case_type,
        location,
    });
    Ok(Json(DispatchResponse {
        request_id: outcome.case_id,
        offered: outcome
            .offers
            .iter()
            .map(|o| OfferedProvider {
                provider_id: o.provider_id,
            })
            .collect(),
    }))
}

async fn get_case(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> ApiResult<Json<CaseView>> {
    let case = state
        .cases
        .get(CaseId(request_id))
        .ok_or_else(|| ApiError::NotFound(format!("case not found: {request_id}")))?;
    Ok(Json(case.into()))
}

async fn accept_case(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    Json(body): Json<AcceptBody>,
) -> ApiResult<Json<AcceptResponse>> {
    let provider_user = required(body.provider_user_id, "provider_user_id")?;
    let outcome = state
        .arbiter
        .accept(CaseId(request_id), UserId(provider_user))?;

    // Losing the race is a normal outcome reported in the body, not an
    // HTTP error.
    let status = if outcome.accepted {
        "accepted"
    } else {
        "already_assigned"
    };
    Ok(Json(AcceptResponse {
        status: status.to_string(),
        request_id: CaseId(request_id),
        provider_id: outcome.case.and_then(|c| c.assigned_provider),
    }))
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

async fn register_provider(
    State(state): State<AppState>,
    Json(body): Json<RegisterProviderBody>,
) -> ApiResult<Json<ProviderView>> {
    let user_id = UserId(required(body.user_id, "user_id")?);
    let display_name = required(
        body.display_name.filter(|n| !n.trim().is_empty()),
        "display_name",
    )?;

    let provider = state.directory.register(user_id, display_name)?;
    state
        .ledger
        .open_wallet(user_id, wakili_types::WalletRole::Provider);
    Ok(Json(provider.into()))
}

async fn provider_status(
    State(state): State<AppState>,
    Json(body): Json<ProviderStatusBody>,
) -> ApiResult<Json<StatusAck>> {
    let user_id = UserId(required(body.provider_id, "provider_id")?);
    let is_online = required(body.is_online, "is_online")?;
    let updated = state.presence.set_reachable(user_id, is_online);
    Ok(Json(StatusAck { updated }))
}

async fn provider_list(State(state): State<AppState>) -> Json<Vec<ProviderView>> {
    let reachable = state.presence.ranked_reachable(state.directory.len());
    Json(reachable.into_iter().map(ProviderView::from).collect())
}

// ---------------------------------------------------------------------------
// Settlement & ratings
// ---------------------------------------------------------------------------

async fn complete_case(
    State(state): State<AppState>,
    Json(body): Json<CompleteBody>,
) -> ApiResult<Json<ReceiptView>> {
    let case_id = CaseId(required(body.case_id, "case_id")?);
    let amount = required(body.amount, "amount")?;
    let provider_user = UserId(required(body.provider_id, "provider_id")?);

    let receipt = state.settlement.complete(case_id, amount, provider_user)?;
    Ok(Json(ReceiptView {
        case_id: receipt.case_id,
        gross: receipt.gross,
        commission: receipt.commission,
        payout: receipt.payout,
    }))
}

async fn rate_provider(
    State(state): State<AppState>,
    Json(body): Json<RateBody>,
) -> ApiResult<Json<RateResponse>> {
    let user_id = UserId(required(body.user_id, "user_id")?);
    let provider_id = wakili_types::ProviderId(required(body.provider_id, "provider_id")?);
    let stars = required(body.stars, "stars")?;

    // 404 before validation side effects: the provider must exist.
    state.directory.get(provider_id)?;
    let rating = Rating::new(user_id, provider_id, stars, body.comment)?;
    let mean = state.ratings.record(rating)?;
    state.directory.set_rating(provider_id, mean)?;
    Ok(Json(RateResponse {
        provider_id,
        rating: mean,
    }))
}

// ---------------------------------------------------------------------------
// Wallets
// ---------------------------------------------------------------------------

async fn get_wallet(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<WalletView>> {
    let wallet = state.ledger.wallet_of(UserId(user_id))?;
    Ok(Json(wallet.into()))
}

async fn get_wallet_transactions(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Vec<wakili_types::Transaction>>> {
    let transactions = state.ledger.transactions_of(UserId(user_id))?;
    Ok(Json(transactions))
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

async fn payments_push(
    State(state): State<AppState>,
    Json(body): Json<PushBody>,
) -> ApiResult<Json<wakili_types::PushOutcome>> {
    let request = PushRequest {
        phone: required(body.phone.filter(|p| !p.trim().is_empty()), "phone")?,
        amount: required(body.amount, "amount")?,
        account_reference: required(body.account_ref, "account_ref")?,
        description: body.desc.unwrap_or_else(|| "Wakili consultation".to_string()),
    };

    let outcome = state.gateway.request_push(&request).await?;
    if let Some(checkout_id) = &outcome.checkout_request_id {
        state
            .pending_pushes
            .track(checkout_id.clone(), request.account_reference.clone());
    }
    Ok(Json(outcome))
}

/// Always fast-acks 200, after audit-persisting the raw body. The payload
/// is unauthenticated by design; crediting is strictly best-effort and a
/// parse failure changes nothing beyond the audit row.
async fn payments_webhook(State(state): State<AppState>, body: String) -> Json<WebhookAck> {
    state.audit.record(&body);

    if let Some(callback) = parse_callback(&body) {
        if callback.is_success() {
            let reference = state.pending_pushes.take(&callback.checkout_request_id);
            if let (Some(amount), Some(reference)) = (callback.amount(), reference) {
                if let Ok(user) = Uuid::parse_str(&reference) {
                    match state.ledger.post_deposit(UserId(user), amount) {
                        Ok(_) => {
                            tracing::info!(user_id = %user, %amount, "gateway deposit credited");
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "gateway deposit not credited");
                        }
                    }
                }
            }
        }
    }

    Json(WebhookAck { received: true })
}

// ---------------------------------------------------------------------------
// Plumbing
// ---------------------------------------------------------------------------

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: constants::SERVICE_NAME.to_string(),
        version: constants::VERSION.to_string(),
    })
}
