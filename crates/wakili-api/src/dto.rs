//! Request and response bodies for the REST surface.
//!
//! Request fields that the contract requires are modelled as `Option` and
//! checked in the handler, so a missing field is a 400 with a useful
//! message rather than a deserializer rejection.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wakili_types::{CaseId, CaseRequest, CaseStatus, Provider, ProviderId, Wallet, WalletRole};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DispatchRequestBody {
    pub client_id: Option<Uuid>,
    pub case_type: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct AcceptBody {
    pub provider_user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ProviderStatusBody {
    /// The provider's platform account id (the id their own client holds).
    pub provider_id: Option<Uuid>,
    pub is_online: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterProviderBody {
    pub user_id: Option<Uuid>,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteBody {
    pub case_id: Option<Uuid>,
    pub amount: Option<Decimal>,
    /// The completing provider's platform account id.
    pub provider_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct RateBody {
    pub user_id: Option<Uuid>,
    pub provider_id: Option<Uuid>,
    pub stars: Option<u8>,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PushBody {
    pub phone: Option<String>,
    pub amount: Option<Decimal>,
    pub account_ref: Option<String>,
    pub desc: Option<String>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct OfferedProvider {
    pub provider_id: ProviderId,
}

#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    pub request_id: CaseId,
    pub offered: Vec<OfferedProvider>,
}

#[derive(Debug, Serialize)]
pub struct AcceptResponse {
    /// `accepted` for the winner, `already_assigned` for race losers.
    pub status: String,
    pub request_id: CaseId,
    /// The provider actually holding the case, for winners and losers alike.
    pub provider_id: Option<ProviderId>,
}

#[derive(Debug, Serialize)]
pub struct ProviderView {
    pub provider_id: ProviderId,
    pub user_id: Uuid,
    pub display_name: String,
    pub rating: Decimal,
}

impl From<Provider> for ProviderView {
    fn from(p: Provider) -> Self {
        Self {
            provider_id: p.id,
            user_id: p.user_id.0,
            display_name: p.display_name,
            rating: p.rating,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseView {
    pub request_id: CaseId,
    pub client_id: Uuid,
    pub case_type: String,
    pub status: CaseStatus,
    pub assigned_provider: Option<ProviderId>,
    pub created_at: DateTime<Utc>,
}

impl From<CaseRequest> for CaseView {
    fn from(c: CaseRequest) -> Self {
        Self {
            request_id: c.id,
            client_id: c.client_id.0,
            case_type: c.case_type,
            status: c.status,
            assigned_provider: c.assigned_provider,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusAck {
    pub updated: bool,
}

#[derive(Debug, Serialize)]
pub struct WalletView {
    pub user_id: Uuid,
    pub role: WalletRole,
    pub balance: Decimal,
}

impl From<Wallet> for WalletView {
    fn from(w: Wallet) -> Self {
        Self {
            user_id: w.user_id.0,
            role: w.role,
            balance: w.balance,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReceiptView {
    pub case_id: CaseId,
    pub gross: Decimal,
    pub commission: Decimal,
    pub payout: Decimal,
}

#[derive(Debug, Serialize)]
pub struct RateResponse {
    pub provider_id: ProviderId,
    /// The recomputed mean after this rating.
    pub rating: Decimal,
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}
