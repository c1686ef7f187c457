//! Wire types for the mobile-money gateway (Daraja-style STK push).
//!
//! Field names follow the gateway's own casing, so these structs
//! serialize/deserialize the wire shapes verbatim. Internal callers work
//! with [`PushRequest`] / [`PushOutcome`] and never see the raw payloads.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Internal request/outcome
// ---------------------------------------------------------------------------

/// Internal input for initiating a customer payment push.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushRequest {
    /// MSISDN in international format (e.g., "254712345678").
    pub phone: String,
    pub amount: Decimal,
    /// Internal reference carried through to reconciliation.
    pub account_reference: String,
    pub description: String,
}

/// Internal outcome of a push initiation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushOutcome {
    /// Whether the gateway accepted the request for processing.
    pub initiated: bool,
    /// Gateway correlation id; the async callback echoes this.
    pub checkout_request_id: Option<String>,
    pub merchant_request_id: Option<String>,
    pub response_description: Option<String>,
}

// ---------------------------------------------------------------------------
// OAuth token exchange
// ---------------------------------------------------------------------------

/// Response of the client-credentials token endpoint. The gateway returns
/// `expires_in` as a string of seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: String,
}

impl TokenResponse {
    /// Token lifetime in seconds; falls back to zero on a malformed value
    /// so a bad response is treated as already expired.
    #[must_use]
    pub fn expires_in_secs(&self) -> u64 {
        self.expires_in.parse().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// STK push request / response
// ---------------------------------------------------------------------------

/// Outbound push payload, gateway casing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StkPushPayload {
    #[serde(rename = "BusinessShortCode")]
    pub business_short_code: String,
    #[serde(rename = "Password")]
    pub password: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "TransactionType")]
    pub transaction_type: String,
    #[serde(rename = "Amount")]
    pub amount: Decimal,
    #[serde(rename = "PartyA")]
    pub party_a: String,
    #[serde(rename = "PartyB")]
    pub party_b: String,
    #[serde(rename = "PhoneNumber")]
    pub phone_number: String,
    #[serde(rename = "CallBackURL")]
    pub callback_url: String,
    #[serde(rename = "AccountReference")]
    pub account_reference: String,
    #[serde(rename = "TransactionDesc")]
    pub transaction_desc: String,
}

/// Synchronous push acknowledgement. Error responses use a different shape
/// entirely, so every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StkPushResponse {
    #[serde(rename = "MerchantRequestID")]
    pub merchant_request_id: Option<String>,
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: Option<String>,
    #[serde(rename = "ResponseCode")]
    pub response_code: Option<String>,
    #[serde(rename = "ResponseDescription")]
    pub response_description: Option<String>,
    #[serde(rename = "CustomerMessage")]
    pub customer_message: Option<String>,
}

impl StkPushResponse {
    /// The gateway signals acceptance with response code "0".
    #[must_use]
    pub fn accepted(&self) -> bool {
        self.response_code.as_deref() == Some("0")
    }
}

// ---------------------------------------------------------------------------
// Asynchronous result callback
// ---------------------------------------------------------------------------

/// Top-level callback envelope: `{"Body": {"stkCallback": {...}}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackEnvelope {
    #[serde(rename = "Body")]
    pub body: CallbackBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackBody {
    #[serde(rename = "stkCallback")]
    pub stk_callback: StkCallback,
}

/// The payment result. `result_code` 0 means the customer paid; metadata
/// is present only on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StkCallback {
    #[serde(rename = "MerchantRequestID")]
    pub merchant_request_id: String,
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,
    #[serde(rename = "ResultCode")]
    pub result_code: i64,
    #[serde(rename = "ResultDesc")]
    pub result_desc: String,
    #[serde(rename = "CallbackMetadata")]
    pub callback_metadata: Option<CallbackMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackMetadata {
    #[serde(rename = "Item")]
    pub item: Vec<MetadataItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataItem {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: Option<serde_json::Value>,
}

impl StkCallback {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result_code == 0
    }

    fn metadata_value(&self, name: &str) -> Option<&serde_json::Value> {
        self.callback_metadata
            .as_ref()?
            .item
            .iter()
            .find(|i| i.name == name)?
            .value
            .as_ref()
    }

    /// Paid amount from the metadata, if present. The gateway sends a JSON
    /// number; integers are taken exactly, floats through lossy conversion.
    #[must_use]
    pub fn amount(&self) -> Option<Decimal> {
        let value = self.metadata_value("Amount")?;
        if let Some(n) = value.as_u64() {
            return Some(Decimal::from(n));
        }
        value.as_f64().and_then(|f| Decimal::try_from(f).ok())
    }

    /// Gateway receipt number, if present.
    #[must_use]
    pub fn receipt_number(&self) -> Option<String> {
        self.metadata_value("MpesaReceiptNumber")
            .and_then(|v| v.as_str().map(String::from))
    }
}
