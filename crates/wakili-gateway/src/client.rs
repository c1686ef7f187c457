//! The gateway HTTP client: token exchange and payment push.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use wakili_types::{
    constants, CallbackEnvelope, GatewayConfig, PushOutcome, PushRequest, Result, StkCallback,
    StkPushPayload, StkPushResponse, TokenResponse, WakiliError,
};

/// Refresh the cached token this long before it actually expires.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Client for the mobile-money gateway.
///
/// Holds one `reqwest::Client` (connection pooling) and a cached bearer
/// token that is re-exchanged only when near expiry. Auth and transport
/// failures surface as single gateway errors; there is no automatic retry
/// of a payment push.
pub struct GatewayClient {
    config: GatewayConfig,
    http: reqwest::Client,
    token: Mutex<Option<CachedToken>>,
}

impl GatewayClient {
    /// # Errors
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WakiliError::Configuration(format!("gateway http client: {e}")))?;
        Ok(Self {
            config,
            http,
            token: Mutex::new(None),
        })
    }

    /// The timestamped push password: `base64(shortcode + passkey + timestamp)`.
    #[must_use]
    pub fn push_password(shortcode: &str, passkey: &str, timestamp: &str) -> String {
        BASE64.encode(format!("{shortcode}{passkey}{timestamp}"))
    }

    /// A valid bearer token, from cache or a fresh credential exchange.
    async fn bearer_token(&self) -> Result<String> {
        if let Some(cached) = self.token.lock().clone() {
            if cached.expires_at > Utc::now() {
                return Ok(cached.value);
            }
        }

        let url = format!(
            "{}/oauth/v1/generate?grant_type=client_credentials",
            self.config.base_url
        );
        let response = self
            .http
            .get(&url)
            .basic_auth(&self.config.consumer_key, Some(&self.config.consumer_secret))
            .send()
            .await
            .map_err(|e| WakiliError::GatewayRequest {
                reason: format!("token exchange: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(WakiliError::GatewayAuth {
                reason: format!("token endpoint returned {}", response.status()),
            });
        }

        let token: TokenResponse =
            response
                .json()
                .await
                .map_err(|e| WakiliError::GatewayResponseMalformed {
                    reason: format!("token body: {e}"),
                })?;

        let ttl = i64::try_from(token.expires_in_secs()).unwrap_or(0);
        let expires_at = Utc::now() + Duration::seconds((ttl - TOKEN_EXPIRY_MARGIN_SECS).max(0));
        *self.token.lock() = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at,
        });
        tracing::debug!(ttl_secs = ttl, "gateway token refreshed");
        Ok(token.access_token)
    }

    /// Submit a customer payment push. Returns what the gateway accepted
    /// synchronously; the actual payment result arrives later on the
    /// callback URL.
    ///
    /// # Errors
    /// - `GatewayAuth` if credentials are missing or rejected
    /// - `GatewayRequest` on transport failure
    /// - `GatewayResponseMalformed` if the response body cannot be decoded
    pub async fn request_push(&self, request: &PushRequest) -> Result<PushOutcome> {
        if !self.config.is_configured() {
            return Err(WakiliError::GatewayAuth {
                reason: "gateway credentials not configured".to_string(),
            });
        }

        let token = self.bearer_token().await?;
        let timestamp = Utc::now()
            .format(constants::GATEWAY_TIMESTAMP_FORMAT)
            .to_string();
        let payload = StkPushPayload {
            business_short_code: self.config.shortcode.clone(),
            password: Self::push_password(&self.config.shortcode, &self.config.passkey, &timestamp),
            timestamp,
            transaction_type: constants::GATEWAY_TRANSACTION_TYPE.to_string(),
            amount: request.amount,
            party_a: request.phone.clone(),
            party_b: self.config.shortcode.clone(),
            phone_number: request.phone.clone(),
            callback_url: self.config.callback_url.clone(),
            account_reference: request.account_reference.clone(),
            transaction_desc: request.description.clone(),
        };

        let url = format!("{}/mpesa/stkpush/v1/processrequest", self.config.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| WakiliError::GatewayRequest {
                reason: format!("push request: {e}"),
            })?;

        let body: StkPushResponse =
            response
                .json()
                .await
                .map_err(|e| WakiliError::GatewayResponseMalformed {
                    reason: format!("push response: {e}"),
                })?;

        let outcome = PushOutcome {
            initiated: body.accepted(),
            checkout_request_id: body.checkout_request_id,
            merchant_request_id: body.merchant_request_id,
            response_description: body.response_description,
        };
        tracing::info!(
            initiated = outcome.initiated,
            checkout_request_id = outcome.checkout_request_id.as_deref().unwrap_or("-"),
            "payment push submitted"
        );
        Ok(outcome)
    }
}

/// Tolerantly decode a raw callback body. Anything that does not match the
/// wire envelope yields `None`; the caller has already audited the raw
/// body, so nothing is lost.
#[must_use]
pub fn parse_callback(raw: &str) -> Option<StkCallback> {
    serde_json::from_str::<CallbackEnvelope>(raw)
        .ok()
        .map(|envelope| envelope.body.stk_callback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_matches_gateway_derivation() {
        // base64("174379" + "key" + "20240101120000")
        let password = GatewayClient::push_password("174379", "key", "20240101120000");
        assert_eq!(
            password,
            BASE64.encode("174379key20240101120000"),
        );
        let decoded = BASE64.decode(password).unwrap();
        assert_eq!(decoded, b"174379key20240101120000");
    }

    #[tokio::test]
    async fn unconfigured_client_refuses_push() {
        let client = GatewayClient::new(GatewayConfig::default()).unwrap();
        let request = PushRequest {
            phone: "254712345678".to_string(),
            amount: rust_decimal::Decimal::new(100, 0),
            account_reference: "ref".to_string(),
            description: "consultation".to_string(),
        };
        let err = client.request_push(&request).await.unwrap_err();
        assert!(matches!(err, WakiliError::GatewayAuth { .. }));
    }

    #[test]
    fn parse_callback_tolerates_garbage() {
        assert!(parse_callback("not json").is_none());
        assert!(parse_callback(r#"{"unexpected": true}"#).is_none());
    }

    #[test]
    fn parse_callback_decodes_success() {
        let raw = r#"{
            "Body": {
                "stkCallback": {
                    "MerchantRequestID": "29115-34620561-1",
                    "CheckoutRequestID": "ws_CO_191220191020363925",
                    "ResultCode": 0,
                    "ResultDesc": "Processed",
                    "CallbackMetadata": {
                        "Item": [{"Name": "Amount", "Value": 750}]
                    }
                }
            }
        }"#;
        let callback = parse_callback(raw).unwrap();
        assert!(callback.is_success());
        assert_eq!(callback.amount(), Some(rust_decimal::Decimal::from(750u64)));
    }
}
