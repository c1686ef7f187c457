//! Configuration types for the Wakili service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants;

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,
    /// Port for the REST/WS API.
    pub port: u16,
    /// Whether to attach the permissive CORS layer.
    pub enable_cors: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: constants::DEFAULT_API_PORT,
            enable_cors: true,
        }
    }
}

impl ServiceConfig {
    /// Bind address in `host:port` form.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Advisory fee for one case-type tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseFee {
    pub case_type: String,
    pub fee: Decimal,
}

/// Dispatch and presence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// How many ranked providers receive each case offer.
    pub top_k: usize,
    /// Seconds before a still-searching case is swept to CANCELLED.
    /// Zero disables the sweeper.
    pub search_ttl_secs: u64,
    /// Fee used when a case type has no table entry.
    pub default_fee: Decimal,
    /// Per-case-type fee table. Tags match case-insensitively.
    pub case_fees: Vec<CaseFee>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            top_k: constants::DEFAULT_TOP_K,
            search_ttl_secs: constants::DEFAULT_SEARCH_TTL_SECS,
            default_fee: Decimal::new(1000, 0),
            case_fees: vec![
                CaseFee {
                    case_type: "family".to_string(),
                    fee: Decimal::new(1500, 0),
                },
                CaseFee {
                    case_type: "land".to_string(),
                    fee: Decimal::new(2500, 0),
                },
                CaseFee {
                    case_type: "business".to_string(),
                    fee: Decimal::new(2000, 0),
                },
                CaseFee {
                    case_type: "criminal".to_string(),
                    fee: Decimal::new(3000, 0),
                },
            ],
        }
    }
}

impl DispatchConfig {
    /// Advisory fee for a case type, falling back to the default fee.
    #[must_use]
    pub fn fee_for(&self, case_type: &str) -> Decimal {
        self.case_fees
            .iter()
            .find(|f| f.case_type.eq_ignore_ascii_case(case_type))
            .map_or(self.default_fee, |f| f.fee)
    }
}

/// Settlement configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementConfig {
    /// Platform's share of each settled case, as a fraction (0.20 = 20%).
    pub commission_rate: Decimal,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            commission_rate: Decimal::new(20, 2),
        }
    }
}

impl SettlementConfig {
    /// Reject rates outside [0, 1].
    ///
    /// # Errors
    /// Returns a configuration error for out-of-range rates.
    pub fn validate(&self) -> crate::Result<()> {
        if self.commission_rate < Decimal::ZERO || self.commission_rate > Decimal::ONE {
            return Err(crate::WakiliError::Configuration(format!(
                "commission_rate must be within [0, 1], got {}",
                self.commission_rate
            )));
        }
        Ok(())
    }
}

/// Mobile-money gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway API base, no trailing slash.
    pub base_url: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    /// Paybill / till shortcode.
    pub shortcode: String,
    /// Passkey used in the timestamped push password.
    pub passkey: String,
    /// Publicly reachable URL the gateway posts payment results to.
    pub callback_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://sandbox.safaricom.co.ke".to_string(),
            consumer_key: String::new(),
            consumer_secret: String::new(),
            shortcode: "174379".to_string(),
            passkey: String::new(),
            callback_url: String::new(),
            timeout_secs: constants::DEFAULT_GATEWAY_TIMEOUT_SECS,
        }
    }
}

impl GatewayConfig {
    /// Whether credentials are present; pushes are refused until they are.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.consumer_key.is_empty() && !self.consumer_secret.is_empty()
    }
}

/// Top-level configuration for one Wakili instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WakiliConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub settlement: SettlementConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_bind_addr() {
        let cfg = ServiceConfig::default();
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn fee_table_lookup() {
        let cfg = DispatchConfig::default();
        assert_eq!(cfg.fee_for("land"), Decimal::new(2500, 0));
        assert_eq!(cfg.fee_for("LAND"), Decimal::new(2500, 0));
        assert_eq!(cfg.fee_for("maritime"), cfg.default_fee);
    }

    #[test]
    fn default_commission_is_twenty_percent() {
        let cfg = SettlementConfig::default();
        assert_eq!(cfg.commission_rate, Decimal::new(20, 2));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn commission_rate_bounds() {
        let cfg = SettlementConfig {
            commission_rate: Decimal::new(15, 1),
        };
        assert!(cfg.validate().is_err(), "1.5 must be rejected");

        let cfg = SettlementConfig {
            commission_rate: Decimal::new(-1, 2),
        };
        assert!(cfg.validate().is_err(), "negative must be rejected");
    }

    #[test]
    fn gateway_unconfigured_by_default() {
        let cfg = GatewayConfig::default();
        assert!(!cfg.is_configured());
    }

    #[test]
    fn config_serde_roundtrip() {
        let cfg = WakiliConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: WakiliConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.service.port, back.service.port);
        assert_eq!(cfg.settlement.commission_rate, back.settlement.commission_rate);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let back: WakiliConfig = serde_json::from_str(r#"{"service": {"host": "127.0.0.1", "port": 9000, "enable_cors": false}}"#).unwrap();
        assert_eq!(back.service.port, 9000);
        assert_eq!(back.dispatch.top_k, constants::DEFAULT_TOP_K);
    }
}
