//! Error types for the Wakili dispatch core.
//!
//! All errors use the `WK_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Validation errors
//! - 2xx: Provider / presence errors
//! - 3xx: Case / dispatch errors
//! - 4xx: Wallet / ledger errors
//! - 5xx: Settlement errors
//! - 6xx: Gateway errors
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{CaseId, CaseStatus, ProviderId, UserId};

/// Central error enum for all Wakili operations.
#[derive(Debug, Error)]
pub enum WakiliError {
    // =================================================================
    // Validation Errors (1xx)
    // =================================================================
    /// A request failed field validation (missing fields, bad values, etc.).
    #[error("WK_ERR_100: Validation failed: {reason}")]
    Validation { reason: String },

    /// A rating was submitted outside the allowed 1..=5 range.
    #[error("WK_ERR_101: Rating out of range: {stars} (allowed 1..=5)")]
    RatingOutOfRange { stars: u8 },

    /// An amount was zero or negative where a positive amount is required.
    #[error("WK_ERR_102: Amount must be positive: {amount}")]
    NonPositiveAmount { amount: Decimal },

    // =================================================================
    // Provider / Presence Errors (2xx)
    // =================================================================
    /// The requested provider profile was not found.
    #[error("WK_ERR_200: Provider not found: {0}")]
    ProviderNotFound(ProviderId),

    /// No provider profile is registered for this user account.
    #[error("WK_ERR_201: No provider registered for user: {0}")]
    ProviderNotRegistered(UserId),

    /// A provider profile already exists for this user account.
    #[error("WK_ERR_202: Provider already registered for user: {0}")]
    ProviderAlreadyRegistered(UserId),

    // =================================================================
    // Case / Dispatch Errors (3xx)
    // =================================================================
    /// The requested case was not found in the registry.
    #[error("WK_ERR_300: Case not found: {0}")]
    CaseNotFound(CaseId),

    /// Another provider already won the acceptance race for this case.
    #[error("WK_ERR_301: Case already assigned: {0}")]
    CaseAlreadyAssigned(CaseId),

    /// The case lifecycle does not permit this transition.
    #[error("WK_ERR_302: Invalid case transition: {from} -> {to}")]
    InvalidCaseTransition { from: CaseStatus, to: CaseStatus },

    /// The case is assigned to a different provider than the caller.
    #[error("WK_ERR_303: Case {case_id} is not assigned to provider {provider_id}")]
    WrongAssignee {
        case_id: CaseId,
        provider_id: ProviderId,
    },

    // =================================================================
    // Wallet / Ledger Errors (4xx)
    // =================================================================
    /// No wallet exists for this user.
    #[error("WK_ERR_400: Wallet not found for user: {0}")]
    WalletNotFound(UserId),

    /// A ledger operation would produce a negative balance.
    #[error("WK_ERR_401: Balance underflow")]
    BalanceUnderflow,

    // =================================================================
    // Settlement Errors (5xx)
    // =================================================================
    /// Settlement of a case failed.
    #[error("WK_ERR_500: Settlement failed: {reason}")]
    SettlementFailed { reason: String },

    /// A case has already been settled (settle-once guard).
    #[error("WK_ERR_501: Case already settled: {0}")]
    CaseAlreadySettled(CaseId),

    /// The commission/payout split does not add back up to the gross amount.
    #[error(
        "WK_ERR_502: Split not conserved: commission {commission} + payout {payout} != gross {gross}"
    )]
    SplitNotConserved {
        commission: Decimal,
        payout: Decimal,
        gross: Decimal,
    },

    // =================================================================
    // Gateway Errors (6xx)
    // =================================================================
    /// The mobile-money gateway rejected the credential exchange.
    #[error("WK_ERR_600: Gateway auth failed: {reason}")]
    GatewayAuth { reason: String },

    /// A gateway request failed in transport or was refused.
    #[error("WK_ERR_601: Gateway request failed: {reason}")]
    GatewayRequest { reason: String },

    /// The gateway returned a body that does not match the expected shape.
    #[error("WK_ERR_602: Gateway response malformed: {reason}")]
    GatewayResponseMalformed { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("WK_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("WK_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid values, missing fields, etc.).
    #[error("WK_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error (disk, network).
    #[error("WK_ERR_903: I/O error: {0}")]
    Io(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, WakiliError>;

// Conversion from std::io::Error
impl From<std::io::Error> for WakiliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for WakiliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
