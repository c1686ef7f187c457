//! Wallet and ledger transaction types.
//!
//! Balances are ledger-derived: every balance change is paired with an
//! appended `Transaction`, and both happen under the ledger store's single
//! writer lock. A wallet balance is never negative.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CaseId, TxId, UserId, WalletId};

/// What the wallet belongs to. The platform wallet collects commissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletRole {
    Platform,
    Provider,
    Client,
}

impl std::fmt::Display for WalletRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Platform => write!(f, "PLATFORM"),
            Self::Provider => write!(f, "PROVIDER"),
            Self::Client => write!(f, "CLIENT"),
        }
    }
}

/// A single wallet in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub user_id: UserId,
    pub role: WalletRole,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Wallet {
    /// Create an empty wallet for a user.
    #[must_use]
    pub fn new(user_id: UserId, role: WalletRole) -> Self {
        Self {
            id: WalletId::new(),
            user_id,
            role,
            balance: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }
}

/// The kind of a ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    /// Provider's share of a settled case.
    Payout,
    /// Platform's share of a settled case.
    Commission,
    /// External money entering a wallet via the gateway.
    Deposit,
}

impl std::fmt::Display for TxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Payout => write!(f, "PAYOUT"),
            Self::Commission => write!(f, "COMMISSION"),
            Self::Deposit => write!(f, "DEPOSIT"),
        }
    }
}

/// Outcome state of a ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    Pending,
    Success,
    Failed,
}

impl std::fmt::Display for TxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Success => write!(f, "SUCCESS"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// One append-only ledger entry.
///
/// `from_wallet` is `None` for money entering the system from outside
/// (deposits credited off a gateway callback).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TxId,
    pub from_wallet: Option<WalletId>,
    pub to_wallet: WalletId,
    pub amount: Decimal,
    pub kind: TxKind,
    pub status: TxStatus,
    /// The settled case, for payout/commission legs. `None` for deposits.
    pub case_id: Option<CaseId>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    #[must_use]
    pub fn new(
        from_wallet: Option<WalletId>,
        to_wallet: WalletId,
        amount: Decimal,
        kind: TxKind,
        status: TxStatus,
        case_id: Option<CaseId>,
    ) -> Self {
        Self {
            id: TxId::new(),
            from_wallet,
            to_wallet,
            amount,
            kind,
            status,
            case_id,
            created_at: Utc::now(),
        }
    }

    /// Whether this entry moved money (only SUCCESS entries do).
    #[must_use]
    pub fn is_effective(&self) -> bool {
        self.status == TxStatus::Success
    }
}
