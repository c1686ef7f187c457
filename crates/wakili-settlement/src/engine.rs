//! The settlement engine — commission split with all-or-nothing posting.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use wakili_types::{CaseId, Result, SettlementConfig, TxId, UserId};
use wakili_registry::{CaseRegistry, LedgerStore, ProviderDirectory};

/// Proof of one settled case: the split and the ledger rows it produced.
#[derive(Debug, Clone)]
pub struct SettlementReceipt {
    pub case_id: CaseId,
    pub gross: Decimal,
    pub commission: Decimal,
    pub payout: Decimal,
    pub payout_tx: TxId,
    pub commission_tx: TxId,
    pub settled_at: DateTime<Utc>,
}

/// Drives the `ACCEPTED → COMPLETED` transition and the ledger split.
pub struct SettlementEngine {
    registry: Arc<CaseRegistry>,
    ledger: Arc<LedgerStore>,
    directory: Arc<ProviderDirectory>,
    config: SettlementConfig,
    /// Account whose wallet collects commissions.
    platform_user: UserId,
}

impl SettlementEngine {
    #[must_use]
    pub fn new(
        registry: Arc<CaseRegistry>,
        ledger: Arc<LedgerStore>,
        directory: Arc<ProviderDirectory>,
        config: SettlementConfig,
        platform_user: UserId,
    ) -> Self {
        Self {
            registry,
            ledger,
            directory,
            config,
            platform_user,
        }
    }

    /// The split for a gross amount: `(commission, payout)`. Commission is
    /// rounded to cents; payout is the remainder, so the two always sum
    /// back to the gross exactly.
    #[must_use]
    pub fn split(&self, gross: Decimal) -> (Decimal, Decimal) {
        let commission = (gross * self.config.commission_rate).round_dp(2);
        let payout = gross - commission;
        (commission, payout)
    }

    /// Settle a completed consultation: transition the case, credit both
    /// wallets, and append both ledger rows — or do none of it.
    ///
    /// The case transition commits first; if the ledger posting then fails
    /// for any reason, the transition is compensated back to ACCEPTED
    /// before the error is returned, so callers and concurrent readers
    /// never observe a completed-but-unpaid case.
    ///
    /// # Errors
    /// - `NonPositiveAmount` if `gross <= 0`
    /// - `ProviderNotRegistered` if `provider_user` has no profile
    /// - `CaseNotFound` / `WrongAssignee` / `InvalidCaseTransition` from
    ///   the registry precondition (case must be ACCEPTED by this provider)
    /// - `CaseAlreadySettled` on repeated completion — never double-credits
    /// - ledger errors, after the case has been reverted to ACCEPTED
    pub fn complete(
        &self,
        case_id: CaseId,
        gross: Decimal,
        provider_user: UserId,
    ) -> Result<SettlementReceipt> {
        if gross <= Decimal::ZERO {
            return Err(wakili_types::WakiliError::NonPositiveAmount { amount: gross });
        }
        let provider = self.directory.by_user(provider_user)?;

        // Precondition and transition in one atomic registry call.
        self.registry.complete_assigned(case_id, provider.id)?;

        let (commission, payout) = self.split(gross);
        match self.ledger.post_split(
            case_id,
            gross,
            commission,
            payout,
            self.platform_user,
            provider_user,
        ) {
            Ok((payout_tx, commission_tx)) => {
                tracing::info!(
                    case_id = %case_id,
                    %gross,
                    %commission,
                    %payout,
                    provider_id = %provider.id,
                    "case settled"
                );
                Ok(SettlementReceipt {
                    case_id,
                    gross,
                    commission,
                    payout,
                    payout_tx: payout_tx.id,
                    commission_tx: commission_tx.id,
                    settled_at: Utc::now(),
                })
            }
            Err(err) => {
                // Compensate: the completion logically never happened.
                self.registry.revert_completion(case_id);
                tracing::error!(case_id = %case_id, error = %err, "ledger split failed, completion reverted");
                Err(err)
            }
        }
    }
}
