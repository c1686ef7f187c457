//! Wallet ledger — balances derived from an append-only transaction log.
//!
//! All state lives behind one `parking_lot::Mutex`, so every multi-wallet
//! mutation (the settlement split touches the platform wallet and a provider
//! wallet plus two log rows) commits as a unit or not at all. Concurrent
//! settlements that share the platform wallet serialize here; there is no
//! read-then-separate-write window anywhere in the ledger.
//!
//! A bounded settle-once set refuses a second split posting for the same
//! case even if the case registry's state check is bypassed.

use std::collections::{HashMap, HashSet, VecDeque};

use parking_lot::Mutex;
use rust_decimal::Decimal;
use wakili_types::{
    constants, CaseId, Result, Transaction, TxKind, TxStatus, UserId, WakiliError, Wallet,
    WalletRole,
};

/// Prevents double-settlement of the same case at the money layer.
///
/// Bounded set of settled `CaseId`s with oldest-first eviction, so memory
/// stays predictable in long-running processes.
struct SettleOnce {
    settled: HashSet<CaseId>,
    /// Insertion order for eviction (front = oldest).
    order: VecDeque<CaseId>,
    max_size: usize,
}

impl SettleOnce {
    fn new(max_size: usize) -> Self {
        assert!(max_size > 0, "SettleOnce max_size must be > 0");
        Self {
            settled: HashSet::new(),
            order: VecDeque::new(),
            max_size,
        }
    }

    fn is_settled(&self, case_id: CaseId) -> bool {
        self.settled.contains(&case_id)
    }

    fn mark(&mut self, case_id: CaseId) {
        if self.settled.len() >= self.max_size {
            if let Some(oldest) = self.order.pop_front() {
                self.settled.remove(&oldest);
            }
        }
        self.settled.insert(case_id);
        self.order.push_back(case_id);
    }
}

/// Everything the ledger owns, guarded by one lock.
struct LedgerInner {
    /// One wallet per user account.
    wallets: HashMap<UserId, Wallet>,
    /// Append-only transaction log.
    log: Vec<Transaction>,
    settled: SettleOnce,
}

/// The durable money store: wallets plus the transaction log.
pub struct LedgerStore {
    inner: Mutex<LedgerInner>,
}

impl LedgerStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(LedgerInner {
                wallets: HashMap::new(),
                log: Vec::new(),
                settled: SettleOnce::new(constants::SETTLED_CASE_CACHE_SIZE),
            }),
        }
    }

    /// Open a wallet for a user, or return the existing one. Idempotent; an
    /// existing wallet keeps its original role.
    pub fn open_wallet(&self, user_id: UserId, role: WalletRole) -> Wallet {
        let mut inner = self.inner.lock();
        inner
            .wallets
            .entry(user_id)
            .or_insert_with(|| Wallet::new(user_id, role))
            .clone()
    }

    /// Look up a user's wallet.
    ///
    /// # Errors
    /// Returns `WalletNotFound` if the user has no wallet.
    pub fn wallet_of(&self, user_id: UserId) -> Result<Wallet> {
        self.inner
            .lock()
            .wallets
            .get(&user_id)
            .cloned()
            .ok_or(WakiliError::WalletNotFound(user_id))
    }

    /// All log entries touching a user's wallet, oldest first.
    ///
    /// # Errors
    /// Returns `WalletNotFound` if the user has no wallet.
    pub fn transactions_of(&self, user_id: UserId) -> Result<Vec<Transaction>> {
        let inner = self.inner.lock();
        let wallet_id = inner
            .wallets
            .get(&user_id)
            .map(|w| w.id)
            .ok_or(WakiliError::WalletNotFound(user_id))?;
        Ok(inner
            .log
            .iter()
            .filter(|tx| tx.to_wallet == wallet_id || tx.from_wallet == Some(wallet_id))
            .cloned()
            .collect())
    }

    /// Post the settlement split for one case: credit the platform wallet
    /// by `commission` and the provider's wallet by `payout`, appending one
    /// SUCCESS transaction per leg. All of it commits under the ledger lock
    /// or none of it does.
    ///
    /// # Errors
    /// - `SplitNotConserved` if `commission + payout != gross`
    /// - `NonPositiveAmount` if the gross amount is not positive
    /// - `CaseAlreadySettled` if a split for this case was already posted
    /// - `WalletNotFound` if either wallet does not exist (checked before
    ///   any mutation)
    pub fn post_split(
        &self,
        case_id: CaseId,
        gross: Decimal,
        commission: Decimal,
        payout: Decimal,
        platform_user: UserId,
        provider_user: UserId,
    ) -> Result<(Transaction, Transaction)> {
        if gross <= Decimal::ZERO {
            return Err(WakiliError::NonPositiveAmount { amount: gross });
        }
        if commission + payout != gross || commission < Decimal::ZERO || payout < Decimal::ZERO {
            return Err(WakiliError::SplitNotConserved {
                commission,
                payout,
                gross,
            });
        }

        let mut inner = self.inner.lock();
        if inner.settled.is_settled(case_id) {
            return Err(WakiliError::CaseAlreadySettled(case_id));
        }
        // Resolve both wallets before touching anything, so a missing
        // wallet leaves the ledger exactly as it was.
        let platform_wallet = inner
            .wallets
            .get(&platform_user)
            .map(|w| w.id)
            .ok_or(WakiliError::WalletNotFound(platform_user))?;
        let provider_wallet = inner
            .wallets
            .get(&provider_user)
            .map(|w| w.id)
            .ok_or(WakiliError::WalletNotFound(provider_user))?;

        inner.settled.mark(case_id);
        if let Some(w) = inner.wallets.get_mut(&platform_user) {
            w.balance += commission;
        }
        if let Some(w) = inner.wallets.get_mut(&provider_user) {
            w.balance += payout;
        }

        let commission_tx = Transaction::new(
            None,
            platform_wallet,
            commission,
            TxKind::Commission,
            TxStatus::Success,
            Some(case_id),
        );
        let payout_tx = Transaction::new(
            None,
            provider_wallet,
            payout,
            TxKind::Payout,
            TxStatus::Success,
            Some(case_id),
        );
        inner.log.push(commission_tx.clone());
        inner.log.push(payout_tx.clone());

        tracing::info!(
            case_id = %case_id,
            %gross,
            %commission,
            %payout,
            "settlement split posted"
        );
        Ok((payout_tx, commission_tx))
    }

    /// Credit a deposit from the gateway into a user's wallet, opening a
    /// client wallet on first deposit. Appends one SUCCESS deposit row.
    ///
    /// # Errors
    /// Returns `NonPositiveAmount` for zero or negative amounts.
    pub fn post_deposit(&self, user_id: UserId, amount: Decimal) -> Result<Transaction> {
        if amount <= Decimal::ZERO {
            return Err(WakiliError::NonPositiveAmount { amount });
        }
        let mut inner = self.inner.lock();
        let wallet = inner
            .wallets
            .entry(user_id)
            .or_insert_with(|| Wallet::new(user_id, WalletRole::Client));
        wallet.balance += amount;
        let wallet_id = wallet.id;

        let tx = Transaction::new(None, wallet_id, amount, TxKind::Deposit, TxStatus::Success, None);
        inner.log.push(tx.clone());
        tracing::info!(user_id = %user_id, %amount, "deposit credited");
        Ok(tx)
    }

    /// Whether a split has been posted for this case.
    #[must_use]
    pub fn is_settled(&self, case_id: CaseId) -> bool {
        self.inner.lock().settled.is_settled(case_id)
    }

    /// Number of log entries.
    #[must_use]
    pub fn log_len(&self) -> usize {
        self.inner.lock().log.len()
    }
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self::new()
    }
}
