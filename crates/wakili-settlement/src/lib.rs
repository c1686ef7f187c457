//! # wakili-settlement
//!
//! **Finality Plane**: turning a delivered consultation into money.
//!
//! [`SettlementEngine::complete`] runs the whole completion as one
//! all-or-nothing unit:
//!
//! 1. Conditionally move the case `ACCEPTED → COMPLETED`, verifying the
//!    completing provider is the assigned one
//! 2. Split the gross amount into commission (platform) and payout
//!    (provider); the two always sum back to the gross
//! 3. Post both wallet credits plus two SUCCESS transactions atomically in
//!    the ledger
//! 4. If the ledger posting fails, revert the case to ACCEPTED so no
//!    partial settlement is ever observable
//!
//! Double settlement is refused twice over: the case registry rejects a
//! second completion, and the ledger refuses a second split for the same
//! case even if called directly.

pub mod engine;

pub use engine::{SettlementEngine, SettlementReceipt};
