//! # wakili-types
//!
//! Shared types, errors, and configuration for the **Wakili** dispatch and
//! settlement core.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`CaseId`], [`UserId`], [`ProviderId`], [`WalletId`], [`TxId`]
//! - **Case model**: [`CaseRequest`], [`CaseStatus`], [`NewCase`], [`GeoPoint`]
//! - **Provider model**: [`Provider`]
//! - **Offer model**: [`Offer`] (ephemeral, never persisted)
//! - **Ledger model**: [`Wallet`], [`WalletRole`], [`Transaction`], [`TxKind`], [`TxStatus`]
//! - **Rating model**: [`Rating`]
//! - **Gateway wire types**: [`PushRequest`], [`PushOutcome`], [`StkCallback`], ...
//! - **Configuration**: [`WakiliConfig`] and its sections
//! - **Errors**: [`WakiliError`] with `WK_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod case;
pub mod config;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod ids;
pub mod offer;
pub mod provider;
pub mod rating;
pub mod wallet;

// Re-export all primary types at crate root for ergonomic imports:
//   use wakili_types::{CaseRequest, CaseStatus, Provider, Wallet, ...};

pub use case::*;
pub use config::*;
pub use error::*;
pub use gateway::*;
pub use ids::*;
pub use offer::*;
pub use provider::*;
pub use rating::*;
pub use wallet::*;

// Constants are accessed via `wakili_types::constants::FOO`
// (not re-exported to avoid name collisions).
