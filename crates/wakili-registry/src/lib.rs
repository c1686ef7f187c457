//! # wakili-registry
//!
//! **Storage Plane**: the durable state of the Wakili core, kept behind
//! concurrent stores with atomic per-key update.
//!
//! ## Stores
//!
//! - [`ProviderDirectory`] — registered provider profiles, indexed by
//!   provider id and by owning user id
//! - [`CaseRegistry`] — consultation cases; owns the single atomic
//!   `SEARCHING → ACCEPTED` conditional update that arbitrates the accept race
//! - [`LedgerStore`] — wallets plus the append-only transaction log; the
//!   settlement split posts as one all-or-nothing unit under a single lock
//! - [`RatingLog`] — insert-only rating rows; the displayed provider rating
//!   is always the mean over the full log
//! - [`AuditLog`] — raw gateway callback bodies, digest-stamped, kept for
//!   reconciliation regardless of payload shape

pub mod audit;
pub mod cases;
pub mod ledger;
pub mod providers;
pub mod ratings;

pub use audit::{AuditEntry, AuditLog};
pub use cases::CaseRegistry;
pub use ledger::LedgerStore;
pub use providers::ProviderDirectory;
pub use ratings::RatingLog;
