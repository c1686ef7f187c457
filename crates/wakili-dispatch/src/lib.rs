//! # wakili-dispatch
//!
//! **Match Plane**: who is reachable, who gets offered a case, and who wins
//! the accept race.
//!
//! ## Flow
//!
//! 1. [`PresenceTracker`] keeps the volatile reachability map, injected with
//!    the provider directory so rankings always use current ratings
//! 2. [`MatchingEngine::dispatch`] persists the case first, then pushes one
//!    targeted offer per ranked reachable candidate through a [`Notifier`]
//! 3. [`AcceptanceArbiter::accept`] forwards to the case registry's atomic
//!    conditional update; exactly one concurrent accept wins
//!
//! Notification delivery is fire-and-forget, at-most-once. Nothing in this
//! crate waits for a remote acknowledgment.

pub mod arbiter;
pub mod matching;
pub mod notifier;
pub mod presence;

pub use arbiter::{AcceptOutcome, AcceptanceArbiter};
pub use matching::{DispatchOutcome, MatchingEngine};
pub use notifier::{Notifier, NullNotifier};
pub use presence::PresenceTracker;
