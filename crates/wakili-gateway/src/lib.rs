//! # wakili-gateway
//!
//! The external collaborator: a client for the mobile-money gateway that
//! funds client wallets (Daraja-style STK push).
//!
//! - [`GatewayClient`] exchanges consumer credentials for a cached bearer
//!   token and submits payment push requests
//! - [`PendingPushes`] remembers which account reference each in-flight
//!   push was for, so the asynchronous result callback can be credited to
//!   the right wallet
//! - [`parse_callback`] tolerantly decodes inbound callback bodies; a body
//!   that does not match the wire shape yields `None` and is only audited
//!
//! Inbound callbacks are **not** authenticated in this design; the audit
//! log is the compensating control.

pub mod client;
pub mod pending;

pub use client::{parse_callback, GatewayClient};
pub use pending::PendingPushes;
