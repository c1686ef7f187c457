//! # wakili-api
//!
//! The service surface of the Wakili core: an axum REST API plus a
//! WebSocket channel per connected client/provider.
//!
//! - [`state::AppState`] wires the storage, match, finality, and gateway
//!   planes together
//! - [`routes::create_router`] maps the HTTP endpoints onto them
//! - [`ws::ChannelHub`] is the concrete [`wakili_dispatch::Notifier`]:
//!   targeted, fire-and-forget pushes to identified sockets
//! - the `wakilid` binary loads config from env, seeds the platform
//!   wallet, and runs the server (plus the optional stale-search sweeper)

pub mod dto;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;
pub mod ws;

pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use server::{create_server, run_server};
pub use state::{build_state, AppState};
pub use ws::ChannelHub;
