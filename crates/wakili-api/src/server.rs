//! Server assembly: router, middleware layers, listener.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::routes::create_router;
use crate::state::AppState;

/// Build the router with middleware and resolve the bind address.
///
/// # Errors
/// Returns an error if the configured bind address does not parse.
pub fn create_server(state: AppState) -> Result<(Router, SocketAddr), std::net::AddrParseError> {
    let service = &state.config.service;
    let addr: SocketAddr = service.bind_addr().parse()?;
    let enable_cors = service.enable_cors;

    let mut router = create_router(state).layer(TraceLayer::new_for_http());
    if enable_cors {
        // Open CORS, matching the service's public-API posture.
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }
    Ok((router, addr))
}

/// Bind and serve until the process exits.
///
/// # Errors
/// Returns bind/IO errors from the listener or the server loop.
pub async fn run_server(state: AppState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (router, addr) = create_server(state)?;
    tracing::info!(%addr, "wakili api listening");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
