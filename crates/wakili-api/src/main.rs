//! `wakilid` — the Wakili service binary.
//!
//! Configuration is defaults plus `WAKILI_*` environment overrides. The
//! optional stale-search sweeper cancels SEARCHING cases older than the
//! configured TTL; a TTL of zero disables it.

use std::time::Duration;

use tracing_subscriber::EnvFilter;
use wakili_api::{build_state, run_server};
use wakili_types::WakiliConfig;

fn env_override<T: std::str::FromStr>(key: &str, target: &mut T) {
    if let Ok(raw) = std::env::var(key) {
        match raw.parse() {
            Ok(value) => *target = value,
            Err(_) => tracing::warn!(key, raw, "ignoring unparseable env override"),
        }
    }
}

fn load_config() -> WakiliConfig {
    let mut config = WakiliConfig::default();

    env_override("WAKILI_HOST", &mut config.service.host);
    env_override("WAKILI_PORT", &mut config.service.port);
    env_override("WAKILI_TOP_K", &mut config.dispatch.top_k);
    env_override("WAKILI_SEARCH_TTL_SECS", &mut config.dispatch.search_ttl_secs);
    env_override("WAKILI_COMMISSION_RATE", &mut config.settlement.commission_rate);
    env_override("WAKILI_GATEWAY_BASE_URL", &mut config.gateway.base_url);
    env_override("WAKILI_GATEWAY_CONSUMER_KEY", &mut config.gateway.consumer_key);
    env_override(
        "WAKILI_GATEWAY_CONSUMER_SECRET",
        &mut config.gateway.consumer_secret,
    );
    env_override("WAKILI_GATEWAY_SHORTCODE", &mut config.gateway.shortcode);
    env_override("WAKILI_GATEWAY_PASSKEY", &mut config.gateway.passkey);
    env_override("WAKILI_GATEWAY_CALLBACK_URL", &mut config.gateway.callback_url);

    config
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_config();
    let state = build_state(config)?;

    let ttl = state.config.dispatch.search_ttl_secs;
    if ttl > 0 {
        let cases = std::sync::Arc::clone(&state.cases);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(60));
            loop {
                ticker.tick().await;
                cases.sweep_stale(ttl);
            }
        });
        tracing::info!(ttl_secs = ttl, "stale-search sweeper running");
    }

    run_server(state).await
}
