use crate::booter::Booter;
use crate::config::RelayConfig;
use crate::server::router::build_router;
use crate::server::types::AppState;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub mod booter;
pub mod config;
pub mod core;
pub mod server;
pub mod utils;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = RelayConfig::from_env()?;
    let state = Arc::new(AppState::new(&config)?);
    let router = build_router(state);

    let booter = Booter::new(config.port).await?;
    tracing::info!(
        addr = %booter.addr,
        downstream = %config.downstream_base_url,
        timeout = ?config.downstream_timeout,
        "analyze relay listening"
    );

    booter.start(router).await
}
