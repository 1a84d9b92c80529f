use std::sync::Arc;

use clap::Parser;
use snip_core::Shortener;
use snip_gateway::cli::{StorageBackendArg, CLI};
use snip_gateway::{telemetry, App, AppState};
use snip_shortener::LinkStore;
use snip_storage::{InMemoryBackend, RedisBackend};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::try_parse()?;
    telemetry::init(config.log_format)?;

    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        public_base_url = %config.public_base_url,
        "starting gateway server"
    );

    let shortener: Arc<dyn Shortener> = match config.storage {
        StorageBackendArg::Redis => {
            let url = config.redis_url()?;
            info!(redis_addr = %config.redis_addr, redis_db = config.redis_db, "connecting to Redis");
            Arc::new(LinkStore::new(RedisBackend::connect(url.as_str()).await?))
        }
        StorageBackendArg::InMemory => {
            warn!("in-memory storage selected, short links are lost on restart");
            Arc::new(LinkStore::new(InMemoryBackend::new()))
        }
    };

    let state = AppState::new(shortener, config.public_base_url);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
