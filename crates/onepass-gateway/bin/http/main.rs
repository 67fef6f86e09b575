mod cli;

use crate::cli::{CatalogBackendArg, StoreBackendArg, CLI};
use anyhow::Context;
use clap::Parser;
use onepass_catalog::{InMemoryCatalog, MySqlCatalog};
use onepass_core::{ResourceCatalog, TokenStore};
use onepass_gateway::{telemetry, App, AppState};
use onepass_link::{LinkService, LinkSettings};
use onepass_store::{MokaTokenStore, RedisTokenStore, TimeoutStore};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    telemetry::init(config.log_format)?;

    info!(
        listen_addr = %config.listen_addr,
        store_backend = %config.store,
        catalog_backend = %config.catalog,
        link_ttl_secs = config.link_ttl_secs,
        "starting onepass gateway"
    );

    let catalog: Arc<dyn ResourceCatalog> = match config.catalog {
        CatalogBackendArg::InMemory => {
            info!(seeded = config.seed_resource.len(), "using in-memory catalog");
            Arc::new(InMemoryCatalog::with_resources(config.seed_resource.clone()))
        }
        CatalogBackendArg::Mysql => {
            if !config.seed_resource.is_empty() {
                warn!("--seed-resource only applies to the in-memory catalog; ignoring");
            }
            let mysql_dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when catalog backend is mysql")?;
            Arc::new(
                MySqlCatalog::connect(mysql_dsn)
                    .await
                    .context("failed to connect to MySQL")?,
            )
        }
    };

    let settings = LinkSettings::builder()
        .ttl(Duration::from_secs(config.link_ttl_secs))
        .public_base_url(config.public_base_url.clone())
        .build();
    let store_timeout = Duration::from_millis(config.store_timeout_ms);

    match config.store {
        StoreBackendArg::InMemory => {
            let store = MokaTokenStore::with_capacity(config.store_capacity);
            run_server(
                config.listen_addr,
                TimeoutStore::new(store, store_timeout),
                catalog,
                settings,
            )
            .await
        }
        StoreBackendArg::Redis => {
            let redis_url = config
                .redis_url
                .as_deref()
                .context("redis url is required when store backend is redis")?;
            let client = redis::Client::open(redis_url).context("invalid redis url")?;
            let conn = client
                .get_multiplexed_async_connection()
                .await
                .context("failed to connect to Redis")?;
            let store = RedisTokenStore::with_prefix(conn, config.redis_key_prefix.clone())
                .with_strategy(config.redis_fetch.into());
            run_server(
                config.listen_addr,
                TimeoutStore::new(store, store_timeout),
                catalog,
                settings,
            )
            .await
        }
    }
}

async fn run_server<S: TokenStore>(
    listen_addr: SocketAddr,
    store: S,
    catalog: Arc<dyn ResourceCatalog>,
    settings: LinkSettings,
) -> anyhow::Result<()> {
    let links = LinkService::new(store, Arc::clone(&catalog), settings);
    let app = App::router(AppState::new(Arc::new(links), catalog));

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
