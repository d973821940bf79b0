use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use melodeck_api::{
    config::Config,
    db::{create_redis_client, Cache, Store},
    routes::{create_router, AppState},
    services::{ExternalCatalog, HttpMailer, LogMailer, Mailer, MusicGatewayProvider, PasswordHashing},
};

const DEFAULT_LOG_FILTER: &str = "melodeck_api=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .try_init()
        .context("Failed to initialize logging")?;

    let config = Config::from_env()?;

    let store = Store::connect(&config.database_url, PasswordHashing::new())
        .await
        .with_context(|| format!("Failed to open database at {}", config.database_url))?;
    tracing::info!(database_url = %config.database_url, "Database ready");

    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, cache_writer) = Cache::new(redis_client).await;

    let catalog: Arc<dyn ExternalCatalog> = Arc::new(MusicGatewayProvider::new(
        cache,
        config.catalog_api_url.clone(),
        config.catalog_api_key.clone(),
    ));

    let mailer: Arc<dyn Mailer> = match &config.mail_relay_url {
        Some(relay_url) => Arc::new(HttpMailer::new(
            relay_url.clone(),
            config.mail_api_key.clone(),
            config.mail_from.clone(),
        )),
        None => {
            tracing::warn!("MAIL_RELAY_URL is not set, verification links will only be logged");
            Arc::new(LogMailer)
        }
    };

    let state = AppState::new(store, catalog, mailer, &config);
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(addr = %addr, public_url = %config.public_url, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Shutting down, flushing pending cache writes");
    cache_writer.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
