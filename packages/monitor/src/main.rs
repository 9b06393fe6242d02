// Main entry point for the restock monitor

use std::sync::Arc;

use anyhow::{Context, Result};
use monitor_core::catalog::CatalogClient;
use monitor_core::monitor::StockMonitor;
use monitor_core::notify::DiscordNotifier;
use monitor_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,monitor_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting restock monitor");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        "Configuration loaded (store: {}, poll interval: {} min, page size: {})",
        config.store_url,
        config.poll_interval_minutes,
        config.page_size
    );

    let catalog = CatalogClient::new(
        config.catalog_api_url.clone(),
        &config.consumer_key,
        &config.consumer_secret,
        config.request_timeout(),
    )
    .context("Failed to create catalog client")?;

    let notifier = DiscordNotifier::new(config.discord_token.clone(), config.channel_id);

    let monitor = StockMonitor::new(
        Arc::new(catalog),
        Arc::new(notifier),
        config.page_size,
        config.poll_interval(),
    );

    // Runs until the process is killed
    monitor.run().await;

    Ok(())
}
