use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub catalog_api_url: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    pub discord_token: String,
    pub channel_id: u64,
    /// Store base URL, display-only (not used by the fetch loop).
    pub store_url: String,
    pub page_size: u32,
    pub poll_interval_minutes: u64,
    pub request_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let page_size: u32 = env::var("PAGE_SIZE")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .context("PAGE_SIZE must be a valid number")?;
        anyhow::ensure!(page_size > 0, "PAGE_SIZE must be at least 1");

        Ok(Self {
            catalog_api_url: env::var("WC_API_URL").context("WC_API_URL must be set")?,
            consumer_key: env::var("WC_CONSUMER_KEY").context("WC_CONSUMER_KEY must be set")?,
            consumer_secret: env::var("WC_CONSUMER_SECRET")
                .context("WC_CONSUMER_SECRET must be set")?,
            discord_token: env::var("DISCORD_TOKEN").context("DISCORD_TOKEN must be set")?,
            channel_id: env::var("CHANNEL_ID")
                .context("CHANNEL_ID must be set")?
                .parse()
                .context("CHANNEL_ID must be a valid channel id")?,
            store_url: env::var("WC_STORE_URL").context("WC_STORE_URL must be set")?,
            page_size,
            poll_interval_minutes: env::var("POLL_INTERVAL_MINUTES")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .context("POLL_INTERVAL_MINUTES must be a valid number")?,
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("REQUEST_TIMEOUT_SECS must be a valid number")?,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_minutes * 60)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
