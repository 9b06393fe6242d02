//! Notification sink for back-in-stock events.

use anyhow::{Context, Result};
use async_trait::async_trait;
use discord::DiscordClient;

use crate::stock::StockChangeEvent;

/// Where back-in-stock announcements go.
#[async_trait]
pub trait BaseNotificationSink: Send + Sync {
    async fn notify_back_in_stock(&self, event: &StockChangeEvent) -> Result<()>;
}

/// Render the announcement message for one event.
///
/// The angle brackets around the URL suppress Discord's link-preview embed.
pub fn format_message(event: &StockChangeEvent) -> String {
    format!(
        "🚨 **The following product is back in stock:**\n{} ({})\n<{}>",
        event.name, event.categories, event.url
    )
}

/// Posts announcements to a Discord channel.
pub struct DiscordNotifier {
    client: DiscordClient,
    channel_id: u64,
}

impl DiscordNotifier {
    pub fn new(bot_token: String, channel_id: u64) -> Self {
        Self {
            client: DiscordClient::new(bot_token),
            channel_id,
        }
    }
}

#[async_trait]
impl BaseNotificationSink for DiscordNotifier {
    async fn notify_back_in_stock(&self, event: &StockChangeEvent) -> Result<()> {
        self.client
            .create_message(self.channel_id, &format_message(event))
            .await
            .context("Failed to post back-in-stock message")?;
        Ok(())
    }
}
