//! Minimal Discord REST API client.
//!
//! Covers the single operation a bot needs to announce things: posting a
//! message to a channel it can see. Authentication uses a bot token
//! (`Authorization: Bot <token>`).
//!
//! # Example
//!
//! ```rust,ignore
//! use discord::DiscordClient;
//!
//! let client = DiscordClient::new("bot-token".into());
//! client.create_message(123456789012345678, "hello").await?;
//! ```

use serde::{Deserialize, Serialize};

const BASE_URL: &str = "https://discord.com/api/v10";

#[derive(Debug, thiserror::Error)]
pub enum DiscordError {
    #[error("request to Discord failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Discord API error {status}: {message}")]
    Api { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, DiscordError>;

pub struct DiscordClient {
    client: reqwest::Client,
    token: String,
}

/// Request body for the Create Message endpoint.
#[derive(Debug, Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
}

/// Subset of the Discord message object we care about.
#[derive(Debug, Deserialize)]
pub struct Message {
    pub id: String,
    pub channel_id: String,
    #[serde(default)]
    pub content: String,
}

impl DiscordClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
        }
    }

    /// Post a message to a channel. The bot must have the Send Messages
    /// permission in that channel.
    pub async fn create_message(&self, channel_id: u64, content: &str) -> Result<Message> {
        let url = format!("{}/channels/{}/messages", BASE_URL, channel_id);

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bot {}", self.token))
            .json(&CreateMessage { content })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::error!("Discord create_message failed ({}): {}", status, body);
            return Err(DiscordError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(resp.json::<Message>().await?)
    }
}
