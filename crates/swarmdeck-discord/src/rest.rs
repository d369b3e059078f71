// ABOUTME: Minimal Discord REST client using the bot token.
// ABOUTME: Bulk-registers slash commands and posts channel messages.

use crate::error::Result;
use serde_json::{json, Value};
use tracing::{debug, info};

/// Discord REST API root.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

#[derive(Clone)]
pub struct DiscordRest {
    client: reqwest::Client,
    base_url: String,
    bot_token: String,
}

impl std::fmt::Debug for DiscordRest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordRest")
            .field("base_url", &self.base_url)
            .field("bot_token", &"[REDACTED]")
            .finish()
    }
}

impl DiscordRest {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_API_BASE.to_string(),
            bot_token: bot_token.into(),
        }
    }

    /// Point the client at another API root (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn auth(&self) -> String {
        format!("Bot {}", self.bot_token)
    }

    /// Replace the application's global commands with `commands`.
    pub async fn register_commands(&self, application_id: &str, commands: &Value) -> Result<()> {
        let url = format!("{}/applications/{}/commands", self.base_url, application_id);
        self.client
            .put(&url)
            .header(reqwest::header::AUTHORIZATION, self.auth())
            .json(commands)
            .send()
            .await?
            .error_for_status()?;
        info!(application_id = %application_id, "Registered slash commands");
        Ok(())
    }

    pub async fn post_message(&self, channel_id: &str, content: &str) -> Result<()> {
        let url = format!("{}/channels/{}/messages", self.base_url, channel_id);
        self.client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.auth())
            .json(&json!({ "content": content }))
            .send()
            .await?
            .error_for_status()?;
        debug!(channel_id = %channel_id, chars = content.chars().count(), "Posted message");
        Ok(())
    }
}
