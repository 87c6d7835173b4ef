use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::constants::{intervals, limits};
use crate::rate_limit::RateLimiter;
use crate::trends::truncate_chars;

const DISCORD_API: &str = "https://discord.com/api/v10";

/// Outbound side of the chat platform.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Replaces the deferred placeholder of an interaction.
    async fn edit_original(&self, interaction_token: &str, content: &str) -> Result<()>;

    /// Posts to the configured channel, splitting long content. Returns the number of
    /// messages sent.
    async fn post_channel_message(&self, content: &str) -> Result<usize>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredCommand {
    pub id: String,
    pub name: String,
}

#[derive(Clone)]
pub struct DiscordClient {
    client: Client,
    bot_token: String,
    app_id: String,
    channel_id: String,
    base_url: String,
    limiter: Arc<RateLimiter>,
}

impl DiscordClient {
    pub fn new(
        bot_token: &str,
        app_id: &str,
        channel_id: &str,
        timeout_seconds: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent("DiscordBot (https://github.com/soundswap, 1.0)")
            .build()
            .context("Failed to build Discord HTTP client")?;

        Ok(Self {
            client,
            bot_token: bot_token.to_string(),
            app_id: app_id.to_string(),
            channel_id: channel_id.to_string(),
            base_url: DISCORD_API.to_string(),
            limiter: Arc::new(RateLimiter::per_interval(intervals::DISCORD_CHUNK)),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.bot_token)
    }

    async fn check(response: Response, action: &str) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(anyhow!("Discord {action} failed: {status} - {body}"))
    }

    pub async fn edit_original_message(&self, interaction_token: &str, content: &str) -> Result<()> {
        let url = format!(
            "{}/webhooks/{}/{}/messages/@original",
            self.base_url, self.app_id, interaction_token
        );

        let result: Result<()> = async {
            let response = self
                .client
                .patch(&url)
                .json(&json!({ "content": truncate_message(content) }))
                .send()
                .await
                .context("Discord edit request failed")?;
            Self::check(response, "edit").await.map(|_| ())
        }
        .await;

        let outcome = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!("discord_messages_total", "kind" => "edit", "outcome" => outcome)
            .increment(1);
        result
    }

    pub async fn create_channel_message(&self, content: &str) -> Result<usize> {
        let url = format!("{}/channels/{}/messages", self.base_url, self.channel_id);
        let chunks = split_message(content, limits::DISCORD_CHUNK_CHARS);
        let total = chunks.len();

        for (i, chunk) in chunks.into_iter().enumerate() {
            self.limiter.acquire().await;

            let result: Result<Response> = async {
                let response = self
                    .client
                    .post(&url)
                    .header("Authorization", self.auth_header())
                    .json(&json!({ "content": chunk }))
                    .send()
                    .await
                    .context("Discord post request failed")?;
                Self::check(response, "post").await
            }
            .await;

            match result {
                Ok(_) => {
                    metrics::counter!("discord_messages_total", "kind" => "post", "outcome" => "ok")
                        .increment(1);
                    debug!(chunk = i + 1, total, "Posted channel message");
                }
                Err(e) => {
                    metrics::counter!(
                        "discord_messages_total",
                        "kind" => "post",
                        "outcome" => "error"
                    )
                    .increment(1);
                    warn!(chunk = i + 1, total, error = %e, "Failed to post channel message");
                    return Err(e);
                }
            }
        }

        Ok(total)
    }

    pub async fn list_commands(&self) -> Result<Vec<RegisteredCommand>> {
        let url = format!("{}/applications/{}/commands", self.base_url, self.app_id);
        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;
        Ok(Self::check(response, "list commands").await?.json().await?)
    }

    pub async fn delete_command(&self, command_id: &str) -> Result<()> {
        let url = format!(
            "{}/applications/{}/commands/{}",
            self.base_url, self.app_id, command_id
        );
        let response = self
            .client
            .delete(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;
        Self::check(response, "delete command").await.map(|_| ())
    }

    /// Replaces every global command with the bot's current command set.
    pub async fn register_commands(&self) -> Result<Vec<RegisteredCommand>> {
        for command in self.list_commands().await? {
            self.delete_command(&command.id).await?;
            info!("Deleted command: {}", command.name);
        }

        let url = format!("{}/applications/{}/commands", self.base_url, self.app_id);
        let mut registered = Vec::new();

        for definition in command_definitions() {
            let response = self
                .client
                .post(&url)
                .header("Authorization", self.auth_header())
                .json(&definition)
                .send()
                .await?;
            let command: RegisteredCommand =
                Self::check(response, "register command").await?.json().await?;
            info!("Registered command: {}", command.name);
            registered.push(command);
        }

        Ok(registered)
    }
}

#[async_trait]
impl ChatPlatform for DiscordClient {
    async fn edit_original(&self, interaction_token: &str, content: &str) -> Result<()> {
        self.edit_original_message(interaction_token, content).await
    }

    async fn post_channel_message(&self, content: &str) -> Result<usize> {
        self.create_channel_message(content).await
    }
}

pub const BLOG_COMMAND: &str = "blog";
pub const OUTLINES_COMMAND: &str = "outlines";
pub const DRAFT_COMMAND: &str = "Generate Draft";

#[must_use]
pub fn command_definitions() -> Vec<Value> {
    vec![
        json!({
            "name": BLOG_COMMAND,
            "description": "Pick one of today's trending topics for a blog post",
            "type": 1,
            "integration_types": [0, 1],
            "dm_permission": true
        }),
        json!({
            "name": OUTLINES_COMMAND,
            "description": "Generate 4 blog outline approaches with sentiment analysis",
            "type": 1,
            "options": [{
                "name": "topic",
                "description": "Topic for blog outlines",
                "type": 3,
                "required": false
            }],
            "integration_types": [0, 1],
            "dm_permission": true
        }),
        json!({
            "name": DRAFT_COMMAND,
            "type": 3,
            "integration_types": [0, 1],
            "dm_permission": true
        }),
    ]
}

/// Content for a single message, cut to the platform limit.
#[must_use]
pub fn truncate_message(content: &str) -> String {
    if content.chars().count() <= limits::DISCORD_MESSAGE_CHARS {
        return content.to_string();
    }
    format!(
        "{}...",
        truncate_chars(content, limits::DISCORD_MESSAGE_CHARS - 3)
    )
}

/// Splits on paragraph boundaries so each piece stays within `max` characters.
/// Paragraphs longer than `max` are cut hard.
#[must_use]
pub fn split_message(content: &str, max: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in content.split("\n\n") {
        let joined_len = if current.is_empty() {
            paragraph.chars().count()
        } else {
            current.chars().count() + 2 + paragraph.chars().count()
        };

        if joined_len <= max {
            if !current.is_empty() {
                current.push_str("\n\n");
            }
            current.push_str(paragraph);
            continue;
        }

        if !current.trim().is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        current.clear();

        let mut rest = paragraph;
        while rest.chars().count() > max {
            let head = truncate_chars(rest, max);
            chunks.push(head.to_string());
            rest = &rest[head.len()..];
        }
        current.push_str(rest);
    }

    if !current.trim().is_empty() {
        chunks.push(current);
    }

    chunks
}
