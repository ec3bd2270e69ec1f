// src/notify/discord.rs
use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;

use super::{format_message, Markup, Notifier};
use crate::ingest::types::NormalizedItem;

#[derive(Clone)]
pub struct DiscordNotifier {
    webhook: String,
    client: Client,
}

impl DiscordNotifier {
    pub fn new(webhook: String) -> Self {
        Self {
            webhook,
            client: Client::new(),
        }
    }
}

#[derive(Serialize)]
struct DiscordWebhookPayload<'a> {
    content: &'a str,
}

#[async_trait::async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, item: &NormalizedItem) -> Result<()> {
        let content = format_message(item, Markup::Discord);
        self.client
            .post(&self.webhook)
            .json(&DiscordWebhookPayload { content: &content })
            .send()
            .await
            .context("discord webhook post")?
            .error_for_status()
            .context("discord webhook non-2xx")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "discord"
    }
}
