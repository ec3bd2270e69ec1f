// src/notify/mod.rs
pub mod discord;
pub mod slack;

use anyhow::Result;

use crate::config::{Settings, WebhookKind};
use crate::ingest::types::NormalizedItem;

pub use discord::DiscordNotifier;
pub use slack::SlackNotifier;

/// Delivers one item. Errors propagate; there are no retries.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, item: &NormalizedItem) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Flag + language label, e.g. "🇧🇷 PT-BR".
pub fn language_tag(lang: &str) -> String {
    let flag = match lang.to_ascii_uppercase().as_str() {
        "PT-BR" => "🇧🇷",
        "EN" => "🇺🇸",
        _ => "🌐",
    };
    format!("{flag} {lang}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markup {
    /// `**bold**`
    Discord,
    /// `*bold*`
    Slack,
}

pub fn format_message(item: &NormalizedItem, markup: Markup) -> String {
    let bold = match markup {
        Markup::Discord => "**",
        Markup::Slack => "*",
    };
    format!(
        "🛡️ {} • {bold}{}{bold}\n{}\n{}",
        language_tag(&item.lang),
        item.source,
        item.title,
        item.link
    )
}

pub fn build_notifier(settings: &Settings) -> Box<dyn Notifier> {
    match settings.webhook_kind {
        WebhookKind::Discord => Box::new(DiscordNotifier::new(settings.webhook_url.clone())),
        WebhookKind::Slack => Box::new(SlackNotifier::new(settings.webhook_url.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(lang: &str) -> NormalizedItem {
        NormalizedItem {
            source: "CERT.br".into(),
            lang: lang.into(),
            title: "Falha crítica".into(),
            link: "https://cert.test/a".into(),
            key: "https://cert.test/a".into(),
            published: None,
            snippet: String::new(),
        }
    }

    #[test]
    fn tags_per_language() {
        assert_eq!(language_tag("PT-BR"), "🇧🇷 PT-BR");
        assert_eq!(language_tag("EN"), "🇺🇸 EN");
        assert_eq!(language_tag("ES"), "🌐 ES");
    }

    #[test]
    fn message_template() {
        assert_eq!(
            format_message(&item("PT-BR"), Markup::Discord),
            "🛡️ 🇧🇷 PT-BR • **CERT.br**\nFalha crítica\nhttps://cert.test/a"
        );
        assert_eq!(
            format_message(&item("EN"), Markup::Slack),
            "🛡️ 🇺🇸 EN • *CERT.br*\nFalha crítica\nhttps://cert.test/a"
        );
    }
}
