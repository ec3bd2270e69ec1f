// src/config/mod.rs
//! Process configuration, read once at startup and passed down explicitly.

pub mod feeds;

use std::path::PathBuf;

use thiserror::Error;

pub const ENV_WEBHOOK: &str = "DISCORD_WEBHOOK";
pub const ENV_WEBHOOK_ALIAS: &str = "WEBHOOK_URL";
pub const ENV_WEBHOOK_KIND: &str = "WEBHOOK_KIND";
pub const ENV_STATE_DIR: &str = "STATE_DIR";
pub const ENV_MAX_POSTS: &str = "MAX_POSTS_PER_RUN";

pub const DEFAULT_MAX_POSTS_PER_RUN: usize = 3;
pub const DEFAULT_STATE_DIR_NAME: &str = "state";

/// Which chat service the webhook belongs to. Decides payload shape and markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WebhookKind {
    #[default]
    Discord,
    Slack,
}

impl WebhookKind {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "discord" => Some(Self::Discord),
            "slack" => Some(Self::Slack),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing {var} env var", var = ENV_WEBHOOK)]
    MissingWebhook,
    #[error("{var} must be `discord` or `slack`, got `{0}`", var = ENV_WEBHOOK_KIND)]
    InvalidWebhookKind(String),
    #[error("{var} must be a non-negative integer, got `{0}`", var = ENV_MAX_POSTS)]
    InvalidMaxPosts(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub webhook_url: String,
    pub webhook_kind: WebhookKind,
    pub state_dir: PathBuf,
    pub max_posts_per_run: usize,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key/value lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let webhook_url = get(ENV_WEBHOOK)
            .or_else(|| get(ENV_WEBHOOK_ALIAS))
            .ok_or(ConfigError::MissingWebhook)?;

        let webhook_kind = match get(ENV_WEBHOOK_KIND) {
            Some(raw) => WebhookKind::parse(&raw).ok_or(ConfigError::InvalidWebhookKind(raw))?,
            None => WebhookKind::default(),
        };

        let max_posts_per_run = match get(ENV_MAX_POSTS) {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidMaxPosts(raw))?,
            None => DEFAULT_MAX_POSTS_PER_RUN,
        };

        let state_dir = get(ENV_STATE_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(default_state_dir);

        Ok(Self {
            webhook_url,
            webhook_kind,
            state_dir,
            max_posts_per_run,
        })
    }
}

/// `<dir of the running executable>/state`, or `./state` when that is unknown.
pub fn default_state_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join(DEFAULT_STATE_DIR_NAME)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR_NAME))
}
