// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

/// A configured feed endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSource {
    pub name: &'static str,
    pub lang: &'static str, // e.g. "EN", "PT-BR"
    pub url: &'static str,
}

impl FeedSource {
    pub const fn new(name: &'static str, lang: &'static str, url: &'static str) -> Self {
        Self { name, lang, url }
    }
}

/// One entry as the parser saw it. Field presence varies by feed format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFeedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub guid: Option<String>,
    pub id: Option<String>,
    pub iso_date: Option<String>,
    pub pub_date: Option<String>,
    pub published: Option<String>,
    pub updated: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
}

/// Item after extraction; `key` is what the seen set stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedItem {
    pub source: String,
    pub lang: String,
    pub title: String,
    pub link: String,
    pub key: String,
    pub published: Option<DateTime<Utc>>,
    pub snippet: String,
}

/// Fetch + parse collaborator for a single feed.
#[async_trait::async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, source: &FeedSource) -> Result<Vec<RawFeedItem>>;
}

/// Result of fetching one feed. A failure never aborts the run.
#[derive(Debug)]
pub enum FeedOutcome {
    Fetched {
        source: &'static str,
        items: Vec<NormalizedItem>,
    },
    Failed {
        source: &'static str,
        error: anyhow::Error,
    },
}

impl FeedOutcome {
    pub fn source(&self) -> &'static str {
        match self {
            Self::Fetched { source, .. } | Self::Failed { source, .. } => *source,
        }
    }

    /// Items contributed to the candidate pool (empty on failure).
    pub fn into_items(self) -> Vec<NormalizedItem> {
        match self {
            Self::Fetched { items, .. } => items,
            Self::Failed { .. } => Vec::new(),
        }
    }
}
