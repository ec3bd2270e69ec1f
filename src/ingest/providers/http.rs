// src/ingest/providers/http.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::ingest::types::{FeedFetcher, FeedSource, RawFeedItem};
use crate::ingest::xml::parse_feed;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Fetches feeds over HTTP and parses them as RSS/Atom.
#[derive(Clone)]
pub struct HttpFeedFetcher {
    client: Client,
}

impl HttpFeedFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("building feed http client")?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// GET `url` and parse the body; shared by the trait impl and tests.
    pub async fn fetch_url(&self, url: &str) -> Result<Vec<RawFeedItem>> {
        let body = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url} non-2xx"))?
            .text()
            .await
            .with_context(|| format!("reading body of {url}"))?;
        parse_feed(&body).with_context(|| format!("parsing feed {url}"))
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, source: &FeedSource) -> Result<Vec<RawFeedItem>> {
        self.fetch_url(source.url).await
    }
}
