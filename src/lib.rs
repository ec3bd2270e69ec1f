// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod config;
pub mod ingest;
pub mod notify;
pub mod pipeline;
pub mod relevance;
pub mod seen;
pub mod telemetry;

use anyhow::{Context, Result};

pub use crate::config::Settings;
pub use crate::pipeline::{run_once, RunReport};

/// Full production run: compiled-in feeds over HTTP, notifier from settings.
pub async fn run(settings: &Settings) -> Result<RunReport> {
    let fetcher = ingest::providers::http::HttpFeedFetcher::new()?;
    let notifier = notify::build_notifier(settings);
    let store = seen::SeenStore::new(&settings.state_dir);
    run_once(
        config::feeds::FEEDS,
        &fetcher,
        notifier.as_ref(),
        &store,
        settings.max_posts_per_run,
    )
    .await
    .context("feed run failed")
}
