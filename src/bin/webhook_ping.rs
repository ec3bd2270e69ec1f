//! Sends one sample item to the configured webhook. Does not touch state.

use std::process::ExitCode;

use chrono::Utc;
use cyber_feed_notifier::ingest::types::NormalizedItem;
use cyber_feed_notifier::{notify, telemetry, Settings};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let notifier = notify::build_notifier(&settings);
    let link = "https://example.com/webhook-ping".to_string();
    let item = NormalizedItem {
        source: "webhook-ping".into(),
        lang: "EN".into(),
        title: format!("Test notification @ {}", Utc::now().to_rfc3339()),
        key: link.clone(),
        link,
        published: Some(Utc::now()),
        snippet: String::new(),
    };

    match notifier.send(&item).await {
        Ok(()) => {
            println!("webhook-ping sent via {}", notifier.name());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("webhook-ping failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}
