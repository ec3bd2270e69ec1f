//! Cron entrypoint: one pass over the feeds, then exit.
//! Exit code 0 on success (including "nothing new"), 1 on any fatal error.

use std::process::ExitCode;

use cyber_feed_notifier::{run, telemetry, Settings};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&settings).await {
        Ok(report) => {
            tracing::info!(posted = report.posted.len(), "done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("run failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}
