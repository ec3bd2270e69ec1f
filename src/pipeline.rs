// src/pipeline.rs
//! One run: fetch → filter → dedupe → rank → post → persist.

use std::collections::HashSet;

use anyhow::Result;
use tracing::{error, info};

use crate::ingest::fetch_all;
use crate::ingest::types::{FeedFetcher, FeedOutcome, FeedSource, NormalizedItem};
use crate::notify::Notifier;
use crate::relevance::is_relevant;
use crate::seen::{SeenSet, SeenStore};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Items extracted across all feeds.
    pub fetched: usize,
    pub failed_feeds: Vec<&'static str>,
    /// Relevant and unseen, before the per-run cap.
    pub candidates: usize,
    /// Keys delivered this run, in posting order.
    pub posted: Vec<String>,
}

/// Relevant, unseen items, newest first, at most `max`.
/// A key seen twice in one run (same article in two feeds) counts once;
/// the first occurrence in feed order wins. Undated items rank below every dated one.
pub fn select_candidates(
    items: Vec<NormalizedItem>,
    seen: &SeenSet,
    max: usize,
) -> (Vec<NormalizedItem>, usize) {
    let mut taken = HashSet::new();
    let mut candidates: Vec<NormalizedItem> = items
        .into_iter()
        .filter(|it| is_relevant(Some(&it.title), Some(&it.snippet)))
        .filter(|it| !seen.contains(&it.key))
        .filter(|it| taken.insert(it.key.clone()))
        .collect();
    let total = candidates.len();

    // Option orders None below Some, so descending puts undated items last.
    candidates.sort_by(|a, b| b.published.cmp(&a.published));
    candidates.truncate(max);
    (candidates, total)
}

/// Run the pipeline once against `store`.
///
/// The seen set is saved even when a delivery fails, so items posted earlier
/// in the run are not re-sent next time. The delivery error is still returned.
pub async fn run_once(
    feeds: &[FeedSource],
    fetcher: &dyn FeedFetcher,
    notifier: &dyn Notifier,
    store: &SeenStore,
    max_posts: usize,
) -> Result<RunReport> {
    let mut seen = store.load().await.into_set();

    let mut report = RunReport::default();
    let mut pool = Vec::new();
    for outcome in fetch_all(feeds, fetcher).await {
        if let FeedOutcome::Failed { source, .. } = &outcome {
            report.failed_feeds.push(*source);
        }
        pool.extend(outcome.into_items());
    }
    report.fetched = pool.len();

    let (to_post, total) = select_candidates(pool, &seen, max_posts);
    report.candidates = total;

    if to_post.is_empty() {
        info!(
            fetched = report.fetched,
            failed_feeds = report.failed_feeds.len(),
            "no new items"
        );
        return Ok(report);
    }

    let mut failure = None;
    for item in &to_post {
        match notifier.send(item).await {
            Ok(()) => {
                seen.insert(item.key.clone());
                report.posted.push(item.key.clone());
                info!(source = %item.source, title = %item.title, "posted");
            }
            Err(e) => {
                let ctx = format!("delivering {} via {}", item.link, notifier.name());
                failure = Some(e.context(ctx));
                break;
            }
        }
    }

    let saved = store.save(&seen).await;
    if let Some(e) = failure {
        if let Err(save_err) = saved {
            error!("saving seen state after failed delivery: {save_err:#}");
        }
        return Err(e);
    }
    saved?;

    info!(
        posted = report.posted.len(),
        candidates = report.candidates,
        fetched = report.fetched,
        "run finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn item(key: &str, title: &str, day: Option<u32>) -> NormalizedItem {
        NormalizedItem {
            source: "S".into(),
            lang: "EN".into(),
            title: title.into(),
            link: key.into(),
            key: key.into(),
            published: day.map(|d| Utc.with_ymd_and_hms(2024, d, 1, 0, 0, 0).unwrap()),
            snippet: String::new(),
        }
    }

    #[test]
    fn newest_first_and_undated_last() {
        let items = vec![
            item("jan", "malware one", Some(1)),
            item("none", "malware two", None),
            item("mar", "malware three", Some(3)),
        ];
        let (out, total) = select_candidates(items, &SeenSet::new(), 10);
        assert_eq!(total, 3);
        let keys: Vec<_> = out.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, ["mar", "jan", "none"]);
    }

    #[test]
    fn seen_items_are_excluded_even_when_relevant() {
        let items = vec![
            item("a", "ransomware", Some(1)),
            item("b", "ransomware", Some(2)),
        ];
        let seen = SeenSet::from_keys(["b"]);
        let (out, total) = select_candidates(items, &seen, 10);
        assert_eq!(total, 1);
        assert_eq!(out[0].key, "a");
    }

    #[test]
    fn duplicate_keys_within_a_run_count_once() {
        let mut twin = item("x", "ransomware wave", Some(2));
        twin.source = "Other".into();
        let items = vec![
            item("x", "ransomware wave", Some(2)),
            item("y", "botnet", Some(1)),
            twin,
        ];
        let (out, total) = select_candidates(items, &SeenSet::new(), 10);
        assert_eq!(total, 2);
        let keys: Vec<_> = out.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, ["x", "y"]);
        assert_eq!(out[0].source, "S");
    }

    #[test]
    fn irrelevant_dropped_and_cap_applied() {
        let items = vec![
            item("a", "phishing wave", Some(1)),
            item("b", "cooking tips", Some(2)),
            item("c", "botnet", Some(3)),
            item("d", "exploit kit", Some(4)),
        ];
        let (out, total) = select_candidates(items, &SeenSet::new(), 2);
        assert_eq!(total, 3);
        let keys: Vec<_> = out.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, ["d", "c"]);
    }
}
