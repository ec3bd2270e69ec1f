// src/ingest/mod.rs
pub mod link;
pub mod providers;
pub mod types;
pub mod xml;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use futures::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ingest::link::normalize_link;
use crate::ingest::types::{FeedFetcher, FeedOutcome, FeedSource, NormalizedItem, RawFeedItem};

pub const UNTITLED: &str = "(sem título)";
const SNIPPET_MAX_CHARS: usize = 1500;

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize snippet text: decode entities, strip tags, collapse whitespace, cap length.
pub fn normalize_text(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s);
    let stripped = RE_TAGS.replace_all(&decoded, " ");
    let mut out = tidy(&stripped);

    if out.chars().count() > SNIPPET_MAX_CHARS {
        out = out.chars().take(SNIPPET_MAX_CHARS).collect();
    }
    out
}

/// Titles keep literal angle brackets (`XSS via <iframe>`); no tag stripping.
pub fn normalize_title(s: &str) -> String {
    tidy(&html_escape::decode_html_entities(s))
}

/// ASCII quotes, single spaces, trimmed.
fn tidy(s: &str) -> String {
    let quoted = s
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");
    RE_WS.replace_all(&quoted, " ").trim().to_string()
}

/// Date fields in the order they are tried.
const DATE_FIELDS: &[fn(&RawFeedItem) -> Option<&str>] = &[
    |it| it.iso_date.as_deref(),
    |it| it.pub_date.as_deref(),
    |it| it.published.as_deref(),
    |it| it.updated.as_deref(),
];

/// First present date-like field, parsed best-effort. The first *present*
/// field decides: an unparseable value yields `None` rather than falling through.
pub fn item_date(it: &RawFeedItem) -> Option<DateTime<Utc>> {
    DATE_FIELDS
        .iter()
        .find_map(|field| field(it).map(str::trim).filter(|s| !s.is_empty()))
        .and_then(parse_date)
}

/// RFC 3339, RFC 2822, then a few loose forms read as UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Dedup key: canonical link, else guid/id, else the raw link.
pub fn identity_key(link: &str, it: &RawFeedItem) -> String {
    [
        non_empty(Some(link)),
        non_empty(it.guid.as_deref()),
        non_empty(it.id.as_deref()),
        non_empty(it.link.as_deref()),
    ]
    .into_iter()
    .flatten()
    .next()
    .unwrap_or_default()
    .to_string()
}

/// Map one raw entry; `None` when no link can be derived.
pub fn normalize_item(source: &FeedSource, it: &RawFeedItem) -> Option<NormalizedItem> {
    let raw_link = non_empty(it.link.as_deref())
        .or_else(|| non_empty(it.guid.as_deref()))
        .unwrap_or_default();
    let link = normalize_link(raw_link);
    if link.is_empty() {
        return None;
    }

    let key = identity_key(&link, it);

    let title = it
        .title
        .as_deref()
        .map(normalize_title)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());

    let snippet = non_empty(it.summary.as_deref())
        .or_else(|| non_empty(it.content.as_deref()))
        .map(normalize_text)
        .unwrap_or_default();

    Some(NormalizedItem {
        source: source.name.to_string(),
        lang: source.lang.to_string(),
        title,
        link,
        key,
        published: item_date(it),
        snippet,
    })
}

/// Feed Item Extractor: a failed fetch is logged and contributes nothing.
pub fn extract_items(
    source: &FeedSource,
    fetched: anyhow::Result<Vec<RawFeedItem>>,
) -> FeedOutcome {
    match fetched {
        Ok(raw) => {
            let items: Vec<NormalizedItem> = raw
                .iter()
                .filter_map(|it| normalize_item(source, it))
                .collect();
            tracing::debug!(
                feed = source.name,
                raw = raw.len(),
                kept = items.len(),
                "feed parsed"
            );
            FeedOutcome::Fetched {
                source: source.name,
                items,
            }
        }
        Err(error) => {
            tracing::warn!(feed = source.name, error = %format!("{error:#}"), "feed fetch failed");
            FeedOutcome::Failed {
                source: source.name,
                error,
            }
        }
    }
}

/// Fetch every feed concurrently and wait for all of them.
pub async fn fetch_all(sources: &[FeedSource], fetcher: &dyn FeedFetcher) -> Vec<FeedOutcome> {
    let fetches = sources.iter().map(|source| async move {
        let fetched = fetcher.fetch(source).await;
        extract_items(source, fetched)
    });
    join_all(fetches).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SRC: FeedSource = FeedSource::new("Test Feed", "EN", "https://feed.test/rss");

    #[test]
    fn normalize_text_strips_markup() {
        let s = "  <p>Hello&nbsp;<b>world</b></p>\n\n &ldquo;ok&rdquo; ";
        assert_eq!(normalize_text(s), r#"Hello world "ok""#);
    }

    #[test]
    fn normalize_text_caps_length() {
        let s = "x".repeat(2_000);
        assert_eq!(normalize_text(&s).chars().count(), SNIPPET_MAX_CHARS);
    }

    #[test]
    fn titles_keep_angle_brackets() {
        assert_eq!(
            normalize_title("Exploit in &lt;iframe&gt; sandbox bypass"),
            "Exploit in <iframe> sandbox bypass"
        );
        assert_eq!(
            normalize_title("CVE score 9 &lt; 10 but &gt; 8"),
            "CVE score 9 < 10 but > 8"
        );
        let it = RawFeedItem {
            title: Some("XSS via <script>   in  \u{201C}admin\u{201D}".into()),
            link: Some("https://a.test/xss".into()),
            ..Default::default()
        };
        assert_eq!(
            normalize_item(&SRC, &it).unwrap().title,
            r#"XSS via <script> in "admin""#
        );
    }

    #[test]
    fn date_fields_tried_in_order() {
        let it = RawFeedItem {
            pub_date: Some("Tue, 02 Jan 2024 10:00:00 +0000".into()),
            updated: Some("2025-01-01T00:00:00Z".into()),
            ..Default::default()
        };
        assert_eq!(
            item_date(&it),
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap())
        );

        let it = RawFeedItem {
            iso_date: Some("2024-03-01T12:00:00-03:00".into()),
            pub_date: Some("Tue, 02 Jan 2024 10:00:00 +0000".into()),
            ..Default::default()
        };
        assert_eq!(
            item_date(&it),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 15, 0, 0).unwrap())
        );
    }

    #[test]
    fn bad_or_missing_dates_are_none() {
        let it = RawFeedItem {
            pub_date: Some("yesterday-ish".into()),
            ..Default::default()
        };
        assert_eq!(item_date(&it), None);
        assert_eq!(item_date(&RawFeedItem::default()), None);
    }

    #[test]
    fn loose_date_forms() {
        assert_eq!(
            parse_date("2024-05-06"),
            Some(Utc.with_ymd_and_hms(2024, 5, 6, 0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_date("2024-05-06 07:08:09"),
            Some(Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap())
        );
    }

    #[test]
    fn item_falls_back_to_guid_and_placeholder_title() {
        let it = RawFeedItem {
            guid: Some("https://a.test/post/?utm_source=rss".into()),
            ..Default::default()
        };
        let n = normalize_item(&SRC, &it).unwrap();
        assert_eq!(n.link, "https://a.test/post");
        assert_eq!(n.key, "https://a.test/post");
        assert_eq!(n.title, UNTITLED);
        assert_eq!(n.source, "Test Feed");
        assert_eq!(n.lang, "EN");
        assert!(n.published.is_none());
    }

    #[test]
    fn identity_key_fallbacks() {
        let it = RawFeedItem {
            guid: Some(" g-7 ".into()),
            id: Some("urn:x".into()),
            ..Default::default()
        };
        assert_eq!(identity_key("https://a.test/1", &it), "https://a.test/1");
        assert_eq!(identity_key("", &it), "g-7");
        let it = RawFeedItem {
            id: Some("urn:x".into()),
            ..Default::default()
        };
        assert_eq!(identity_key("", &it), "urn:x");
        assert_eq!(identity_key("", &RawFeedItem::default()), "");
    }

    #[test]
    fn item_without_link_is_dropped() {
        let it = RawFeedItem {
            title: Some("orphan".into()),
            id: Some("urn:x".into()),
            ..Default::default()
        };
        assert!(normalize_item(&SRC, &it).is_none());
    }

    #[test]
    fn snippet_prefers_summary_then_content() {
        let it = RawFeedItem {
            link: Some("https://a.test/1".into()),
            content: Some("<div>full body</div>".into()),
            ..Default::default()
        };
        assert_eq!(normalize_item(&SRC, &it).unwrap().snippet, "full body");
    }

    #[test]
    fn failed_fetch_yields_no_items() {
        let out = extract_items(&SRC, Err(anyhow::anyhow!("boom")));
        assert!(matches!(out, FeedOutcome::Failed { source: "Test Feed", .. }));
        assert!(out.into_items().is_empty());
    }
}
