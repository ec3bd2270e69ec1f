// src/ingest/link.rs
//! Canonical item links, used as the dedup identity.

use url::Url;

const TRACKING_PARAMS: &[&str] = &["utm", "ref", "fbclid", "gclid", "mc_cid", "mc_eid"];

fn is_tracking_param(name: &str) -> bool {
    let key = name.to_lowercase();
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key.as_str())
}

/// Drop fragment, tracking query params and trailing slashes.
/// Input that does not parse as a URL comes back trimmed.
pub fn normalize_link(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw.trim()) else {
        return raw.trim().to_string();
    };
    url.set_fragment(None);

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if pairs.iter().any(|(k, _)| is_tracking_param(k)) {
        let kept: Vec<_> = pairs.iter().filter(|(k, _)| !is_tracking_param(k)).collect();
        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut()
                .clear()
                .extend_pairs(kept.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
    }

    // all of them: keeps `/x//` idempotent
    String::from(url).trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tracking_and_keeps_order() {
        assert_eq!(
            normalize_link("https://example.com/a?utm_source=x&ref=y&id=1"),
            "https://example.com/a?id=1"
        );
        assert_eq!(
            normalize_link("https://example.com/a?b=2&UTM_Medium=m&a=1&fbclid=z"),
            "https://example.com/a?b=2&a=1"
        );
    }

    #[test]
    fn drops_fragment_and_trailing_slash() {
        assert_eq!(
            normalize_link("https://krebsonsecurity.com/2024/01/post/#comments"),
            "https://krebsonsecurity.com/2024/01/post"
        );
        assert_eq!(normalize_link("https://example.com/"), "https://example.com");
    }

    #[test]
    fn removes_query_entirely_when_only_tracking() {
        assert_eq!(
            normalize_link("https://example.com/a/?utm_campaign=feed&gclid=1"),
            "https://example.com/a"
        );
    }

    #[test]
    fn untouched_query_is_not_reencoded() {
        let s = "https://example.com/search?q=a%20b&x=1";
        assert_eq!(normalize_link(s), s);
    }

    #[test]
    fn unparseable_input_is_trimmed() {
        assert_eq!(normalize_link("  not a url  "), "not a url");
        assert_eq!(normalize_link(""), "");
    }

    #[test]
    fn idempotent() {
        let samples = [
            "https://example.com/a?utm_source=x&ref=y&id=1",
            "https://example.com/x//",
            "https://example.com/?q=hello+world&mc_eid=9#top",
            "HTTPS://Example.COM/Path/?Ref=abc",
            "tag:blogger.com,1999:blog-1.post-2",
            "  garbage value ",
            "https://example.com/a?",
        ];
        for s in samples {
            let once = normalize_link(s);
            assert_eq!(normalize_link(&once), once, "input {s:?}");
        }
    }
}
