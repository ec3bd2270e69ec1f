// src/config/feeds.rs
use crate::ingest::types::FeedSource;

/// Compiled-in feed table (EN + PT-BR). Order is kept when fetching.
pub const FEEDS: &[FeedSource] = &[
    // Official advisories
    FeedSource::new(
        "CISA Advisories",
        "EN",
        "https://www.cisa.gov/cybersecurity-advisories/all.xml",
    ),
    FeedSource::new(
        "Google Security Blog",
        "EN",
        "https://security.googleblog.com/feeds/posts/default",
    ),
    // Security journalism / research
    FeedSource::new("Krebs on Security", "EN", "https://krebsonsecurity.com/feed/"),
    FeedSource::new(
        "Schneier on Security",
        "EN",
        "https://www.schneier.com/feed/atom/",
    ),
    FeedSource::new(
        "The Hacker News",
        "EN",
        "https://feeds.feedburner.com/TheHackersNews",
    ),
    // Brazilian outlets
    FeedSource::new("TecMundo", "PT-BR", "https://www.tecmundo.com.br/rss"),
    FeedSource::new("Canaltech", "PT-BR", "https://feeds.feedburner.com/canaltech"),
    FeedSource::new("Olhar Digital", "PT-BR", "https://olhardigital.com.br/feed/"),
    FeedSource::new("CERT.br", "PT-BR", "https://www.cert.br/rss/"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn feed_table_is_well_formed() {
        let mut urls = HashSet::new();
        for f in FEEDS {
            assert!(!f.name.is_empty());
            assert!(f.url.starts_with("https://"), "{}", f.url);
            assert!(urls.insert(f.url), "duplicate feed url {}", f.url);
        }
    }
}
