// src/relevance.rs
//! Keyword gate for the security topic (EN + PT-BR).
//!
//! Plain lowercase substring search: no tokenizing, so "hacker" also hits
//! "hackerspace". Coarse on purpose.

/// Lowercase keywords; any single hit makes an item relevant.
pub const KEYWORDS: &[&str] = &[
    // EN
    "cve",
    "vulnerability",
    "exploit",
    "zero-day",
    "zeroday",
    "ransomware",
    "phishing",
    "malware",
    "botnet",
    "breach",
    "leak",
    "ddos",
    "cyber",
    "hacker",
    "hack",
    "backdoor",
    "trojan",
    "spyware",
    "credential",
    "stealer",
    "apt",
    // PT-BR
    "vulnerabilidade",
    "exploração",
    "falha",
    "brecha",
    "vazamento",
    "golpe",
    "invasão",
    "ataque",
    "ciber",
    "sequestro",
    "dados",
    "credenciais",
    "roubo",
];

/// First keyword found in `title + " " + snippet`, if any.
pub fn matched_keyword(title: Option<&str>, snippet: Option<&str>) -> Option<&'static str> {
    let text = format!("{} {}", title.unwrap_or_default(), snippet.unwrap_or_default())
        .to_lowercase();
    KEYWORDS.iter().copied().find(|k| text.contains(k))
}

pub fn is_relevant(title: Option<&str>, snippet: Option<&str>) -> bool {
    matched_keyword(title, snippet).is_some()
}
