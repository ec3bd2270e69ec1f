// src/seen.rs
//! Seen set: identity keys already published, persisted between runs.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;

use crate::ingest::link::normalize_link;

/// Upper bound on persisted keys; the oldest are dropped first.
pub const SEEN_CAP: usize = 600;
pub const SEEN_FILE: &str = "seen.json";
/// Older single-link state, imported once when `seen.json` is absent.
pub const LEGACY_FILE: &str = "last_link.txt";

/// Insertion-ordered set of keys.
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    order: Vec<String>,
    index: HashSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set keeping the first occurrence of each key.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for k in keys {
            set.insert(k);
        }
        set
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains(key)
    }

    /// Appends `key` if new. Returns whether it was added.
    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        if self.index.contains(&key) {
            return false;
        }
        self.index.insert(key.clone());
        self.order.push(key);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Oldest first.
    pub fn keys(&self) -> &[String] {
        &self.order
    }

    /// The `n` most recently added keys, oldest first.
    pub fn newest(&self, n: usize) -> &[String] {
        let start = self.order.len().saturating_sub(n);
        &self.order[start..]
    }
}

impl PartialEq for SeenSet {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
    }
}

impl Eq for SeenSet {}

/// What `load` found on disk. None of these is an error.
#[derive(Debug)]
pub enum SeenLoad {
    Missing,
    Loaded(SeenSet),
    Legacy(SeenSet),
    Corrupt(String),
}

impl SeenLoad {
    pub fn into_set(self) -> SeenSet {
        match self {
            Self::Loaded(s) | Self::Legacy(s) => s,
            Self::Missing | Self::Corrupt(_) => SeenSet::new(),
        }
    }
}

/// File-backed store for a `SeenSet`. Single writer, no locking.
#[derive(Debug, Clone)]
pub struct SeenStore {
    dir: PathBuf,
    cap: usize,
}

impl SeenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cap: SEEN_CAP,
        }
    }

    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn seen_path(&self) -> PathBuf {
        self.dir.join(SEEN_FILE)
    }

    pub fn legacy_path(&self) -> PathBuf {
        self.dir.join(LEGACY_FILE)
    }

    /// Never fails; unreadable state is reported as `Missing`/`Corrupt`.
    pub async fn load(&self) -> SeenLoad {
        if let Err(e) = fs::create_dir_all(&self.dir).await {
            tracing::warn!(dir = %self.dir.display(), "state dir: {e:#}");
        }

        let path = self.seen_path();
        match fs::read_to_string(&path).await {
            Ok(s) => match serde_json::from_str::<Vec<String>>(&s) {
                Ok(keys) => SeenLoad::Loaded(SeenSet::from_keys(keys)),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        "corrupt seen state, starting empty: {e}"
                    );
                    SeenLoad::Corrupt(e.to_string())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => self.load_legacy().await,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    "unreadable seen state, starting empty: {e}"
                );
                SeenLoad::Corrupt(e.to_string())
            }
        }
    }

    async fn load_legacy(&self) -> SeenLoad {
        let Ok(raw) = fs::read_to_string(self.legacy_path()).await else {
            return SeenLoad::Missing;
        };
        let link = normalize_link(&raw);
        if link.is_empty() {
            return SeenLoad::Missing;
        }
        tracing::info!(%link, "imported legacy last-link state");
        SeenLoad::Legacy(SeenSet::from_keys([link]))
    }

    /// Persist the newest `cap` keys as a pretty JSON array.
    pub async fn save(&self, seen: &SeenSet) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating state dir {}", self.dir.display()))?;

        let body = serde_json::to_string_pretty(seen.newest(self.cap))
            .context("serializing seen state")?;

        // write-then-rename: readers never see a partial file
        let path = self.seen_path();
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, body)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("replacing {}", path.display()))?;
        Ok(())
    }
}
