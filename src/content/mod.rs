//! Collectible fact content
//!
//! Items carry a display-only fact record. The pool is loaded at most once per
//! process and replaced wholesale; until then (or if loading fails) a small
//! built-in pool keeps items spawning.

pub mod sportsdb;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fact grouping, also used to pick a colour/emoji
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactCategory {
    Soccer,
    Basketball,
    Baseball,
}

impl FactCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FactCategory::Soccer => "soccer",
            FactCategory::Basketball => "basketball",
            FactCategory::Baseball => "baseball",
        }
    }
}

/// A collectible payload. The simulation never inspects it beyond cloning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    pub id: String,
    pub category: FactCategory,
    pub emoji: String,
    /// Colour hint for the renderer (CSS hex)
    pub color: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

/// Immutable shared pool of facts
pub type FactPool = Arc<[Fact]>;

/// Errors from an external content source
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content source unavailable: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed content payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("content source returned no facts")]
    Empty,
}

/// Supplies the fact pool to a session
pub trait ContentProvider {
    /// Current pool; may be empty, in which case no items spawn
    fn facts(&self) -> FactPool;
}

/// A fixed pool, mostly useful in tests
#[derive(Debug, Clone)]
pub struct StaticContent(pub FactPool);

impl StaticContent {
    pub fn new(facts: Vec<Fact>) -> Self {
        Self(facts.into())
    }

    pub fn empty() -> Self {
        Self(Vec::new().into())
    }
}

impl ContentProvider for StaticContent {
    fn facts(&self) -> FactPool {
        Arc::clone(&self.0)
    }
}

/// Built-in pool used while loading and whenever the source fails
pub fn fallback_facts() -> Vec<Fact> {
    vec![
        Fact {
            id: "fallback-soccer-1".into(),
            category: FactCategory::Soccer,
            emoji: "⚽".into(),
            color: "#22c55e".into(),
            title: "Soccer".into(),
            subtitle: Some("Trivia boost: quick feet, quick points.".into()),
        },
        Fact {
            id: "fallback-basketball-1".into(),
            category: FactCategory::Basketball,
            emoji: "🏀".into(),
            color: "#f97316".into(),
            title: "Basketball".into(),
            subtitle: Some("League facts keep your score climbing.".into()),
        },
        Fact {
            id: "fallback-baseball-1".into(),
            category: FactCategory::Baseball,
            emoji: "⚾".into(),
            color: "#60a5fa".into(),
            title: "Baseball".into(),
            subtitle: Some("Collect teams to power up your run.".into()),
        },
    ]
}

/// Group a pool by category, preserving pool order within each group
pub fn group_by_category(facts: &[Fact]) -> BTreeMap<FactCategory, Vec<&Fact>> {
    let mut groups: BTreeMap<FactCategory, Vec<&Fact>> = BTreeMap::new();
    for fact in facts {
        groups.entry(fact.category).or_default().push(fact);
    }
    groups
}

/// Load state, surfaced to the UI as a hint line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentStatus {
    /// No load attempted yet
    Idle,
    /// A load is in flight; the fallback pool is served meanwhile
    Loading,
    /// Loaded pool is being served
    Ready,
    /// The source failed; the fallback pool is served for the process lifetime
    Degraded(String),
}

/// Proof that the holder started the single in-flight load
#[derive(Debug)]
#[must_use = "pass the ticket back to ContentCache::complete"]
pub struct LoadTicket(());

/// Process-wide fact pool with at-most-one load and a static fallback
#[derive(Debug, Clone)]
pub struct ContentCache {
    pool: FactPool,
    status: ContentStatus,
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentCache {
    pub fn new() -> Self {
        Self {
            pool: fallback_facts().into(),
            status: ContentStatus::Idle,
        }
    }

    pub fn status(&self) -> &ContentStatus {
        &self.status
    }

    /// Start the one and only load. Returns `None` if a load already started.
    pub fn begin_load(&mut self) -> Option<LoadTicket> {
        if self.status != ContentStatus::Idle {
            return None;
        }
        self.status = ContentStatus::Loading;
        Some(LoadTicket(()))
    }

    /// Finish the load started by `begin_load`
    pub fn complete(&mut self, _ticket: LoadTicket, result: Result<Vec<Fact>, ContentError>) {
        match result {
            Ok(facts) if !facts.is_empty() => {
                log::info!("Loaded {} facts", facts.len());
                self.pool = facts.into();
                self.status = ContentStatus::Ready;
            }
            Ok(_) => self.degrade(ContentError::Empty),
            Err(e) => self.degrade(e),
        }
    }

    /// Convenience for synchronous sources
    pub fn load_with<F>(&mut self, source: F)
    where
        F: FnOnce() -> Result<Vec<Fact>, ContentError>,
    {
        if let Some(ticket) = self.begin_load() {
            let result = source();
            self.complete(ticket, result);
        }
    }

    /// One-line hint for the HUD
    pub fn hint(&self) -> String {
        match &self.status {
            ContentStatus::Idle | ContentStatus::Loading => "Loading sports facts…".to_string(),
            ContentStatus::Ready => "Collect ⚽🏀⚾ items for power-ups + facts.".to_string(),
            ContentStatus::Degraded(msg) => {
                format!("Sports facts unavailable ({}). Using fallback facts.", msg)
            }
        }
    }

    fn degrade(&mut self, error: ContentError) {
        log::warn!("Content load failed, using fallback facts: {}", error);
        self.pool = fallback_facts().into();
        self.status = ContentStatus::Degraded(error.to_string());
    }
}

impl ContentProvider for ContentCache {
    fn facts(&self) -> FactPool {
        Arc::clone(&self.pool)
    }
}
