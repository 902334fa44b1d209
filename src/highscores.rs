//! High score leaderboard system
//!
//! The simulation hands its final score to a `ScoreSink` exactly once per
//! round; `HighScores` is the stock sink, persisted as a JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Receives the final score of each crashed round
pub trait ScoreSink {
    fn report_final_score(&mut self, score: u64);
}

/// Discards scores; for hosts that handle persistence elsewhere
#[derive(Debug, Default, Clone, Copy)]
pub struct NoScoreSink;

impl ScoreSink for NoScoreSink {
    fn report_final_score(&mut self, _score: u64) {}
}

#[derive(Debug, Error)]
pub enum HighScoreError {
    #[error("score file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("score file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player's score
    pub score: u64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, score: u64, timestamp: f64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry { score, timestamp };

        // Find insertion point (sorted descending by score)
        let rank = match self.entries.iter().position(|e| score > e.score) {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    /// Best score so far (0 if none)
    pub fn best(&self) -> u64 {
        self.entries.first().map(|e| e.score).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load from a JSON file; a missing file is an empty leaderboard
    pub fn load(path: &Path) -> Result<Self, HighScoreError> {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let scores: HighScores = serde_json::from_str(&json)?;
                log::info!("Loaded {} high scores", scores.entries.len());
                Ok(scores)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No high scores found, starting fresh");
                Ok(Self::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), HighScoreError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

impl ScoreSink for HighScores {
    fn report_final_score(&mut self, score: u64) {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or_default();
        if let Some(rank) = self.add_score(score, timestamp) {
            log::info!("New high score #{}: {}", rank, score);
        }
    }
}
