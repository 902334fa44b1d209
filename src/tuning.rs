//! Game balance and timing constants
//!
//! Every gameplay number lives here so a round can be re-tuned from a JSON
//! file without touching the simulation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Problems loading or validating a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Data-driven game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Speed ===
    /// Obstacle speed at round start (px/s)
    pub base_speed: f32,
    /// Speed gained per second survived (px/s²)
    pub speed_ramp: f32,
    /// Items drift at this fraction of obstacle speed
    pub item_speed_factor: f32,

    // === Difficulty ramp ===
    /// Seconds until the obstacle interval bottoms out
    pub ramp_seconds: f32,
    /// Obstacle spawn interval at round start (ms)
    pub obstacle_interval_start_ms: f32,
    /// Obstacle spawn interval once the ramp completes (ms)
    pub obstacle_interval_min_ms: f32,

    // === Items ===
    pub item_interval_min_ms: u32,
    pub item_interval_max_ms: u32,
    /// Delay range before the very first item roll (ms)
    pub first_item_min_ms: u32,
    pub first_item_max_ms: u32,

    // === Effects ===
    /// Speed multiplier while slow-mo is active
    pub slow_factor: f32,
    /// How long one slow-mo pickup lasts (ms)
    pub slow_duration_ms: f64,
    /// How long an item toast stays up (ms)
    pub toast_duration_ms: f64,
    /// Flat score for a boost pickup
    pub boost_bonus: f64,
    /// Flat score for a trivia pickup
    pub trivia_bonus: f64,
    /// Survival score per second
    pub score_per_second: f64,

    // === Timing ===
    /// Largest frame delta fed to the simulation (ms)
    pub max_frame_ms: f64,
    /// Minimum gap between published UI snapshots (ms)
    pub publish_interval_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_speed: 280.0,
            speed_ramp: 3.5,
            item_speed_factor: 0.9,

            ramp_seconds: 70.0,
            obstacle_interval_start_ms: 950.0,
            obstacle_interval_min_ms: 360.0,

            item_interval_min_ms: 2200,
            item_interval_max_ms: 3600,
            first_item_min_ms: 900,
            first_item_max_ms: 1500,

            slow_factor: 0.65,
            slow_duration_ms: 3200.0,
            toast_duration_ms: 2000.0,
            boost_bonus: 150.0,
            trivia_bonus: 60.0,
            score_per_second: 10.0,

            max_frame_ms: 50.0,
            publish_interval_ms: 33.0,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning file; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject ranges the simulation cannot honor
    pub fn validate(&self) -> Result<(), TuningError> {
        let reals = [
            ("base_speed", self.base_speed as f64),
            ("speed_ramp", self.speed_ramp as f64),
            ("item_speed_factor", self.item_speed_factor as f64),
            ("ramp_seconds", self.ramp_seconds as f64),
            ("obstacle_interval_start_ms", self.obstacle_interval_start_ms as f64),
            ("obstacle_interval_min_ms", self.obstacle_interval_min_ms as f64),
            ("slow_factor", self.slow_factor as f64),
            ("slow_duration_ms", self.slow_duration_ms),
            ("toast_duration_ms", self.toast_duration_ms),
            ("boost_bonus", self.boost_bonus),
            ("trivia_bonus", self.trivia_bonus),
            ("score_per_second", self.score_per_second),
            ("max_frame_ms", self.max_frame_ms),
            ("publish_interval_ms", self.publish_interval_ms),
        ];
        if let Some((name, value)) = reals.iter().find(|(_, v)| !v.is_finite()) {
            return Err(TuningError::Invalid(format!("{} is not finite ({})", name, value)));
        }

        // Score never decreases while a round runs
        if self.boost_bonus < 0.0 || self.trivia_bonus < 0.0 || self.score_per_second < 0.0 {
            return Err(TuningError::Invalid(
                "score bonuses and survival rate must be non-negative".into(),
            ));
        }
        if self.ramp_seconds <= 0.0 || self.slow_duration_ms <= 0.0 || self.toast_duration_ms <= 0.0
        {
            return Err(TuningError::Invalid(
                "ramp, slow-mo and toast durations must be positive".into(),
            ));
        }
        if self.item_interval_min_ms > self.item_interval_max_ms {
            return Err(TuningError::Invalid(format!(
                "item interval min {} exceeds max {}",
                self.item_interval_min_ms, self.item_interval_max_ms
            )));
        }
        if self.first_item_min_ms > self.first_item_max_ms {
            return Err(TuningError::Invalid(format!(
                "first item delay min {} exceeds max {}",
                self.first_item_min_ms, self.first_item_max_ms
            )));
        }
        if self.obstacle_interval_min_ms <= 0.0
            || self.obstacle_interval_start_ms < self.obstacle_interval_min_ms
        {
            return Err(TuningError::Invalid(
                "obstacle interval must shrink from start to a positive minimum".into(),
            ));
        }
        if !(self.slow_factor > 0.0 && self.slow_factor <= 1.0) {
            return Err(TuningError::Invalid(format!(
                "slow factor {} must be in (0, 1]",
                self.slow_factor
            )));
        }
        if self.base_speed < 0.0 || self.speed_ramp < 0.0 || self.item_speed_factor <= 0.0 {
            return Err(TuningError::Invalid("speeds must be non-negative".into()));
        }
        if self.max_frame_ms <= 0.0 || self.publish_interval_ms < 0.0 {
            return Err(TuningError::Invalid(
                "frame clamp must be positive and publish interval non-negative".into(),
            ));
        }
        Ok(())
    }

    /// Load tuning from a file path, falling back to defaults on any problem
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_or_default(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path.display());
                    tuning
                }
                Err(e) => {
                    log::warn!("Ignoring {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}
