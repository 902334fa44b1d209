//! Lane Dash - A three-lane dodge-and-collect arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, movement, collisions, effects)
//! - `driver`: Frame timing harness and presentation throttle
//! - `session`: Round lifecycle and the boundary to UI/persistence
//! - `content`: Collectible fact pool with a built-in fallback
//! - `tuning`: Data-driven game balance
//! - `highscores`: Best-score tracking for the persistence collaborator

pub mod content;
pub mod driver;
pub mod highscores;
pub mod session;
pub mod sim;
pub mod tuning;

pub use content::{ContentCache, ContentProvider, Fact, FactCategory, FactPool};
pub use highscores::{HighScores, ScoreSink};
pub use session::{FrameReport, Session, Snapshot};
pub use tuning::Tuning;

/// Layout constants (screen-space units)
pub mod consts {
    /// Number of lanes on the road
    pub const LANES: u8 = 3;

    /// Road width limits; the road is centred in the play area
    pub const ROAD_MAX_WIDTH: f32 = 420.0;
    pub const ROAD_MIN_WIDTH: f32 = 240.0;
    pub const ROAD_SIDE_PADDING: f32 = 16.0;

    /// Player car
    pub const CAR_WIDTH: f32 = 46.0;
    pub const CAR_HEIGHT: f32 = 72.0;
    /// Gap between the car and the bottom of the play area
    pub const CAR_BOTTOM_MARGIN: f32 = 36.0;
    /// The car never sits higher than this, even on tiny play areas
    pub const CAR_MIN_Y: f32 = 60.0;

    /// Square hazard size
    pub const OBSTACLE_SIZE: f32 = 54.0;
    /// Square collectible size
    pub const ITEM_SIZE: f32 = 44.0;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Normalized progress through the difficulty window, clamped to [0, 1]
#[inline]
pub fn ramp_fraction(elapsed_secs: f32, ramp_secs: f32) -> f32 {
    if ramp_secs <= 0.0 {
        return 1.0;
    }
    (elapsed_secs / ramp_secs).clamp(0.0, 1.0)
}
