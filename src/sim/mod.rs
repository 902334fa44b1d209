//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only from the frame timestamps the caller passes in
//! - Seeded RNG only
//! - Stable iteration order (store order)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod geometry;
pub mod playfield;
pub mod spawn;
pub mod state;
pub mod tick;

pub use autopilot::suggest_lane_change;
pub use geometry::{Rect, intersects};
pub use playfield::Playfield;
pub use spawn::{SpawnScheduler, Spawned, obstacle_interval_ms};
pub use state::{
    ActiveEffects, EntityStore, GameEvent, GamePhase, GameState, Item, ItemKind, Lane,
    LaneDirection, Obstacle, Toast,
};
pub use tick::{TickContext, current_speed, tick};
