//! Game state and core simulation types
//!
//! Everything a round mutates lives in `GameState`; the session owns exactly
//! one of these at a time.

use serde::{Deserialize, Serialize};

use super::spawn::SpawnScheduler;
use crate::consts::LANES;
use crate::content::Fact;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for `start`
    #[default]
    Idle,
    /// Active gameplay
    Running,
    /// Round over (crash or exit); terminal
    Ended,
}

/// One of the three tracks. Always in range by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Lane(u8);

impl Lane {
    pub const LEFT: Lane = Lane(0);
    pub const CENTER: Lane = Lane(1);
    pub const RIGHT: Lane = Lane(LANES - 1);
    pub const ALL: [Lane; LANES as usize] = [Lane(0), Lane(1), Lane(2)];

    /// Clamp an arbitrary index into the valid lane range
    pub fn new(index: i32) -> Self {
        Lane(index.clamp(0, LANES as i32 - 1) as u8)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Neighbouring lane in `dir`, clamped at the road edges
    pub fn shifted(self, dir: LaneDirection) -> Self {
        Lane::new(self.0 as i32 + dir.delta())
    }
}

impl Default for Lane {
    fn default() -> Self {
        Lane::CENTER
    }
}

/// A lane-change intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneDirection {
    Left,
    Right,
}

impl LaneDirection {
    pub fn delta(self) -> i32 {
        match self {
            LaneDirection::Left => -1,
            LaneDirection::Right => 1,
        }
    }

    /// Interpret any signed step; only the sign matters, zero is no intent
    pub fn from_delta(delta: i32) -> Option<Self> {
        match delta.signum() {
            -1 => Some(LaneDirection::Left),
            1 => Some(LaneDirection::Right),
            _ => None,
        }
    }
}

/// A hazard falling down a lane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Unique entity ID (shared counter with items)
    pub id: u32,
    /// Lane the obstacle falls in
    pub lane: Lane,
    /// Top edge; negative means above the visible area
    pub y: f32,
}

/// Collectible effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Shield,
    Slow,
    Boost,
    Trivia,
}

impl ItemKind {
    pub const ALL: [ItemKind; 4] = [
        ItemKind::Shield,
        ItemKind::Slow,
        ItemKind::Boost,
        ItemKind::Trivia,
    ];

    /// Toast headline
    pub fn title(self) -> &'static str {
        match self {
            ItemKind::Shield => "Shield!",
            ItemKind::Slow => "Slow-mo!",
            ItemKind::Boost => "Score boost!",
            ItemKind::Trivia => "Trivia!",
        }
    }

    /// Badge shown on the item; trivia items show the fact's own emoji
    pub fn badge<'a>(self, fact_emoji: &'a str) -> &'a str {
        match self {
            ItemKind::Shield => "🛡️",
            ItemKind::Slow => "🐢",
            ItemKind::Boost => "✨",
            ItemKind::Trivia => fact_emoji,
        }
    }
}

/// A collectible falling down a lane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique entity ID (shared counter with obstacles)
    pub id: u32,
    /// Lane the item falls in
    pub lane: Lane,
    /// Top edge; negative means above the visible area
    pub y: f32,
    /// Effect applied on pickup
    pub kind: ItemKind,
    /// Display payload, shown in the toast
    pub fact: Fact,
}

/// Live obstacles and items plus the id counter they share
#[derive(Debug, Clone)]
pub struct EntityStore {
    /// Obstacles in spawn order
    pub obstacles: Vec<Obstacle>,
    /// Items in spawn order
    pub items: Vec<Item>,
    /// Next ID to hand out; starts at 1
    next_id: u32,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    /// Create an empty store whose first ID is 1
    pub fn new() -> Self {
        Self {
            obstacles: Vec::new(),
            items: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add an obstacle at `y` in `lane`, returning its new ID
    pub fn push_obstacle(&mut self, lane: Lane, y: f32) -> u32 {
        let id = self.next_entity_id();
        self.obstacles.push(Obstacle { id, lane, y });
        id
    }

    /// Add an item at `y` in `lane`, returning its new ID
    pub fn push_item(&mut self, lane: Lane, y: f32, kind: ItemKind, fact: Fact) -> u32 {
        let id = self.next_entity_id();
        self.items.push(Item {
            id,
            lane,
            y,
            kind,
            fact,
        });
        id
    }

    /// Remove every entity and restart IDs (new round)
    pub fn clear(&mut self) {
        self.obstacles.clear();
        self.items.clear();
        self.next_id = 1;
    }
}

/// Timed and single-use status effects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffects {
    /// Absorbs the next obstacle hit
    pub shield_active: bool,
    /// Slow-mo applies while the frame clock is before this instant (ms)
    pub slow_until_ms: f64,
}

impl ActiveEffects {
    /// Whether obstacle speed is damped at `now_ms`
    #[inline]
    pub fn slow_active(&self, now_ms: f64) -> bool {
        now_ms < self.slow_until_ms
    }
}

/// Auto-expiring notice about the last collected item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    /// Headline for the item kind ("Shield!", ...)
    pub title: String,
    /// Badge plus the fact's title and subtitle
    pub subtitle: String,
    /// Badge emoji
    pub emoji: String,
    /// Hidden at or after this frame timestamp (ms)
    #[serde(skip)]
    pub until_ms: f64,
}

impl Toast {
    /// Build the notice for picking up `kind` carrying `fact`
    pub fn for_item(kind: ItemKind, fact: &Fact, until_ms: f64) -> Self {
        let emoji = kind.badge(&fact.emoji).to_string();
        let subtitle = match &fact.subtitle {
            Some(sub) => format!("{} {} - {}", emoji, fact.title, sub),
            None => format!("{} {}", emoji, fact.title),
        };
        Self {
            title: kind.title().to_string(),
            subtitle,
            emoji,
            until_ms,
        }
    }
}

/// Something the presentation layer may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Player picked up an item (already removed from the store)
    ItemCollected { id: u32, kind: ItemKind },
    /// Shield absorbed an obstacle, which was removed
    ShieldConsumed { obstacle_id: u32 },
    /// Unshielded hit; the round is over
    Crashed { obstacle_id: u32, final_score: u64 },
}

/// Complete state of one round
#[derive(Debug, Clone)]
pub struct GameState {
    /// Current phase of the round
    pub phase: GamePhase,
    /// Lane the player car occupies
    pub lane: Lane,
    /// Fractional score accumulator; floored when shown or reported
    pub score: f64,
    /// Seconds of simulated play this round
    pub elapsed: f32,
    /// Shield and slow-mo
    pub effects: ActiveEffects,
    /// Notice about the last pickup, if still showing
    pub toast: Option<Toast>,
    /// Obstacles and items in flight
    pub entities: EntityStore,
    /// Spawn timers and the seeded RNG
    pub spawner: SpawnScheduler,
    /// Set once, on the crash that ends the round
    pub final_score: Option<u64>,
}

impl GameState {
    /// Create an idle state with the given spawn seed
    pub fn new(seed: u64) -> Self {
        Self {
            phase: GamePhase::Idle,
            lane: Lane::CENTER,
            score: 0.0,
            elapsed: 0.0,
            effects: ActiveEffects::default(),
            toast: None,
            entities: EntityStore::new(),
            spawner: SpawnScheduler::new(seed),
            final_score: None,
        }
    }

    /// Full reset into a fresh running round
    pub fn start(&mut self) {
        self.phase = GamePhase::Running;
        self.lane = Lane::CENTER;
        self.score = 0.0;
        self.elapsed = 0.0;
        self.effects = ActiveEffects::default();
        self.toast = None;
        self.entities.clear();
        self.spawner.reset();
        self.final_score = None;
    }

    /// Whether steps are applied
    #[inline]
    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Score as shown to the player
    #[inline]
    pub fn display_score(&self) -> u64 {
        self.score.max(0.0).floor() as u64
    }
}
