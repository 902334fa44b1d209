//! Round lifecycle and the boundary to the host
//!
//! A `Session` owns the game state and both clocks. The host calls `frame`
//! on every display refresh, forwards lane-change intents, and draws the
//! snapshots it gets back. Final scores leave through the `ScoreSink`.

use serde::Serialize;

use crate::content::ContentProvider;
use crate::driver::{LoopDriver, PublishThrottle};
use crate::highscores::ScoreSink;
use crate::sim::{
    GameEvent, GamePhase, GameState, ItemKind, Lane, LaneDirection, Playfield, Rect, TickContext,
    Toast, tick,
};
use crate::tuning::Tuning;

/// Obstacle as the renderer sees it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObstacleView {
    pub id: u32,
    pub lane: Lane,
    /// Screen-space bounds in the current playfield
    pub rect: Rect,
}

/// Item as the renderer sees it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemView {
    pub id: u32,
    pub lane: Lane,
    pub kind: ItemKind,
    pub rect: Rect,
    /// Badge to draw (the fact's emoji for trivia)
    pub emoji: String,
    /// Colour hint from the fact
    pub color: String,
}

/// Read-only picture of the round for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub lane: Lane,
    /// Player car bounds
    pub player: Rect,
    pub obstacles: Vec<ObstacleView>,
    pub items: Vec<ItemView>,
    /// Floored score
    pub score: u64,
    pub shield_active: bool,
    /// Slow-mo damping applies at the snapshot's timestamp
    pub slow_mo: bool,
    pub toast: Option<Toast>,
    pub elapsed: f32,
}

/// Outcome of one host frame
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    /// Events raised by the simulation step, if one ran
    pub events: Vec<GameEvent>,
    /// Present when the throttle allows a UI update (always on the final frame)
    pub snapshot: Option<Snapshot>,
    /// Final score, reported on the one frame the round crashed
    pub game_over: Option<u64>,
}

/// One player's game: the round state, its clocks, and the collaborators
/// that supply facts (`P`) and receive final scores (`S`)
pub struct Session<P, S> {
    state: GameState,
    tuning: Tuning,
    playfield: Playfield,
    content: P,
    sink: S,
    driver: LoopDriver,
    throttle: PublishThrottle,
    /// Guards the single hand-off to `sink` per round
    score_reported: bool,
}

impl<P: ContentProvider, S: ScoreSink> Session<P, S> {
    /// Create an idle session. The playfield starts empty, so nothing ticks
    /// until the host calls `set_playfield`.
    pub fn new(tuning: Tuning, content: P, sink: S, seed: u64) -> Self {
        Self {
            state: GameState::new(seed),
            driver: LoopDriver::new(tuning.max_frame_ms),
            throttle: PublishThrottle::new(tuning.publish_interval_ms),
            tuning,
            playfield: Playfield::default(),
            content,
            sink,
            score_reported: false,
        }
    }

    /// Host layout changed; an empty area pauses the loop
    pub fn set_playfield(&mut self, width: f32, height: f32) {
        self.playfield = Playfield::new(width, height);
    }

    /// Idle/Ended -> Running with everything reset
    pub fn start(&mut self) {
        self.state.start();
        self.driver.frame(false, 0.0);
        self.throttle.reset();
        self.score_reported = false;
        log::info!("Round started (seed {})", self.state.spawner.seed());
    }

    /// Player quit: the round ends without a score hand-off
    pub fn exit(&mut self) {
        if self.state.phase == GamePhase::Ended {
            return;
        }
        log::info!(
            "Round abandoned at {} points after {:.1}s",
            self.state.display_score(),
            self.state.elapsed
        );
        self.state.phase = GamePhase::Ended;
    }

    /// Move one lane; clamped at the road edges, ignored once the round ended
    pub fn request_lane_change(&mut self, dir: LaneDirection) -> Lane {
        if self.state.phase != GamePhase::Ended {
            self.state.lane = self.state.lane.shifted(dir);
        }
        self.state.lane
    }

    /// Untyped form of `request_lane_change`; only the sign of `delta` counts
    pub fn request_lane_step(&mut self, delta: i32) -> Lane {
        match LaneDirection::from_delta(delta) {
            Some(dir) => self.request_lane_change(dir),
            None => self.state.lane,
        }
    }

    /// Advance by one host frame at monotonic timestamp `now_ms`
    pub fn frame(&mut self, now_ms: f64) -> FrameReport {
        let active = self.state.is_running() && self.playfield.is_valid();
        let Some(dt) = self.driver.frame(active, now_ms) else {
            return FrameReport::default();
        };

        let facts = self.content.facts();
        let ctx = TickContext {
            playfield: self.playfield,
            tuning: &self.tuning,
            facts: &facts,
        };
        let events = tick(&mut self.state, &ctx, dt, now_ms);
        let mut report = FrameReport {
            events,
            ..Default::default()
        };

        if self.state.phase == GamePhase::Ended {
            if let Some(score) = self.state.final_score {
                if !self.score_reported {
                    self.score_reported = true;
                    self.sink.report_final_score(score);
                    report.game_over = Some(score);
                }
            }
            self.throttle.force(now_ms);
            report.snapshot = Some(self.snapshot(now_ms));
        } else if self.throttle.ready(now_ms) {
            report.snapshot = Some(self.snapshot(now_ms));
        }

        report
    }

    /// Read-only picture of the round in screen space, evaluated at `now_ms`
    pub fn snapshot(&self, now_ms: f64) -> Snapshot {
        let field = &self.playfield;
        Snapshot {
            phase: self.state.phase,
            lane: self.state.lane,
            player: field.car_rect(self.state.lane),
            obstacles: self
                .state
                .entities
                .obstacles
                .iter()
                .map(|o| ObstacleView {
                    id: o.id,
                    lane: o.lane,
                    rect: field.obstacle_rect(o),
                })
                .collect(),
            items: self
                .state
                .entities
                .items
                .iter()
                .map(|i| ItemView {
                    id: i.id,
                    lane: i.lane,
                    kind: i.kind,
                    rect: field.item_rect(i),
                    emoji: i.kind.badge(&i.fact.emoji).to_string(),
                    color: i.fact.color.clone(),
                })
                .collect(),
            score: self.state.display_score(),
            shield_active: self.state.effects.shield_active,
            slow_mo: self.state.effects.slow_active(now_ms),
            toast: self.state.toast.clone(),
            elapsed: self.state.elapsed,
        }
    }

    /// Current round phase
    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Full simulation state (read-only)
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Layout the last frame was simulated against
    pub fn playfield(&self) -> &Playfield {
        &self.playfield
    }

    pub fn content(&self) -> &P {
        &self.content
    }

    /// Mutable access for hosts that finish a content load mid-session
    pub fn content_mut(&mut self) -> &mut P {
        &mut self.content
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Tear down the session, handing back the score sink
    pub fn into_sink(self) -> S {
        self.sink
    }
}
