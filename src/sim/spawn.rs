//! Procedural spawning under the difficulty ramp
//!
//! Two independent timers: obstacles on an interval that shrinks as the ramp
//! progresses, items on a randomly re-rolled interval. Neither fires on the
//! first call; that call only seeds the baseline.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{EntityStore, ItemKind, Lane};
use crate::consts::{ITEM_SIZE, LANES, OBSTACLE_SIZE};
use crate::content::Fact;
use crate::tuning::Tuning;
use crate::{lerp, ramp_fraction};

/// What a single spawn pass produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Spawned {
    /// Id of the obstacle added this pass
    pub obstacle: Option<u32>,
    /// Id of the item added this pass
    pub item: Option<u32>,
}

/// Obstacle interval (whole ms) for the given ramp progress
pub fn obstacle_interval_ms(tuning: &Tuning, ramp: f32) -> f64 {
    lerp(
        tuning.obstacle_interval_start_ms,
        tuning.obstacle_interval_min_ms,
        ramp,
    )
    .floor() as f64
}

/// Spawn timers plus the seeded RNG behind every spawn roll
#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    seed: u64,
    rng: Pcg32,
    last_obstacle_ms: Option<f64>,
    next_item_ms: Option<f64>,
}

impl SpawnScheduler {
    /// Create a scheduler with unseeded timers and an RNG stream from `seed`
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            last_obstacle_ms: None,
            next_item_ms: None,
        }
    }

    /// Seed the RNG was created from (for replaying a round)
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Forget both timers. The RNG keeps its stream so consecutive rounds differ.
    pub fn reset(&mut self) {
        self.last_obstacle_ms = None;
        self.next_item_ms = None;
    }

    /// When the next item may appear, once the baseline is seeded
    pub fn next_item_ms(&self) -> Option<f64> {
        self.next_item_ms
    }

    /// Run one spawn pass at `now_ms`, appending anything due to `store`
    pub fn spawn(
        &mut self,
        tuning: &Tuning,
        elapsed: f32,
        now_ms: f64,
        facts: &[Fact],
        store: &mut EntityStore,
    ) -> Spawned {
        let mut spawned = Spawned::default();

        // Obstacles
        let ramp = ramp_fraction(elapsed, tuning.ramp_seconds);
        let interval = obstacle_interval_ms(tuning, ramp);
        let last = *self.last_obstacle_ms.get_or_insert(now_ms);
        if now_ms - last >= interval {
            self.last_obstacle_ms = Some(now_ms);
            let lane = self.roll_lane();
            let id = store.push_obstacle(lane, -OBSTACLE_SIZE);
            log::debug!("Obstacle {} in lane {} (interval {}ms)", id, lane.index(), interval);
            spawned.obstacle = Some(id);
        }

        // Items
        let next = match self.next_item_ms {
            Some(next) => next,
            None => {
                let delay = self.roll_ms(tuning.first_item_min_ms, tuning.first_item_max_ms);
                let next = now_ms + delay;
                self.next_item_ms = Some(next);
                next
            }
        };
        // An empty pool leaves the timer expired so the next pass retries
        if now_ms >= next && !facts.is_empty() {
            let delay = self.roll_ms(tuning.item_interval_min_ms, tuning.item_interval_max_ms);
            self.next_item_ms = Some(now_ms + delay);

            let lane = self.roll_lane();
            let kind = ItemKind::ALL[self.rng.random_range(0..ItemKind::ALL.len())];
            let fact = facts[self.rng.random_range(0..facts.len())].clone();
            let id = store.push_item(lane, -ITEM_SIZE, kind, fact);
            log::debug!("Item {} ({:?}) in lane {}", id, kind, lane.index());
            spawned.item = Some(id);
        }

        spawned
    }

    /// Uniform lane pick
    fn roll_lane(&mut self) -> Lane {
        Lane::new(self.rng.random_range(0..LANES as i32))
    }

    /// Uniform whole-ms delay in [min, max]
    fn roll_ms(&mut self, min: u32, max: u32) -> f64 {
        self.rng.random_range(min..=max) as f64
    }
}
