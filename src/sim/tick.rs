//! Per-frame simulation step
//!
//! Order within a step is fixed: advance time, spawn, move, cull, expire the
//! toast, resolve items, resolve obstacles, then accrue survival score.

use super::geometry::intersects;
use super::playfield::Playfield;
use super::state::{GameEvent, GamePhase, GameState, ItemKind, Toast};
use crate::consts::{ITEM_SIZE, OBSTACLE_SIZE};
use crate::content::Fact;
use crate::tuning::Tuning;

/// Read-only inputs shared by every step of a round
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    /// Layout used for collision rectangles and culling
    pub playfield: Playfield,
    /// Balance constants
    pub tuning: &'a Tuning,
    /// Pool items draw their payload from; may be empty
    pub facts: &'a [Fact],
}

/// Obstacle speed (px/s) at the current elapsed time, damped during slow-mo
pub fn current_speed(state: &GameState, tuning: &Tuning, now_ms: f64) -> f32 {
    let base = tuning.base_speed + tuning.speed_ramp * state.elapsed;
    if state.effects.slow_active(now_ms) {
        base * tuning.slow_factor
    } else {
        base
    }
}

/// Advance a running round by `dt_sec`, with `now_ms` as the frame timestamp.
///
/// Does nothing unless the round is running. Returns the events raised during
/// the step; a `Crashed` event means the round has ended.
pub fn tick(state: &mut GameState, ctx: &TickContext<'_>, dt_sec: f32, now_ms: f64) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.phase != GamePhase::Running {
        return events;
    }
    let dt = dt_sec.max(0.0);
    let tuning = ctx.tuning;
    let field = &ctx.playfield;

    state.elapsed += dt;

    let speed = current_speed(state, tuning, now_ms);
    let item_speed = speed * tuning.item_speed_factor;

    state
        .spawner
        .spawn(tuning, state.elapsed, now_ms, ctx.facts, &mut state.entities);

    for obstacle in &mut state.entities.obstacles {
        obstacle.y += speed * dt;
    }
    for item in &mut state.entities.items {
        item.y += item_speed * dt;
    }

    let obstacle_cull = field.cull_line(OBSTACLE_SIZE);
    let item_cull = field.cull_line(ITEM_SIZE);
    state.entities.obstacles.retain(|o| o.y < obstacle_cull);
    state.entities.items.retain(|i| i.y < item_cull);

    if state.toast.as_ref().is_some_and(|t| now_ms >= t.until_ms) {
        state.toast = None;
    }

    let car = field.car_rect(state.lane);

    // Items first: a shield picked up this frame already protects against
    // an obstacle hit this frame.
    let items = std::mem::take(&mut state.entities.items);
    for item in items {
        if !intersects(&car, &field.item_rect(&item)) {
            state.entities.items.push(item);
            continue;
        }
        match item.kind {
            ItemKind::Shield => state.effects.shield_active = true,
            ItemKind::Slow => state.effects.slow_until_ms = now_ms + tuning.slow_duration_ms,
            ItemKind::Boost => state.score += tuning.boost_bonus,
            ItemKind::Trivia => state.score += tuning.trivia_bonus,
        }
        log::debug!("Collected {:?} item {} ({})", item.kind, item.id, item.fact.title);
        state.toast = Some(Toast::for_item(
            item.kind,
            &item.fact,
            now_ms + tuning.toast_duration_ms,
        ));
        events.push(GameEvent::ItemCollected {
            id: item.id,
            kind: item.kind,
        });
    }

    // At most one obstacle hit per frame
    let hit = state
        .entities
        .obstacles
        .iter()
        .position(|o| intersects(&car, &field.obstacle_rect(o)));
    if let Some(index) = hit {
        if state.effects.shield_active {
            let obstacle = state.entities.obstacles.remove(index);
            state.effects.shield_active = false;
            log::debug!("Shield absorbed obstacle {}", obstacle.id);
            events.push(GameEvent::ShieldConsumed {
                obstacle_id: obstacle.id,
            });
        } else {
            let obstacle_id = state.entities.obstacles[index].id;
            let final_score = state.display_score();
            state.score = final_score as f64;
            state.final_score = Some(final_score);
            state.phase = GamePhase::Ended;
            log::info!(
                "Crashed into obstacle {} after {:.1}s, score {}",
                obstacle_id,
                state.elapsed,
                final_score
            );
            events.push(GameEvent::Crashed {
                obstacle_id,
                final_score,
            });
            return events;
        }
    }

    state.score += tuning.score_per_second * dt as f64;

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fallback_facts;
    use crate::sim::spawn::obstacle_interval_ms;
    use crate::sim::state::Lane;
    use crate::ramp_fraction;
    use proptest::prelude::*;
    use std::collections::HashMap;

    const FRAME: f32 = 1.0 / 60.0;

    fn field() -> Playfield {
        Playfield::new(400.0, 800.0)
    }

    fn running_state() -> GameState {
        let mut state = GameState::new(12345);
        state.start();
        state
    }

    fn fact() -> Fact {
        fallback_facts().remove(0)
    }

    #[test]
    fn test_idle_and_ended_do_not_tick() {
        let tuning = Tuning::default();
        let facts = fallback_facts();
        let ctx = TickContext {
            playfield: field(),
            tuning: &tuning,
            facts: &facts,
        };

        let mut state = GameState::new(1);
        tick(&mut state, &ctx, FRAME, 0.0);
        assert_eq!(state.elapsed, 0.0);

        state.start();
        state.phase = GamePhase::Ended;
        state.score = 12.0;
        tick(&mut state, &ctx, FRAME, 16.0);
        assert_eq!(state.elapsed, 0.0);
        assert_eq!(state.score, 12.0);
    }

    #[test]
    fn test_survival_score_accrues() {
        let tuning = Tuning::default();
        let ctx = TickContext {
            playfield: field(),
            tuning: &tuning,
            facts: &[],
        };
        let mut state = running_state();
        for frame in 0..60 {
            tick(&mut state, &ctx, FRAME, frame as f64 * 16.0);
        }
        assert!((state.score - 10.0).abs() < 1e-3);
        assert!((state.elapsed - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_survival_score_accrues_at_large_totals() {
        let tuning = Tuning::default();
        let ctx = TickContext {
            playfield: field(),
            tuning: &tuning,
            facts: &[],
        };
        let mut state = running_state();
        state.score = 5_000_000.0;
        for frame in 0..60 {
            tick(&mut state, &ctx, FRAME, frame as f64 * 16.0);
        }
        assert!((state.score - 5_000_010.0).abs() < 1e-3);
    }

    #[test]
    fn test_shield_absorbs_one_obstacle() {
        let tuning = Tuning::default();
        let ctx = TickContext {
            playfield: field(),
            tuning: &tuning,
            facts: &[],
        };
        let mut state = running_state();
        state.effects.shield_active = true;
        let id = state.entities.push_obstacle(state.lane, field().car_y());

        let events = tick(&mut state, &ctx, FRAME, 0.0);
        assert!(!state.effects.shield_active);
        assert!(state.entities.obstacles.iter().all(|o| o.id != id));
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(events, vec![GameEvent::ShieldConsumed { obstacle_id: id }]);
    }

    #[test]
    fn test_unshielded_crash_ends_round() {
        let tuning = Tuning::default();
        let ctx = TickContext {
            playfield: field(),
            tuning: &tuning,
            facts: &[],
        };
        let mut state = running_state();
        state.score = 123.7;
        let id = state.entities.push_obstacle(state.lane, field().car_y() + 10.0);

        let events = tick(&mut state, &ctx, FRAME, 0.0);
        assert_eq!(state.phase, GamePhase::Ended);
        assert_eq!(state.final_score, Some(123));
        assert_eq!(state.score, 123.0);
        assert_eq!(
            events,
            vec![GameEvent::Crashed {
                obstacle_id: id,
                final_score: 123
            }]
        );

        // Frozen afterwards
        tick(&mut state, &ctx, FRAME, 16.0);
        assert_eq!(state.score, 123.0);
    }

    #[test]
    fn test_only_first_overlapping_obstacle_resolves() {
        let tuning = Tuning::default();
        let ctx = TickContext {
            playfield: field(),
            tuning: &tuning,
            facts: &[],
        };
        let mut state = running_state();
        state.effects.shield_active = true;
        let first = state.entities.push_obstacle(state.lane, field().car_y());
        let second = state.entities.push_obstacle(state.lane, field().car_y() + 5.0);
        let elsewhere = state.entities.push_obstacle(Lane::LEFT, 100.0);

        tick(&mut state, &ctx, FRAME, 0.0);
        assert_eq!(state.phase, GamePhase::Running);
        let ids: Vec<u32> = state.entities.obstacles.iter().map(|o| o.id).collect();
        assert!(!ids.contains(&first));
        assert!(ids.contains(&second));
        assert!(ids.contains(&elsewhere));

        // Second one lands next frame with no shield left
        tick(&mut state, &ctx, FRAME, 16.0);
        assert_eq!(state.phase, GamePhase::Ended);
    }

    #[test]
    fn test_item_pickup_precedes_obstacle_hit() {
        let tuning = Tuning::default();
        let ctx = TickContext {
            playfield: field(),
            tuning: &tuning,
            facts: &[],
        };
        let mut state = running_state();
        let y = field().car_y();
        state.entities.push_item(state.lane, y, ItemKind::Shield, fact());
        state.entities.push_obstacle(state.lane, y);

        let events = tick(&mut state, &ctx, FRAME, 0.0);
        assert_eq!(state.phase, GamePhase::Running);
        assert!(!state.effects.shield_active);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], GameEvent::ItemCollected { kind: ItemKind::Shield, .. }));
        assert!(matches!(events[1], GameEvent::ShieldConsumed { .. }));
    }

    #[test]
    fn test_boost_adds_exact_bonus() {
        let tuning = Tuning::default();
        let ctx = TickContext {
            playfield: field(),
            tuning: &tuning,
            facts: &[],
        };
        let mut state = running_state();
        let y = field().car_y();
        let taken = state.entities.push_item(state.lane, y, ItemKind::Boost, fact());
        let kept = state.entities.push_item(Lane::LEFT, y, ItemKind::Boost, fact());

        // Zero-length frame isolates the bonus from survival scoring
        tick(&mut state, &ctx, 0.0, 0.0);
        assert_eq!(state.score, tuning.boost_bonus);
        assert!(state.entities.items.iter().all(|i| i.id != taken));

        let other = state.entities.items.iter().find(|i| i.id == kept).unwrap();
        assert_eq!(other.kind, ItemKind::Boost);
        assert_eq!(other.lane, Lane::LEFT);
        assert_eq!(other.y, y);

        let toast = state.toast.as_ref().unwrap();
        assert_eq!(toast.title, "Score boost!");
        assert_eq!(toast.until_ms, tuning.toast_duration_ms);
    }

    #[test]
    fn test_trivia_and_shield_effects() {
        let tuning = Tuning::default();
        let ctx = TickContext {
            playfield: field(),
            tuning: &tuning,
            facts: &[],
        };
        let mut state = running_state();
        let y = field().car_y();
        state.entities.push_item(state.lane, y, ItemKind::Trivia, fact());
        state.entities.push_item(state.lane, y, ItemKind::Shield, fact());

        tick(&mut state, &ctx, 0.0, 0.0);
        assert_eq!(state.score, tuning.trivia_bonus);
        assert!(state.effects.shield_active);
        assert!(state.entities.items.is_empty());

        // A second shield while one is active changes nothing else
        state.entities.push_item(state.lane, y, ItemKind::Shield, fact());
        tick(&mut state, &ctx, 0.0, 10.0);
        assert!(state.effects.shield_active);
        assert!(state.entities.items.is_empty());
    }

    #[test]
    fn test_toast_expires() {
        let tuning = Tuning::default();
        let ctx = TickContext {
            playfield: field(),
            tuning: &tuning,
            facts: &[],
        };
        let mut state = running_state();
        state
            .entities
            .push_item(state.lane, field().car_y(), ItemKind::Trivia, fact());
        tick(&mut state, &ctx, 0.0, 1000.0);
        assert!(state.toast.is_some());

        tick(&mut state, &ctx, 0.0, 2999.0);
        assert!(state.toast.is_some());
        tick(&mut state, &ctx, 0.0, 3000.0);
        assert!(state.toast.is_none());
    }

    #[test]
    fn test_slow_mo_window() {
        let tuning = Tuning::default();
        let ctx = TickContext {
            playfield: field(),
            tuning: &tuning,
            facts: &[],
        };
        let mut state = running_state();
        let t0 = 5000.0;
        state
            .entities
            .push_item(state.lane, field().car_y(), ItemKind::Slow, fact());
        tick(&mut state, &ctx, 0.0, t0);
        assert_eq!(state.effects.slow_until_ms, t0 + 3200.0);

        let marker = state.entities.push_obstacle(Lane::LEFT, 0.0);
        let y_of = |state: &GameState| {
            state
                .entities
                .obstacles
                .iter()
                .find(|o| o.id == marker)
                .map(|o| o.y)
                .unwrap()
        };

        let before = y_of(&state);
        tick(&mut state, &ctx, FRAME, t0 + 3199.0);
        let damped = (tuning.base_speed + tuning.speed_ramp * state.elapsed) * 0.65 * FRAME;
        assert!((y_of(&state) - before - damped).abs() < 1e-3);

        let before = y_of(&state);
        tick(&mut state, &ctx, FRAME, t0 + 3201.0);
        let full = (tuning.base_speed + tuning.speed_ramp * state.elapsed) * FRAME;
        assert!((y_of(&state) - before - full).abs() < 1e-3);
    }

    #[test]
    fn test_second_slow_pickup_refreshes_window() {
        let tuning = Tuning::default();
        let ctx = TickContext {
            playfield: field(),
            tuning: &tuning,
            facts: &[],
        };
        let mut state = running_state();
        let t0 = 5000.0;
        let y = field().car_y();
        state.entities.push_item(state.lane, y, ItemKind::Slow, fact());
        tick(&mut state, &ctx, 0.0, t0);
        assert_eq!(state.effects.slow_until_ms, t0 + 3200.0);

        state.entities.push_item(state.lane, y, ItemKind::Slow, fact());
        tick(&mut state, &ctx, 0.0, t0 + 2000.0);
        assert_eq!(state.effects.slow_until_ms, t0 + 5200.0);

        // Past the first window, still inside the refreshed one
        let marker = state.entities.push_obstacle(Lane::LEFT, 0.0);
        tick(&mut state, &ctx, FRAME, t0 + 5199.0);
        let moved = state
            .entities
            .obstacles
            .iter()
            .find(|o| o.id == marker)
            .map(|o| o.y)
            .unwrap();
        let damped = (tuning.base_speed + tuning.speed_ramp * state.elapsed) * 0.65 * FRAME;
        assert!((moved - damped).abs() < 1e-3);
        assert!(state.effects.slow_active(t0 + 5199.0));
        assert!(!state.effects.slow_active(t0 + 5200.0));
    }

    #[test]
    fn test_items_drift_slower() {
        let tuning = Tuning::default();
        let ctx = TickContext {
            playfield: field(),
            tuning: &tuning,
            facts: &[],
        };
        let mut state = running_state();
        state.entities.push_obstacle(Lane::LEFT, 0.0);
        state.entities.push_item(Lane::RIGHT, 0.0, ItemKind::Boost, fact());

        tick(&mut state, &ctx, 0.1, 0.0);
        let ob = state.entities.obstacles[0].y;
        let it = state.entities.items[0].y;
        assert!((it - ob * 0.9).abs() < 1e-3);
    }

    #[test]
    fn test_offscreen_entities_culled() {
        let tuning = Tuning::default();
        let ctx = TickContext {
            playfield: field(),
            tuning: &tuning,
            facts: &[],
        };
        let mut state = running_state();
        state.entities.push_obstacle(Lane::LEFT, 800.0 + OBSTACLE_SIZE - 1.0);
        state.entities.push_item(Lane::LEFT, 800.0 + ITEM_SIZE - 1.0, ItemKind::Boost, fact());

        tick(&mut state, &ctx, FRAME, 0.0);
        assert!(state.entities.obstacles.is_empty());
        assert!(state.entities.items.is_empty());
    }

    #[test]
    fn test_seventy_second_ramp() {
        let tuning = Tuning::default();
        let facts = fallback_facts();
        let ctx = TickContext {
            playfield: field(),
            tuning: &tuning,
            facts: &facts,
        };
        let mut state = running_state();

        for frame in 0..700 {
            tick(&mut state, &ctx, 0.1, frame as f64 * 100.0);
            // Keep the lane clear so the round survives
            state.entities.obstacles.clear();
        }

        assert_eq!(state.phase, GamePhase::Running);
        assert!((state.elapsed - 70.0).abs() < 0.01);
        let ramp = ramp_fraction(state.elapsed, tuning.ramp_seconds);
        assert!(ramp > 0.999);
        assert_eq!(obstacle_interval_ms(&tuning, ramp), 360.0);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let tuning = Tuning::default();
        let facts = fallback_facts();
        let ctx = TickContext {
            playfield: field(),
            tuning: &tuning,
            facts: &facts,
        };
        let mut state1 = GameState::new(99999);
        let mut state2 = GameState::new(99999);
        state1.start();
        state2.start();

        for frame in 0..600 {
            let now = frame as f64 * 16.0;
            let e1 = tick(&mut state1, &ctx, 0.016, now);
            let e2 = tick(&mut state2, &ctx, 0.016, now);
            assert_eq!(e1, e2);
        }
        assert_eq!(state1.phase, state2.phase);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.entities.obstacles, state2.entities.obstacles);
    }

    proptest! {
        #[test]
        fn test_forward_motion_and_score(
            seed in any::<u64>(),
            frames in prop::collection::vec(0.0f32..0.05, 1..200),
        ) {
            let tuning = Tuning::default();
            let facts = fallback_facts();
            let ctx = TickContext { playfield: field(), tuning: &tuning, facts: &facts };
            let mut state = GameState::new(seed);
            state.start();
            let mut now = 0.0;

            for dt in frames {
                now += dt as f64 * 1000.0;
                let was_running = state.is_running();
                let score_before = state.score;
                let before: HashMap<u32, f32> = state.entities.obstacles.iter().map(|o| (o.id, o.y))
                    .chain(state.entities.items.iter().map(|i| (i.id, i.y)))
                    .collect();

                tick(&mut state, &ctx, dt, now);

                for (id, y) in state.entities.obstacles.iter().map(|o| (o.id, o.y))
                    .chain(state.entities.items.iter().map(|i| (i.id, i.y)))
                {
                    if let Some(prev) = before.get(&id) {
                        prop_assert!(y >= *prev);
                    }
                }
                if state.is_running() {
                    prop_assert!(state.score >= score_before);
                }
                if !was_running {
                    prop_assert_eq!(state.score, score_before);
                }
            }
        }
    }
}
