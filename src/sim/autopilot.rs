//! Idle/demo mode - a simple bot that plays the game
//!
//! Looks at what is falling toward the car and suggests at most one lane
//! change per frame: dodge first, collect second.

use super::playfield::Playfield;
use super::state::{GameState, Lane, LaneDirection};
use crate::consts::{CAR_HEIGHT, OBSTACLE_SIZE};

/// How far above the car an obstacle starts to count as a threat (px)
const LOOKAHEAD_PX: f32 = 220.0;

/// Free road between the car and the nearest obstacle still ahead of it
fn clearance(state: &GameState, field: &Playfield, lane: Lane) -> f32 {
    let car_y = field.car_y();
    state
        .entities
        .obstacles
        .iter()
        .filter(|o| o.lane == lane && o.y < car_y + CAR_HEIGHT)
        .map(|o| car_y - (o.y + OBSTACLE_SIZE))
        .fold(f32::INFINITY, f32::min)
}

fn is_safe(state: &GameState, field: &Playfield, lane: Lane) -> bool {
    clearance(state, field, lane) >= LOOKAHEAD_PX
}

/// Suggest a lane change for this frame, if any
pub fn suggest_lane_change(state: &GameState, field: &Playfield) -> Option<LaneDirection> {
    if !state.is_running() {
        return None;
    }
    let current = state.lane;
    let neighbours = [LaneDirection::Left, LaneDirection::Right]
        .into_iter()
        .map(|dir| (dir, current.shifted(dir)))
        .filter(|(_, lane)| *lane != current);

    if !is_safe(state, field, current) {
        // Dodge toward whichever neighbour has the most room
        let here = clearance(state, field, current);
        return neighbours
            .map(|(dir, lane)| (dir, clearance(state, field, lane)))
            .filter(|(_, room)| *room > here)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(dir, _)| dir);
    }

    // Lane is clear: step toward the nearest item that hasn't passed yet
    let car_y = field.car_y();
    let target = state
        .entities
        .items
        .iter()
        .filter(|i| i.lane != current && i.y < car_y + CAR_HEIGHT)
        .max_by(|a, b| a.y.total_cmp(&b.y))?;
    let dir = LaneDirection::from_delta(target.lane.index() as i32 - current.index() as i32)?;
    is_safe(state, field, current.shifted(dir)).then_some(dir)
}
