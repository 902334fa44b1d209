//! Lane layout in screen space
//!
//! The road is centred in the play area and split into equal lanes. Entities
//! and the car are centred on their lane.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use super::state::{Item, Lane, Obstacle};
use crate::consts::*;

/// Size of the area the game is drawn into
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Playfield {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// No simulation happens until the host reports a non-empty area
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Road width: padded area, clamped to the road limits
    pub fn road_width(&self) -> f32 {
        (self.width - ROAD_SIDE_PADDING * 2.0).clamp(ROAD_MIN_WIDTH, ROAD_MAX_WIDTH)
    }

    /// Left edge of the road
    pub fn road_x(&self) -> f32 {
        (self.width - self.road_width()) / 2.0
    }

    pub fn lane_width(&self) -> f32 {
        self.road_width() / LANES as f32
    }

    /// Horizontal centre of a lane
    pub fn lane_center_x(&self, lane: Lane) -> f32 {
        self.road_x() + self.lane_width() * (lane.index() as f32 + 0.5)
    }

    /// Top edge of the car
    pub fn car_y(&self) -> f32 {
        (self.height - CAR_HEIGHT - CAR_BOTTOM_MARGIN).max(CAR_MIN_Y)
    }

    pub fn car_rect(&self, lane: Lane) -> Rect {
        let min = Vec2::new(self.lane_center_x(lane) - CAR_WIDTH / 2.0, self.car_y());
        Rect::from_min_size(min, Vec2::new(CAR_WIDTH, CAR_HEIGHT))
    }

    /// Square box of `size` centred on `lane` with its top edge at `y`
    pub fn lane_box(&self, lane: Lane, y: f32, size: f32) -> Rect {
        let min = Vec2::new(self.lane_center_x(lane) - size / 2.0, y);
        Rect::from_min_size(min, Vec2::splat(size))
    }

    pub fn obstacle_rect(&self, obstacle: &Obstacle) -> Rect {
        self.lane_box(obstacle.lane, obstacle.y, OBSTACLE_SIZE)
    }

    pub fn item_rect(&self, item: &Item) -> Rect {
        self.lane_box(item.lane, item.y, ITEM_SIZE)
    }

    /// Entities with their top edge at or beyond this are gone
    #[inline]
    pub fn cull_line(&self, size: f32) -> f32 {
        self.height + size
    }
}
