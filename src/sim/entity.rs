//! Vehicle and falling item entities

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bounds::Rect;
use crate::consts::*;

/// Lateral steering intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    #[default]
    None,
}

impl Direction {
    /// -1 for left, +1 for right, 0 when idle
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
            Direction::None => 0.0,
        }
    }
}

/// The player's car
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Lateral speed (pixels per tick)
    pub speed: f32,
    pub intent: Direction,
    /// Nitro burning (drives trail color and world speed)
    pub boosting: bool,
    /// Smoothed lean angle (radians, positive leans right)
    pub heading: f32,
}

impl Vehicle {
    /// Place a vehicle centered horizontally near the bottom of the field
    pub fn new(field_width: f32, field_height: f32, speed: f32) -> Self {
        Self {
            pos: Vec2::new(
                field_width / 2.0 - VEHICLE_WIDTH / 2.0,
                field_height - VEHICLE_BOTTOM_OFFSET,
            ),
            size: Vec2::new(VEHICLE_WIDTH, VEHICLE_HEIGHT),
            speed,
            intent: Direction::None,
            boosting: false,
            heading: 0.0,
        }
    }

    pub fn set_intent(&mut self, intent: Direction) {
        self.intent = intent;
    }

    pub fn set_boost(&mut self, boosting: bool) {
        self.boosting = boosting;
    }

    /// Apply one step of lateral motion and ease the heading toward the intent
    pub fn tick(&mut self, field_width: f32) {
        let max_x = (field_width - self.size.x).max(0.0);
        self.pos.x = (self.pos.x + self.intent.sign() * self.speed).clamp(0.0, max_x);

        let target = self.intent.sign() * VEHICLE_MAX_HEADING;
        self.heading += (target - self.heading) * VEHICLE_HEADING_EASE;
    }

    /// Whether the car is steering (used to gate trail particles)
    pub fn is_moving(&self) -> bool {
        self.intent != Direction::None
    }

    /// Full drawn silhouette
    pub fn visual_rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }

    /// Hitbox, inset from the silhouette so near misses feel fair
    pub fn bounds(&self) -> Rect {
        self.visual_rect().inset(VEHICLE_HITBOX_MARGIN)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Left and right exhaust pipes, at the rear bumper
    pub fn exhaust_points(&self) -> [Vec2; 2] {
        let rear = self.pos.y + self.size.y;
        [
            Vec2::new(self.pos.x + 12.0, rear),
            Vec2::new(self.pos.x + self.size.x - 12.0, rear),
        ]
    }
}

/// What a falling item does on contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// Ends the run
    Hazard,
    /// Coin: score and combo
    Currency,
    /// Nitro canister: refills the meter
    Boost,
}

/// An item dropping down the road
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallingItem {
    pub id: u32,
    pub kind: ItemKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Fall speed (pixels per tick, before the speed multiplier)
    pub speed: f32,
}

impl FallingItem {
    pub fn new(id: u32, kind: ItemKind, pos: Vec2, speed: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            size: Vec2::splat(ITEM_SIZE),
            speed,
        }
    }

    pub fn advance(&mut self, speed_factor: f32) {
        self.pos.y += self.speed * speed_factor;
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Past the bottom edge of the field
    pub fn is_off_field(&self, field_height: f32) -> bool {
        self.pos.y > field_height
    }
}
