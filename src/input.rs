//! Device input and latching
//!
//! Device events arrive whenever the host delivers them; the latch folds them
//! into the single `TickInput` the next simulation tick consumes.

use serde::{Deserialize, Serialize};

use crate::sim::{Direction, TickInput};

/// Discrete device events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    LeftPressed,
    LeftReleased,
    RightPressed,
    RightReleased,
    BoostPressed,
    BoostReleased,
}

impl InputEvent {
    /// Map a DOM `KeyboardEvent.key` value. Arrows or A/D steer, Space or Shift
    /// burns nitro.
    pub fn from_key(key: &str, pressed: bool) -> Option<Self> {
        let event = match (key, pressed) {
            ("ArrowLeft" | "a" | "A", true) => InputEvent::LeftPressed,
            ("ArrowLeft" | "a" | "A", false) => InputEvent::LeftReleased,
            ("ArrowRight" | "d" | "D", true) => InputEvent::RightPressed,
            ("ArrowRight" | "d" | "D", false) => InputEvent::RightReleased,
            (" " | "Shift", true) => InputEvent::BoostPressed,
            (" " | "Shift", false) => InputEvent::BoostReleased,
            _ => return None,
        };
        Some(event)
    }
}

/// Held-state tracker between ticks
#[derive(Debug, Clone, Default)]
pub struct InputLatch {
    left_held: bool,
    right_held: bool,
    /// Most recent direction pressed; wins while both are held
    last_pressed: Direction,
    boost_pressed: bool,
    boost_released: bool,
}

impl InputLatch {
    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::LeftPressed => {
                self.left_held = true;
                self.last_pressed = Direction::Left;
            }
            InputEvent::LeftReleased => self.left_held = false,
            InputEvent::RightPressed => {
                self.right_held = true;
                self.last_pressed = Direction::Right;
            }
            InputEvent::RightReleased => self.right_held = false,
            InputEvent::BoostPressed => self.boost_pressed = true,
            InputEvent::BoostReleased => self.boost_released = true,
        }
    }

    /// Steering intent from the keys currently held
    pub fn intent(&self) -> Direction {
        match (self.left_held, self.right_held) {
            (true, true) => self.last_pressed,
            (true, false) => Direction::Left,
            (false, true) => Direction::Right,
            (false, false) => Direction::None,
        }
    }

    /// Input for the next tick. Boost edges are handed out once.
    pub fn take(&mut self) -> TickInput {
        let input = TickInput {
            intent: self.intent(),
            boost_pressed: self.boost_pressed,
            boost_released: self.boost_released,
        };
        self.boost_pressed = false;
        self.boost_released = false;
        input
    }

    /// Forget everything (run reset)
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
