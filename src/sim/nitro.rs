//! Nitro meter: a bounded resource that drains while burning and regenerates while idle

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceMeter {
    /// Always within [0, max]
    pub current: f32,
    pub max: f32,
    /// Per tick while active
    pub drain: f32,
    /// Per tick while idle
    pub regen: f32,
    /// Only true while `current > 0`
    pub active: bool,
}

impl ResourceMeter {
    /// A full meter
    pub fn new(max: f32, drain: f32, regen: f32) -> Self {
        Self {
            current: max,
            max,
            drain,
            regen,
            active: false,
        }
    }

    /// Start burning. Returns true only on the idle → active transition so the
    /// caller fires the engage cue exactly once.
    pub fn activate(&mut self) -> bool {
        if self.active || self.current <= 0.0 {
            return false;
        }
        self.active = true;
        true
    }

    /// Stop burning. Returns true only if the meter was active; calling it on an
    /// idle meter changes nothing.
    pub fn deactivate(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        true
    }

    /// One simulation step. Returns true if the meter ran dry this tick
    /// (and switched itself off).
    pub fn tick(&mut self) -> bool {
        if self.active {
            self.current = (self.current - self.drain).max(0.0);
            if self.current <= 0.0 {
                self.active = false;
                return true;
            }
        } else if self.current < self.max {
            self.current = (self.current + self.regen).min(self.max);
        }
        false
    }

    pub fn refill(&mut self, amount: f32) {
        self.current = (self.current + amount.max(0.0)).min(self.max);
    }

    /// Fill level in [0, 1]
    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 { self.current / self.max } else { 0.0 }
    }

    /// Fill level as a whole percentage for the HUD
    pub fn percent(&self) -> u32 {
        (self.fraction() * 100.0).round() as u32
    }

    /// Full and idle
    pub fn reset(&mut self) {
        self.current = self.max;
        self.active = false;
    }
}
