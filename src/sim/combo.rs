//! Pickup streaks with a decay window

use serde::{Deserialize, Serialize};

/// Consecutive pickups within the window build a score multiplier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComboSystem {
    pub streak: u32,
    pub max_streak: u32,
    /// Time left before the streak lapses (ms); never negative
    pub timeout_ms: f32,
    window_ms: f32,
}

impl ComboSystem {
    pub fn new(window_ms: f32) -> Self {
        Self {
            streak: 0,
            max_streak: 0,
            timeout_ms: 0.0,
            window_ms,
        }
    }

    /// Register a pickup: extend the streak and restart the window
    pub fn on_hit(&mut self) {
        self.streak += 1;
        self.max_streak = self.max_streak.max(self.streak);
        self.timeout_ms = self.window_ms;
    }

    /// Burn down the window; the streak lapses the moment it reaches zero
    pub fn tick(&mut self, dt_ms: f32) {
        if self.timeout_ms <= 0.0 {
            return;
        }
        self.timeout_ms -= crate::sanitize_dt(dt_ms);
        if self.timeout_ms <= 0.0 {
            self.timeout_ms = 0.0;
            self.streak = 0;
        }
    }

    /// Score scaling: +10% per streak step
    #[inline]
    pub fn multiplier(&self) -> f32 {
        1.0 + 0.1 * self.streak as f32
    }

    /// Scale a whole-point reward by the multiplier, in exact integer tenths
    pub fn scale_reward(&self, base: u64) -> u64 {
        base * (10 + self.streak as u64) / 10
    }

    /// Drop the streak (crash); the best streak is kept for run stats
    pub fn reset(&mut self) {
        self.streak = 0;
        self.timeout_ms = 0.0;
    }

    /// Fresh run: forget the best streak too
    pub fn new_run(&mut self) {
        self.reset();
        self.max_streak = 0;
    }
}
