//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Logging setup
//! - Frame timing
//! - Canvas drawing and DOM HUD (web only)

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::game::FrameClock;

/// Install the platform logger. Safe to call more than once.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// Install the platform logger. Safe to call more than once.
#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Deterministic clock for headless runs and tests: evenly spaced frames,
/// optionally ending after a fixed count
#[derive(Debug, Clone)]
pub struct SimulatedClock {
    frame: u64,
    interval_ms: f64,
    limit: Option<u64>,
}

impl SimulatedClock {
    /// Frames at `hz` per second
    pub fn new(hz: f64, limit: Option<u64>) -> Self {
        let interval_ms = if hz.is_finite() && hz > 0.0 { 1000.0 / hz } else { 1000.0 / 60.0 };
        Self {
            frame: 0,
            interval_ms,
            limit,
        }
    }

    /// Frames handed out so far
    pub fn frames(&self) -> u64 {
        self.frame
    }
}

impl FrameClock for SimulatedClock {
    fn next_frame(&mut self) -> Option<f64> {
        if self.limit.is_some_and(|limit| self.frame >= limit) {
            return None;
        }
        let now = self.frame as f64 * self.interval_ms;
        self.frame += 1;
        Some(now)
    }
}
