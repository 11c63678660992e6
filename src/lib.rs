//! Nitro Dash - A top-down arcade driving game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, spawning, collisions, scoring)
//! - `game`: Run state machine, fixed-step frame loop, sink dispatch
//! - `renderer`: Frame snapshots and primitive draw lists
//! - `input`: Device events latched into per-tick input
//! - `audio`: Fire-and-forget sound cues
//! - `platform`: Browser/native platform abstraction
//! - `tuning`: Data-driven game balance
//! - `settings`: Presentation preferences (quality, effects, volume)

pub mod audio;
pub mod game;
pub mod input;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game::{FrameClock, GameLoop, InputSource, NoInput, StopToken};
pub use input::InputEvent;
pub use settings::{QualityPreset, Settings};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz, the rate the tuning is expressed in)
    pub const SIM_DT_MS: f32 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame gap fed to the accumulator (tab switches, debugger pauses)
    pub const MAX_FRAME_MS: f32 = 100.0;

    /// Play field dimensions
    pub const FIELD_WIDTH: f32 = 400.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Vehicle defaults
    pub const VEHICLE_WIDTH: f32 = 50.0;
    pub const VEHICLE_HEIGHT: f32 = 80.0;
    /// Distance from the bottom of the field to the vehicle's top edge
    pub const VEHICLE_BOTTOM_OFFSET: f32 = 120.0;
    /// Hitbox inset on every side (collisions are stricter than the silhouette)
    pub const VEHICLE_HITBOX_MARGIN: f32 = 6.0;
    /// Maximum lean angle while steering (radians)
    pub const VEHICLE_MAX_HEADING: f32 = 0.2;
    /// Per-tick easing factor toward the target heading
    pub const VEHICLE_HEADING_EASE: f32 = 0.2;

    /// Falling item defaults
    pub const ITEM_SIZE: f32 = 50.0;

    /// Particle gravity bias (pixels/tick²)
    pub const PARTICLE_GRAVITY: f32 = 0.1;
    /// Particle shrink factor per tick
    pub const PARTICLE_SHRINK: f32 = 0.98;
}

/// Packed RGB colors shared by the simulation (particles) and the renderer
pub mod colors {
    pub const GOLD: u32 = 0xF0B90B;
    pub const GOLD_LIGHT: u32 = 0xFCD535;
    pub const GOLD_PALE: u32 = 0xFFE066;
    pub const HAZARD_RED: u32 = 0xF6465D;
    pub const BOOST_CYAN: u32 = 0x3BC9DB;
    pub const ASPHALT: u32 = 0x1E2329;
    pub const INK: u32 = 0x0B0E11;
    pub const WHITE: u32 = 0xFFFFFF;

    /// Unpack a `0xRRGGBB` color into normalized RGBA
    #[inline]
    pub fn to_rgba(rgb: u32, alpha: f32) -> [f32; 4] {
        [
            ((rgb >> 16) & 0xFF) as f32 / 255.0,
            ((rgb >> 8) & 0xFF) as f32 / 255.0,
            (rgb & 0xFF) as f32 / 255.0,
            alpha,
        ]
    }
}

/// Sanitize an elapsed-time reading: NaN and negative values become 0
#[inline]
pub fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_nan() { 0.0 } else { dt.max(0.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_dt() {
        assert_eq!(sanitize_dt(f32::NAN), 0.0);
        assert_eq!(sanitize_dt(-3.0), 0.0);
        assert_eq!(sanitize_dt(16.0), 16.0);
    }

    #[test]
    fn test_to_rgba() {
        let c = colors::to_rgba(0xFF0000, 0.5);
        assert_eq!(c, [1.0, 0.0, 0.0, 0.5]);
    }
}
