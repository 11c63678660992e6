//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (cosmetics draw from their own stream)
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod bounds;
pub mod collision;
pub mod combo;
pub mod effects;
pub mod entity;
pub mod nitro;
pub mod particles;
pub mod spawn;
pub mod state;
pub mod tick;

pub use bounds::Rect;
pub use collision::{CollisionOutcome, detect_collisions};
pub use combo::ComboSystem;
pub use effects::{Effects, ScreenShake};
pub use entity::{Direction, FallingItem, ItemKind, Vehicle};
pub use nitro::ResourceMeter;
pub use particles::{Particle, ParticleSystem};
pub use spawn::{SpawnContext, SpawnManager};
pub use state::{GameEvent, GamePhase, GameState, RunState, RunStats};
pub use tick::{TickInput, tick};
