//! Vehicle-versus-item collision detection
//!
//! Detection only reports what was hit; the tick decides what each hit does and
//! removes consumed items afterwards, so the item list is never mutated while it
//! is being scanned.

use glam::Vec2;

use super::bounds::Rect;
use super::entity::{FallingItem, ItemKind};

/// What a single contact means for the run
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionOutcome {
    /// Hit a hazard; the run is over
    Crash { id: u32, at: Vec2 },
    /// Picked up a coin
    Currency { id: u32, at: Vec2 },
    /// Picked up a nitro canister
    Boost { id: u32, at: Vec2 },
}

impl CollisionOutcome {
    pub fn id(&self) -> u32 {
        match *self {
            CollisionOutcome::Crash { id, .. }
            | CollisionOutcome::Currency { id, .. }
            | CollisionOutcome::Boost { id, .. } => id,
        }
    }

    /// Item center, used to place feedback effects
    pub fn point(&self) -> Vec2 {
        match *self {
            CollisionOutcome::Crash { at, .. }
            | CollisionOutcome::Currency { at, .. }
            | CollisionOutcome::Boost { at, .. } => at,
        }
    }

    pub fn is_crash(&self) -> bool {
        matches!(self, CollisionOutcome::Crash { .. })
    }
}

/// Scan every live item against the vehicle hitbox, in spawn order.
///
/// All pickups touched this tick are reported. The first hazard ends the scan:
/// its crash is the last outcome in the returned list.
pub fn detect_collisions(vehicle: &Rect, items: &[FallingItem]) -> Vec<CollisionOutcome> {
    let mut outcomes = Vec::new();

    for item in items {
        if !vehicle.intersects(&item.bounds()) {
            continue;
        }
        let id = item.id;
        let at = item.center();
        match item.kind {
            ItemKind::Hazard => {
                outcomes.push(CollisionOutcome::Crash { id, at });
                break;
            }
            ItemKind::Currency => outcomes.push(CollisionOutcome::Currency { id, at }),
            ItemKind::Boost => outcomes.push(CollisionOutcome::Boost { id, at }),
        }
    }

    outcomes
}
