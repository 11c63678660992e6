//! Time-based item spawning with a tightening spawn interval

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{FallingItem, ItemKind};
use crate::consts::ITEM_SIZE;
use crate::tuning::Tuning;

/// Run facts the spawner's weighting depends on
#[derive(Debug, Clone, Copy, Default)]
pub struct SpawnContext {
    pub score: u64,
}

/// Owns the live falling items and decides when and what to drop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnManager {
    /// Sim timestamp (ms) of the last spawn; `None` until the first one
    pub last_spawn_ms: Option<f64>,
    /// Current gap between spawns (ms); only ever shrinks within a run
    pub interval_ms: f32,
    initial_interval_ms: f32,
    step_ms: f32,
    floor_ms: f32,
    field_width: f32,
    field_height: f32,
    fall_speed: f32,
    currency_probability: f32,
    boost_probability: f32,
    boost_unlock_score: u64,
    /// Live items in spawn order
    pub items: Vec<FallingItem>,
    next_id: u32,
}

impl SpawnManager {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            last_spawn_ms: None,
            interval_ms: tuning.spawn_interval_ms,
            initial_interval_ms: tuning.spawn_interval_ms,
            step_ms: tuning.spawn_interval_step_ms,
            floor_ms: tuning.spawn_interval_floor_ms,
            field_width: tuning.field_width,
            field_height: tuning.field_height,
            fall_speed: tuning.item_fall_speed,
            currency_probability: tuning.currency_probability,
            boost_probability: tuning.boost_probability,
            boost_unlock_score: tuning.boost_unlock_score,
            items: Vec::new(),
            next_id: 1,
        }
    }

    /// Spawn one item if the interval has elapsed since the last spawn. The
    /// first call of a run always spawns. Returns the new item's id.
    pub fn try_spawn<R: Rng>(&mut self, now_ms: f64, ctx: SpawnContext, rng: &mut R) -> Option<u32> {
        if let Some(last) = self.last_spawn_ms {
            if now_ms - last <= self.interval_ms as f64 {
                return None;
            }
        }

        let max_x = self.field_width - ITEM_SIZE;
        let x = if max_x > 0.0 { rng.random_range(0.0..max_x) } else { 0.0 };
        let kind = self.roll_kind(rng.random::<f32>(), ctx);
        let id = self.spawn_item(kind, x);
        self.last_spawn_ms = Some(now_ms);

        log::debug!("Spawned {:?} #{} at x={:.0} (interval {}ms)", kind, id, x, self.interval_ms);
        Some(id)
    }

    /// Map a uniform roll in [0, 1) to an item kind.
    ///
    /// Boost occupies the bottom of the range once unlocked, currency the
    /// next slice, hazard the remainder.
    pub fn roll_kind(&self, roll: f32, ctx: SpawnContext) -> ItemKind {
        let boost_p = if ctx.score >= self.boost_unlock_score {
            self.boost_probability
        } else {
            0.0
        };

        if roll < boost_p {
            ItemKind::Boost
        } else if roll < boost_p + self.currency_probability {
            ItemKind::Currency
        } else {
            ItemKind::Hazard
        }
    }

    /// Drop an item of `kind` at horizontal offset `x`, just above the field
    pub fn spawn_item(&mut self, kind: ItemKind, x: f32) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(FallingItem::new(
            id,
            kind,
            Vec2::new(x, -ITEM_SIZE),
            self.fall_speed,
        ));
        id
    }

    /// Advance every item and prune those past the bottom edge
    pub fn tick(&mut self, speed_factor: f32) {
        for item in &mut self.items {
            item.advance(speed_factor);
        }

        let field_height = self.field_height;
        let gone: Vec<u32> = self
            .items
            .iter()
            .filter(|item| item.is_off_field(field_height))
            .map(|item| item.id)
            .collect();
        if !gone.is_empty() {
            self.items.retain(|item| !gone.contains(&item.id));
        }
    }

    /// Remove a consumed item by id
    pub fn remove(&mut self, id: u32) -> Option<FallingItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Tighten the spawn interval by one step (never below the floor)
    pub fn increase_difficulty(&mut self) {
        self.interval_ms = (self.interval_ms - self.step_ms).max(self.floor_ms);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Back to the run's starting interval with an empty road
    pub fn reset(&mut self) {
        self.clear();
        self.interval_ms = self.initial_interval_ms;
        self.last_spawn_ms = None;
        self.next_id = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn manager() -> SpawnManager {
        SpawnManager::new(&Tuning::default())
    }

    #[test]
    fn test_spawns_only_after_interval() {
        let mut spawner = manager();
        let mut rng = Pcg32::seed_from_u64(7);
        let ctx = SpawnContext::default();

        // The road is not left empty at the start of a run
        assert!(spawner.try_spawn(16.0, ctx, &mut rng).is_some());
        assert_eq!(spawner.last_spawn_ms, Some(16.0));

        assert!(spawner.try_spawn(1516.0, ctx, &mut rng).is_none());
        assert!(spawner.try_spawn(1517.0, ctx, &mut rng).is_some());
        assert_eq!(spawner.items.len(), 2);
        assert_eq!(spawner.last_spawn_ms, Some(1517.0));

        // Interval restarts from the last spawn
        assert!(spawner.try_spawn(2500.0, ctx, &mut rng).is_none());
        assert!(spawner.try_spawn(3018.0, ctx, &mut rng).is_some());
    }

    #[test]
    fn test_spawned_item_is_above_field_and_within_width() {
        let mut spawner = manager();
        let mut rng = Pcg32::seed_from_u64(42);
        for i in 1..=50 {
            spawner.try_spawn(i as f64 * 2000.0, SpawnContext::default(), &mut rng);
        }
        assert_eq!(spawner.items.len(), 50);
        for item in &spawner.items {
            assert_eq!(item.pos.y, -ITEM_SIZE);
            assert!(item.pos.x >= 0.0 && item.pos.x < 400.0 - ITEM_SIZE);
        }
    }

    #[test]
    fn test_ids_preserve_spawn_order() {
        let mut spawner = manager();
        let a = spawner.spawn_item(ItemKind::Hazard, 0.0);
        let b = spawner.spawn_item(ItemKind::Currency, 10.0);
        assert!(a < b);
        assert_eq!(spawner.items[0].id, a);
        assert_eq!(spawner.items[1].id, b);
    }

    #[test]
    fn test_roll_kind_before_unlock() {
        let spawner = manager();
        let ctx = SpawnContext { score: 0 };
        assert_eq!(spawner.roll_kind(0.0, ctx), ItemKind::Currency);
        assert_eq!(spawner.roll_kind(0.39, ctx), ItemKind::Currency);
        assert_eq!(spawner.roll_kind(0.4, ctx), ItemKind::Hazard);
        assert_eq!(spawner.roll_kind(0.99, ctx), ItemKind::Hazard);
    }

    #[test]
    fn test_roll_kind_after_unlock() {
        let spawner = manager();
        let ctx = SpawnContext { score: 2000 };
        assert_eq!(spawner.roll_kind(0.05, ctx), ItemKind::Boost);
        assert_eq!(spawner.roll_kind(0.10, ctx), ItemKind::Currency);
        assert_eq!(spawner.roll_kind(0.47, ctx), ItemKind::Currency);
        assert_eq!(spawner.roll_kind(0.5, ctx), ItemKind::Hazard);
    }

    #[test]
    fn test_tick_advances_and_prunes() {
        let mut spawner = manager();
        let id = spawner.spawn_item(ItemKind::Hazard, 0.0);
        spawner.tick(1.0);
        assert_eq!(spawner.items[0].pos.y, -45.0);

        // 600 + 50 pixels to clear at 5px/tick: gone after tick 131
        for _ in 0..129 {
            spawner.tick(1.0);
        }
        assert_eq!(spawner.items[0].pos.y, 600.0);
        assert_eq!(spawner.items[0].id, id);
        spawner.tick(1.0);
        assert!(spawner.items.is_empty());
    }

    #[test]
    fn test_remove_by_id() {
        let mut spawner = manager();
        let a = spawner.spawn_item(ItemKind::Hazard, 0.0);
        let b = spawner.spawn_item(ItemKind::Currency, 0.0);
        assert_eq!(spawner.remove(a).map(|i| i.kind), Some(ItemKind::Hazard));
        assert!(spawner.remove(a).is_none());
        assert_eq!(spawner.items.len(), 1);
        assert_eq!(spawner.items[0].id, b);
    }

    #[test]
    fn test_reset_restores_interval() {
        let mut spawner = manager();
        spawner.increase_difficulty();
        spawner.spawn_item(ItemKind::Hazard, 0.0);
        spawner.last_spawn_ms = Some(9000.0);
        spawner.reset();
        assert_eq!(spawner.interval_ms, 1500.0);
        assert!(spawner.items.is_empty());
        assert_eq!(spawner.last_spawn_ms, None);
    }

    proptest! {
        #[test]
        fn prop_difficulty_is_floored(n in 0u32..100) {
            let mut spawner = manager();
            for _ in 0..n {
                spawner.increase_difficulty();
            }
            let expected = (1500.0 - n as f32 * 100.0).max(800.0);
            prop_assert_eq!(spawner.interval_ms, expected);
            prop_assert!(spawner.interval_ms > 0.0);
        }
    }
}
