//! Fixed timestep simulation tick
//!
//! Core game loop step that advances the simulation deterministically. Order
//! within a tick is fixed: latched input, vehicle, spawning and item fall,
//! collisions, outcome routing, nitro and combo timers, score and difficulty,
//! then cosmetics.

use glam::Vec2;
use rand::Rng;

use super::collision::{CollisionOutcome, detect_collisions};
use super::entity::Direction;
use super::spawn::SpawnContext;
use super::state::{GameEvent, GamePhase, GameState};
use crate::colors;

/// Input commands for a single tick, latched from device events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Steering intent
    pub intent: Direction,
    /// Nitro button went down since the last tick
    pub boost_pressed: bool,
    /// Nitro button went up since the last tick
    pub boost_released: bool,
}

/// Advance the game state by one fixed timestep of `dt_ms` milliseconds.
///
/// Does nothing unless the run is `Running`. Events are appended to `events`.
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f32, events: &mut Vec<GameEvent>) {
    if state.phase != GamePhase::Running {
        return;
    }
    let dt_ms = crate::sanitize_dt(dt_ms);

    state.time_ticks += 1;
    state.time_ms += dt_ms as f64;

    // Latched input must land before the vehicle moves
    state.vehicle.set_intent(input.intent);
    if input.boost_pressed && state.nitro.activate() {
        for point in state.vehicle.exhaust_points() {
            state
                .particles
                .emit_nitro_burst(point, state.tuning.nitro_burst, &mut state.fx_rng);
        }
        log::debug!("Nitro engaged at {:.1}", state.nitro.current);
        events.push(GameEvent::NitroEngaged);
    }
    if input.boost_released {
        state.nitro.deactivate();
    }
    state.vehicle.set_boost(state.nitro.active);

    state.vehicle.tick(state.tuning.field_width);

    // Spawn, then advance everything on the road
    let ctx = SpawnContext {
        score: state.run.score,
    };
    state.spawner.try_spawn(state.time_ms, ctx, &mut state.rng);
    let world_speed = state.world_speed();
    state.run.max_speed = state.run.max_speed.max(world_speed);
    state.spawner.tick(world_speed);

    // Collisions run after both the vehicle and the items have moved
    let outcomes = detect_collisions(&state.vehicle.bounds(), &state.spawner.items);
    let mut consumed = Vec::new();
    let mut crashed = false;
    for outcome in outcomes {
        match outcome {
            CollisionOutcome::Currency { id, at } => {
                consumed.push(id);
                collect_currency(state, at, events);
            }
            CollisionOutcome::Boost { id, at } => {
                consumed.push(id);
                collect_boost(state, at, events);
            }
            CollisionOutcome::Crash { .. } => crashed = true,
        }
    }
    for id in consumed {
        state.spawner.remove(id);
    }
    if crashed {
        crash(state, events);
        return;
    }

    if state.nitro.tick() {
        log::debug!("Nitro depleted");
        events.push(GameEvent::NitroDepleted);
    }
    state.vehicle.set_boost(state.nitro.active);
    state.combo.tick(dt_ms);

    state.run.score += floor_points(state.speed_multiplier() * state.combo.multiplier());
    while state.run.score >= state.run.next_difficulty_at {
        increase_difficulty(state, events);
    }

    emit_trails(state);
    state.particles.tick();
    state.effects.tick(dt_ms, world_speed, &mut state.fx_rng);
}

/// Whole points from a float product, absorbing representation error
/// (1.2 × 2.5 must score 3, not 2)
fn floor_points(value: f32) -> u64 {
    (value as f64 + 1e-4).floor().max(0.0) as u64
}

fn collect_currency(state: &mut GameState, at: Vec2, events: &mut Vec<GameEvent>) {
    state.combo.on_hit();
    let points = state.combo.scale_reward(state.tuning.currency_reward);
    state.run.currency += 1;
    state.run.score += points;

    state
        .particles
        .emit_burst(at, colors::GOLD, state.tuning.coin_burst, &mut state.fx_rng);

    log::debug!("Coin +{} (combo x{})", points, state.combo.streak);
    events.push(GameEvent::CoinCollected {
        points,
        combo: state.combo.streak,
    });
}

fn collect_boost(state: &mut GameState, at: Vec2, events: &mut Vec<GameEvent>) {
    state.combo.on_hit();
    state.nitro.refill(state.tuning.boost_refill);

    state
        .particles
        .emit_burst(at, colors::GOLD_LIGHT, state.tuning.boost_burst, &mut state.fx_rng);
    state
        .effects
        .shake
        .start(state.tuning.boost_shake_ms, state.tuning.boost_shake_intensity);

    log::debug!("Boost canister, nitro at {:.1}", state.nitro.current);
    events.push(GameEvent::BoostCollected);
}

fn crash(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let at = state.vehicle.center();
    state
        .particles
        .emit_burst(at, colors::HAZARD_RED, state.tuning.crash_burst, &mut state.fx_rng);
    state
        .effects
        .shake
        .start(state.tuning.crash_shake_ms, state.tuning.crash_shake_intensity);
    // Jolt the final frame; nothing advances after this
    state.effects.shake.tick(0.0, &mut state.fx_rng);

    state.combo.reset();
    state.nitro.deactivate();
    state.vehicle.set_boost(false);
    state.vehicle.set_intent(Direction::None);
    state.phase = GamePhase::Ended;

    let stats = state.stats();
    log::info!(
        "Crashed after {} ticks: score {}, coins {}, max speed {:.1}x, max combo {}",
        stats.ticks,
        stats.score,
        stats.currency,
        stats.max_speed,
        stats.max_combo
    );
    events.push(GameEvent::Crashed(stats));
}

/// Raise the speed multiplier one step and tighten spawning
fn increase_difficulty(state: &mut GameState, events: &mut Vec<GameEvent>) {
    state.run.difficulty_steps += 1;
    state.run.next_difficulty_at += state.tuning.difficulty_score_step;
    state.spawner.increase_difficulty();

    let speed_multiplier = state.speed_multiplier();
    log::info!(
        "Difficulty up: {:.1}x speed, spawn every {}ms",
        speed_multiplier,
        state.spawner.interval_ms
    );
    events.push(GameEvent::DifficultyUp { speed_multiplier });
}

/// Exhaust puffs while steering or burning nitro
fn emit_trails(state: &mut GameState) {
    let vehicle = &state.vehicle;
    if !(vehicle.is_moving() || vehicle.boosting) {
        return;
    }
    if !state.fx_rng.random_bool(state.tuning.trail_probability as f64) {
        return;
    }

    let boosting = vehicle.boosting;
    for point in vehicle.exhaust_points() {
        if boosting {
            state.particles.emit_nitro_trail(point, &mut state.fx_rng);
        } else {
            state.particles.emit_trail(point, colors::WHITE, &mut state.fx_rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT_MS;
    use crate::sim::entity::ItemKind;
    use crate::tuning::Tuning;

    fn running(seed: u64) -> GameState {
        let mut state = GameState::new(seed, Tuning::default(), 256);
        state.phase = GamePhase::Running;
        state
    }

    /// Drop an item straight onto the car's current position
    fn place_on_vehicle(state: &mut GameState, kind: ItemKind) -> u32 {
        let id = state.spawner.spawn_item(kind, state.vehicle.pos.x);
        let item = state.spawner.items.last_mut().unwrap();
        item.pos.y = state.vehicle.pos.y;
        id
    }

    fn step(state: &mut GameState, input: &TickInput) -> Vec<GameEvent> {
        let mut events = Vec::new();
        tick(state, input, SIM_DT_MS, &mut events);
        events
    }

    #[test]
    fn test_idle_does_not_tick() {
        let mut state = GameState::new(1, Tuning::default(), 256);
        step(&mut state, &TickInput::default());
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.run.score, 0);
    }

    #[test]
    fn test_score_accumulates_per_tick() {
        let mut state = running(1);
        for _ in 0..10 {
            step(&mut state, &TickInput::default());
        }
        assert_eq!(state.time_ticks, 10);
        assert_eq!(state.run.score, 10);
        assert!((state.time_ms - 10.0 * SIM_DT_MS as f64).abs() < 1e-3);
    }

    #[test]
    fn test_hazard_on_top_of_vehicle_ends_run() {
        let mut state = running(1);
        place_on_vehicle(&mut state, ItemKind::Hazard);

        let events = step(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::Ended);
        let stats = match events.last() {
            Some(GameEvent::Crashed(stats)) => *stats,
            other => panic!("expected crash, got {other:?}"),
        };
        assert_eq!(stats.ticks, 1);
        assert_eq!(stats.score, 0);
        assert_eq!(state.particles.len(), state.tuning.crash_burst);
    }

    #[test]
    fn test_no_tick_after_crash() {
        let mut state = running(1);
        place_on_vehicle(&mut state, ItemKind::Hazard);
        step(&mut state, &TickInput::default());
        let ticks = state.time_ticks;
        let score = state.run.score;

        let events = step(&mut state, &TickInput::default());
        assert!(events.is_empty());
        assert_eq!(state.time_ticks, ticks);
        assert_eq!(state.run.score, score);
    }

    #[test]
    fn test_three_coins_build_combo() {
        let mut state = running(1);
        let coins: Vec<u32> = (0..3)
            .map(|_| place_on_vehicle(&mut state, ItemKind::Currency))
            .collect();

        let events = step(&mut state, &TickInput::default());
        let points: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::CoinCollected { points, .. } => Some(*points),
                _ => None,
            })
            .collect();
        assert_eq!(points, vec![55, 60, 65]);
        assert_eq!(state.combo.streak, 3);
        assert!((state.combo.multiplier() - 1.3).abs() < 1e-6);
        assert_eq!(state.run.currency, 3);
        // 180 from coins plus floor(1.0 × 1.3) for the tick itself
        assert_eq!(state.run.score, 181);
        assert!(state.spawner.items.iter().all(|i| !coins.contains(&i.id)));
    }

    #[test]
    fn test_coins_across_ticks_within_window() {
        let mut state = running(1);
        let mut rewards = Vec::new();
        for _ in 0..3 {
            place_on_vehicle(&mut state, ItemKind::Currency);
            for event in step(&mut state, &TickInput::default()) {
                if let GameEvent::CoinCollected { points, .. } = event {
                    rewards.push(points);
                }
            }
            for _ in 0..30 {
                step(&mut state, &TickInput::default());
            }
        }
        assert_eq!(rewards, vec![55, 60, 65]);
        assert_eq!(state.combo.streak, 3);
        assert_eq!(state.combo.max_streak, 3);
    }

    #[test]
    fn test_combo_lapses_after_window() {
        let mut state = running(1);
        place_on_vehicle(&mut state, ItemKind::Currency);
        step(&mut state, &TickInput::default());
        assert_eq!(state.combo.streak, 1);

        // 2000ms at 60 Hz is 120 ticks
        for _ in 0..121 {
            step(&mut state, &TickInput::default());
        }
        assert_eq!(state.combo.streak, 0);
        assert_eq!(state.combo.max_streak, 1);
    }

    #[test]
    fn test_boost_pickup_refills_nitro() {
        let mut state = running(1);
        state.nitro.current = 10.0;
        place_on_vehicle(&mut state, ItemKind::Boost);

        let events = step(&mut state, &TickInput::default());
        assert!(events.contains(&GameEvent::BoostCollected));
        // refill 35, then one idle regen step
        assert!((state.nitro.current - 45.1).abs() < 1e-4);
        assert_eq!(state.combo.streak, 1);
        assert!(state.effects.shake.is_active());
    }

    #[test]
    fn test_nitro_speeds_up_world() {
        let mut state = running(1);
        let id = state.spawner.spawn_item(ItemKind::Currency, 0.0);

        let press = TickInput {
            boost_pressed: true,
            ..Default::default()
        };
        let events = step(&mut state, &press);
        assert!(events.contains(&GameEvent::NitroEngaged));
        assert!(state.vehicle.boosting);
        // One flame blast per exhaust pipe on engage
        assert!(state.particles.len() >= 2 * state.tuning.nitro_burst);
        let item = state.spawner.items.iter().find(|i| i.id == id).unwrap();
        assert_eq!(item.pos.y, -50.0 + 7.5);
        assert_eq!(state.nitro.current, 99.5);
        assert_eq!(state.run.max_speed, 1.5);

        // Holding does not re-fire the engage cue
        let events = step(&mut state, &TickInput::default());
        assert!(!events.contains(&GameEvent::NitroEngaged));

        let release = TickInput {
            boost_released: true,
            ..Default::default()
        };
        step(&mut state, &release);
        assert!(!state.nitro.active);
        assert!(!state.vehicle.boosting);
    }

    #[test]
    fn test_nitro_runs_dry_mid_run() {
        let mut state = running(1);
        state.nitro.current = 1.0;
        let press = TickInput {
            boost_pressed: true,
            ..Default::default()
        };
        step(&mut state, &press);
        let events = step(&mut state, &TickInput::default());
        assert!(events.contains(&GameEvent::NitroDepleted));
        assert!(!state.nitro.active);
        assert!(!state.vehicle.boosting);
    }

    #[test]
    fn test_empty_nitro_cannot_engage() {
        let mut state = running(1);
        state.nitro.current = 0.0;
        let press = TickInput {
            boost_pressed: true,
            ..Default::default()
        };
        let events = step(&mut state, &press);
        assert!(!events.contains(&GameEvent::NitroEngaged));
        assert!(!state.nitro.active);
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_difficulty_steps_at_threshold() {
        let mut state = running(1);
        state.run.score = 999;
        let events = step(&mut state, &TickInput::default());
        assert_eq!(state.run.score, 1000);
        assert!(events.contains(&GameEvent::DifficultyUp {
            speed_multiplier: 1.1
        }));
        assert_eq!(state.spawner.interval_ms, 1400.0);
        assert_eq!(state.run.next_difficulty_at, 2000);

        // Next tick scores floor(1.1) = 1 and does not step again
        let events = step(&mut state, &TickInput::default());
        assert_eq!(state.run.score, 1001);
        assert!(events.is_empty());
    }

    #[test]
    fn test_big_jump_crosses_several_thresholds() {
        let mut state = running(1);
        state.run.score = 2999;
        let events = step(&mut state, &TickInput::default());
        let steps = events
            .iter()
            .filter(|e| matches!(e, GameEvent::DifficultyUp { .. }))
            .count();
        assert_eq!(steps, 3);
        assert_eq!(state.spawner.interval_ms, 1200.0);
    }

    #[test]
    fn test_steering_moves_vehicle_and_leaves_trail() {
        let mut state = running(1);
        let input = TickInput {
            intent: Direction::Right,
            ..Default::default()
        };
        for _ in 0..30 {
            step(&mut state, &input);
        }
        assert_eq!(state.vehicle.pos.x, 350.0);
        assert!(state.vehicle.heading > 0.0);
        assert!(!state.particles.is_empty());
    }

    #[test]
    fn test_first_tick_spawns_an_item() {
        let mut state = running(1);
        assert!(state.spawner.items.is_empty());
        step(&mut state, &TickInput::default());
        assert_eq!(state.spawner.items.len(), 1);
        // Next one waits out the full interval
        for _ in 0..80 {
            step(&mut state, &TickInput::default());
        }
        assert_eq!(state.spawner.items.len(), 1);
    }

    #[test]
    fn test_bad_dt_does_not_rewind_clock() {
        let mut state = running(1);
        let mut events = Vec::new();
        tick(&mut state, &TickInput::default(), f32::NAN, &mut events);
        tick(&mut state, &TickInput::default(), -16.0, &mut events);
        assert_eq!(state.time_ms, 0.0);
        assert_eq!(state.time_ticks, 2);
    }

    #[test]
    fn test_floor_points() {
        assert_eq!(floor_points(1.0), 1);
        assert_eq!(floor_points(1.3), 1);
        assert_eq!(floor_points(1.2f32 * 2.5f32), 3);
        assert_eq!(floor_points(2.9999998), 3);
    }

    fn scripted_input(tick: u64) -> TickInput {
        let intent = match (tick / 40) % 3 {
            0 => Direction::Left,
            1 => Direction::Right,
            _ => Direction::None,
        };
        TickInput {
            intent,
            boost_pressed: tick % 300 == 0,
            boost_released: tick % 300 == 90,
        }
    }

    #[test]
    fn test_determinism() {
        // Same seed and inputs replay identically, regardless of particle cap
        let mut a = running(99999);
        let mut b = GameState::new(99999, Tuning::default(), 0);
        b.phase = GamePhase::Running;

        for t in 0..5000 {
            let input = scripted_input(t);
            let ea = step(&mut a, &input);
            let eb = step(&mut b, &input);
            assert_eq!(ea, eb);
        }

        assert_eq!(a.phase, b.phase);
        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.run.score, b.run.score);
        assert_eq!(a.run.currency, b.run.currency);
        assert_eq!(a.vehicle.pos, b.vehicle.pos);
        let ids_a: Vec<u32> = a.spawner.items.iter().map(|i| i.id).collect();
        let ids_b: Vec<u32> = b.spawner.items.iter().map(|i| i.id).collect();
        assert_eq!(ids_a, ids_b);
        assert!(b.particles.is_empty());
    }
}
