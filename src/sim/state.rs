//! Game state and core simulation types
//!
//! Everything a run needs lives in `GameState`. Gameplay randomness and cosmetic
//! randomness come from separate seeded streams: the same seed and the same
//! inputs always replay the same run, whatever the particle settings are.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::combo::ComboSystem;
use super::effects::Effects;
use super::entity::Vehicle;
use super::nitro::ResourceMeter;
use super::particles::ParticleSystem;
use super::spawn::SpawnManager;
use crate::tuning::Tuning;

/// Stream selector for cosmetic randomness
const FX_STREAM: u64 = 0x5EED_F00D;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for start
    #[default]
    Idle,
    /// Active gameplay
    Running,
    /// Frozen mid-run
    Paused,
    /// Crashed; terminal until reset/start
    Ended,
}

/// Score and progression for the current run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    /// Never decreases within a run
    pub score: u64,
    pub currency: u32,
    /// Difficulty steps taken so far
    pub difficulty_steps: u32,
    /// Highest effective world speed seen (includes nitro)
    pub max_speed: f32,
    /// Score at which the next difficulty step triggers
    pub next_difficulty_at: u64,
}

impl RunState {
    pub fn new(difficulty_score_step: u64) -> Self {
        Self {
            score: 0,
            currency: 0,
            difficulty_steps: 0,
            max_speed: 1.0,
            next_difficulty_at: difficulty_score_step,
        }
    }
}

/// End-of-run summary handed to the UI
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub score: u64,
    pub currency: u32,
    pub max_speed: f32,
    pub max_combo: u32,
    pub ticks: u64,
}

/// Things that happened during a tick, for audio/UI/logging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    CoinCollected { points: u64, combo: u32 },
    BoostCollected,
    NitroEngaged,
    NitroDepleted,
    DifficultyUp { speed_multiplier: f32 },
    Crashed(RunStats),
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Simulation clock (ms since run start)
    pub time_ms: f64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub run: RunState,
    pub vehicle: Vehicle,
    pub spawner: SpawnManager,
    pub combo: ComboSystem,
    pub nitro: ResourceMeter,
    /// Visual particles (not gameplay-affecting)
    pub particles: ParticleSystem,
    /// Ambient layers (not gameplay-affecting)
    pub effects: Effects,
    /// Gameplay RNG (spawn positions and kinds)
    pub rng: Pcg32,
    /// Cosmetic RNG (particles, shake, stars)
    pub fx_rng: Pcg32,
}

impl GameState {
    /// Fresh idle state for the given seed
    pub fn new(seed: u64, tuning: Tuning, particle_cap: usize) -> Self {
        let rng = Pcg32::seed_from_u64(seed);
        let mut fx_rng = Pcg32::new(seed, FX_STREAM);
        let effects = Effects::new(tuning.field_width, tuning.field_height, &mut fx_rng);

        Self {
            seed,
            phase: GamePhase::Idle,
            time_ms: 0.0,
            time_ticks: 0,
            run: RunState::new(tuning.difficulty_score_step),
            vehicle: Vehicle::new(tuning.field_width, tuning.field_height, tuning.vehicle_speed),
            spawner: SpawnManager::new(&tuning),
            combo: ComboSystem::new(tuning.combo_window_ms),
            nitro: ResourceMeter::new(tuning.nitro_max, tuning.nitro_drain, tuning.nitro_regen),
            particles: ParticleSystem::new(particle_cap),
            effects,
            rng,
            fx_rng,
            tuning,
        }
    }

    /// Reinitialize every subsystem to its defaults (same seed, tuning and cap)
    pub fn reset(&mut self) {
        *self = Self::new(self.seed, self.tuning.clone(), self.particles.cap());
    }

    /// Reinitialize with a new seed
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.reset();
    }

    /// Current speed multiplier from difficulty alone
    pub fn speed_multiplier(&self) -> f32 {
        1.0 + self.tuning.speed_step * self.run.difficulty_steps as f32
    }

    /// Speed the world scrolls at right now (difficulty × nitro)
    pub fn world_speed(&self) -> f32 {
        let boost = if self.nitro.active {
            self.tuning.boost_speed_factor
        } else {
            1.0
        };
        self.speed_multiplier() * boost
    }

    pub fn stats(&self) -> RunStats {
        RunStats {
            score: self.run.score,
            currency: self.run.currency,
            max_speed: self.run.max_speed,
            max_combo: self.combo.max_streak,
            ticks: self.time_ticks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_idle_and_clean() {
        let state = GameState::new(1, Tuning::default(), 256);
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.run.score, 0);
        assert_eq!(state.speed_multiplier(), 1.0);
        assert_eq!(state.nitro.current, 100.0);
        assert!(state.spawner.items.is_empty());
        assert_eq!(state.run.next_difficulty_at, 1000);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut state = GameState::new(1, Tuning::default(), 64);
        state.phase = GamePhase::Ended;
        state.run.score = 5000;
        state.run.difficulty_steps = 4;
        state.nitro.current = 3.0;
        state.combo.on_hit();
        state.spawner.increase_difficulty();
        state.time_ticks = 99;

        state.reset();
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.run.score, 0);
        assert_eq!(state.speed_multiplier(), 1.0);
        assert_eq!(state.nitro.current, 100.0);
        assert_eq!(state.combo.max_streak, 0);
        assert_eq!(state.spawner.interval_ms, 1500.0);
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.particles.cap(), 64);
    }

    #[test]
    fn test_world_speed_includes_nitro() {
        let mut state = GameState::new(1, Tuning::default(), 64);
        state.run.difficulty_steps = 10;
        assert_eq!(state.speed_multiplier(), 2.0);
        state.nitro.activate();
        assert_eq!(state.world_speed(), 3.0);
    }
}
