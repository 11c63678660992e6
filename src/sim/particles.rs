//! Particle system for pickup sparks, crash debris and exhaust trails
//!
//! Particles are purely cosmetic. They draw from their own RNG stream so the
//! particle cap (a quality setting) can never change a run's outcome.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::colors;
use crate::consts::{PARTICLE_GRAVITY, PARTICLE_SHRINK};

/// A single spark
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Packed 0xRRGGBB
    pub color: u32,
    pub size: f32,
    /// 1 at birth, dead at 0; doubles as draw alpha
    pub life: f32,
    /// Life lost per tick
    pub decay: f32,
}

impl Particle {
    pub fn update(&mut self) {
        self.pos += self.vel;
        self.vel.y += PARTICLE_GRAVITY;
        self.life -= self.decay;
        self.size *= PARTICLE_SHRINK;
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.life <= 0.0
    }
}

/// Palette for nitro flames
const NITRO_COLORS: [u32; 3] = [colors::GOLD, colors::GOLD_LIGHT, colors::GOLD_PALE];

/// Maximum speed on each axis at emission (pixels/tick)
const SPREAD: f32 = 3.0;

/// Live particles with a hard cap; the oldest are evicted on overflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleSystem {
    pub particles: Vec<Particle>,
    cap: usize,
}

impl ParticleSystem {
    pub fn new(cap: usize) -> Self {
        Self {
            particles: Vec::with_capacity(cap.min(512)),
            cap,
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn set_cap(&mut self, cap: usize) {
        self.cap = cap;
        self.enforce_cap();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    fn spawn<R: Rng>(&mut self, pos: Vec2, color: u32, size: f32, rng: &mut R) {
        let vel = Vec2::new(
            rng.random_range(-SPREAD..SPREAD),
            rng.random_range(-SPREAD..SPREAD),
        );
        self.particles.push(Particle {
            pos,
            vel,
            color,
            size,
            life: 1.0,
            decay: rng.random_range(0.01..0.03),
        });
    }

    /// Explosion of `count` sparks at `point`
    pub fn emit_burst<R: Rng>(&mut self, point: Vec2, color: u32, count: usize, rng: &mut R) {
        if self.cap == 0 {
            return;
        }
        for _ in 0..count {
            let size = rng.random_range(2.0..6.0);
            self.spawn(point, color, size, rng);
        }
        self.enforce_cap();
    }

    /// One faint exhaust puff
    pub fn emit_trail<R: Rng>(&mut self, point: Vec2, color: u32, rng: &mut R) {
        if self.cap == 0 {
            return;
        }
        let size = rng.random_range(1.0..4.0);
        self.spawn(point, color, size, rng);
        self.enforce_cap();
    }

    /// One big flame puff in a random gold shade
    pub fn emit_nitro_trail<R: Rng>(&mut self, point: Vec2, rng: &mut R) {
        self.emit_nitro_burst(point, 1, rng);
    }

    /// Flame blast from an exhaust pipe when nitro kicks in
    pub fn emit_nitro_burst<R: Rng>(&mut self, point: Vec2, count: usize, rng: &mut R) {
        if self.cap == 0 {
            return;
        }
        for _ in 0..count {
            let color = NITRO_COLORS[rng.random_range(0..NITRO_COLORS.len())];
            let size = rng.random_range(3.0..8.0);
            self.spawn(point, color, size, rng);
        }
        self.enforce_cap();
    }

    /// Advance every particle and drop the dead ones
    pub fn tick(&mut self) {
        for particle in &mut self.particles {
            particle.update();
        }
        self.particles.retain(|p| !p.is_dead());
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    fn enforce_cap(&mut self) {
        let len = self.particles.len();
        if len > self.cap {
            self.particles.drain(..len - self.cap);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_burst_spawns_count() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut system = ParticleSystem::new(256);
        system.emit_burst(Vec2::new(100.0, 100.0), colors::GOLD, 20, &mut rng);
        assert_eq!(system.len(), 20);
        for p in &system.particles {
            assert_eq!(p.pos, Vec2::new(100.0, 100.0));
            assert!(p.vel.x.abs() <= SPREAD && p.vel.y.abs() <= SPREAD);
            assert!((2.0..6.0).contains(&p.size));
            assert_eq!(p.life, 1.0);
        }
    }

    #[test]
    fn test_particle_physics() {
        let mut p = Particle {
            pos: Vec2::ZERO,
            vel: Vec2::new(1.0, -2.0),
            color: colors::WHITE,
            size: 4.0,
            life: 1.0,
            decay: 0.25,
        };
        p.update();
        assert_eq!(p.pos, Vec2::new(1.0, -2.0));
        assert!((p.vel.y - -1.9).abs() < 1e-6);
        assert_eq!(p.life, 0.75);
        assert!((p.size - 3.92).abs() < 1e-6);
    }

    #[test]
    fn test_particles_die_and_are_pruned() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut system = ParticleSystem::new(256);
        system.emit_burst(Vec2::ZERO, colors::HAZARD_RED, 10, &mut rng);
        system.emit_trail(Vec2::ZERO, colors::WHITE, &mut rng);
        // Slowest decay is 0.01 per tick
        for _ in 0..101 {
            system.tick();
        }
        assert!(system.is_empty());
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut system = ParticleSystem::new(5);
        system.emit_burst(Vec2::ZERO, colors::HAZARD_RED, 4, &mut rng);
        system.emit_burst(Vec2::ONE, colors::GOLD, 4, &mut rng);
        assert_eq!(system.len(), 5);
        // One survivor from the first burst, all of the second
        assert_eq!(system.particles[0].color, colors::HAZARD_RED);
        assert!(system.particles[1..].iter().all(|p| p.color == colors::GOLD));
    }

    #[test]
    fn test_zero_cap_disables() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut system = ParticleSystem::new(0);
        system.emit_burst(Vec2::ZERO, colors::GOLD, 30, &mut rng);
        system.emit_nitro_trail(Vec2::ZERO, &mut rng);
        assert!(system.is_empty());
    }

    #[test]
    fn test_nitro_trail_palette() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut system = ParticleSystem::new(64);
        for _ in 0..32 {
            system.emit_nitro_trail(Vec2::ZERO, &mut rng);
        }
        assert!(system.particles.iter().all(|p| NITRO_COLORS.contains(&p.color)));
        assert!(system.particles.iter().all(|p| (3.0..8.0).contains(&p.size)));
    }

    #[test]
    fn test_shrinking_cap_trims() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut system = ParticleSystem::new(100);
        system.emit_burst(Vec2::ZERO, colors::GOLD, 50, &mut rng);
        system.set_cap(10);
        assert_eq!(system.len(), 10);
    }
}
