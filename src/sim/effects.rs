//! Ambient per-frame effects: screen shake, parallax stars, road scroll, speed lines
//!
//! None of this feeds back into gameplay.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of parallax stars
pub const STAR_COUNT: usize = 100;
/// Number of speed streaks
pub const SPEED_LINE_COUNT: usize = 30;
/// Road marker period (pixels)
pub const ROAD_PERIOD: f32 = 100.0;

/// Camera jitter after impacts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreenShake {
    pub remaining_ms: f32,
    pub intensity: f32,
    pub offset: Vec2,
}

impl ScreenShake {
    /// Begin shaking; an in-progress stronger or longer shake is not cut short
    pub fn start(&mut self, duration_ms: f32, intensity: f32) {
        self.remaining_ms = self.remaining_ms.max(duration_ms);
        self.intensity = self.intensity.max(intensity);
    }

    pub fn tick<R: Rng>(&mut self, dt_ms: f32, rng: &mut R) {
        if self.remaining_ms > 0.0 {
            self.remaining_ms = (self.remaining_ms - dt_ms).max(0.0);
            let half = self.intensity / 2.0;
            if half > 0.0 {
                self.offset = Vec2::new(rng.random_range(-half..half), rng.random_range(-half..half));
            }
        } else {
            self.intensity = 0.0;
            self.offset = Vec2::ZERO;
        }
    }

    pub fn is_active(&self) -> bool {
        self.remaining_ms > 0.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Star {
    pub pos: Vec2,
    pub size: f32,
    pub speed: f32,
    pub opacity: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedLine {
    pub pos: Vec2,
    pub length: f32,
    pub speed: f32,
    pub opacity: f32,
}

/// All ambient layers, back to front
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Effects {
    pub shake: ScreenShake,
    pub stars: Vec<Star>,
    /// Road marker scroll offset in [0, ROAD_PERIOD)
    pub road_offset: f32,
    pub speed_lines: Vec<SpeedLine>,
    field: Vec2,
}

impl Effects {
    pub fn new<R: Rng>(field_width: f32, field_height: f32, rng: &mut R) -> Self {
        let stars = (0..STAR_COUNT)
            .map(|_| Star {
                pos: Vec2::new(
                    rng.random_range(0.0..field_width),
                    rng.random_range(0.0..field_height),
                ),
                size: rng.random_range(0.0..2.0),
                speed: rng.random_range(1.0..3.0),
                opacity: rng.random::<f32>(),
            })
            .collect();
        let speed_lines = (0..SPEED_LINE_COUNT)
            .map(|_| SpeedLine {
                pos: Vec2::new(
                    rng.random_range(0.0..field_width),
                    rng.random_range(0.0..field_height),
                ),
                length: rng.random_range(20.0..70.0),
                speed: rng.random_range(2.0..5.0),
                opacity: rng.random_range(0.0..0.5),
            })
            .collect();

        Self {
            shake: ScreenShake::default(),
            stars,
            road_offset: 0.0,
            speed_lines,
            field: Vec2::new(field_width, field_height),
        }
    }

    /// Advance every layer; `speed_factor` is the current world speed
    pub fn tick<R: Rng>(&mut self, dt_ms: f32, speed_factor: f32, rng: &mut R) {
        self.shake.tick(dt_ms, rng);

        for star in &mut self.stars {
            star.pos.y += star.speed * speed_factor;
            if star.pos.y > self.field.y {
                star.pos.y = 0.0;
                star.pos.x = rng.random_range(0.0..self.field.x);
            }
        }

        self.road_offset = (self.road_offset + 5.0 * speed_factor) % ROAD_PERIOD;

        for line in &mut self.speed_lines {
            line.pos.y += line.speed * speed_factor * 3.0;
            if line.pos.y > self.field.y {
                line.pos.y = -line.length;
                line.pos.x = rng.random_range(0.0..self.field.x);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_shake_runs_out() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut shake = ScreenShake::default();
        shake.start(300.0, 5.0);
        shake.tick(100.0, &mut rng);
        assert!(shake.is_active());
        assert!(shake.offset.x.abs() <= 2.5 && shake.offset.y.abs() <= 2.5);

        shake.tick(200.0, &mut rng);
        assert!(!shake.is_active());
        shake.tick(16.0, &mut rng);
        assert_eq!(shake.offset, Vec2::ZERO);
    }

    #[test]
    fn test_weaker_shake_does_not_cut_stronger() {
        let mut shake = ScreenShake::default();
        shake.start(300.0, 5.0);
        shake.start(150.0, 3.0);
        assert_eq!(shake.remaining_ms, 300.0);
        assert_eq!(shake.intensity, 5.0);
    }

    #[test]
    fn test_layers_wrap_inside_field() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut effects = Effects::new(400.0, 600.0, &mut rng);
        assert_eq!(effects.stars.len(), STAR_COUNT);
        assert_eq!(effects.speed_lines.len(), SPEED_LINE_COUNT);

        for _ in 0..1000 {
            effects.tick(16.0, 2.0, &mut rng);
            assert!(effects.road_offset >= 0.0 && effects.road_offset < ROAD_PERIOD);
        }
        assert!(effects.stars.iter().all(|s| s.pos.y <= 600.0));
        assert!(effects.speed_lines.iter().all(|l| l.pos.y <= 600.0));
    }
}
