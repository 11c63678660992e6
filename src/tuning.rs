//! Data-driven game balance
//!
//! Every number that shapes a run lives here so balance can be tweaked from
//! JSON without touching simulation code. Missing fields fall back to the
//! defaults, so an override file only needs the values it changes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{FIELD_HEIGHT, FIELD_WIDTH};

/// Rejected configuration (tuning or settings)
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} must be within [0, 1] (got {value})")]
    NotProbability { field: &'static str, value: f32 },
    #[error("currency and boost probabilities sum to {0}, which exceeds 1")]
    ProbabilityOverflow(f32),
    #[error("spawn interval floor {floor}ms is above the starting interval {initial}ms")]
    FloorAboveInitial { floor: f32, initial: f32 },
}

/// Game balance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Field ===
    pub field_width: f32,
    pub field_height: f32,

    // === Movement (pixels per 60 Hz tick) ===
    /// Lateral vehicle speed
    pub vehicle_speed: f32,
    /// Base fall speed of items before the speed multiplier
    pub item_fall_speed: f32,

    // === Spawning ===
    pub spawn_interval_ms: f32,
    /// How much each difficulty step shortens the interval
    pub spawn_interval_step_ms: f32,
    /// The interval never shrinks below this
    pub spawn_interval_floor_ms: f32,
    pub currency_probability: f32,
    /// Only rolled once the run's score reaches `boost_unlock_score`
    pub boost_probability: f32,
    pub boost_unlock_score: u64,

    // === Scoring ===
    /// Base points per coin, scaled by the combo multiplier
    pub currency_reward: u64,
    pub combo_window_ms: f32,
    /// Score gap between difficulty steps
    pub difficulty_score_step: u64,
    /// Speed multiplier gained per difficulty step
    pub speed_step: f32,

    // === Nitro ===
    pub nitro_max: f32,
    /// Drained per tick while active
    pub nitro_drain: f32,
    /// Regenerated per tick while idle
    pub nitro_regen: f32,
    /// Nitro refilled by a boost pickup
    pub boost_refill: f32,
    /// World speed factor while nitro burns
    pub boost_speed_factor: f32,

    // === Feedback ===
    /// Chance per tick of dropping a trail particle while moving or boosting
    pub trail_probability: f32,
    pub crash_burst: usize,
    pub coin_burst: usize,
    pub boost_burst: usize,
    /// Flame particles per exhaust pipe when nitro engages
    pub nitro_burst: usize,
    pub crash_shake_ms: f32,
    pub crash_shake_intensity: f32,
    pub boost_shake_ms: f32,
    pub boost_shake_intensity: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,

            vehicle_speed: 8.0,
            item_fall_speed: 5.0,

            spawn_interval_ms: 1500.0,
            spawn_interval_step_ms: 100.0,
            spawn_interval_floor_ms: 800.0,
            currency_probability: 0.4,
            boost_probability: 0.08,
            boost_unlock_score: 2000,

            currency_reward: 50,
            combo_window_ms: 2000.0,
            difficulty_score_step: 1000,
            speed_step: 0.1,

            nitro_max: 100.0,
            nitro_drain: 0.5,
            nitro_regen: 0.1,
            boost_refill: 35.0,
            boost_speed_factor: 1.5,

            trail_probability: 0.3,
            crash_burst: 30,
            coin_burst: 15,
            boost_burst: 20,
            nitro_burst: 8,
            crash_shake_ms: 300.0,
            crash_shake_intensity: 5.0,
            boost_shake_ms: 150.0,
            boost_shake_intensity: 3.0,
        }
    }
}

impl Tuning {
    /// Parse and validate a (possibly partial) JSON override
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json_pretty(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the values the simulation relies on being sane
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("field_width", self.field_width),
            ("field_height", self.field_height),
            ("vehicle_speed", self.vehicle_speed),
            ("item_fall_speed", self.item_fall_speed),
            ("spawn_interval_ms", self.spawn_interval_ms),
            ("spawn_interval_floor_ms", self.spawn_interval_floor_ms),
            ("combo_window_ms", self.combo_window_ms),
            ("nitro_max", self.nitro_max),
            ("nitro_drain", self.nitro_drain),
            ("boost_speed_factor", self.boost_speed_factor),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(TuningError::NotPositive { field, value });
            }
        }
        // Zero is allowed: it switches the mechanic off
        let non_negative = [
            ("nitro_regen", self.nitro_regen),
            ("boost_refill", self.boost_refill),
            ("speed_step", self.speed_step),
            ("spawn_interval_step_ms", self.spawn_interval_step_ms),
            ("crash_shake_ms", self.crash_shake_ms),
            ("crash_shake_intensity", self.crash_shake_intensity),
            ("boost_shake_ms", self.boost_shake_ms),
            ("boost_shake_intensity", self.boost_shake_intensity),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(TuningError::Negative { field, value });
            }
        }
        if self.difficulty_score_step == 0 {
            return Err(TuningError::NotPositive {
                field: "difficulty_score_step",
                value: 0.0,
            });
        }

        let probabilities = [
            ("currency_probability", self.currency_probability),
            ("boost_probability", self.boost_probability),
            ("trail_probability", self.trail_probability),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(TuningError::NotProbability { field, value });
            }
        }
        let item_total = self.currency_probability + self.boost_probability;
        if item_total > 1.0 {
            return Err(TuningError::ProbabilityOverflow(item_total));
        }

        if self.spawn_interval_floor_ms > self.spawn_interval_ms {
            return Err(TuningError::FloorAboveInitial {
                floor: self.spawn_interval_floor_ms,
                initial: self.spawn_interval_ms,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_override() {
        let tuning = Tuning::from_json(r#"{ "vehicle_speed": 10.0, "boost_unlock_score": 0 }"#)
            .expect("valid override");
        assert_eq!(tuning.vehicle_speed, 10.0);
        assert_eq!(tuning.boost_unlock_score, 0);
        // Untouched fields keep their defaults
        assert_eq!(tuning.spawn_interval_ms, 1500.0);
    }

    #[test]
    fn test_rejects_zero_floor() {
        let err = Tuning::from_json(r#"{ "spawn_interval_floor_ms": 0.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::NotPositive {
                field: "spawn_interval_floor_ms",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_nan() {
        let tuning = Tuning {
            nitro_max: f32::NAN,
            ..Default::default()
        };
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_rejects_non_positive_drain() {
        for json in [r#"{ "nitro_drain": -1.0 }"#, r#"{ "nitro_drain": 0.0 }"#] {
            assert!(matches!(
                Tuning::from_json(json),
                Err(TuningError::NotPositive {
                    field: "nitro_drain",
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_rejects_negative_rates_and_steps() {
        for field in ["nitro_regen", "boost_refill", "speed_step", "spawn_interval_step_ms"] {
            let json = format!(r#"{{ "{field}": -0.5 }}"#);
            match Tuning::from_json(&json) {
                Err(TuningError::Negative { field: got, value }) => {
                    assert_eq!(got, field);
                    assert_eq!(value, -0.5);
                }
                other => panic!("{field}: expected rejection, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_rejects_nan_rates() {
        let tuning = Tuning {
            speed_step: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::Negative {
                field: "speed_step",
                ..
            })
        ));
    }

    #[test]
    fn test_zero_steps_are_allowed() {
        let tuning = Tuning::from_json(r#"{ "speed_step": 0.0, "nitro_regen": 0.0, "boost_refill": 0.0 }"#)
            .expect("zero disables a mechanic");
        assert_eq!(tuning.speed_step, 0.0);
    }

    #[test]
    fn test_rejects_probability_overflow() {
        let err = Tuning::from_json(r#"{ "currency_probability": 0.95, "boost_probability": 0.1 }"#)
            .unwrap_err();
        assert!(matches!(err, TuningError::ProbabilityOverflow(_)));
    }

    #[test]
    fn test_rejects_floor_above_initial() {
        let err = Tuning::from_json(r#"{ "spawn_interval_ms": 500.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::FloorAboveInitial { .. }));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            Tuning::from_json("not json"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_json_roundtrip_keeps_values() {
        let original = Tuning {
            coin_burst: 3,
            ..Default::default()
        };
        let json = original.to_json_pretty().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), original);
    }
}
