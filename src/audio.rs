//! Sound cues
//!
//! The simulation reports events; this module turns the audible ones into
//! fire-and-forget cues. In the browser each cue is synthesized with Web Audio
//! oscillators, so no sound files are needed. Audio failures never reach the
//! game: the backend warns once and carries on silently.

use crate::sim::GameEvent;

/// Audible feedback for gameplay events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Coin picked up
    Coin,
    /// Nitro canister picked up
    Boost,
    /// Hit a hazard
    Crash,
}

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Sawtooth,
    Square,
}

/// One synthesized note: a tone that decays from 0.3 × volume to silence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency: f32,
    /// Seconds
    pub duration: f64,
    /// Seconds after the cue fires
    pub delay: f64,
    pub waveform: Waveform,
}

/// Peak gain of every tone before volume scaling
pub const TONE_GAIN: f32 = 0.3;

const COIN_TONES: [Tone; 2] = [
    Tone {
        frequency: 800.0,
        duration: 0.1,
        delay: 0.0,
        waveform: Waveform::Sine,
    },
    Tone {
        frequency: 1000.0,
        duration: 0.1,
        delay: 0.05,
        waveform: Waveform::Sine,
    },
];

const BOOST_TONES: [Tone; 1] = [Tone {
    frequency: 200.0,
    duration: 0.3,
    delay: 0.0,
    waveform: Waveform::Sawtooth,
}];

const CRASH_TONES: [Tone; 1] = [Tone {
    frequency: 100.0,
    duration: 0.5,
    delay: 0.0,
    waveform: Waveform::Square,
}];

impl Cue {
    /// The cue an event should trigger, if any
    pub fn for_event(event: &GameEvent) -> Option<Cue> {
        match event {
            GameEvent::CoinCollected { .. } => Some(Cue::Coin),
            GameEvent::BoostCollected | GameEvent::NitroEngaged => Some(Cue::Boost),
            GameEvent::Crashed(_) => Some(Cue::Crash),
            _ => None,
        }
    }

    /// Notes making up this cue
    pub fn tones(&self) -> &'static [Tone] {
        match self {
            Cue::Coin => &COIN_TONES,
            Cue::Boost => &BOOST_TONES,
            Cue::Crash => &CRASH_TONES,
        }
    }
}

/// Anything that can make a cue audible. Playback is fire-and-forget.
pub trait AudioSink {
    fn play(&mut self, cue: Cue);
}

/// Silent sink (headless runs, tests, audio unavailable)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: Cue) {}
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, Cue, TONE_GAIN, Tone, Waveform};
    use crate::settings::Settings;

    /// Web Audio backend
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        /// Master volume after mute
        volume: f32,
        warned: bool,
    }

    impl WebAudio {
        pub fn new(settings: &Settings) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            let unavailable = ctx.is_none();
            if unavailable {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            let mut audio = Self {
                ctx,
                volume: 1.0,
                warned: unavailable,
            };
            audio.apply_settings(settings);
            audio
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Pick up volume and mute from the player's settings
        pub fn apply_settings(&mut self, settings: &Settings) {
            self.volume = settings.effective_volume().clamp(0.0, 1.0);
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        fn play_tone(ctx: &AudioContext, tone: &Tone, vol: f32) -> Option<()> {
            let osc_type = match tone.waveform {
                Waveform::Sine => OscillatorType::Sine,
                Waveform::Sawtooth => OscillatorType::Sawtooth,
                Waveform::Square => OscillatorType::Square,
            };
            let (osc, gain) = Self::create_osc(ctx, tone.frequency, osc_type)?;
            let t = ctx.current_time() + tone.delay;

            gain.gain().set_value_at_time(TONE_GAIN * vol, t).ok()?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + tone.duration)
                .ok()?;

            osc.start_with_when(t).ok()?;
            osc.stop_with_when(t + tone.duration).ok()
        }
    }

    impl AudioSink for WebAudio {
        fn play(&mut self, cue: Cue) {
            let vol = self.volume;
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Browsers suspend the context until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let ok = cue.tones().iter().all(|tone| Self::play_tone(ctx, tone, vol).is_some());
            if !ok && !self.warned {
                log::warn!("Web Audio playback failed for {:?}; further failures are silent", cue);
                self.warned = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::RunStats;

    #[test]
    fn test_event_cues() {
        let coin = GameEvent::CoinCollected {
            points: 55,
            combo: 1,
        };
        assert_eq!(Cue::for_event(&coin), Some(Cue::Coin));
        assert_eq!(Cue::for_event(&GameEvent::BoostCollected), Some(Cue::Boost));
        // Engaging nitro gets the sawtooth rev once, not per tick
        assert_eq!(Cue::for_event(&GameEvent::NitroEngaged), Some(Cue::Boost));
        let stats = RunStats {
            score: 1,
            currency: 0,
            max_speed: 1.0,
            max_combo: 0,
            ticks: 1,
        };
        assert_eq!(Cue::for_event(&GameEvent::Crashed(stats)), Some(Cue::Crash));
        assert_eq!(Cue::for_event(&GameEvent::NitroDepleted), None);
    }

    #[test]
    fn test_coin_is_a_rising_pair() {
        let tones = Cue::Coin.tones();
        assert_eq!(tones.len(), 2);
        assert!(tones[1].frequency > tones[0].frequency);
        assert_eq!(tones[1].delay, 0.05);
    }

    #[test]
    fn test_crash_is_longest() {
        let longest = |cue: Cue| cue.tones().iter().map(|t| t.delay + t.duration).fold(0.0, f64::max);
        assert!(longest(Cue::Crash) > longest(Cue::Boost));
        assert!(longest(Cue::Boost) > longest(Cue::Coin));
    }
}
