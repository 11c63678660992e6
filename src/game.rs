//! Run controller: phase transitions, the fixed-step frame loop, and dispatch
//! of simulation events to audio and HUD sinks.
//!
//! Callback-driven hosts (a browser's `requestAnimationFrame`) call
//! `GameLoop::step` once per frame. Hosts that own their thread hand
//! `GameLoop::run` a `FrameClock`, an `InputSource` and a `StopToken` and let
//! it loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::audio::{AudioSink, Cue};
use crate::consts::{MAX_FRAME_MS, MAX_SUBSTEPS, SIM_DT_MS};
use crate::input::{InputEvent, InputLatch};
use crate::renderer::{Frame, Hud, HudSink, RenderSink, draw_frame};
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, GameState, RunStats, tick};
use crate::tuning::{Tuning, TuningError};

/// Source of frame timestamps (ms, monotonic). `None` ends the loop.
pub trait FrameClock {
    fn next_frame(&mut self) -> Option<f64>;
}

/// Input polled by `GameLoop::run` before each frame
pub trait InputSource {
    /// Push any device events that happened since the last poll
    fn poll(&mut self, state: &GameState, events: &mut Vec<InputEvent>);
}

/// A run with nobody at the wheel
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInput;

impl InputSource for NoInput {
    fn poll(&mut self, _state: &GameState, _events: &mut Vec<InputEvent>) {}
}

/// Shared flag that halts `GameLoop::run` before its next iteration
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Owns a run and everything that paces it
#[derive(Debug)]
pub struct GameLoop {
    state: GameState,
    settings: Settings,
    latch: InputLatch,
    accumulator: f32,
    /// Timestamp of the previous frame; `None` right after (re)starting
    last_time: Option<f64>,
}

impl GameLoop {
    /// Fails if `tuning` does not validate
    pub fn new(seed: u64, tuning: Tuning, settings: Settings) -> Result<Self, TuningError> {
        tuning.validate()?;
        let state = GameState::new(seed, tuning, settings.max_particles());
        Ok(Self {
            state,
            settings,
            latch: InputLatch::default(),
            accumulator: 0.0,
            last_time: None,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Swap settings mid-run; only presentation changes
    pub fn set_settings(&mut self, settings: Settings) {
        self.state.particles.set_cap(settings.max_particles());
        self.settings = settings;
    }

    /// Idle or Ended → Running. Returns whether a run started.
    pub fn start(&mut self) -> bool {
        match self.state.phase {
            GamePhase::Idle => {}
            GamePhase::Ended => self.reset(),
            GamePhase::Running | GamePhase::Paused => return false,
        }
        self.state.phase = GamePhase::Running;
        self.accumulator = 0.0;
        self.last_time = None;
        log::info!("Run started (seed {})", self.state.seed);
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.state.phase != GamePhase::Running {
            return false;
        }
        self.state.phase = GamePhase::Paused;
        log::info!("Paused at tick {}", self.state.time_ticks);
        true
    }

    /// Paused wall time is never fed to the simulation
    pub fn resume(&mut self) -> bool {
        if self.state.phase != GamePhase::Paused {
            return false;
        }
        self.state.phase = GamePhase::Running;
        self.accumulator = 0.0;
        self.last_time = None;
        log::info!("Resumed");
        true
    }

    /// Any phase → Idle with every subsystem back at its defaults
    pub fn reset(&mut self) {
        self.state.reset();
        self.latch.clear();
        self.accumulator = 0.0;
        self.last_time = None;
        log::info!("Run reset");
    }

    /// Reset into a fresh seed
    pub fn reseed(&mut self, seed: u64) {
        self.state.seed = seed;
        self.reset();
    }

    /// Latch a device event; it takes effect at the start of the next tick
    pub fn handle_input(&mut self, event: InputEvent) {
        self.latch.apply(event);
    }

    /// Advance by the wall time since the previous frame.
    ///
    /// Elapsed time is sanitized, capped at `MAX_FRAME_MS` and consumed in fixed
    /// `SIM_DT_MS` ticks, at most `MAX_SUBSTEPS` per frame. Ticking stops the
    /// moment the run ends.
    pub fn frame(&mut self, now_ms: f64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if !now_ms.is_finite() {
            return events;
        }
        let last = self.last_time.replace(now_ms);
        if self.state.phase != GamePhase::Running {
            return events;
        }
        let Some(last) = last else {
            return events;
        };

        let mut dt = crate::sanitize_dt((now_ms - last) as f32);
        if dt > MAX_FRAME_MS {
            log::warn!("Frame took {:.0}ms, dropping {:.0}ms", dt, dt - MAX_FRAME_MS);
            dt = MAX_FRAME_MS;
        }
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT_MS && substeps < MAX_SUBSTEPS {
            let input = self.latch.take();
            tick(&mut self.state, &input, SIM_DT_MS, &mut events);
            self.accumulator -= SIM_DT_MS;
            substeps += 1;

            if self.state.phase != GamePhase::Running {
                self.accumulator = 0.0;
                break;
            }
        }
        log::trace!("Frame ran {} substeps", substeps);

        events
    }

    pub fn snapshot(&self) -> Frame {
        Frame::capture(&self.state, &self.settings)
    }

    pub fn hud(&self) -> Hud {
        Hud::from_state(&self.state)
    }

    pub fn stats(&self) -> RunStats {
        self.state.stats()
    }

    /// One host frame: simulate up to `now_ms`, route the events, then draw
    /// and refresh the HUD
    pub fn step<A, H, R>(&mut self, now_ms: f64, audio: &mut A, hud: &mut H, render: &mut R)
    where
        A: AudioSink + ?Sized,
        H: HudSink + ?Sized,
        R: RenderSink + ?Sized,
    {
        let events = self.frame(now_ms);
        dispatch(&events, audio, hud);

        let frame = self.snapshot();
        draw_frame(&frame, render);
        hud.update(&frame.hud);
    }

    /// Drive the run until the stop token trips, the clock runs out, or the
    /// run ends. Starts a run first if none is in progress.
    pub fn run<C, I, A, H, R>(
        &mut self,
        clock: &mut C,
        input: &mut I,
        stop: &StopToken,
        audio: &mut A,
        hud: &mut H,
        render: &mut R,
    ) -> RunStats
    where
        C: FrameClock + ?Sized,
        I: InputSource + ?Sized,
        A: AudioSink + ?Sized,
        H: HudSink + ?Sized,
        R: RenderSink + ?Sized,
    {
        if matches!(self.state.phase, GamePhase::Idle | GamePhase::Ended) {
            self.start();
        }

        let mut pending = Vec::new();
        loop {
            if stop.is_stopped() {
                log::info!("Stop requested at tick {}", self.state.time_ticks);
                break;
            }
            let Some(now) = clock.next_frame() else {
                log::info!("Frame clock exhausted");
                break;
            };

            input.poll(&self.state, &mut pending);
            for event in pending.drain(..) {
                self.handle_input(event);
            }
            self.step(now, audio, hud, render);

            if self.state.phase == GamePhase::Ended {
                break;
            }
        }

        self.stats()
    }
}

/// Route events to their sinks
pub fn dispatch<A, H>(events: &[GameEvent], audio: &mut A, hud: &mut H)
where
    A: AudioSink + ?Sized,
    H: HudSink + ?Sized,
{
    for event in events {
        if let Some(cue) = Cue::for_event(event) {
            audio.play(cue);
        }
        if let GameEvent::Crashed(stats) = event {
            hud.show_final(stats);
        }
    }
}
