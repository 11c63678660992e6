//! Read-only frame snapshots and the draw pass
//!
//! The renderer never touches live game state. `Frame::capture` copies what a
//! frame needs, settings decide which ambient layers make it in, and
//! `draw_frame` paints it back to front through a `RenderSink`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::vertex::palette;
use crate::colors::{self, to_rgba};
use crate::settings::Settings;
use crate::sim::effects::{SpeedLine, Star};
use crate::sim::{GamePhase, GameState, ItemKind, Particle, Rect, RunStats};

/// Drawing primitives a host surface must provide. Colors are straight RGBA;
/// `set_alpha` multiplies every later fill until changed.
pub trait RenderSink {
    /// Called once before anything else in a frame
    fn begin_frame(&mut self) {}
    fn fill_rect(&mut self, rect: Rect, color: [f32; 4]);
    /// Vertical linear gradient
    fn fill_gradient_rect(&mut self, rect: Rect, top: [f32; 4], bottom: [f32; 4]);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: [f32; 4]);
    /// Text centered on `at`
    fn fill_text(&mut self, text: &str, at: Vec2, size: f32, color: [f32; 4]);
    fn set_alpha(&mut self, alpha: f32);
    fn push_translate(&mut self, offset: Vec2);
    /// Rotate later drawing by `angle` radians around `pivot`
    fn push_rotate(&mut self, pivot: Vec2, angle: f32);
    /// Undo the most recent push
    fn pop_transform(&mut self);
}

/// Heads-up display readouts
pub trait HudSink {
    fn update(&mut self, hud: &Hud);
    /// Game over screen
    fn show_final(&mut self, stats: &RunStats);
}

/// HUD values for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub score: u64,
    pub currency: u32,
    /// Difficulty speed, e.g. "1.3x"
    pub speed_text: String,
    pub nitro_percent: u32,
    pub combo: u32,
    pub combo_multiplier: f32,
}

impl Hud {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            score: state.run.score,
            currency: state.run.currency,
            speed_text: format!("{:.1}x", state.speed_multiplier()),
            nitro_percent: state.nitro.percent(),
            combo: state.combo.streak,
            combo_multiplier: state.combo.multiplier(),
        }
    }
}

/// One falling item as drawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemSprite {
    pub kind: ItemKind,
    pub rect: Rect,
}

/// Everything one frame draws
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub phase: GamePhase,
    pub field: Vec2,
    pub hud: Hud,
    /// Drawn silhouette, not the hitbox
    pub vehicle: Rect,
    pub heading: f32,
    pub boosting: bool,
    pub items: Vec<ItemSprite>,
    pub particles: Vec<Particle>,
    pub stars: Vec<Star>,
    pub speed_lines: Vec<SpeedLine>,
    pub road_offset: f32,
    /// Camera offset applied to the whole scene
    pub shake: Vec2,
}

impl Frame {
    pub fn capture(state: &GameState, settings: &Settings) -> Self {
        let effects = &state.effects;
        Self {
            phase: state.phase,
            field: Vec2::new(state.tuning.field_width, state.tuning.field_height),
            hud: Hud::from_state(state),
            vehicle: state.vehicle.visual_rect(),
            heading: state.vehicle.heading,
            boosting: state.vehicle.boosting,
            items: state
                .spawner
                .items
                .iter()
                .map(|item| ItemSprite {
                    kind: item.kind,
                    rect: Rect::new(item.pos.x, item.pos.y, item.size.x, item.size.y),
                })
                .collect(),
            particles: state.particles.particles.clone(),
            stars: if settings.effective_starfield() {
                effects.stars.clone()
            } else {
                Vec::new()
            },
            speed_lines: if settings.effective_speed_lines() {
                effects.speed_lines.clone()
            } else {
                Vec::new()
            },
            road_offset: effects.road_offset,
            shake: if settings.effective_screen_shake() {
                effects.shake.offset
            } else {
                Vec2::ZERO
            },
        }
    }
}

/// Center line dash and gap length
const DASH: f32 = 30.0;

/// Paint a frame back to front
pub fn draw_frame<S: RenderSink + ?Sized>(frame: &Frame, sink: &mut S) {
    sink.begin_frame();
    sink.push_translate(frame.shake);

    let field = Rect::new(0.0, 0.0, frame.field.x, frame.field.y);
    sink.fill_gradient_rect(field, palette::ROAD_TOP, palette::ROAD_BOTTOM);

    let white = to_rgba(colors::WHITE, 1.0);
    for star in &frame.stars {
        sink.set_alpha(star.opacity);
        sink.fill_circle(star.pos, star.size, white);
    }
    sink.set_alpha(1.0);

    draw_road(frame, sink);

    let gold = to_rgba(colors::GOLD, 1.0);
    for line in &frame.speed_lines {
        sink.set_alpha(line.opacity);
        sink.stroke_line(line.pos, line.pos + Vec2::new(0.0, line.length), 2.0, gold);
    }
    sink.set_alpha(1.0);

    for item in &frame.items {
        draw_item(item, sink);
    }

    draw_vehicle(frame.vehicle, frame.heading, frame.boosting, sink);

    for particle in &frame.particles {
        sink.set_alpha(particle.life.clamp(0.0, 1.0));
        sink.fill_circle(particle.pos, particle.size, to_rgba(particle.color, 1.0));
    }
    sink.set_alpha(1.0);

    sink.pop_transform();
}

fn draw_road<S: RenderSink + ?Sized>(frame: &Frame, sink: &mut S) {
    let (w, h) = (frame.field.x, frame.field.y);
    let offset = frame.road_offset;

    // Side lines narrowing toward the horizon
    let edge = to_rgba(colors::GOLD, 0.3);
    sink.stroke_line(Vec2::new(50.0, 0.0), Vec2::new(20.0, h), 3.0, edge);
    sink.stroke_line(Vec2::new(w - 50.0, 0.0), Vec2::new(w - 20.0, h), 3.0, edge);

    // Perspective grid
    let grid = to_rgba(colors::GOLD, 0.1);
    for i in 0..15 {
        let y = (i as f32 * 50.0 + offset * 0.5) % h;
        let progress = y / h;
        let left = 50.0 - 30.0 * progress;
        let right = w - 50.0 + 30.0 * progress;
        sink.stroke_line(Vec2::new(left, y), Vec2::new(right, y), 1.0, grid);
    }

    // Edge markers
    let marker = to_rgba(colors::WHITE, 0.5);
    for i in 0..10 {
        let y = (i as f32 * 80.0 + offset) % h;
        let progress = y / h;
        let width = 15.0 + progress * 10.0;
        sink.fill_rect(Rect::new(50.0 - 30.0 * progress, y, width, 3.0), marker);
        sink.fill_rect(Rect::new(w - 50.0 + 30.0 * progress - width, y, width, 3.0), marker);
    }

    // Dashed center line scrolling with the road
    let gold = to_rgba(colors::GOLD, 1.0);
    let x = w / 2.0;
    let mut y = offset % (2.0 * DASH) - 2.0 * DASH;
    while y < h {
        let top = y.max(0.0);
        let bottom = (y + DASH).min(h);
        if bottom > top {
            sink.stroke_line(Vec2::new(x, top), Vec2::new(x, bottom), 4.0, gold);
        }
        y += 2.0 * DASH;
    }
}

fn draw_item<S: RenderSink + ?Sized>(item: &ItemSprite, sink: &mut S) {
    let r = item.rect;
    let center = r.center();
    match item.kind {
        ItemKind::Hazard => {
            sink.fill_rect(r, palette::hazard());
            sink.fill_text("!", center, 30.0, palette::LABEL);
        }
        ItemKind::Currency => {
            sink.fill_circle(center, r.w / 2.0, palette::body());
            sink.fill_circle(center, r.w / 3.0, palette::lights());
            sink.fill_text("$", center, 14.0, palette::ink(1.0));
        }
        ItemKind::Boost => {
            sink.fill_circle(center, r.w / 2.0, palette::boost());
            sink.fill_circle(center, r.w / 3.0, palette::ink(0.6));
            sink.fill_text("N", center, 16.0, palette::boost());
        }
    }
}

/// Exhaust pipes sit this far in from each side of the car
const EXHAUST_INSET: f32 = 12.0;

fn draw_vehicle<S: RenderSink + ?Sized>(car: Rect, heading: f32, boosting: bool, sink: &mut S) {
    sink.push_rotate(car.center(), heading);

    if boosting {
        let glow = to_rgba(colors::GOLD_LIGHT, 0.35);
        let core = to_rgba(colors::GOLD_PALE, 0.9);
        for x in [car.x + EXHAUST_INSET, car.right() - EXHAUST_INSET] {
            let base = Vec2::new(x, car.bottom() + 6.0);
            sink.fill_circle(base, 10.0, glow);
            sink.fill_circle(base + Vec2::new(0.0, 6.0), 5.0, core);
        }
    }

    // Tires first so the body overlaps them
    let tire = palette::tire();
    for (dx, dy) in [(-5.0, 15.0), (car.w - 3.0, 15.0), (-5.0, 50.0), (car.w - 3.0, 50.0)] {
        sink.fill_rect(Rect::new(car.x + dx, car.y + dy, 8.0, 15.0), tire);
    }

    sink.fill_rect(car, palette::body());

    // Racing stripes
    sink.fill_rect(Rect::new(car.x + 10.0, car.y, 5.0, car.h), palette::ink(1.0));
    sink.fill_rect(Rect::new(car.x + car.w - 15.0, car.y, 5.0, car.h), palette::ink(1.0));

    // Windshield
    sink.fill_rect(Rect::new(car.x + 5.0, car.y + 10.0, car.w - 10.0, 20.0), palette::ink(0.7));

    // Tail lights
    let lights = palette::lights();
    sink.fill_rect(Rect::new(car.x + 5.0, car.bottom() - 5.0, 15.0, 3.0), lights);
    sink.fill_rect(Rect::new(car.right() - 20.0, car.bottom() - 5.0, 15.0, 3.0), lights);

    sink.pop_transform();
}
