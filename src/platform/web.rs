//! Browser sinks: a 2D canvas renderer and a DOM heads-up display

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use crate::renderer::{Hud, HudSink, RenderSink};
use crate::sim::{Rect, RunStats};

/// CSS color string from straight RGBA
fn css(color: [f32; 4]) -> String {
    format!(
        "rgba({}, {}, {}, {:.3})",
        (color[0].clamp(0.0, 1.0) * 255.0).round() as u8,
        (color[1].clamp(0.0, 1.0) * 255.0).round() as u8,
        (color[2].clamp(0.0, 1.0) * 255.0).round() as u8,
        color[3].clamp(0.0, 1.0)
    )
}

/// Draws straight onto a `<canvas>` 2D context
pub struct CanvasSink {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl CanvasSink {
    pub fn new(canvas: &HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()??
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        Some(Self {
            ctx,
            width: canvas.width() as f64,
            height: canvas.height() as f64,
        })
    }
}

impl RenderSink for CanvasSink {
    fn begin_frame(&mut self) {
        self.ctx.set_global_alpha(1.0);
        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
    }

    fn fill_rect(&mut self, rect: Rect, color: [f32; 4]) {
        self.ctx.set_fill_style_str(&css(color));
        self.ctx
            .fill_rect(rect.x as f64, rect.y as f64, rect.w as f64, rect.h as f64);
    }

    fn fill_gradient_rect(&mut self, rect: Rect, top: [f32; 4], bottom: [f32; 4]) {
        let gradient = self.ctx.create_linear_gradient(
            0.0,
            rect.y as f64,
            0.0,
            rect.bottom() as f64,
        );
        let _ = gradient.add_color_stop(0.0, &css(top));
        let _ = gradient.add_color_stop(1.0, &css(bottom));
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.ctx
            .fill_rect(rect.x as f64, rect.y as f64, rect.w as f64, rect.h as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        if radius <= 0.0 {
            return;
        }
        self.ctx.set_fill_style_str(&css(color));
        self.ctx.begin_path();
        if self
            .ctx
            .arc(
                center.x as f64,
                center.y as f64,
                radius as f64,
                0.0,
                std::f64::consts::TAU,
            )
            .is_ok()
        {
            self.ctx.fill();
        }
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: [f32; 4]) {
        self.ctx.set_stroke_style_str(&css(color));
        self.ctx.set_line_width(width as f64);
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.stroke();
    }

    fn fill_text(&mut self, text: &str, at: Vec2, size: f32, color: [f32; 4]) {
        self.ctx.set_fill_style_str(&css(color));
        self.ctx.set_font(&format!("bold {}px Arial", size.round()));
        let _ = self.ctx.fill_text(text, at.x as f64, at.y as f64);
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(alpha.clamp(0.0, 1.0) as f64);
    }

    fn push_translate(&mut self, offset: Vec2) {
        self.ctx.save();
        let _ = self.ctx.translate(offset.x as f64, offset.y as f64);
    }

    fn push_rotate(&mut self, pivot: Vec2, angle: f32) {
        self.ctx.save();
        let (x, y) = (pivot.x as f64, pivot.y as f64);
        let _ = self.ctx.translate(x, y);
        let _ = self.ctx.rotate(angle as f64);
        let _ = self.ctx.translate(-x, -y);
    }

    fn pop_transform(&mut self) {
        self.ctx.restore();
    }
}

/// Writes HUD values into page elements by id
pub struct DomHud {
    document: Document,
}

impl DomHud {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn set_text(&self, id: &str, text: &str) {
        if let Some(el) = self.document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    /// Show one screen (`start-screen`, `game-screen`, `game-over-screen`),
    /// hiding the others
    pub fn show_screen(&self, id: &str) {
        for screen in ["start-screen", "game-screen", "game-over-screen"] {
            if let Some(el) = self.document.get_element_by_id(screen) {
                let classes = el.class_list();
                let _ = if screen == id {
                    classes.remove_1("hidden")
                } else {
                    classes.add_1("hidden")
                };
            }
        }
    }
}

impl HudSink for DomHud {
    fn update(&mut self, hud: &Hud) {
        self.set_text("score", &hud.score.to_string());
        self.set_text("currency", &hud.currency.to_string());
        self.set_text("speed", &hud.speed_text);
        self.set_text("nitro", &format!("{}%", hud.nitro_percent));
        let combo = if hud.combo > 1 {
            format!("x{} ({:.1}x)", hud.combo, hud.combo_multiplier)
        } else {
            String::new()
        };
        self.set_text("combo", &combo);
    }

    fn show_final(&mut self, stats: &RunStats) {
        self.set_text("final-score", &stats.score.to_string());
        self.set_text("final-currency", &stats.currency.to_string());
        self.set_text("final-speed", &format!("{:.1}x", stats.max_speed));
        self.set_text("final-combo", &stats.max_combo.to_string());
        self.show_screen("game-over-screen");
    }
}
