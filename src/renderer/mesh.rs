//! CPU-side render sink producing a triangle list
//!
//! A host uploads `vertices` (bytemuck-castable) as one vertex buffer and draws
//! `labels` with whatever text facility it has.

use glam::{Affine2, Vec2};
use serde::Serialize;

use super::frame::RenderSink;
use super::shapes;
use super::vertex::Vertex;
use crate::sim::Rect;

/// Text queued for the host's text renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLabel {
    pub text: String,
    /// Center, already transformed
    pub pos: Vec2,
    pub size: f32,
    pub color: [f32; 4],
}

/// Accumulates one frame of geometry
#[derive(Debug, Default)]
pub struct MeshBuilder {
    pub vertices: Vec<Vertex>,
    pub labels: Vec<TextLabel>,
    /// Transforms saved by each push
    saved: Vec<Affine2>,
    transform: Affine2,
    alpha: Option<f32>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop last frame's output, keeping allocations
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.labels.clear();
        self.saved.clear();
        self.transform = Affine2::IDENTITY;
        self.alpha = None;
    }

    /// Raw bytes for a vertex buffer upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    fn tint(&self, mut color: [f32; 4]) -> [f32; 4] {
        color[3] *= self.alpha.unwrap_or(1.0);
        color
    }

    fn append(&mut self, vertices: Vec<Vertex>) {
        let transform = self.transform;
        self.vertices.extend(vertices.into_iter().map(|mut v| {
            v.position = transform.transform_point2(Vec2::from(v.position)).to_array();
            v
        }));
    }

    fn push(&mut self, next: Affine2) {
        self.saved.push(self.transform);
        self.transform = self.transform * next;
    }
}

impl RenderSink for MeshBuilder {
    fn begin_frame(&mut self) {
        self.clear();
    }

    fn fill_rect(&mut self, rect: Rect, color: [f32; 4]) {
        let color = self.tint(color);
        self.append(shapes::rect(rect, color));
    }

    fn fill_gradient_rect(&mut self, rect: Rect, top: [f32; 4], bottom: [f32; 4]) {
        let (top, bottom) = (self.tint(top), self.tint(bottom));
        self.append(shapes::gradient_rect(rect, top, bottom));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        if radius <= 0.0 {
            return;
        }
        let color = self.tint(color);
        self.append(shapes::circle(center, radius, color, shapes::circle_segments(radius)));
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: [f32; 4]) {
        let color = self.tint(color);
        self.append(shapes::line(from, to, width, color));
    }

    fn fill_text(&mut self, text: &str, at: Vec2, size: f32, color: [f32; 4]) {
        let color = self.tint(color);
        self.labels.push(TextLabel {
            text: text.to_string(),
            pos: self.transform.transform_point2(at),
            size,
            color,
        });
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.alpha = Some(alpha.clamp(0.0, 1.0));
    }

    fn push_translate(&mut self, offset: Vec2) {
        self.push(Affine2::from_translation(offset));
    }

    fn push_rotate(&mut self, pivot: Vec2, angle: f32) {
        self.push(
            Affine2::from_translation(pivot)
                * Affine2::from_angle(angle)
                * Affine2::from_translation(-pivot),
        );
    }

    fn pop_transform(&mut self) {
        if let Some(transform) = self.saved.pop() {
            self.transform = transform;
        } else {
            log::warn!("pop_transform without a matching push");
        }
    }
}
