//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color, laid out for direct GPU upload
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    /// Byte stride of one vertex in a packed buffer
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();
}

/// Colors for game elements, straight from the packed palette
pub mod palette {
    use crate::colors::{self, to_rgba};

    pub fn body() -> [f32; 4] {
        to_rgba(colors::GOLD, 1.0)
    }

    pub fn ink(alpha: f32) -> [f32; 4] {
        to_rgba(colors::INK, alpha)
    }

    pub fn tire() -> [f32; 4] {
        to_rgba(colors::ASPHALT, 1.0)
    }

    pub fn lights() -> [f32; 4] {
        to_rgba(colors::GOLD_LIGHT, 1.0)
    }

    pub fn hazard() -> [f32; 4] {
        to_rgba(colors::HAZARD_RED, 1.0)
    }

    pub fn boost() -> [f32; 4] {
        to_rgba(colors::BOOST_CYAN, 1.0)
    }

    /// Road surface gradient, top then bottom
    pub const ROAD_TOP: [f32; 4] = [0.102, 0.102, 0.102, 1.0];
    pub const ROAD_BOTTOM: [f32; 4] = [0.039, 0.039, 0.039, 1.0];
    pub const LABEL: [f32; 4] = [0.918, 0.925, 0.937, 1.0];
}
