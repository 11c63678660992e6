//! Rendering module
//!
//! Snapshots game state into a `Frame`, paints it through a `RenderSink`, and
//! ships a sink that tessellates everything into a GPU-ready triangle list.

pub mod frame;
pub mod mesh;
pub mod shapes;
pub mod vertex;

pub use frame::{Frame, Hud, HudSink, RenderSink, draw_frame};
pub use mesh::{MeshBuilder, TextLabel};
pub use vertex::Vertex;
