//! WebGPU rendering module
//!
//! The scene is a flat list of coloured triangles built fresh each frame.
//! Text (score, prompts, banners) lives in the DOM HUD, not here.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::build_frame;
pub use vertex::Vertex;
