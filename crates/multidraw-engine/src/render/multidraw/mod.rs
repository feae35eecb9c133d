//! Multi-draw-indirect scene: a grid of quads and triangles drawn with one
//! `multi_draw_indexed_indirect` call.
//!
//! - [`geometry`] builds vertices, indices, draw commands and transforms
//! - [`texture`] builds the per-draw array texture layers
//! - [`MultiDrawRenderer`] uploads both and records the draw

pub mod geometry;
pub mod texture;

mod renderer;

pub use geometry::{DrawCommand, DrawScene, GridLayout, IndexRegion, Shape, Vertex2D};
pub use renderer::MultiDrawRenderer;
pub use texture::{LayerColors, LayerTexture};

use crate::render::shader::{ShaderSource, ShaderStage};

pub const VERTEX_SHADER: ShaderSource = ShaderSource {
    stage: ShaderStage::Vertex,
    label: "multidraw vertex shader",
    entry_point: "vs_main",
    wgsl: include_str!("shaders/multidraw_vs.wgsl"),
};

pub const FRAGMENT_SHADER: ShaderSource = ShaderSource {
    stage: ShaderStage::Fragment,
    label: "multidraw fragment shader",
    entry_point: "fs_main",
    wgsl: include_str!("shaders/multidraw_fs.wgsl"),
};
