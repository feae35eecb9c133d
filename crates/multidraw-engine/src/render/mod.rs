//! GPU rendering subsystem.
//!
//! Renderers own their GPU resources (pipelines, buffers, textures) and record
//! into the frame's encoder through a [`RenderTarget`].

mod ctx;
pub mod multidraw;
pub mod shader;

pub use ctx::{RenderCtx, RenderTarget};
