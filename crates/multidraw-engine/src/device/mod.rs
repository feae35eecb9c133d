//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - verifying the adapter offers what the renderer needs
//! - creating & configuring the Surface (swapchain)
//! - acquiring frames and providing encoders/views for rendering

mod gpu;
mod init;

pub use gpu::{Gpu, GpuFrame, SurfaceErrorAction};
pub use init::{check_capabilities, GpuInit};
