//! Multidraw engine crate.
//!
//! Owns the platform + GPU runtime pieces (window loop, device, input, timing)
//! and the multi-draw-indirect renderer used by the demo binary.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod paint;
