//! Coordinate types shared by the runtime and renderers.
//!
//! Pointer positions arrive in logical pixels (origin top-left, +Y down);
//! the multi-draw scene lives in normalized device coordinates (+Y up).

mod light;
mod viewport;

pub use light::pointer_to_light;
pub use viewport::Viewport;
