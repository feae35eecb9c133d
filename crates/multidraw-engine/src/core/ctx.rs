use winit::window::Window;

use crate::coords::Viewport;
use wgpu::SurfaceError;

use crate::device::{Gpu, SurfaceErrorAction};
use crate::input::{InputFrame, InputState};
use crate::paint::Color;
use crate::render::{RenderCtx, RenderTarget};
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Window handle plus size queries.
pub struct WindowCtx<'a> {
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Returns the logical window size as `(width, height)` in logical pixels.
    pub fn logical_size(&self) -> (f32, f32) {
        let phys = self.window.inner_size();
        let logi: winit::dpi::LogicalSize<f64> = phys.to_logical(self.window.scale_factor());
        (logi.width as f32, logi.height as f32)
    }

    pub fn viewport(&self) -> Viewport {
        let (w, h) = self.logical_size();
        Viewport::new(w, h)
    }
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Device/queue view for creating GPU resources outside of `render`.
    pub fn render_ctx(&self) -> RenderCtx<'_> {
        RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.gpu.surface_format(),
            self.window.viewport(),
        )
    }

    /// Clears the surface with `clear`, calls `draw` with a ready [`RenderCtx`] and
    /// [`RenderTarget`], then presents the frame.
    ///
    /// Surface errors skip the frame. Unrecoverable ones fail the runtime and
    /// return `Exit`.
    pub fn render<F>(&mut self, clear: Color, draw: F) -> AppControl
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                let action = self.gpu.handle_surface_error(err.clone());
                return surface_error_control(action, &err, self.runtime);
            }
        };

        let rctx = RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.gpu.surface_format(),
            self.window.viewport(),
        );

        // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
        {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
            target.clear("multidraw clear", clear);
            draw(&rctx, &mut target);
        }

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);

        AppControl::Continue
    }
}

fn surface_error_control(
    action: SurfaceErrorAction,
    err: &SurfaceError,
    runtime: &mut RuntimeCtx,
) -> AppControl {
    match action {
        SurfaceErrorAction::Fatal => {
            runtime.fail(anyhow::anyhow!("unrecoverable surface error: {err}"));
            AppControl::Exit
        }
        SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => AppControl::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── surface errors ────────────────────────────────────────────────────

    #[test]
    fn out_of_memory_fails_the_runtime() {
        let mut runtime = RuntimeCtx::default();
        let err = SurfaceError::OutOfMemory;
        let control = surface_error_control(SurfaceErrorAction::for_error(&err), &err, &mut runtime);

        assert_eq!(control, AppControl::Exit);
        assert!(runtime.exit_requested());
        assert!(runtime.take_error().is_some());
    }

    #[test]
    fn lost_surface_keeps_running() {
        let mut runtime = RuntimeCtx::default();
        let err = SurfaceError::Lost;
        let control = surface_error_control(SurfaceErrorAction::for_error(&err), &err, &mut runtime);

        assert_eq!(control, AppControl::Continue);
        assert!(!runtime.exit_requested());
        assert!(runtime.take_error().is_none());
    }
}
