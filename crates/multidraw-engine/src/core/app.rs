use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
///
/// `Continue` keeps the render loop running; `Exit` moves it to closing.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by the binary.
pub trait App {
    /// Called once per rendered frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
