use anyhow::Result;

/// Initialization parameters for the GPU layer.
///
/// Add configuration flags only when a concrete platform or backend
/// requirement exists.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior).
    ///
    /// FIFO waits for vertical sync and is supported everywhere.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Required wgpu features.
    ///
    /// Multi-draw with per-draw `first_instance` needs
    /// `Features::INDIRECT_FIRST_INSTANCE`.
    pub required_features: wgpu::Features,

    /// Downlevel capabilities the adapter must report.
    pub required_downlevel: wgpu::DownlevelFlags,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for the surface.
    ///
    /// This value is a hint; support depends on platform/backend.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_downlevel: wgpu::DownlevelFlags::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}

impl GpuInit {
    /// Parameters for indirect multi-draw rendering.
    ///
    /// Every draw command carries its own `first_instance`, and the draws are
    /// read from a GPU buffer, so both capabilities are mandatory.
    pub fn multi_draw_indirect() -> Self {
        Self {
            required_features: wgpu::Features::INDIRECT_FIRST_INSTANCE,
            required_downlevel: wgpu::DownlevelFlags::INDIRECT_EXECUTION,
            ..Self::default()
        }
    }
}

/// Fails when `available` / `downlevel` do not cover what `init` requires.
pub fn check_capabilities(
    available: wgpu::Features,
    downlevel: wgpu::DownlevelFlags,
    init: &GpuInit,
) -> Result<()> {
    anyhow::ensure!(
        available.contains(init.required_features),
        "adapter does not support required features {:?} (available: {:?})",
        init.required_features,
        available
    );
    anyhow::ensure!(
        downlevel.contains(init.required_downlevel),
        "adapter does not support required downlevel capabilities {:?}",
        init.required_downlevel
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_requires_nothing() {
        let init = GpuInit::default();
        assert!(check_capabilities(
            wgpu::Features::empty(),
            wgpu::DownlevelFlags::empty(),
            &init
        )
        .is_ok());
    }

    #[test]
    fn multi_draw_rejects_adapter_without_first_instance() {
        let init = GpuInit::multi_draw_indirect();
        let err = check_capabilities(
            wgpu::Features::empty(),
            wgpu::DownlevelFlags::INDIRECT_EXECUTION,
            &init,
        );
        assert!(err.is_err());
    }

    #[test]
    fn multi_draw_rejects_adapter_without_indirect_execution() {
        let init = GpuInit::multi_draw_indirect();
        let err = check_capabilities(
            wgpu::Features::INDIRECT_FIRST_INSTANCE,
            wgpu::DownlevelFlags::empty(),
            &init,
        );
        assert!(err.is_err());
    }

    #[test]
    fn multi_draw_accepts_capable_adapter() {
        let init = GpuInit::multi_draw_indirect();
        assert!(check_capabilities(
            wgpu::Features::INDIRECT_FIRST_INSTANCE,
            wgpu::DownlevelFlags::INDIRECT_EXECUTION,
            &init
        )
        .is_ok());
    }

    #[test]
    fn multi_draw_keeps_vsync_present_mode() {
        assert_eq!(GpuInit::multi_draw_indirect().present_mode, wgpu::PresentMode::Fifo);
    }
}
