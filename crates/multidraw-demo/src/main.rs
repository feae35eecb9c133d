use multidraw_engine::coords::pointer_to_light;
use multidraw_engine::core::{App, AppControl, FrameCtx};
use multidraw_engine::device::GpuInit;
use multidraw_engine::input::Key;
use multidraw_engine::logging::{init_logging, LoggingConfig};
use multidraw_engine::paint::Color;
use multidraw_engine::render::multidraw::{DrawScene, GridLayout, LayerColors, MultiDrawRenderer};
use multidraw_engine::window::{Runtime, RuntimeConfig};

/// Fixes the layer colours when set to a `u64`.
const SEED_VAR: &str = "MULTIDRAW_SEED";

/// Frame-time diagnostics are logged once per this many frames.
const FRAME_LOG_INTERVAL: u64 = 300;

struct DemoConfig {
    layout: GridLayout,
    texture_seed: Option<u64>,
    clear: Color,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            layout: GridLayout::default(),
            texture_seed: None,
            clear: Color::WHITE,
        }
    }
}

impl DemoConfig {
    fn from_env() -> Self {
        let texture_seed = match std::env::var(SEED_VAR) {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(seed) => Some(seed),
                Err(e) => {
                    log::warn!("ignoring {SEED_VAR}={raw:?}: {e}");
                    None
                }
            },
            Err(_) => None,
        };

        Self {
            texture_seed,
            ..Self::default()
        }
    }
}

struct MultiDrawApp {
    scene: DrawScene,
    colors: LayerColors,
    clear: Color,

    /// Created on the first frame, once the surface format is known.
    renderer: Option<MultiDrawRenderer>,
    light: [f32; 2],
    frame_time_sum: f32,
}

impl MultiDrawApp {
    fn new(config: DemoConfig) -> Self {
        let scene = DrawScene::generate(&config.layout);
        let layers = scene.draw_count();
        let colors = match config.texture_seed {
            Some(seed) => {
                log::info!("layer colours seeded with {seed}");
                LayerColors::seeded(layers, seed)
            }
            None => LayerColors::random(layers, &mut rand::rng()),
        };

        Self {
            scene,
            colors,
            clear: config.clear,
            renderer: None,
            light: [0.0, 0.0],
            frame_time_sum: 0.0,
        }
    }

    fn ensure_renderer(&mut self, ctx: &FrameCtx<'_, '_>) -> anyhow::Result<()> {
        if self.renderer.is_some() {
            return Ok(());
        }

        let renderer = MultiDrawRenderer::new(&ctx.render_ctx(), &self.scene, &self.colors)?;
        log::info!(
            "renderer ready: {} draws into {:?}",
            renderer.draw_count(),
            renderer.surface_format()
        );
        self.renderer = Some(renderer);
        Ok(())
    }

    fn log_frame_time(&mut self, ctx: &FrameCtx<'_, '_>) {
        self.frame_time_sum += ctx.time.dt;
        if ctx.time.frame_index > 0 && ctx.time.frame_index % FRAME_LOG_INTERVAL == 0 {
            let avg_ms = self.frame_time_sum / FRAME_LOG_INTERVAL as f32 * 1000.0;
            log::debug!("frame {}: avg {avg_ms:.2} ms", ctx.time.frame_index);
            self.frame_time_sum = 0.0;
        }
    }
}

impl App for MultiDrawApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if ctx.input_frame.keys_pressed.contains(&Key::Escape) {
            log::info!("escape pressed, closing");
            return AppControl::Exit;
        }

        if let Err(e) = self.ensure_renderer(ctx) {
            ctx.runtime.fail(e.context("renderer setup failed"));
            return AppControl::Exit;
        }

        // Outside the window the light stays where the pointer left it.
        if let Some(pointer) = ctx.input.pointer_pos {
            self.light = pointer_to_light(pointer, ctx.window.viewport());
        }

        self.log_frame_time(ctx);

        let light = self.light;
        let Some(renderer) = self.renderer.as_mut() else {
            return AppControl::Continue;
        };

        ctx.render(self.clear, |rctx, target| {
            renderer.set_light_position(rctx.queue, light);
            renderer.render(target);
        })
    }
}

fn main() {
    init_logging(LoggingConfig::default());

    let app = MultiDrawApp::new(DemoConfig::from_env());

    if let Err(e) = Runtime::run(RuntimeConfig::default(), GpuInit::multi_draw_indirect(), app) {
        log::error!("{e:#}");
        std::process::exit(-1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── config ──────────────────────────────────────────────────────────────

    #[test]
    fn default_config_is_ten_by_ten_on_white() {
        let config = DemoConfig::default();
        assert_eq!(config.layout.cell_count(), 100);
        assert_eq!(config.clear, Color::WHITE);
        assert!(config.texture_seed.is_none());
    }

    // ── app ─────────────────────────────────────────────────────────────────

    #[test]
    fn app_has_one_layer_per_draw() {
        let app = MultiDrawApp::new(DemoConfig::default());
        assert_eq!(app.colors.layer_count(), app.scene.draw_count());
        assert_eq!(app.scene.draw_count(), 100);
    }

    #[test]
    fn seeded_app_is_reproducible() {
        let config = || DemoConfig {
            texture_seed: Some(9),
            ..DemoConfig::default()
        };
        let a = MultiDrawApp::new(config());
        let b = MultiDrawApp::new(config());
        assert_eq!(a.colors, b.colors);
    }

    #[test]
    fn light_starts_at_centre() {
        let app = MultiDrawApp::new(DemoConfig::default());
        assert_eq!(app.light, [0.0, 0.0]);
    }

    #[test]
    fn renderer_waits_for_the_first_frame() {
        let app = MultiDrawApp::new(DemoConfig::default());
        assert!(app.renderer.is_none());
    }
}
