use anyhow::Context;

use orrery_engine::core::{App as CoreApp, AppControl, FrameCtx, WindowCtx};
use orrery_engine::device::Gpu;
use orrery_engine::input::{InputEvent, MouseButton, MouseButtonState, PointerButtonEvent};
use orrery_engine::scene::{Camera, CameraConfig, Scene};
use orrery_engine::time::FrameRate;
use orrery_engine::{Compositor, RendererConfig, SurfaceInfo};

use crate::config::ViewerConfig;
use crate::controls::{action_for, wheel_action, Action};

/// Frames between frame-rate log lines.
const STATS_WINDOW: u32 = 120;

pub struct OrreryApp {
    title: String,
    frame_rate: FrameRate,
    compositor: Option<Compositor>,
    camera: Camera,
    scene: Scene,
    config: ViewerConfig,
}

impl OrreryApp {
    pub fn new(config: ViewerConfig) -> Self {
        let camera = Camera::new(CameraConfig {
            lateral: config.lateral,
            ..CameraConfig::default()
        });
        Self {
            title: String::new(),
            frame_rate: FrameRate::new(STATS_WINDOW),
            compositor: None,
            camera,
            scene: Scene::default(),
            config,
        }
    }

    fn apply(&mut self, action: Action) -> AppControl {
        match action {
            Action::Rotate { yaw, pitch } => self.camera.rotate(yaw, pitch),
            Action::Move { dx, dy, dz } => self.camera.move_by(dx, dy, dz),
            Action::TogglePostProcess => {
                if let Some(c) = self.compositor.as_mut() {
                    c.toggle_post_process();
                }
            }
            Action::ToggleCulling => {
                if let Some(c) = self.compositor.as_mut() {
                    if !c.device_culling_available() {
                        log::info!("device culling unavailable; staying on host");
                    }
                    c.toggle_culling();
                }
            }
            Action::Quit => return AppControl::Exit,
        }
        AppControl::Continue
    }

    fn handle_input(&mut self, events: &[InputEvent]) -> AppControl {
        for event in events {
            let action = match *event {
                InputEvent::MouseWheel(delta) => wheel_action(delta.lines_y()),
                InputEvent::PointerButton(PointerButtonEvent {
                    button: MouseButton::Left,
                    state: MouseButtonState::Pressed,
                    x,
                    y,
                }) => {
                    if let Some(c) = self.compositor.as_mut() {
                        c.handle_click(x, y);
                    }
                    None
                }
                _ => event.key_press().and_then(action_for),
            };
            if let Some(action) = action {
                if self.apply(action) == AppControl::Exit {
                    return AppControl::Exit;
                }
            }
        }
        AppControl::Continue
    }

    fn update_title(&mut self, window: &WindowCtx<'_>) {
        let Some(c) = self.compositor.as_ref() else {
            return;
        };
        let title = format!("{} | {}", self.config.title, c.summary());
        if title != self.title {
            window.set_title(&title);
            self.title = title;
        }
    }
}

impl CoreApp for OrreryApp {
    fn on_gpu_ready(&mut self, _window: &WindowCtx<'_>, gpu: &Gpu<'_>) -> anyhow::Result<()> {
        let surface = SurfaceInfo {
            format: gpu.surface_format(),
            copy_dst: gpu.surface_copy_dst(),
        };
        let renderer = RendererConfig {
            asset_dir: self.config.asset_dir.clone(),
            culling: self.config.culling,
            post_process: self.config.post_process,
            ..RendererConfig::default()
        };
        let compositor = Compositor::new(gpu.device(), gpu.queue(), gpu.adapter(), surface, renderer)
            .with_context(|| format!("renderer setup from {}", self.config.asset_dir.display()))?;
        self.compositor = Some(compositor);
        Ok(())
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        let Some(c) = self.compositor.as_mut() else {
            return;
        };
        if let Err(e) = c.resize(width, height) {
            log::warn!("{e}; frames skipped until the next resize");
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.handle_input(&ctx.input_frame.events) == AppControl::Exit {
            return AppControl::Exit;
        }

        self.scene.tick();

        let Some(compositor) = self.compositor.as_mut() else {
            return AppControl::Continue;
        };
        let report = match compositor.render_frame(ctx, &self.scene, &self.camera) {
            Ok(report) => report,
            Err(e) => {
                log::error!("{e}");
                return AppControl::Exit;
            }
        };

        self.update_title(&ctx.window);

        if let Some(fps) = self.frame_rate.record(ctx.time.dt) {
            log::debug!(
                "{fps:.1} fps | visible {} / {} | {} culling",
                report.visible_count,
                report.total_count,
                report.culling
            );
        }

        AppControl::Continue
    }
}
