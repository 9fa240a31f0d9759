//! Frame compositor.
//!
//! Owns every GPU resource of the scene and records one frame in a fixed
//! order:
//! 1. clear the composition target and depth
//! 2. skybox
//! 3. opaque instanced cubes, then the light markers
//! 4. alpha quads, back to front
//! 5. composite to the presentable target (invert, copy or blit)
//! 6. debug overlay
//!
//! Presentation itself belongs to the device layer.

mod common;
mod cubes;
mod markers;
mod post;
mod skybox;
mod transparent;

use std::path::PathBuf;

use crate::core::{AppControl, FrameCtx};
use crate::culling::{
    device_culling_supported, Culler, CullingKind, DeviceCuller, Frustum, HostCuller, CULL_RADIUS,
};
use crate::device::FrameTargets;
use crate::error::{RenderError, Result};
use crate::overlay::{summary, DebugOverlay, OverlayStats, RectRenderer};
use crate::render::texture::TextureSet;
use crate::render::uniforms::{CameraUniform, LightsUniform};
use crate::render::{RenderCtx, RenderTarget, ShaderRegistry};
use crate::scene::{Camera, Scene};

use common::{CubeMesh, FrameBindings};
use cubes::CubePass;
use markers::MarkerPass;
use post::PostPass;
use skybox::SkyboxPass;
use transparent::QuadPass;

pub use post::PresentPath;

/// Renderer configuration.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Root holding `shaders/` and `textures/`.
    pub asset_dir: PathBuf,
    /// Preferred culling strategy; device falls back to host when unsupported.
    pub culling: CullingKind,
    /// Start with the invert effect enabled.
    pub post_process: bool,
    pub overlay: bool,
    /// Initial device culling capacity; grows with the scene.
    pub instance_capacity: u32,
    pub clear_color: wgpu::Color,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from(crate::DEFAULT_ASSET_DIR),
            culling: CullingKind::Device,
            post_process: false,
            overlay: true,
            instance_capacity: 1024,
            clear_color: wgpu::Color {
                r: 0.48,
                g: 0.57,
                b: 0.48,
                a: 1.0,
            },
        }
    }
}

/// What the compositor needs to know about the presentable target.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfaceInfo {
    pub format: wgpu::TextureFormat,
    /// Whether the target accepts texture copies.
    pub copy_dst: bool,
}

/// Per-frame result.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameReport {
    pub visible_count: u32,
    pub total_count: u32,
    pub culling: CullingKind,
    /// False when the frame was skipped (no targets or surface unavailable).
    pub rendered: bool,
}

pub struct Compositor {
    report: FrameReport,
    visible: Vec<u32>,
    post_process: bool,
    targets: Option<FrameTargets>,
    overlay: DebugOverlay,
    post: PostPass,
    quads: QuadPass,
    markers: MarkerPass,
    cubes: CubePass,
    skybox: SkyboxPass,
    culler: Culler,
    frame: FrameBindings,
    mesh: CubeMesh,
    shaders: ShaderRegistry,
    present_path: PresentPath,
    clear_color: wgpu::Color,
    format: wgpu::TextureFormat,
    device: wgpu::Device,
}

impl Compositor {
    /// Loads shaders and textures and builds every pipeline.
    ///
    /// Targets are created by the first [`Compositor::resize`].
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        adapter: &wgpu::Adapter,
        surface: SurfaceInfo,
        config: RendererConfig,
    ) -> Result<Self> {
        let format = surface.format;
        let mut shaders = ShaderRegistry::new(config.asset_dir.join("shaders"));
        let textures = TextureSet::in_dir(&config.asset_dir.join("textures"));

        let mesh = CubeMesh::new(device);
        let frame = FrameBindings::new(device);

        let device_culler = if device_culling_supported(adapter, device) {
            Some(DeviceCuller::new(
                device,
                queue,
                &mut shaders,
                config.instance_capacity,
                CULL_RADIUS,
            )?)
        } else {
            None
        };
        let culler = Culler::new(HostCuller::new(CULL_RADIUS), device_culler, config.culling);

        let skybox = SkyboxPass::new(device, queue, &mut shaders, format, &textures)?;
        let cubes = CubePass::new(
            device,
            queue,
            &mut shaders,
            format,
            &frame,
            &textures,
            culler.device().map(DeviceCuller::draw_bind_group_layout),
            config.instance_capacity as usize,
        )?;
        let markers = MarkerPass::new(device, &mut shaders, format, &frame)?;
        let quads = QuadPass::new(device, &mut shaders, format, &frame)?;
        let post = PostPass::new(device, &mut shaders, format)?;
        let overlay = DebugOverlay::new(RectRenderer::new(device, &mut shaders)?, config.overlay);

        let present_path = if surface.copy_dst {
            PresentPath::Copy
        } else {
            PresentPath::Blit
        };

        log::info!(
            "compositor ready: culling {} (device {}), present path {:?}, format {:?}",
            culler.active(),
            if culler.device_available() { "available" } else { "unavailable" },
            present_path,
            format
        );

        Ok(Self {
            report: FrameReport {
                visible_count: 0,
                total_count: 0,
                culling: culler.active(),
                rendered: false,
            },
            visible: Vec::new(),
            post_process: config.post_process,
            targets: None,
            overlay,
            post,
            quads,
            markers,
            cubes,
            skybox,
            culler,
            frame,
            mesh,
            shaders,
            present_path,
            clear_color: config.clear_color,
            format,
            device: device.clone(),
        })
    }

    // ── state ─────────────────────────────────────────────────────────────

    pub fn present_path(&self) -> PresentPath {
        self.present_path
    }

    pub fn shaders(&self) -> &ShaderRegistry {
        &self.shaders
    }

    pub fn has_targets(&self) -> bool {
        self.targets.is_some()
    }

    pub fn post_process_enabled(&self) -> bool {
        self.post_process
    }

    pub fn set_post_process(&mut self, enabled: bool) {
        if self.post_process != enabled {
            log::info!("post-process {}", if enabled { "on" } else { "off" });
        }
        self.post_process = enabled;
    }

    pub fn toggle_post_process(&mut self) -> bool {
        self.set_post_process(!self.post_process);
        self.post_process
    }

    pub fn culling(&self) -> CullingKind {
        self.culler.active()
    }

    pub fn device_culling_available(&self) -> bool {
        self.culler.device_available()
    }

    /// Switches between host and device culling when both exist.
    pub fn toggle_culling(&mut self) -> CullingKind {
        self.culler.toggle()
    }

    pub fn set_culling(&mut self, kind: CullingKind) -> bool {
        self.culler.set_active(kind)
    }

    pub fn last_report(&self) -> FrameReport {
        self.report
    }

    pub fn overlay_enabled(&self) -> bool {
        self.overlay.enabled()
    }

    pub fn set_overlay(&mut self, enabled: bool) {
        self.overlay.set_enabled(enabled);
    }

    /// Routes a click (logical pixels) to the overlay. Returns true when it
    /// toggled the post-process effect.
    pub fn handle_click(&mut self, x: f32, y: f32) -> bool {
        if self.overlay.hit_toggle(x, y) {
            self.toggle_post_process();
            return true;
        }
        false
    }

    /// Window-title summary of the last frame.
    pub fn summary(&self) -> String {
        summary(&self.overlay_stats())
    }

    fn overlay_stats(&self) -> OverlayStats<'_> {
        stats_for(&self.report, self.post_process, &self.visible)
    }

    // ── resize ────────────────────────────────────────────────────────────

    /// Recreates the size-dependent targets.
    ///
    /// Old targets are released first. A zero-area size leaves the
    /// compositor without targets and every frame is skipped until a later
    /// resize succeeds; this is not an error.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.post.rebind(&self.device, None);
        self.targets = None;

        if width == 0 || height == 0 {
            log::debug!("compositor resize to {width}x{height} deferred");
            return Ok(());
        }

        let targets = FrameTargets::new(&self.device, self.format, width, height)?;
        self.post.rebind(&self.device, Some(&targets));
        self.targets = Some(targets);
        log::debug!("compositor targets {width}x{height}");
        Ok(())
    }

    // ── frame ─────────────────────────────────────────────────────────────

    /// Acquires the surface, records the frame, submits and presents it.
    ///
    /// A skipped frame returns a report with `rendered == false`. An
    /// unrecoverable surface error is returned as an error.
    pub fn render_frame(
        &mut self,
        ctx: &mut FrameCtx<'_, '_>,
        scene: &Scene,
        camera: &Camera,
    ) -> Result<FrameReport> {
        let mut report = None;
        let control = ctx.render(|rctx, target| {
            report = Some(self.encode(rctx, target, scene, camera));
        });
        self.after_submit();

        if control == AppControl::Exit {
            return Err(RenderError::Surface("surface is out of memory".into()));
        }
        Ok(report.unwrap_or(FrameReport {
            rendered: false,
            ..self.report
        }))
    }

    /// Records one frame into `target`. The caller submits.
    pub fn encode(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        scene: &Scene,
        camera: &Camera,
    ) -> FrameReport {
        self.collect_readback();

        let total = scene.instances.len() as u32;
        let culling = self.culler.active();
        let skipped = FrameReport {
            visible_count: self.report.visible_count,
            total_count: total,
            culling,
            rendered: false,
        };

        let Some(targets) = self.targets.as_ref() else {
            log::trace!("frame skipped: no targets");
            return skipped;
        };
        let (width, height) = targets.size();
        let out = target.color_texture.size();
        if out.width != width || out.height != height {
            log::debug!(
                "frame skipped: targets {width}x{height} do not match output {}x{}",
                out.width,
                out.height
            );
            return skipped;
        }

        let aspect = width as f32 / height as f32;
        let eye = camera.position();
        let view_proj = camera.view_projection(aspect);

        self.frame.write(
            ctx.queue,
            &CameraUniform::new(view_proj, eye),
            &LightsUniform::new(scene.lights.lights()),
        );
        self.skybox.update(ctx.queue, camera.sky_view_projection(aspect));
        self.quads.update(ctx.queue, scene.quads.quads(), eye);

        // Visibility.
        let frustum = Frustum::from_view_projection(view_proj);
        let instances = scene.instances.instances();
        let visible_count = match culling {
            CullingKind::Host => {
                self.culler.host().collect(&frustum, instances, &mut self.visible);
                self.cubes
                    .upload_visible(ctx.device, ctx.queue, instances, &self.visible);
                self.visible.len() as u32
            }
            CullingKind::Device => match self.culler.device_mut() {
                Some(device) => {
                    device.prepare(&frustum, instances);
                    device.encode(target.encoder);
                    self.visible.clear();
                    device.last_visible_count()
                }
                None => 0,
            },
        };

        self.encode_scene(target.encoder, targets, culling);

        // Composite.
        if self.post_process {
            self.post.encode(target.encoder, target.color_view, true);
        } else {
            match self.present_path {
                PresentPath::Copy => target.encoder.copy_texture_to_texture(
                    targets.composition.as_image_copy(),
                    target.color_texture.as_image_copy(),
                    wgpu::Extent3d {
                        width,
                        height,
                        depth_or_array_layers: 1,
                    },
                ),
                PresentPath::Blit => self.post.encode(target.encoder, target.color_view, false),
            }
        }

        self.report = FrameReport {
            visible_count,
            total_count: total,
            culling,
            rendered: true,
        };

        let stats = stats_for(&self.report, self.post_process, &self.visible);
        self.overlay.render(ctx, target, &stats);

        self.report
    }

    /// Requests the visible-count map once the frame is submitted.
    pub fn after_submit(&mut self) {
        if let Some(device) = self.culler.device_mut() {
            device.after_submit();
        }
    }

    fn collect_readback(&mut self) {
        let Some(device) = self.culler.device_mut() else {
            return;
        };
        match device.poll_readback() {
            Some(Ok(count)) => log::trace!("device culling visible count {count}"),
            Some(Err(e)) => log::warn!("{e}; visible count reported as 0"),
            None => {}
        }
    }

    fn encode_scene(&self, encoder: &mut wgpu::CommandEncoder, targets: &FrameTargets, culling: CullingKind) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("orrery scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &targets.composition_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &targets.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        self.skybox.draw(&mut pass);

        match (culling, self.culler.device()) {
            (CullingKind::Device, Some(device)) => {
                self.cubes.draw_indirect(&mut pass, &self.frame, &self.mesh, device)
            }
            _ => self.cubes.draw_host(&mut pass, &self.frame, &self.mesh),
        }
        self.markers.draw(&mut pass, &self.frame, &self.mesh);

        self.quads.draw(&mut pass, &self.frame);
    }
}

fn stats_for<'a>(report: &FrameReport, post_process: bool, visible: &'a [u32]) -> OverlayStats<'a> {
    OverlayStats {
        total: report.total_count,
        visible: report.visible_count,
        culling: report.culling,
        post_process,
        visible_indices: match report.culling {
            CullingKind::Host => Some(visible),
            CullingKind::Device => None,
        },
    }
}
