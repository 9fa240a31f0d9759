use crate::device::FrameTargets;
use crate::error::Result;
use crate::render::states::{BlendMode, CullFace};
use crate::render::ShaderRegistry;

use super::common::{create_pipeline, PipelineSpec};

/// How the composition texture reaches the presentable target when the
/// post-process effect is off. Decided once from the surface usages.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PresentPath {
    /// Texture-to-texture copy.
    Copy,
    /// Full-screen pass-through draw.
    Blit,
}

/// Full-screen passes reading the composition texture by pixel coordinate.
pub(super) struct PostPass {
    /// Rebuilt whenever the frame targets change.
    bind_group: Option<wgpu::BindGroup>,
    blit: wgpu::RenderPipeline,
    invert: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
}

impl PostPass {
    pub fn new(
        device: &wgpu::Device,
        shaders: &mut ShaderRegistry,
        format: wgpu::TextureFormat,
    ) -> Result<Self> {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("orrery post bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            }],
        });

        let vertex = shaders.compile_shader(device, "fullscreen.vs")?;
        let invert_ps = shaders.compile_shader(device, "invert.ps")?;
        let blit_ps = shaders.compile_shader(device, "blit.ps")?;

        let layouts = [&layout];
        let build = |label: &str, fragment| {
            create_pipeline(
                device,
                PipelineSpec {
                    label,
                    bind_group_layouts: &layouts,
                    vertex: &vertex,
                    fragment,
                    buffers: &[],
                    format,
                    blend: BlendMode::Opaque,
                    depth: None,
                    cull: CullFace::None,
                },
            )
        };
        let invert = build("orrery invert pipeline", &invert_ps)?;
        let blit = build("orrery blit pipeline", &blit_ps)?;

        Ok(Self {
            bind_group: None,
            blit,
            invert,
            layout,
        })
    }

    /// Points the passes at new frame targets, or drops the binding.
    pub fn rebind(&mut self, device: &wgpu::Device, targets: Option<&FrameTargets>) {
        self.bind_group = targets.map(|t| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("orrery post bind group"),
                layout: &self.layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&t.composition_view),
                }],
            })
        });
    }

    /// Draws the composition into `output`, inverted or as is.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView, invert: bool) {
        let Some(bind_group) = self.bind_group.as_ref() else {
            return;
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(if invert { "orrery invert pass" } else { "orrery blit pass" }),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: output,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_pipeline(if invert { &self.invert } else { &self.blit });
        pass.set_bind_group(0, bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}
