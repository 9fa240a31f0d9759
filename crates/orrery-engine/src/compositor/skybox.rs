use wgpu::util::DeviceExt;

use crate::error::Result;
use crate::render::mesh::{skybox_vertices, PositionVertex};
use crate::render::states::{create_sampler, BlendMode, CullFace, DepthMode, SamplerConfig};
use crate::render::texture::{Texture, TextureSet};
use crate::render::uniforms::SkyUniform;
use crate::render::ShaderRegistry;

use super::common::{create_pipeline, sampler_entry, texture_entry, uniform_buffer, uniform_entry, PipelineSpec};

/// Cube-mapped background drawn at the far plane.
///
/// Depth is compared less-or-equal without writes, and front faces are
/// culled because the camera sits inside the cube.
pub(super) struct SkyboxPass {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    vertex_count: u32,
    vertices: wgpu::Buffer,
    uniform: wgpu::Buffer,
}

impl SkyboxPass {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        shaders: &mut ShaderRegistry,
        format: wgpu::TextureFormat,
        textures: &TextureSet,
    ) -> Result<Self> {
        let uniform = uniform_buffer(device, "orrery sky ubo", std::mem::size_of::<SkyUniform>());

        let verts = skybox_vertices();
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("orrery sky vbo"),
            contents: bytemuck::cast_slice(&verts),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let cube = Texture::cube_map(device, queue, &textures.skybox)?;
        let sampler = create_sampler(device, "orrery sky sampler", &SamplerConfig::linear_clamp())?;

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("orrery sky bgl"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX),
                texture_entry(1, wgpu::TextureViewDimension::Cube),
                sampler_entry(2),
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("orrery sky bind group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&cube.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let vertex = shaders.compile_shader(device, "skybox.vs")?;
        let fragment = shaders.compile_shader(device, "skybox.ps")?;
        let pipeline = create_pipeline(
            device,
            PipelineSpec {
                label: "orrery sky pipeline",
                bind_group_layouts: &[&layout],
                vertex: &vertex,
                fragment: &fragment,
                buffers: &[PositionVertex::layout()],
                format,
                blend: BlendMode::Opaque,
                depth: Some(DepthMode::SkyboxLessEqual),
                cull: CullFace::Front,
            },
        )?;

        Ok(Self {
            pipeline,
            bind_group,
            vertex_count: verts.len() as u32,
            vertices,
            uniform,
        })
    }

    /// `view_proj` must carry the view rotation only.
    pub fn update(&self, queue: &wgpu::Queue, view_proj: glam::Mat4) {
        let block = SkyUniform {
            view_proj: view_proj.to_cols_array_2d(),
        };
        queue.write_buffer(&self.uniform, 0, bytemuck::bytes_of(&block));
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertices.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }
}
