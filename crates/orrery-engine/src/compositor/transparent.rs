use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::error::Result;
use crate::render::mesh::{PositionVertex, QUAD_INDICES, QUAD_VERTICES};
use crate::render::states::{BlendMode, CullFace, DepthMode};
use crate::render::uniforms::QuadsUniform;
use crate::render::ShaderRegistry;
use crate::scene::{sort_back_to_front, TransparentQuad};

use super::common::{create_pipeline, uniform_buffer, uniform_entry, FrameBindings, PipelineSpec};

/// Alpha-blended quads, re-sorted back to front every frame.
///
/// Slots in the uniform block are written in draw order, so a single
/// instanced draw composites them farthest first.
pub(super) struct QuadPass {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    count: u32,
    indices: wgpu::Buffer,
    vertices: wgpu::Buffer,
    uniform: wgpu::Buffer,
}

impl QuadPass {
    pub fn new(
        device: &wgpu::Device,
        shaders: &mut ShaderRegistry,
        format: wgpu::TextureFormat,
        frame: &FrameBindings,
    ) -> Result<Self> {
        let uniform = uniform_buffer(device, "orrery quads ubo", std::mem::size_of::<QuadsUniform>());
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("orrery quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("orrery quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("orrery quads bgl"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("orrery quads bind group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.as_entire_binding(),
            }],
        });

        let vertex = shaders.compile_shader(device, "quad.vs")?;
        let fragment = shaders.compile_shader(device, "quad.ps")?;
        let pipeline = create_pipeline(
            device,
            PipelineSpec {
                label: "orrery quad pipeline",
                bind_group_layouts: &[&frame.layout, &layout],
                vertex: &vertex,
                fragment: &fragment,
                buffers: &[PositionVertex::layout()],
                format,
                blend: BlendMode::Alpha,
                depth: Some(DepthMode::TestOnly),
                cull: CullFace::None,
            },
        )?;

        Ok(Self {
            pipeline,
            bind_group,
            count: 0,
            indices,
            vertices,
            uniform,
        })
    }

    /// Sorts by distance from `eye` and uploads the result.
    pub fn update(&mut self, queue: &wgpu::Queue, quads: &[TransparentQuad], eye: Vec3) {
        let sorted = sort_back_to_front(quads, eye);
        let (block, count) = QuadsUniform::pack(&sorted);
        if sorted.len() > count as usize {
            log::trace!("{} transparent quads dropped", sorted.len() - count as usize);
        }
        queue.write_buffer(&self.uniform, 0, bytemuck::bytes_of(&block));
        self.count = count;
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, frame: &FrameBindings) {
        if self.count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &frame.bind_group, &[]);
        pass.set_bind_group(1, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertices.slice(..));
        pass.set_index_buffer(self.indices.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..self.count);
    }
}
