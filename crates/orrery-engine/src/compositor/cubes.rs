use crate::culling::DeviceCuller;
use crate::error::Result;
use crate::render::mesh::CubeVertex;
use crate::render::states::{create_sampler, BlendMode, CullFace, DepthMode, SamplerConfig};
use crate::render::texture::{Texture, TextureSet};
use crate::render::ShaderRegistry;
use crate::scene::{Instance, InstanceRaw};

use super::common::{create_pipeline, sampler_entry, texture_entry, CubeMesh, FrameBindings, PipelineSpec};

/// Lit, textured instanced cubes.
///
/// Two draw paths:
/// - host: the compacted visible transforms are uploaded into an
///   instance-rate vertex buffer and drawn with a plain instanced draw
/// - device: the vertex stage reads the instance array and the visible-id
///   list written by the cull dispatch, drawn indirectly
pub(super) struct CubePass {
    indirect: Option<wgpu::RenderPipeline>,
    host: wgpu::RenderPipeline,
    host_count: u32,
    scratch: Vec<InstanceRaw>,
    instance_capacity: usize,
    instance_buffer: wgpu::Buffer,
    material: wgpu::BindGroup,
}

impl CubePass {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        shaders: &mut ShaderRegistry,
        format: wgpu::TextureFormat,
        frame: &FrameBindings,
        textures: &TextureSet,
        draw_layout: Option<&wgpu::BindGroupLayout>,
        capacity: usize,
    ) -> Result<Self> {
        let diffuse = Texture::diffuse_array(device, queue, &textures.diffuse)?;
        let normal = Texture::normal_map(device, queue, &textures.normal)?;
        let sampler = create_sampler(device, "orrery material sampler", &SamplerConfig::linear_repeat())?;

        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("orrery material bgl"),
            entries: &[
                texture_entry(0, wgpu::TextureViewDimension::D2Array),
                texture_entry(1, wgpu::TextureViewDimension::D2),
                sampler_entry(2),
            ],
        });

        let material = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("orrery material bind group"),
            layout: &material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&diffuse.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&normal.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let fragment = shaders.compile_shader(device, "cube.ps")?;
        let host_vertex = shaders.compile_shader(device, "cube.vs")?;

        let host = create_pipeline(
            device,
            PipelineSpec {
                label: "orrery cube pipeline",
                bind_group_layouts: &[&frame.layout, &material_layout],
                vertex: &host_vertex,
                fragment: &fragment,
                buffers: &[CubeVertex::layout(), InstanceRaw::layout()],
                format,
                blend: BlendMode::Opaque,
                depth: Some(DepthMode::Standard),
                cull: CullFace::Back,
            },
        )?;

        let indirect = match draw_layout {
            Some(draw_layout) => {
                let vertex = shaders.compile_shader(device, "cube_indirect.vs")?;
                Some(create_pipeline(
                    device,
                    PipelineSpec {
                        label: "orrery cube indirect pipeline",
                        bind_group_layouts: &[&frame.layout, &material_layout, draw_layout],
                        vertex: &vertex,
                        fragment: &fragment,
                        buffers: &[CubeVertex::layout()],
                        format,
                        blend: BlendMode::Opaque,
                        depth: Some(DepthMode::Standard),
                        cull: CullFace::Back,
                    },
                )?)
            }
            None => None,
        };

        let capacity = capacity.max(1);
        Ok(Self {
            indirect,
            host,
            host_count: 0,
            scratch: Vec::with_capacity(capacity),
            instance_capacity: capacity,
            instance_buffer: create_instance_buffer(device, capacity),
            material,
        })
    }

    /// Uploads the transforms of `visible` in order.
    pub fn upload_visible(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        instances: &[Instance],
        visible: &[u32],
    ) {
        self.scratch.clear();
        self.scratch
            .extend(visible.iter().filter_map(|&i| instances.get(i as usize)).map(Instance::raw));
        self.host_count = self.scratch.len() as u32;

        if self.scratch.is_empty() {
            return;
        }
        if self.scratch.len() > self.instance_capacity {
            self.instance_capacity = self.scratch.len().next_power_of_two();
            self.instance_buffer = create_instance_buffer(device, self.instance_capacity);
            log::debug!("cube instance buffer grown to {}", self.instance_capacity);
        }
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&self.scratch));
    }

    /// Host path. Nothing is drawn when no instance survived culling.
    pub fn draw_host(&self, pass: &mut wgpu::RenderPass<'_>, frame: &FrameBindings, mesh: &CubeMesh) {
        if self.host_count == 0 {
            return;
        }
        pass.set_pipeline(&self.host);
        pass.set_bind_group(0, &frame.bind_group, &[]);
        pass.set_bind_group(1, &self.material, &[]);
        mesh.bind(pass);
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        pass.draw_indexed(0..CubeMesh::index_count(), 0, 0..self.host_count);
    }

    /// Device path; the instance count comes from the cull dispatch.
    pub fn draw_indirect(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        frame: &FrameBindings,
        mesh: &CubeMesh,
        culler: &DeviceCuller,
    ) {
        let Some(pipeline) = self.indirect.as_ref() else {
            return;
        };
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &frame.bind_group, &[]);
        pass.set_bind_group(1, &self.material, &[]);
        pass.set_bind_group(2, culler.draw_bind_group(), &[]);
        mesh.bind(pass);
        pass.draw_indexed_indirect(culler.args_buffer(), 0);
    }
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("orrery cube instance vbo"),
        size: (capacity * std::mem::size_of::<InstanceRaw>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
