//! Bindings and pipeline plumbing shared by the compositor passes.

use wgpu::util::DeviceExt;

use crate::device::DEPTH_FORMAT;
use crate::error::Result;
use crate::render::mesh::{cube_indices, cube_vertices, CUBE_INDEX_COUNT};
use crate::render::states::{color_target, depth_stencil_state, rasterizer_state, BlendMode, CullFace, DepthMode};
use crate::render::uniforms::{CameraUniform, LightsUniform};
use crate::render::CompiledShader;

// ── layout entries ────────────────────────────────────────────────────────

pub(super) fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

pub(super) fn texture_entry(binding: u32, view_dimension: wgpu::TextureViewDimension) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension,
            multisampled: false,
        },
        count: None,
    }
}

pub(super) fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

pub(super) fn uniform_buffer(device: &wgpu::Device, label: &str, size: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: size as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

// ── per-frame bindings ────────────────────────────────────────────────────

/// Group 0 of every lit pass: camera and light blocks.
pub(super) struct FrameBindings {
    pub bind_group: wgpu::BindGroup,
    pub layout: wgpu::BindGroupLayout,
    lights: wgpu::Buffer,
    camera: wgpu::Buffer,
}

impl FrameBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let camera = uniform_buffer(device, "orrery camera ubo", std::mem::size_of::<CameraUniform>());
        let lights = uniform_buffer(device, "orrery lights ubo", std::mem::size_of::<LightsUniform>());

        let stages = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("orrery frame bgl"),
            entries: &[uniform_entry(0, stages), uniform_entry(1, stages)],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("orrery frame bind group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lights.as_entire_binding(),
                },
            ],
        });

        Self {
            bind_group,
            layout,
            lights,
            camera,
        }
    }

    pub fn write(&self, queue: &wgpu::Queue, camera: &CameraUniform, lights: &LightsUniform) {
        queue.write_buffer(&self.camera, 0, bytemuck::bytes_of(camera));
        queue.write_buffer(&self.lights, 0, bytemuck::bytes_of(lights));
    }
}

// ── cube mesh ─────────────────────────────────────────────────────────────

/// Vertex and index buffers of the unit cube, shared by cubes and markers.
pub(super) struct CubeMesh {
    index_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
}

impl CubeMesh {
    pub fn new(device: &wgpu::Device) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("orrery cube vbo"),
            contents: bytemuck::cast_slice(&cube_vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("orrery cube ibo"),
            contents: bytemuck::cast_slice(&cube_indices()),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            index_buffer,
            vertex_buffer,
        }
    }

    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
    }

    pub const fn index_count() -> u32 {
        CUBE_INDEX_COUNT
    }
}

// ── pipelines ─────────────────────────────────────────────────────────────

/// Fixed-function choices for one scene pipeline.
pub(super) struct PipelineSpec<'a> {
    pub label: &'a str,
    pub bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
    pub vertex: &'a CompiledShader,
    pub fragment: &'a CompiledShader,
    pub buffers: &'a [wgpu::VertexBufferLayout<'a>],
    pub format: wgpu::TextureFormat,
    pub blend: BlendMode,
    /// `None` for passes without a depth attachment.
    pub depth: Option<DepthMode>,
    pub cull: CullFace,
}

pub(super) fn create_pipeline(device: &wgpu::Device, spec: PipelineSpec<'_>) -> Result<wgpu::RenderPipeline> {
    let depth_stencil = spec
        .depth
        .map(|mode| depth_stencil_state(mode, DEPTH_FORMAT))
        .transpose()?;

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(spec.label),
        bind_group_layouts: spec.bind_group_layouts,
        immediate_size: 0,
    });

    Ok(device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(spec.label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &spec.vertex.module,
            entry_point: spec.vertex.entry_point(),
            compilation_options: Default::default(),
            buffers: spec.buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: &spec.fragment.module,
            entry_point: spec.fragment.entry_point(),
            compilation_options: Default::default(),
            targets: &[Some(color_target(spec.format, spec.blend))],
        }),
        primitive: rasterizer_state(spec.cull),
        depth_stencil,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    }))
}
