use crate::error::Result;
use crate::render::mesh::CubeVertex;
use crate::render::states::{BlendMode, CullFace, DepthMode};
use crate::render::ShaderRegistry;
use crate::scene::LIGHT_COUNT;

use super::common::{create_pipeline, CubeMesh, FrameBindings, PipelineSpec};

/// Small flat-colored cubes placed at each light.
///
/// Positions come from the light block already bound in group 0, so the
/// pass owns no buffers of its own.
pub(super) struct MarkerPass {
    pipeline: wgpu::RenderPipeline,
}

impl MarkerPass {
    pub fn new(
        device: &wgpu::Device,
        shaders: &mut ShaderRegistry,
        format: wgpu::TextureFormat,
        frame: &FrameBindings,
    ) -> Result<Self> {
        let vertex = shaders.compile_shader(device, "marker.vs")?;
        let fragment = shaders.compile_shader(device, "marker.ps")?;
        let pipeline = create_pipeline(
            device,
            PipelineSpec {
                label: "orrery marker pipeline",
                bind_group_layouts: &[&frame.layout],
                vertex: &vertex,
                fragment: &fragment,
                buffers: &[CubeVertex::layout()],
                format,
                blend: BlendMode::Opaque,
                depth: Some(DepthMode::Standard),
                cull: CullFace::Back,
            },
        )?;
        Ok(Self { pipeline })
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, frame: &FrameBindings, mesh: &CubeMesh) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &frame.bind_group, &[]);
        mesh.bind(pass);
        pass.draw_indexed(0..CubeMesh::index_count(), 0, 0..LIGHT_COUNT as u32);
    }
}
