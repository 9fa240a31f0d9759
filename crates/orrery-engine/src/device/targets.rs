use crate::error::{RenderError, Result};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Size-dependent render targets: the depth buffer and the offscreen
/// composition texture every scene pass draws into.
///
/// Recreated as a unit on resize.
pub struct FrameTargets {
    width: u32,
    height: u32,
    pub depth_view: wgpu::TextureView,
    pub depth: wgpu::Texture,
    pub composition_view: wgpu::TextureView,
    pub composition: wgpu::Texture,
}

impl FrameTargets {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        check_size(width, height, device.limits().max_texture_dimension_2d)?;

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let composition = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("orrery composition"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let composition_view = composition.create_view(&wgpu::TextureViewDescriptor::default());

        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("orrery depth"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            width,
            height,
            depth_view,
            depth,
            composition_view,
            composition,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

fn check_size(width: u32, height: u32, max: u32) -> Result<()> {
    let reason = if width == 0 || height == 0 {
        "zero area".to_string()
    } else if width > max || height > max {
        format!("exceeds the device limit of {max}")
    } else {
        return Ok(());
    };
    Err(RenderError::Resize {
        width,
        height,
        reason,
    })
}
