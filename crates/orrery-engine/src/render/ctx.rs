/// Renderer-facing context (device/queue + output format + size).
///
/// This is intentionally small and stable.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    /// Output size in physical pixels.
    pub size: (u32, u32),
    /// Physical pixels per logical pixel.
    pub scale_factor: f32,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        size: (u32, u32),
        scale_factor: f32,
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
            size,
            scale_factor,
        }
    }

    /// Output width over height; 1.0 for a degenerate size.
    pub fn aspect(&self) -> f32 {
        let (w, h) = self.size;
        if w == 0 || h == 0 {
            1.0
        } else {
            w as f32 / h as f32
        }
    }

    /// Output size in logical pixels.
    pub fn logical_size(&self) -> (f32, f32) {
        let scale = if self.scale_factor > 0.0 { self.scale_factor } else { 1.0 };
        (self.size.0 as f32 / scale, self.size.1 as f32 / scale)
    }
}

/// Target for drawing (encoder + presentable color texture).
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_texture: &'a wgpu::Texture,
    pub color_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(
        encoder: &'a mut wgpu::CommandEncoder,
        color_texture: &'a wgpu::Texture,
        color_view: &'a wgpu::TextureView,
    ) -> Self {
        Self {
            encoder,
            color_texture,
            color_view,
        }
    }
}
