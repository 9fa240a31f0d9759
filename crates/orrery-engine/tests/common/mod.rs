//! Headless rendering helpers shared by the GPU tests.

#![allow(dead_code)]

use std::sync::mpsc;

use orrery_engine::device::{GpuInit, HeadlessGpu};
use orrery_engine::render::{RenderCtx, RenderTarget};
use orrery_engine::scene::{Camera, Scene};
use orrery_engine::{Compositor, FrameReport};

pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub const SIZE: u32 = 64;

/// Returns a headless device, or `None` (with a note) when the machine has
/// no usable adapter.
pub fn headless() -> Option<HeadlessGpu> {
    match pollster::block_on(HeadlessGpu::new(GpuInit::default())) {
        Ok(gpu) => Some(gpu),
        Err(e) => {
            eprintln!("skipping GPU test: {e}");
            None
        }
    }
}

/// Offscreen stand-in for a surface texture, readable after the frame.
pub struct Output {
    pub view: wgpu::TextureView,
    pub texture: wgpu::Texture,
    readback: wgpu::Buffer,
}

impl Output {
    pub fn new(device: &wgpu::Device) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("test output"),
            size: extent(),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("test readback"),
            size: (row_bytes() * SIZE) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        Self {
            view,
            texture,
            readback,
        }
    }
}

fn extent() -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: SIZE,
        height: SIZE,
        depth_or_array_layers: 1,
    }
}

/// 64 RGBA8 texels fill exactly one 256-byte aligned row.
fn row_bytes() -> u32 {
    SIZE * 4
}

/// Records, submits and reads back one frame.
pub fn render(
    gpu: &HeadlessGpu,
    compositor: &mut Compositor,
    output: &Output,
    scene: &Scene,
    camera: &Camera,
) -> (FrameReport, Vec<u8>) {
    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("test frame"),
        });

    let report = {
        let ctx = RenderCtx::new(&gpu.device, &gpu.queue, FORMAT, (SIZE, SIZE), 1.0);
        let mut target = RenderTarget::new(&mut encoder, &output.texture, &output.view);
        compositor.encode(&ctx, &mut target, scene, camera)
    };

    encoder.copy_texture_to_buffer(
        output.texture.as_image_copy(),
        wgpu::TexelCopyBufferInfo {
            buffer: &output.readback,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(row_bytes()),
                rows_per_image: Some(SIZE),
            },
        },
        extent(),
    );
    gpu.queue.submit(std::iter::once(encoder.finish()));
    compositor.after_submit();

    let (tx, rx) = mpsc::channel();
    output
        .readback
        .slice(..)
        .map_async(wgpu::MapMode::Read, move |r| {
            let _ = tx.send(r);
        });
    gpu.device
        .poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        })
        .unwrap();
    rx.recv().unwrap().unwrap();

    let pixels = output.readback.slice(..).get_mapped_range().to_vec();
    output.readback.unmap();
    (report, pixels)
}
