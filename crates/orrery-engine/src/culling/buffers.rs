use bytemuck::{Pod, Zeroable};

use crate::render::mesh::CUBE_INDEX_COUNT;
use crate::scene::InstanceRaw;

/// Layout of `draw_indexed_indirect` arguments. The compute pass bumps
/// `instance_count` atomically.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawIndexedIndirectArgs {
    pub index_count: u32,
    pub instance_count: u32,
    pub first_index: u32,
    pub base_vertex: i32,
    pub first_instance: u32,
}

impl DrawIndexedIndirectArgs {
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    /// Seed written before every dispatch.
    pub fn seed() -> Self {
        Self {
            index_count: CUBE_INDEX_COUNT,
            ..Self::default()
        }
    }
}

/// Uniform block consumed by the cull compute shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct CullParams {
    pub planes: [[f32; 4]; 6],
    pub count: u32,
    pub radius: f32,
    pub _pad: [u32; 2],
}

/// Offset of the index list inside the staging buffer.
pub(super) const STAGING_IDS_OFFSET: u64 = 32;

/// GPU buffers backing device culling, sized for `capacity` instances.
pub struct VisibilityBuffers {
    pub capacity: u32,
    pub params: wgpu::Buffer,
    pub instances: wgpu::Buffer,
    pub visible_ids: wgpu::Buffer,
    pub args: wgpu::Buffer,
    pub staging: wgpu::Buffer,
}

impl VisibilityBuffers {
    pub fn new(device: &wgpu::Device, capacity: u32) -> Self {
        let capacity = capacity.max(1);
        let ids_size = 4 * capacity as u64;

        let params = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("orrery cull params"),
            size: std::mem::size_of::<CullParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let instances = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("orrery cull instances"),
            size: capacity as u64 * std::mem::size_of::<InstanceRaw>() as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let visible_ids = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("orrery visible ids"),
            size: ids_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let args = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("orrery indirect args"),
            size: DrawIndexedIndirectArgs::SIZE,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::INDIRECT
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let staging = Self::create_staging(device, capacity);

        Self {
            capacity,
            params,
            instances,
            visible_ids,
            args,
            staging,
        }
    }

    /// Read-back buffer holding the args block followed by the index list.
    pub(super) fn create_staging(device: &wgpu::Device, capacity: u32) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("orrery cull staging"),
            size: STAGING_IDS_OFFSET + 4 * capacity as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Rewrites params, instances and the args seed for this frame.
    pub fn upload(&self, queue: &wgpu::Queue, params: &CullParams, instances: &[InstanceRaw]) {
        queue.write_buffer(&self.params, 0, bytemuck::bytes_of(params));
        if !instances.is_empty() {
            queue.write_buffer(&self.instances, 0, bytemuck::cast_slice(instances));
        }
        queue.write_buffer(&self.args, 0, bytemuck::bytes_of(&DrawIndexedIndirectArgs::seed()));
    }

    /// Copies args and ids into `staging`.
    pub fn encode_copy_to(&self, encoder: &mut wgpu::CommandEncoder, staging: &wgpu::Buffer) {
        encoder.copy_buffer_to_buffer(&self.args, 0, staging, 0, DrawIndexedIndirectArgs::SIZE);
        encoder.copy_buffer_to_buffer(
            &self.visible_ids,
            0,
            staging,
            STAGING_IDS_OFFSET,
            4 * self.capacity as u64,
        );
    }
}

/// Decodes a mapped staging range into `(args, visible ids)`.
pub(super) fn decode_staging(bytes: &[u8]) -> (DrawIndexedIndirectArgs, Vec<u32>) {
    let args_end = DrawIndexedIndirectArgs::SIZE as usize;
    let args: DrawIndexedIndirectArgs = bytemuck::pod_read_unaligned(&bytes[..args_end]);
    let ids_bytes = &bytes[STAGING_IDS_OFFSET as usize..];
    let available = ids_bytes.len() / 4;
    let count = (args.instance_count as usize).min(available);
    let ids = ids_bytes[..count * 4]
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    (args, ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_match_wgsl() {
        assert_eq!(DrawIndexedIndirectArgs::SIZE, 20);
        assert_eq!(std::mem::size_of::<CullParams>(), 112);
        assert!(STAGING_IDS_OFFSET >= DrawIndexedIndirectArgs::SIZE);
        assert_eq!(STAGING_IDS_OFFSET % 8, 0);
    }

    #[test]
    fn seed_draws_the_cube_with_no_instances() {
        let seed = DrawIndexedIndirectArgs::seed();
        assert_eq!(seed.index_count, 36);
        assert_eq!(seed.instance_count, 0);
    }

    #[test]
    fn decode_clamps_count_to_buffer() {
        let mut bytes = vec![0u8; STAGING_IDS_OFFSET as usize + 8];
        let args = DrawIndexedIndirectArgs {
            index_count: 36,
            instance_count: 5,
            ..Default::default()
        };
        bytes[..20].copy_from_slice(bytemuck::bytes_of(&args));
        bytes[32..36].copy_from_slice(&7u32.to_le_bytes());
        bytes[36..40].copy_from_slice(&3u32.to_le_bytes());
        let (decoded, ids) = decode_staging(&bytes);
        assert_eq!(decoded.instance_count, 5);
        assert_eq!(ids, vec![7, 3]);
    }
}
