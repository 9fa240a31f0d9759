use std::sync::mpsc;

use crate::error::{RenderError, Result};
use crate::render::ShaderRegistry;
use crate::scene::{Instance, InstanceRaw};

use super::buffers::{decode_staging, CullParams, VisibilityBuffers};
use super::frustum::Frustum;
use super::{CullingKind, CullingStrategy, VisibleSet};

/// Threads per compute workgroup; must match `cull.cs`.
pub(super) const WORKGROUP_SIZE: u32 = 64;

type MapResult = std::result::Result<(), wgpu::BufferAsyncError>;

/// Progress of the visible-count read-back.
enum Readback {
    /// Staging buffer free.
    Idle,
    /// Copy recorded into the current frame's encoder; map after submit.
    Encoded,
    /// Map requested; waiting for the device.
    Pending(mpsc::Receiver<MapResult>),
}

/// Compute-shader frustum culling feeding `draw_indexed_indirect`.
///
/// The frame path never waits on the GPU: the visible count is copied into a
/// staging buffer, mapped after submission and collected on a later frame.
pub struct DeviceCuller {
    readback: Readback,
    last_visible: u32,
    scratch: Vec<InstanceRaw>,
    draw_bind_group: wgpu::BindGroup,
    draw_layout: wgpu::BindGroupLayout,
    compute_bind_group: wgpu::BindGroup,
    compute_layout: wgpu::BindGroupLayout,
    pipeline: wgpu::ComputePipeline,
    buffers: VisibilityBuffers,
    count: u32,
    radius: f32,
    queue: wgpu::Queue,
    device: wgpu::Device,
}

impl DeviceCuller {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        shaders: &mut ShaderRegistry,
        capacity: u32,
        radius: f32,
    ) -> Result<Self> {
        let shader = shaders.compile_shader(device, "cull.cs")?;
        let buffers = VisibilityBuffers::new(device, capacity);

        let compute_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("orrery cull bgl"),
            entries: &[
                layout_entry(0, wgpu::ShaderStages::COMPUTE, wgpu::BufferBindingType::Uniform),
                storage_entry(1, wgpu::ShaderStages::COMPUTE, true),
                storage_entry(2, wgpu::ShaderStages::COMPUTE, false),
                storage_entry(3, wgpu::ShaderStages::COMPUTE, false),
            ],
        });
        let compute_bind_group = create_compute_bind_group(device, &compute_layout, &buffers);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("orrery cull pipeline layout"),
            bind_group_layouts: &[&compute_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("orrery cull pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader.module,
            entry_point: shader.entry_point(),
            compilation_options: Default::default(),
            cache: None,
        });

        // Cube vertex stage reads the same instance and id buffers.
        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("orrery cull draw bgl"),
            entries: &[
                storage_entry(0, wgpu::ShaderStages::VERTEX, true),
                storage_entry(1, wgpu::ShaderStages::VERTEX, true),
            ],
        });

        let draw_bind_group = create_draw_bind_group(device, &draw_layout, &buffers);

        Ok(Self {
            readback: Readback::Idle,
            last_visible: 0,
            scratch: Vec::with_capacity(capacity as usize),
            draw_bind_group,
            draw_layout,
            compute_bind_group,
            compute_layout,
            pipeline,
            buffers,
            count: 0,
            radius,
            queue: queue.clone(),
            device: device.clone(),
        })
    }

    pub fn capacity(&self) -> u32 {
        self.buffers.capacity
    }

    /// Layout of the vertex-stage bind group (instances, visible ids).
    pub fn draw_bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.draw_layout
    }

    pub fn draw_bind_group(&self) -> &wgpu::BindGroup {
        &self.draw_bind_group
    }

    /// Indirect argument block filled by the last dispatch.
    pub fn args_buffer(&self) -> &wgpu::Buffer {
        &self.buffers.args
    }

    /// Most recent visible count read back from the device.
    pub fn last_visible_count(&self) -> u32 {
        self.last_visible
    }

    /// Writes frustum, instances and the argument seed for this frame.
    ///
    /// Buffers grow to the next power of two when `instances` does not fit.
    pub fn prepare(&mut self, frustum: &Frustum, instances: &[Instance]) {
        if instances.len() > self.buffers.capacity as usize {
            self.grow(instances.len());
        }

        self.scratch.clear();
        self.scratch.extend(instances.iter().map(Instance::raw));
        self.count = instances.len() as u32;

        let params = CullParams {
            planes: frustum.to_arrays(),
            count: self.count,
            radius: self.radius,
            _pad: [0; 2],
        };
        self.buffers.upload(&self.queue, &params, &self.scratch);
    }

    /// Recreates every buffer and both bind groups for at least `needed`
    /// instances. An in-flight read-back is abandoned with the old staging
    /// buffer.
    fn grow(&mut self, needed: usize) {
        let capacity = u32::try_from(needed.next_power_of_two()).unwrap_or(u32::MAX);
        self.buffers = VisibilityBuffers::new(&self.device, capacity);
        self.compute_bind_group =
            create_compute_bind_group(&self.device, &self.compute_layout, &self.buffers);
        self.draw_bind_group = create_draw_bind_group(&self.device, &self.draw_layout, &self.buffers);
        self.readback = Readback::Idle;
        log::debug!("device culling buffers grown to {capacity}");
    }

    fn encode_dispatch(&self, encoder: &mut wgpu::CommandEncoder) {
        if self.count == 0 {
            return;
        }
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("orrery cull pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.compute_bind_group, &[]);
        pass.dispatch_workgroups(self.count.div_ceil(WORKGROUP_SIZE), 1, 1);
    }

    /// Records the cull dispatch, and the read-back copy when the staging
    /// buffer is free.
    pub fn encode(&mut self, encoder: &mut wgpu::CommandEncoder) {
        self.encode_dispatch(encoder);
        if matches!(self.readback, Readback::Idle) {
            self.buffers.encode_copy_to(encoder, &self.buffers.staging);
            self.readback = Readback::Encoded;
        }
    }

    /// Requests the staging map once the frame's commands are submitted.
    pub fn after_submit(&mut self) {
        if !matches!(self.readback, Readback::Encoded) {
            return;
        }
        let (tx, rx) = mpsc::channel();
        self.buffers
            .staging
            .slice(..)
            .map_async(wgpu::MapMode::Read, move |result| {
                let _ = tx.send(result);
            });
        self.readback = Readback::Pending(rx);
    }

    /// Collects a finished read-back without blocking.
    ///
    /// Returns `None` while nothing new is available. A failed map resets
    /// the reported count to 0.
    pub fn poll_readback(&mut self) -> Option<Result<u32>> {
        let Readback::Pending(rx) = &self.readback else {
            return None;
        };
        let mapped = map_outcome(self.device.poll(wgpu::PollType::Poll), rx.try_recv())?;

        let outcome = match mapped {
            Ok(()) => {
                let count = {
                    let view = self.buffers.staging.slice(..).get_mapped_range();
                    decode_staging(&view).0.instance_count
                };
                self.buffers.staging.unmap();
                Ok(count)
            }
            Err(e) => {
                // The old staging buffer may stay pending forever.
                self.buffers.staging =
                    VisibilityBuffers::create_staging(&self.device, self.buffers.capacity);
                Err(e)
            }
        };
        Some(self.finish_readback(outcome))
    }

    fn finish_readback(&mut self, outcome: Result<u32>) -> Result<u32> {
        self.readback = Readback::Idle;
        self.last_visible = *outcome.as_ref().unwrap_or(&0);
        outcome
    }
}

impl CullingStrategy for DeviceCuller {
    fn kind(&self) -> CullingKind {
        CullingKind::Device
    }

    /// Runs one dispatch and waits for its result.
    fn cull(&mut self, frustum: &Frustum, instances: &[Instance]) -> Result<VisibleSet> {
        self.prepare(frustum, instances);

        let staging = VisibilityBuffers::create_staging(&self.device, self.buffers.capacity);
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("orrery cull readback encoder"),
            });
        self.encode_dispatch(&mut encoder);
        self.buffers.encode_copy_to(&mut encoder, &staging);
        self.queue.submit(std::iter::once(encoder.finish()));

        let (tx, rx) = mpsc::channel();
        staging.slice(..).map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: None,
            })
            .map_err(|e| RenderError::Readback(e.to_string()))?;

        match rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(RenderError::Readback(e.to_string())),
            Err(_) => return Err(RenderError::Readback("map callback dropped".into())),
        }

        let ids = {
            let view = staging.slice(..).get_mapped_range();
            decode_staging(&view).1
        };
        staging.unmap();
        Ok(VisibleSet::new(ids))
    }
}

/// Classifies one non-blocking read-back check. `None` means still pending.
fn map_outcome(
    polled: std::result::Result<wgpu::PollStatus, wgpu::PollError>,
    received: std::result::Result<MapResult, mpsc::TryRecvError>,
) -> Option<Result<()>> {
    if let Err(e) = polled {
        return Some(Err(RenderError::Readback(format!("device poll failed: {e}"))));
    }
    match received {
        Ok(Ok(())) => Some(Ok(())),
        Ok(Err(e)) => Some(Err(RenderError::Readback(e.to_string()))),
        Err(mpsc::TryRecvError::Empty) => None,
        Err(mpsc::TryRecvError::Disconnected) => {
            Some(Err(RenderError::Readback("map callback dropped".into())))
        }
    }
}

fn create_compute_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffers: &VisibilityBuffers,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("orrery cull bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: buffers.params.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: buffers.instances.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: buffers.visible_ids.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: buffers.args.as_entire_binding(),
            },
        ],
    })
}

fn create_draw_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffers: &VisibilityBuffers,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("orrery cull draw bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: buffers.instances.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: buffers.visible_ids.as_entire_binding(),
            },
        ],
    })
}

fn layout_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    ty: wgpu::BufferBindingType,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn storage_entry(binding: u32, visibility: wgpu::ShaderStages, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    layout_entry(
        binding,
        visibility,
        wgpu::BufferBindingType::Storage { read_only },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_poll_ends_the_readback() {
        let outcome = map_outcome(Err(wgpu::PollError::Timeout), Err(mpsc::TryRecvError::Empty));
        assert!(matches!(outcome, Some(Err(RenderError::Readback(_)))));
    }

    #[test]
    fn empty_channel_keeps_waiting() {
        assert!(map_outcome(Ok(wgpu::PollStatus::Poll), Err(mpsc::TryRecvError::Empty)).is_none());
    }

    #[test]
    fn mapped_or_dropped_callbacks_finish() {
        assert!(matches!(
            map_outcome(Ok(wgpu::PollStatus::QueueEmpty), Ok(Ok(()))),
            Some(Ok(()))
        ));
        assert!(matches!(
            map_outcome(Ok(wgpu::PollStatus::Poll), Err(mpsc::TryRecvError::Disconnected)),
            Some(Err(RenderError::Readback(_)))
        ));
    }
}
