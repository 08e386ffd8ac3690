//! wgpu compute kernel.
//!
//! Each tick uploads the snapshot, dispatches one invocation per particle,
//! copies the outputs into staging buffers and blocks until they are mapped.
//! The controller therefore never starts the next tick before this one's
//! results are back on the host.

use super::{KernelInput, KernelOutput, PhysicsKernel, KERNEL_WGSL, WORKGROUP_SIZE};
use crate::error::{GpuError, Result};
use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use std::sync::mpsc;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct GpuParams {
    count: u32,
    type_count: u32,
    close_range: f32,
    close_force: f32,
    damping: f32,
    half_width: f32,
    half_height: f32,
    boundary_mode: u32,
    cutoff: f32,
}

/// Kernel running on the first high-performance adapter wgpu finds.
pub struct GpuKernel {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    adapter_name: String,
}

impl GpuKernel {
    /// Blocking constructor.
    pub fn new() -> Result<Self> {
        pollster::block_on(Self::new_async())
    }

    pub async fn new_async() -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("plife device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(GpuError::from)?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Kernel"),
            source: wgpu::ShaderSource::Wgsl(KERNEL_WGSL.into()),
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Particle Kernel Pipeline"),
            layout: None, // Auto layout
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let adapter_name = adapter.get_info().name;
        tracing::info!(adapter = %adapter_name, "GPU kernel ready");

        Ok(Self {
            device,
            queue,
            pipeline,
            adapter_name,
        })
    }

    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }

    fn storage(&self, label: &str, contents: &[u8]) -> wgpu::Buffer {
        self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: wgpu::BufferUsages::STORAGE,
        })
    }

    fn buffer(&self, label: &str, size: u64, usage: wgpu::BufferUsages) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage,
            mapped_at_creation: false,
        })
    }
}

impl PhysicsKernel for GpuKernel {
    fn name(&self) -> &'static str {
        "gpu"
    }

    fn step(&mut self, input: &KernelInput<'_>) -> Result<KernelOutput> {
        input.validate()?;
        let n = input.count();
        // Zero-sized storage bindings are invalid
        if n == 0 {
            return Ok(KernelOutput::default());
        }

        let bounds = input.params.boundary.bounds;
        let params = GpuParams {
            count: n as u32,
            type_count: input.type_count,
            close_range: input.params.close_range,
            close_force: input.params.close_force,
            damping: input.params.damping,
            half_width: bounds.half_width,
            half_height: bounds.half_height,
            boundary_mode: input.params.boundary.mode.as_u32(),
            cutoff: input.cutoff(),
        };

        let positions = self.storage("Positions", bytemuck::cast_slice(input.positions));
        let velocities = self.storage("Velocities", bytemuck::cast_slice(input.velocities));
        let types = self.storage("Types", bytemuck::cast_slice(input.types));
        let profiles = self.storage("Profiles", bytemuck::cast_slice(input.profiles));
        let params_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Kernel Params"),
            contents: bytemuck::cast_slice(&[params]),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let byte_len = (n * std::mem::size_of::<Vec2>()) as u64;
        let out_usage = wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC;
        let staging_usage = wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST;
        let out_positions = self.buffer("Out Positions", byte_len, out_usage);
        let out_velocities = self.buffer("Out Velocities", byte_len, out_usage);
        let staging_positions = self.buffer("Staging Positions", byte_len, staging_usage);
        let staging_velocities = self.buffer("Staging Velocities", byte_len, staging_usage);

        let layout = self.pipeline.get_bind_group_layout(0);
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Kernel Bind Group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: positions.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: velocities.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: types.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: profiles.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: out_positions.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: out_velocities.as_entire_binding(),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Kernel Encoder"),
            });

        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Kernel Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            let workgroups = (n as u32).div_ceil(WORKGROUP_SIZE);
            pass.dispatch_workgroups(workgroups, 1, 1);
        }

        encoder.copy_buffer_to_buffer(&out_positions, 0, &staging_positions, 0, byte_len);
        encoder.copy_buffer_to_buffer(&out_velocities, 0, &staging_velocities, 0, byte_len);
        self.queue.submit(Some(encoder.finish()));

        let positions = read_vec2(&self.device, &staging_positions)?;
        let velocities = read_vec2(&self.device, &staging_velocities)?;

        tracing::trace!(particles = n, "gpu kernel step");
        Ok(KernelOutput {
            positions,
            velocities,
        })
    }
}

/// Map a staging buffer and copy it out as `Vec2`s.
fn read_vec2(
    device: &wgpu::Device,
    buffer: &wgpu::Buffer,
) -> std::result::Result<Vec<Vec2>, GpuError> {
    let slice = buffer.slice(..);
    let (tx, rx) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    device.poll(wgpu::Maintain::Wait);

    rx.recv()
        .map_err(|e| GpuError::BufferMapping(e.to_string()))?
        .map_err(|e| GpuError::BufferMapping(e.to_string()))?;

    let out = {
        let data = slice.get_mapped_range();
        bytemuck::cast_slice::<u8, Vec2>(&data).to_vec()
    };
    buffer.unmap();
    Ok(out)
}
