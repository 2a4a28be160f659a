use std::sync::mpsc;

use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use image::RgbaImage;
use wgpu::util::DeviceExt;

use crate::device::Gpu;
use crate::paint::GradientLookup;
use crate::raster::{dispatch_grid, Rasterizer, TargetStatus, TextureResolution};
use crate::shape::{Ramp, Shape};

/// Logical name of the particle kernel resource.
pub const KERNEL_NAME: &str = "RenderParticle";

/// Compute entry point inside the kernel module.
pub const KERNEL_ENTRY: &str = "gpu_render";

const OUTPUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// GPU implementation of [`Rasterizer`].
///
/// Owns the compute pipeline, the output storage texture and its readback
/// buffer. The output texture is created on first use, replaced when the
/// resolution changes and destroyed on `release` or drop.
pub struct GpuRasterizer {
    gpu: Gpu,
    kernel: ParticleKernel,
    target: Option<OutputTarget>,
}

impl GpuRasterizer {
    /// Compiles the particle kernel on `gpu`.
    pub fn new(gpu: Gpu) -> Self {
        let kernel = ParticleKernel::new(gpu.device());
        log::debug!("loaded compute kernel {KERNEL_NAME}::{KERNEL_ENTRY}");
        Self {
            gpu,
            kernel,
            target: None,
        }
    }

    pub fn gpu(&self) -> &Gpu {
        &self.gpu
    }
}

impl Rasterizer for GpuRasterizer {
    fn ensure_target(&mut self, resolution: TextureResolution) -> Result<TargetStatus> {
        let px = resolution.pixels();
        let status = match &self.target {
            Some(t) if t.size == px => return Ok(TargetStatus::Reused),
            Some(_) => TargetStatus::Replaced,
            None => TargetStatus::Allocated,
        };
        if let Some(old) = self.target.take() {
            old.destroy();
        }
        log::debug!("gpu rasterizer: {status:?} {resolution} target");
        self.target = Some(OutputTarget::new(self.gpu.device(), px));
        Ok(status)
    }

    fn dispatch(&mut self, shape: Shape, lookup: &GradientLookup) -> Result<()> {
        let target = self
            .target
            .as_ref()
            .context("no output target; ensure_target must run before dispatch")?;
        let device = self.gpu.device();
        let queue = self.gpu.queue();

        let lookup_tex = upload_lookup(device, queue, lookup);
        let lookup_view = lookup_tex.create_view(&wgpu::TextureViewDescriptor::default());

        let params = KernelParams::new(shape, target.size);
        queue.write_buffer(&self.kernel.params_ubo, 0, bytemuck::bytes_of(&params));

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("partex particle bind group"),
            layout: &self.kernel.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&target.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&lookup_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.kernel.params_ubo.as_entire_binding(),
                },
            ],
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("partex particle encoder"),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("partex particle pass"),
                timestamp_writes: None,
            });
            let [gx, gy, gz] = dispatch_grid(target.size);
            pass.set_pipeline(&self.kernel.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(gx, gy, gz);
        }
        queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn read_back(&mut self) -> Result<RgbaImage> {
        let target = self.target.as_ref().context("no output target to read back")?;
        let device = self.gpu.device();
        let size = target.size;

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("partex readback encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &target.staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(target.padded_row),
                    rows_per_image: Some(size),
                },
            },
            extent(size, size),
        );
        self.gpu.queue().submit(std::iter::once(encoder.finish()));

        let slice = target.staging.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.gpu.wait_idle()?;
        rx.recv()
            .context("readback callback dropped")?
            .context("failed to map readback buffer")?;

        let row = (size * 4) as usize;
        let mut pixels = Vec::with_capacity(row * size as usize);
        {
            let mapped = slice.get_mapped_range();
            for chunk in mapped.chunks(target.padded_row as usize).take(size as usize) {
                pixels.extend_from_slice(&chunk[..row]);
            }
        }
        target.staging.unmap();

        RgbaImage::from_raw(size, size, pixels).context("readback size mismatch")
    }

    fn target_size(&self) -> Option<u32> {
        self.target.as_ref().map(|t| t.size)
    }

    fn release(&mut self) {
        if let Some(target) = self.target.take() {
            log::debug!("gpu rasterizer: released {0}x{0} target", target.size);
            target.destroy();
        }
    }
}

impl Drop for GpuRasterizer {
    fn drop(&mut self) {
        self.release();
    }
}

// ── kernel ────────────────────────────────────────────────────────────────

struct ParticleKernel {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    params_ubo: wgpu::Buffer,
}

impl ParticleKernel {
    fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(KERNEL_NAME),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/particle.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("partex particle bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: OUTPUT_FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<KernelParams>() as u64,
                        ),
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("partex particle pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("partex particle pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some(KERNEL_ENTRY),
            compilation_options: Default::default(),
            cache: None,
        });

        let params_ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("partex particle params ubo"),
            contents: bytemuck::bytes_of(&KernelParams::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            pipeline,
            bind_group_layout,
            params_ubo,
        }
    }
}

/// Uniform layout (32 bytes), mirrors `Params` in particle.wgsl.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct KernelParams {
    shape_id: u32,
    resolution: u32,
    band: f32,
    ramp_kind: u32,
    ramp_scale: f32,
    _pad: [u32; 3],
}

impl KernelParams {
    fn new(shape: Shape, resolution: u32) -> Self {
        let (ramp_kind, ramp_scale) = match shape.ramp() {
            Ramp::Radial { outer_radius } => (0, outer_radius),
            Ramp::Inset { inradius } => (1, inradius),
            Ramp::Linear => (2, 1.0),
        };
        Self {
            shape_id: shape.id(),
            resolution,
            band: shape.edge_band(resolution),
            ramp_kind,
            ramp_scale,
            _pad: [0; 3],
        }
    }
}

// ── output target ─────────────────────────────────────────────────────────

struct OutputTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    staging: wgpu::Buffer,
    size: u32,
    /// Row pitch of `staging`, aligned to `COPY_BYTES_PER_ROW_ALIGNMENT`.
    padded_row: u32,
}

impl OutputTarget {
    fn new(device: &wgpu::Device, size: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("partex result texture"),
            size: extent(size, size),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OUTPUT_FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let padded_row = padded_bytes_per_row(size);
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("partex readback buffer"),
            size: padded_row as u64 * size as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            texture,
            view,
            staging,
            size,
            padded_row,
        }
    }

    fn destroy(self) {
        self.texture.destroy();
        self.staging.destroy();
    }
}

// ── helpers ───────────────────────────────────────────────────────────────

fn upload_lookup(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    lookup: &GradientLookup,
) -> wgpu::Texture {
    let (w, h) = (lookup.width(), lookup.height());
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("partex gradient lookup"),
        size: extent(w, h),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        lookup.as_bytes(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * w),
            rows_per_image: Some(h),
        },
        extent(w, h),
    );
    texture
}

#[inline]
fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

#[inline]
fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    unpadded.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT) * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_are_uniform_sized() {
        assert_eq!(std::mem::size_of::<KernelParams>(), 32);
    }

    #[test]
    fn params_follow_shape_ramp() {
        let p = KernelParams::new(Shape::Circle, 64);
        assert_eq!((p.shape_id, p.ramp_kind, p.resolution), (0, 0, 64));
        assert_eq!(p.band, Shape::Circle.edge_band(64));
        assert_eq!(KernelParams::new(Shape::Hexagon, 64).ramp_kind, 1);
        assert_eq!(KernelParams::new(Shape::Blade, 64).ramp_kind, 2);
    }

    #[test]
    fn rows_are_padded_to_copy_alignment() {
        assert_eq!(padded_bytes_per_row(32), 256);
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(128), 512);
    }
}
