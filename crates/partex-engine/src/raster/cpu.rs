use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};

use crate::coords::texel_center;
use crate::paint::GradientLookup;
use crate::shape::Shape;

use super::{dispatch_grid, Rasterizer, TargetStatus, TextureResolution, WORKGROUP_SIZE};

/// Shades one texel: `lookup.sample(g) * coverage` on all four channels.
#[inline]
pub fn shade_texel(
    shape: Shape,
    lookup: &GradientLookup,
    px: u32,
    py: u32,
    resolution: u32,
) -> [u8; 4] {
    let sample = shape.sample(texel_center(px, py, resolution), resolution);
    lookup
        .sample(sample.gradient)
        .scaled(sample.coverage)
        .to_rgba8()
}

/// Software reference for the particle kernel.
///
/// Walks the same tile grid the GPU dispatch uses, one invocation per texel,
/// skipping invocations outside the image.
#[derive(Debug, Default)]
pub struct CpuRasterizer {
    target: Option<RgbaImage>,
}

impl CpuRasterizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Rasterizer for CpuRasterizer {
    fn ensure_target(&mut self, resolution: TextureResolution) -> Result<TargetStatus> {
        let px = resolution.pixels();
        let status = match &self.target {
            Some(img) if img.width() == px && img.height() == px => return Ok(TargetStatus::Reused),
            Some(_) => TargetStatus::Replaced,
            None => TargetStatus::Allocated,
        };
        log::debug!("cpu rasterizer: {status:?} {resolution} target");
        self.target = Some(RgbaImage::new(px, px));
        Ok(status)
    }

    fn dispatch(&mut self, shape: Shape, lookup: &GradientLookup) -> Result<()> {
        let target = self
            .target
            .as_mut()
            .context("no output target; ensure_target must run before dispatch")?;
        let res = target.width();
        let [gx, gy, _] = dispatch_grid(res);

        for tile_y in 0..gy {
            for tile_x in 0..gx {
                for ly in 0..WORKGROUP_SIZE {
                    for lx in 0..WORKGROUP_SIZE {
                        let px = tile_x * WORKGROUP_SIZE + lx;
                        let py = tile_y * WORKGROUP_SIZE + ly;
                        if px >= res || py >= res {
                            continue;
                        }
                        target.put_pixel(px, py, Rgba(shade_texel(shape, lookup, px, py, res)));
                    }
                }
            }
        }
        Ok(())
    }

    fn read_back(&mut self) -> Result<RgbaImage> {
        self.target
            .clone()
            .context("no output target to read back")
    }

    fn target_size(&self) -> Option<u32> {
        self.target.as_ref().map(|img| img.width())
    }

    fn release(&mut self) {
        self.target = None;
    }
}
