//! Rasterizer seam.
//!
//! The generator talks to a [`Rasterizer`]: something that owns an output
//! surface, runs the particle kernel over it and hands back CPU pixels. The
//! GPU implementation lives in `render`; [`CpuRasterizer`] is the software
//! reference with identical formulas and tiling.

mod cpu;

use std::fmt;

use anyhow::Result;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::paint::GradientLookup;
use crate::shape::Shape;

pub use cpu::{shade_texel, CpuRasterizer};

/// Kernel tile edge in pixels.
pub const WORKGROUP_SIZE: u32 = 8;

/// Minimum dispatch size per axis, in tiles.
pub const MIN_DISPATCH: u32 = 8;

/// Dispatch grid for a square target: `max(8, ceil(res / 8))` tiles per axis.
///
/// Small targets over-dispatch; invocations outside the image exit early.
#[inline]
pub fn dispatch_grid(resolution: u32) -> [u32; 3] {
    let tiles = resolution.div_ceil(WORKGROUP_SIZE).max(MIN_DISPATCH);
    [tiles, tiles, 1]
}

/// Output resolution (square, power of two).
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum TextureResolution {
    R32 = 32,
    R64 = 64,
    #[default]
    R128 = 128,
    R256 = 256,
    R512 = 512,
    R1024 = 1024,
}

impl TextureResolution {
    pub const ALL: [TextureResolution; 6] = [
        TextureResolution::R32,
        TextureResolution::R64,
        TextureResolution::R128,
        TextureResolution::R256,
        TextureResolution::R512,
        TextureResolution::R1024,
    ];

    #[inline]
    pub const fn pixels(self) -> u32 {
        self as u32
    }
}

impl From<TextureResolution> for u32 {
    fn from(res: TextureResolution) -> u32 {
        res.pixels()
    }
}

/// Error for resolutions outside the supported set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unsupported resolution {0}; expected one of 32, 64, 128, 256, 512, 1024")]
pub struct UnsupportedResolution(pub u32);

impl TryFrom<u32> for TextureResolution {
    type Error = UnsupportedResolution;

    fn try_from(px: u32) -> std::result::Result<Self, Self::Error> {
        TextureResolution::ALL
            .into_iter()
            .find(|r| r.pixels() == px)
            .ok_or(UnsupportedResolution(px))
    }
}

impl fmt::Display for TextureResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{0}x{0}", self.pixels())
    }
}

/// What `ensure_target` did with the output surface.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TargetStatus {
    /// Existing surface had the right size and was still valid.
    Reused,
    /// No surface existed; a new one was created.
    Allocated,
    /// The old surface had another size (or was lost) and was replaced.
    Replaced,
}

/// Executes the particle kernel into an owned output surface.
///
/// Call order per generation: `ensure_target`, `dispatch`, `read_back`.
pub trait Rasterizer {
    /// Makes sure an output surface of `resolution` exists.
    ///
    /// Surfaces are never resized in place: a size change drops the old one.
    fn ensure_target(&mut self, resolution: TextureResolution) -> Result<TargetStatus>;

    /// Runs the kernel for `shape` with the baked gradient over the target.
    fn dispatch(&mut self, shape: Shape, lookup: &GradientLookup) -> Result<()>;

    /// Copies the target into CPU memory. Blocks until the kernel finished.
    fn read_back(&mut self) -> Result<RgbaImage>;

    /// Side length of the current target, if one exists.
    fn target_size(&self) -> Option<u32>;

    /// Drops the output surface. The next `ensure_target` allocates again.
    fn release(&mut self);
}

impl<R: Rasterizer + ?Sized> Rasterizer for Box<R> {
    fn ensure_target(&mut self, resolution: TextureResolution) -> Result<TargetStatus> {
        (**self).ensure_target(resolution)
    }

    fn dispatch(&mut self, shape: Shape, lookup: &GradientLookup) -> Result<()> {
        (**self).dispatch(shape, lookup)
    }

    fn read_back(&mut self) -> Result<RgbaImage> {
        (**self).read_back()
    }

    fn target_size(&self) -> Option<u32> {
        (**self).target_size()
    }

    fn release(&mut self) {
        (**self).release()
    }
}
