//! Generation orchestration.
//!
//! One generation is: make sure the output surface matches the requested
//! resolution, bake the gradient lookup, run the kernel, read the pixels back.

use std::time::Instant;

use anyhow::{Context, Result};
use image::RgbaImage;

use crate::material::BlendMode;
use crate::paint::{bake, Gradient, LOOKUP_HEIGHT, LOOKUP_WIDTH};
use crate::raster::{Rasterizer, TargetStatus, TextureResolution};
use crate::shape::Shape;

/// Everything a single generation needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationRequest {
    pub shape: Shape,
    pub resolution: TextureResolution,
    pub gradient: Gradient,
    /// Not used by rasterization; carried so the caller can apply the result.
    pub blend_mode: BlendMode,
}

/// Drives a [`Rasterizer`] through one generation at a time.
pub struct Generator<R: Rasterizer> {
    rasterizer: R,
    lookup_size: (u32, u32),
}

impl<R: Rasterizer> Generator<R> {
    pub fn new(rasterizer: R) -> Self {
        Self {
            rasterizer,
            lookup_size: (LOOKUP_WIDTH, LOOKUP_HEIGHT),
        }
    }

    /// Overrides the baked lookup dimensions. Zero sizes are raised to 1.
    pub fn with_lookup_size(mut self, width: u32, height: u32) -> Self {
        self.lookup_size = (width.max(1), height.max(1));
        self
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// Renders `request` and returns an image of exactly R×R pixels.
    pub fn generate(&mut self, request: &GenerationRequest) -> Result<RgbaImage> {
        let started = Instant::now();
        let res = request.resolution;

        let status = self
            .rasterizer
            .ensure_target(res)
            .with_context(|| format!("failed to prepare {res} output target"))?;
        if status != TargetStatus::Reused {
            log::debug!("output target {status:?} at {res}");
        }

        let (w, h) = self.lookup_size;
        let lookup = bake(&request.gradient, w, h);

        self.rasterizer
            .dispatch(request.shape, &lookup)
            .with_context(|| format!("failed to rasterize {}", request.shape))?;
        let image = self
            .rasterizer
            .read_back()
            .context("failed to read back particle texture")?;

        log::info!(
            "generated {} at {} in {:.2?}",
            request.shape,
            res,
            started.elapsed()
        );
        Ok(image)
    }

    /// Drops the rasterizer's output surface.
    pub fn release(&mut self) {
        self.rasterizer.release();
    }
}
