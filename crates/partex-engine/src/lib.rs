//! Partex engine crate.
//!
//! Procedural particle textures: a gradient is baked into a lookup strip, a
//! shape kernel rasterizes it into a square RGBA image on the GPU (or the CPU
//! reference), and the result is applied to a particle material and
//! optionally exported as PNG.

pub mod device;
pub mod coords;
pub mod paint;
pub mod shape;
pub mod raster;
pub mod render;

pub mod generate;
pub mod material;
pub mod export;
pub mod config;

pub mod logging;
