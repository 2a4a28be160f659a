//! Color model shared between configuration and rasterizers.
//!
//! Scope:
//! - straight-alpha color representation
//! - 1-D gradients and their baked lookup images

pub mod color;
pub mod gradient;
pub mod lookup;

pub use color::Color;
pub use gradient::{ColorStop, Gradient, GradientMode};
pub use lookup::{bake, GradientLookup, LOOKUP_HEIGHT, LOOKUP_WIDTH};
