//! GPU rasterization.
//!
//! The particle kernel runs as a wgpu compute pipeline writing straight into
//! an rgba8unorm storage texture, then copies into a mappable buffer for
//! readback.
//!
//! Convention:
//! - one invocation per texel, 8×8 workgroups
//! - the kernel owns no state between dispatches besides the output target

mod kernel;

pub use kernel::{GpuRasterizer, KERNEL_ENTRY, KERNEL_NAME};
