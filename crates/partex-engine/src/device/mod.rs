//! GPU device management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue without a surface
//! - waiting on submitted work for synchronous readback

mod context;
mod init;

pub use context::Gpu;
pub use init::GpuInit;
