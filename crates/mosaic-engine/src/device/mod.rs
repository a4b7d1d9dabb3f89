//! GPU device management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue without a window
//! - creating offscreen color targets
//! - providing encoders for rendering and submitting them

mod frame;
mod gpu;
mod init;

pub use frame::{GpuFrame, OffscreenTarget};
pub use gpu::Gpu;
pub use init::GpuInit;
