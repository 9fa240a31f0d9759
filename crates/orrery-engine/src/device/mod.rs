//! GPU device + surface management.
//!
//! This module is responsible for:
//! - selecting an adapter and creating the Device/Queue
//! - creating & configuring the Surface (swapchain)
//! - acquiring frames and presenting them
//! - the size-dependent depth and composition targets

mod adapter;
mod error;
mod frame;
mod gpu;
mod init;
mod surface;
mod targets;

pub use adapter::{is_software_adapter, request_device, select_adapter};
pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::{Gpu, HeadlessGpu};
pub use init::GpuInit;
pub use targets::{FrameTargets, DEPTH_FORMAT};
