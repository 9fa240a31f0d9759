//! Time subsystem.
//!
//! Frame timing utilities decoupled from the runtime:
//! - one `FrameClock` per render loop, ticked once per presented frame
//! - `FrameRate` averages frame times over a fixed window for periodic logs

mod frame_clock;
mod frame_rate;

pub use frame_clock::{FrameClock, FrameTime};
pub use frame_rate::FrameRate;
