//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend only on this crate, never on each other's internals.
//!
//! ## Time Model
//! - `timestamp_ms` is the logger's millisecond clock, taken verbatim from the log
//! - `sample_index` is the per-sensor sample counter; it is the alignment key
//! - The accelerometer clock is canonical for aligned records
//!
//! ## Channel Order
//! Window tensors always use [`CHANNEL_ORDER`]: accel x/y/z then gyro x/y/z.
//! Training and inference must agree on this ordering.

mod blueprint;
mod device_id;
mod error;
mod header;
mod sensor;
mod sync;
mod window;

pub use blueprint::*;
pub use device_id::DeviceId;
pub use error::*;
pub use header::*;
pub use sensor::*;
pub use sync::*;
pub use window::*;
