//! Compile-time simulation tunables
//!
//! These seed [`SimConfig::default`](crate::config::SimConfig). The core reads
//! no files, flags, or environment variables.

/// Domain width in cells
pub const WIDTH: usize = 800;

/// Domain height in cells
pub const HEIGHT: usize = 800;

/// Simulation ticks per second
pub const SIM_RATE: u32 = 64;

/// Grid publications per second
pub const PUBLISH_RATE: u32 = 60;

/// Seconds per simulation tick
pub const DELTA: f32 = 1.0 / SIM_RATE as f32;

/// Downward acceleration in px/s²
pub const GRAVITY: f32 = 490.0;

/// Vertical speed cap in px/s (four cells per tick)
pub const MAX_VELOCITY: f32 = 4.0 * SIM_RATE as f32;

/// Live particle ceiling (half of the domain)
pub const MAX_SAND: usize = WIDTH * HEIGHT / 2;

/// Pointer events buffered between the window thread and the simulation
pub const EVENT_QUEUE_CAPACITY: usize = 2;

/// Ticks between store compactions (0 disables compaction)
pub const COMPACT_INTERVAL_TICKS: u64 = 640;
