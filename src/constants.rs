//! Default values for the engine configuration.

use std::time::Duration;

/// World width used by the border test unless configured otherwise.
pub const DEFAULT_WORLD_WIDTH: u32 = 800;
/// World height used by the border test unless configured otherwise.
pub const DEFAULT_WORLD_HEIGHT: u32 = 600;

pub const DEFAULT_WINDOW_WIDTH: u32 = 800;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 600;

/// Length of one fixed simulation tick, in milliseconds (~60 ticks per second).
pub const DEFAULT_TICK_LENGTH_MS: u32 = 16;

/// Frames longer than this are clamped before being fed to the accumulator.
pub const DEFAULT_MAX_FRAME_MS: u32 = 250;

/// Target duration of one rendered frame.
pub const LOOP_TIME: Duration = Duration::from_nanos((1_000_000_000.0 / 60.0) as u64);
