//! Fixed-timestep bookkeeping for the frame loop.

use crate::config::TimingConfig;

/// Splits variable frame times into fixed simulation ticks.
///
/// The remainder that does not fill a whole tick stays in the accumulator and is what the render system
/// uses to interpolate between the current and predicted positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedTimestep {
    tick_length: u32,
    max_frame: u32,
    accumulator: u32,
}

impl FixedTimestep {
    pub fn new(tick_length: u32, max_frame: u32) -> Self {
        Self {
            tick_length: tick_length.max(1),
            max_frame,
            accumulator: 0,
        }
    }

    pub fn from_config(config: &TimingConfig) -> Self {
        Self::new(config.tick_length_ms, config.max_frame_ms)
    }

    /// Adds a frame's elapsed time and returns how many ticks to simulate.
    pub fn advance(&mut self, frame_ms: u32) -> u32 {
        self.accumulator += frame_ms.min(self.max_frame);
        let ticks = self.accumulator / self.tick_length;
        self.accumulator %= self.tick_length;
        ticks
    }

    /// Time left over after the last whole tick, always below the tick length.
    pub fn accumulator(&self) -> u32 {
        self.accumulator
    }

    pub fn tick_length(&self) -> u32 {
        self.tick_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remainder_carries_over() {
        let mut timestep = FixedTimestep::new(16, 250);
        assert_eq!(timestep.advance(10), 0);
        assert_eq!(timestep.accumulator(), 10);
        assert_eq!(timestep.advance(10), 1);
        assert_eq!(timestep.accumulator(), 4);
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut timestep = FixedTimestep::new(10, 100);
        assert_eq!(timestep.advance(5_000), 10);
        assert_eq!(timestep.accumulator(), 0);
    }

    #[test]
    fn test_zero_tick_length_is_bumped() {
        let timestep = FixedTimestep::new(0, 100);
        assert_eq!(timestep.tick_length(), 1);
    }
}
