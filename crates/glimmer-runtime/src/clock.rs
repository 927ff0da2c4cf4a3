//! Frame clock producing millisecond deltas

use std::time::{Duration, Instant};

/// Longest delta handed to the scene; longer stalls are cut short
pub const MAX_DELTA_MS: u32 = 250;

/// Tracks wall-clock time between frames
pub struct FrameClock {
    /// Total elapsed game time in milliseconds
    pub total_ms: u64,
    /// Time since last frame in milliseconds
    pub delta_ms: u32,
    /// Number of ticks so far
    pub frame: u64,
    /// Last tick instant
    last_instant: Instant,
    /// Whether this is the first tick
    first_tick: bool,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            total_ms: 0,
            delta_ms: 0,
            frame: 0,
            last_instant: Instant::now(),
            first_tick: true,
        }
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock from the wall clock. Call once per frame.
    pub fn tick(&mut self) -> u32 {
        let now = Instant::now();

        if self.first_tick {
            self.first_tick = false;
            self.last_instant = now;
            self.frame += 1;
            self.delta_ms = 0;
            return 0;
        }

        let elapsed = now.duration_since(self.last_instant);
        self.last_instant = now;
        self.advance(elapsed)
    }

    /// Advance by a given duration, for headless runs at a fixed rate
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        // Clamp to avoid a huge catch-up step after a stall
        let ms = elapsed.as_millis().min(MAX_DELTA_MS as u128) as u32;
        self.first_tick = false;
        self.delta_ms = ms;
        self.total_ms += ms as u64;
        self.frame += 1;
        ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_defaults() {
        let clock = FrameClock::new();
        assert_eq!(clock.total_ms, 0);
        assert_eq!(clock.delta_ms, 0);
        assert_eq!(clock.frame, 0);
    }

    #[test]
    fn test_first_tick_zero_delta() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(), 0);
        assert_eq!(clock.frame, 1);
    }

    #[test]
    fn test_advance_accumulates() {
        let mut clock = FrameClock::new();
        clock.advance(Duration::from_millis(16));
        clock.advance(Duration::from_millis(17));
        assert_eq!(clock.total_ms, 33);
        assert_eq!(clock.delta_ms, 17);
        assert_eq!(clock.frame, 2);
    }

    #[test]
    fn test_long_frames_are_clamped() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(Duration::from_secs(3)), MAX_DELTA_MS);
        assert_eq!(clock.total_ms, MAX_DELTA_MS as u64);
    }
}
