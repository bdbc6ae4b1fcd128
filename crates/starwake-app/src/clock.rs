//! Wall-clock frame timing.

use std::time::Instant;

use tracing::warn;

/// Longest frame time handed to the simulation, in seconds.
///
/// A stall longer than this is reported and clamped so the fps signal does
/// not collapse after a pause.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Measures the time between successive frames.
pub struct FrameClock {
    previous_time: Instant,
    frame_count: u64,
    elapsed: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            previous_time: Instant::now(),
            frame_count: 0,
            elapsed: 0.0,
        }
    }

    /// Seconds since the previous call (or since construction), clamped to
    /// [`MAX_FRAME_TIME`].
    pub fn tick(&mut self) -> f32 {
        let current_time = Instant::now();
        let frame_time = current_time
            .duration_since(self.previous_time)
            .as_secs_f64();
        self.previous_time = current_time;
        self.advance(frame_time)
    }

    fn advance(&mut self, frame_time: f64) -> f32 {
        let mut frame_time = frame_time.max(0.0);
        if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            frame_time = MAX_FRAME_TIME;
        }
        self.elapsed += frame_time;
        self.frame_count += 1;
        frame_time as f32
    }

    /// Frames measured so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Sum of the clamped frame times.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_frame_is_clamped() {
        let mut clock = FrameClock::new();
        let dt = clock.advance(3.0);
        assert!((dt as f64 - MAX_FRAME_TIME).abs() < 1e-6);
        assert!((clock.elapsed() - MAX_FRAME_TIME).abs() < 1e-9);
    }

    #[test]
    fn test_short_frame_passes_through() {
        let mut clock = FrameClock::new();
        let dt = clock.advance(1.0 / 60.0);
        assert!((dt - 1.0 / 60.0).abs() < 1e-6);
        assert_eq!(clock.frame_count(), 1);
    }

    #[test]
    fn test_tick_is_non_negative() {
        let mut clock = FrameClock::new();
        let dt = clock.tick();
        assert!(dt >= 0.0);
        assert!(dt as f64 <= MAX_FRAME_TIME);
    }
}
