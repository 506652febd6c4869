//! Wall-clock timing for the playback loop.

use std::time::{Duration, Instant};

/// Milliseconds in a second, shared by the FPS window and pacing math.
pub(crate) const MILLIS_PER_SECOND: f64 = 1000.0;

/// Wall-clock delta measurement and a rolling one-second frame counter.
///
/// All state is instance state, so multiple playback sessions can each own a
/// clock without interfering.
#[derive(Debug)]
pub struct PlaybackClock {
    /// Time of the previous `tick()` call
    last: Instant,
    /// Rolling window accumulator in milliseconds
    window_ms: f64,
    /// Frames observed in the current window
    frames: u32,
}

impl PlaybackClock {
    /// Creates a clock; the window starts empty.
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            window_ms: 0.0,
            frames: 0,
        }
    }

    /// Returns the wall-clock time elapsed since the previous call and
    /// advances the internal reference point.
    ///
    /// The first call after construction returns the time since construction;
    /// treat it as a warm-up value, not something to gate logic on.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let delta = now - self.last;
        self.last = now;
        delta
    }

    /// Feeds one iteration's delta into the rolling one-second window.
    ///
    /// Returns `Some(count)` with the frames observed once the window fills,
    /// resetting both the window and the count; `None` until then. The window
    /// triggers as soon as less than one millisecond remains of it, tolerating
    /// floating-point drift near the boundary.
    pub fn note_frame(&mut self, delta: Duration) -> Option<u32> {
        self.window_ms += delta.as_secs_f64() * MILLIS_PER_SECOND;
        self.frames += 1;

        if MILLIS_PER_SECOND - self.window_ms < 1.0 {
            let count = self.frames;
            self.window_ms = 0.0;
            self.frames = 0;
            return Some(count);
        }

        None
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new()
    }
}
