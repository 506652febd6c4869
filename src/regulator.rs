//! Iteration pacing for the playback loop.

use std::time::{Duration, Instant};

use crate::clock::MILLIS_PER_SECOND;

/// Caps the playback loop at a target iteration rate.
///
/// The regulator only ever slows the loop down: a fast iteration sleeps away
/// the remainder of its frame budget, a slow one proceeds immediately and is
/// reported as behind schedule. It never speeds up a slow iteration.
#[derive(Debug)]
pub struct FrameRegulator {
    /// Budget for one iteration, rounded to whole milliseconds
    target_frame_duration: Duration,
    /// Start of the current iteration
    frame_start: Instant,
    /// Elapsed time between `begin()` and `end()`
    frame_time: Duration,
    /// Iterations that exceeded their budget
    behind_count: u64,
}

impl FrameRegulator {
    /// Creates a regulator for the given target rate.
    ///
    /// `target_fps` must be positive.
    pub fn new(target_fps: f64) -> Self {
        debug_assert!(target_fps > 0.0);
        let target_ms = (MILLIS_PER_SECOND / target_fps).round() as u64;
        Self {
            target_frame_duration: Duration::from_millis(target_ms),
            frame_start: Instant::now(),
            frame_time: Duration::ZERO,
            behind_count: 0,
        }
    }

    /// Marks the start of an iteration.
    pub fn begin(&mut self) {
        self.frame_start = Instant::now();
    }

    /// Marks the end of an iteration, recording its observed duration.
    pub fn end(&mut self) {
        self.frame_time = self.frame_start.elapsed();
    }

    /// Sleeps away the unused remainder of the iteration budget.
    ///
    /// Returns `false`, after sleeping nothing, when the iteration already
    /// exceeded its budget, meaning the loop is running behind schedule. That
    /// is observability only; correctness is unaffected.
    pub fn wait(&mut self) -> bool {
        match self.sleep_budget() {
            Some(budget) => {
                std::thread::sleep(budget);
                true
            }
            None => {
                self.behind_count += 1;
                tracing::warn!(
                    observed_ms = self.frame_time.as_millis() as u64,
                    target_ms = self.target_frame_duration.as_millis() as u64,
                    "running behind schedule, no pacing delay this iteration"
                );
                false
            }
        }
    }

    /// Remaining budget for the current iteration, or `None` when the
    /// iteration already ran past it.
    pub fn sleep_budget(&self) -> Option<Duration> {
        if self.frame_time < self.target_frame_duration {
            Some(self.target_frame_duration - self.frame_time)
        } else {
            None
        }
    }

    /// Returns the per-iteration budget.
    pub fn target_frame_duration(&self) -> Duration {
        self.target_frame_duration
    }

    /// Returns how many iterations have run past their budget so far.
    pub fn behind_count(&self) -> u64 {
        self.behind_count
    }

    #[cfg(test)]
    fn force_observed(&mut self, observed: Duration) {
        self.frame_time = observed;
    }
}
