//! Bounded sample queue between the decode loop and the audio callback.
//!
//! The queue is the single shared-mutable resource between the two playback
//! execution contexts: the coordinator loop pushes decoded PCM bursts, the
//! audio device callback pulls at a cadence and buffer size this crate does
//! not control. Every operation is one short critical section; neither side
//! ever blocks the other beyond that.
//!
//! Capacity is bounded. On overflow the oldest samples are dropped so the
//! audible playhead stays near real time; drops are counted in
//! [`SampleQueueMetrics`]. Underrun is serviced with silence and is not an
//! error, it is the expected state at stream start and end.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// Capacity in seconds of audio when sizing from a format.
const CAPACITY_SECONDS: usize = 2;

/// Bounded, serialized queue of interleaved signed 16-bit samples.
pub struct SampleQueue {
    /// Buffered samples, oldest at the front
    samples: Mutex<VecDeque<i16>>,
    /// Maximum number of samples retained
    capacity: usize,
    /// Total samples offered by the producer
    pushed: AtomicU64,
    /// Total real samples delivered to the consumer
    pulled: AtomicU64,
    /// Samples discarded by the drop-oldest overflow policy
    dropped: AtomicU64,
    /// Pulls that could not be fully served from buffered samples
    underrun_pulls: AtomicU64,
}

/// Counter snapshot for observability.
#[derive(Debug, Clone, Default)]
pub struct SampleQueueMetrics {
    /// Current fill level in samples
    pub len: usize,
    /// Maximum number of samples retained
    pub capacity: usize,
    /// Total samples offered by the producer
    pub total_pushed: u64,
    /// Total real samples delivered to the consumer
    pub total_pulled: u64,
    /// Samples discarded on overflow
    pub dropped: u64,
    /// Pulls partially or fully served with silence
    pub underrun_pulls: u64,
}

impl SampleQueue {
    /// Creates a queue holding at most `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Mutex::new(VecDeque::with_capacity(capacity.min(1 << 16))),
            capacity: capacity.max(1),
            pushed: AtomicU64::new(0),
            pulled: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            underrun_pulls: AtomicU64::new(0),
        }
    }

    /// Sizes the queue for the given audio format: enough interleaved samples
    /// to hold a couple of seconds of playback, absorbing decode-rate bursts
    /// without growing unbounded.
    pub fn for_format(sample_rate: u32, channels: u16) -> Self {
        Self::new(sample_rate as usize * channels as usize * CAPACITY_SECONDS)
    }

    /// Appends samples at the tail.
    ///
    /// When the queue would exceed its capacity, the oldest samples are
    /// dropped to make room and the drop is counted.
    pub fn push(&self, samples: &[i16]) {
        if samples.is_empty() {
            return;
        }

        let mut queue = self.samples.lock();
        let overflow = (queue.len() + samples.len()).saturating_sub(self.capacity);
        if overflow > 0 {
            let from_queue = overflow.min(queue.len());
            queue.drain(..from_queue);
            self.dropped.fetch_add(overflow as u64, Ordering::Relaxed);
        }
        // A burst larger than the whole queue keeps only its newest tail
        let skip = samples.len().saturating_sub(self.capacity);
        queue.extend(samples[skip..].iter().copied());
        drop(queue);

        self.pushed.fetch_add(samples.len() as u64, Ordering::Relaxed);
        if overflow > 0 {
            tracing::warn!(dropped = overflow, "sample queue full, dropped oldest samples");
        }
    }

    /// Fills `out` with the oldest buffered samples in order, zero-filling
    /// any remainder. Returns the number of real samples written.
    ///
    /// An empty queue leaves the buffer untouched and the entire request is
    /// silence.
    pub fn pull(&self, out: &mut [i16]) -> usize {
        let mut queue = self.samples.lock();
        let take = out.len().min(queue.len());
        for (slot, sample) in out.iter_mut().zip(queue.drain(..take)) {
            *slot = sample;
        }
        drop(queue);

        out[take..].fill(0);

        self.pulled.fetch_add(take as u64, Ordering::Relaxed);
        if take < out.len() {
            self.underrun_pulls.fetch_add(1, Ordering::Relaxed);
        }
        take
    }

    /// Returns the number of buffered samples.
    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    /// Returns true if no samples are buffered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns current counters for observability.
    pub fn metrics(&self) -> SampleQueueMetrics {
        SampleQueueMetrics {
            len: self.len(),
            capacity: self.capacity,
            total_pushed: self.pushed.load(Ordering::Relaxed),
            total_pulled: self.pulled.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            underrun_pulls: self.underrun_pulls.load(Ordering::Relaxed),
        }
    }
}
