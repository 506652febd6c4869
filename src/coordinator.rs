//! Top-level playback driver.
//!
//! [`PlaybackCoordinator`] owns the session state machine and the single
//! cooperative loop that demuxes, decodes, presents and paces. The audio
//! device callback is the only other execution context in a session; the two
//! meet exclusively at the [`SampleQueue`].
//!
//! # State Machine
//!
//! ```text
//! Idle
//!   → Opening   start() opens the source and the audio device
//!   → Playing   the per-iteration loop below
//!   → Draining  source exhausted or stop requested
//!   → Closed    resources released
//!
//! Failed: terminal, reachable from any non-Closed state; teardown runs on
//! this path too and is idempotent.
//! ```
//!
//! One `Playing` iteration: poll for a stop command, advance the playback
//! position, report the rolling FPS window, read the next packet pair, decode
//! and present any video, decode and queue any audio, refresh the display,
//! then either sleep the remaining frame budget or skip the delay to catch
//! up when the just-decoded frame is already behind the playhead.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::clock::PlaybackClock;
use crate::error::PlaybackError;
use crate::media::{AudioDecoder, Demuxer, VideoDecoder};
use crate::present::{PresentationStage, Presenter};
use crate::regulator::FrameRegulator;
use crate::sample_queue::SampleQueue;
use crate::sink::AudioSink;

/// Playback session states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No session started yet
    Idle,
    /// Opening the source and the output devices
    Opening,
    /// The playback loop is running
    Playing,
    /// Winding down after exhaustion or a stop request
    Draining,
    /// Resources released, session over
    Closed,
    /// A fatal error ended the session
    Failed,
}

/// Commands delivered to the playback loop, polled once per iteration.
#[derive(Debug, Clone, Copy)]
pub enum PlaybackCommand {
    /// Stop playback at the next iteration boundary
    Stop,
}

/// Cloneable handle for controlling a running session from another context.
///
/// Cancellation is cooperative: the loop observes commands once per
/// iteration, so a stop takes effect at the next iteration boundary.
#[derive(Clone)]
pub struct PlaybackControl {
    commands: Sender<PlaybackCommand>,
}

impl PlaybackControl {
    /// Requests a cooperative stop.
    pub fn stop(&self) {
        // Send failure means the session is already gone, nothing to stop
        let _ = self.commands.send(PlaybackCommand::Stop);
    }
}

/// Drives one playback session from open to teardown.
pub struct PlaybackCoordinator {
    demuxer: Box<dyn Demuxer>,
    video_decoder: Box<dyn VideoDecoder>,
    audio_decoder: Box<dyn AudioDecoder>,
    stage: PresentationStage,
    sink: Box<dyn AudioSink>,
    /// Present only while the source has an audio track
    queue: Option<Arc<SampleQueue>>,
    state: PlaybackState,
    commands: Receiver<PlaybackCommand>,
    command_sender: Sender<PlaybackCommand>,
    torn_down: bool,
}

impl PlaybackCoordinator {
    /// Creates a coordinator around the given collaborators.
    ///
    /// A coordinator drives a single session: call [`start`] once.
    ///
    /// [`start`]: PlaybackCoordinator::start
    pub fn new(
        demuxer: Box<dyn Demuxer>,
        video_decoder: Box<dyn VideoDecoder>,
        audio_decoder: Box<dyn AudioDecoder>,
        presenter: Box<dyn Presenter>,
        sink: Box<dyn AudioSink>,
    ) -> Self {
        let (command_sender, commands) = unbounded();
        Self {
            demuxer,
            video_decoder,
            audio_decoder,
            stage: PresentationStage::new(presenter),
            sink,
            queue: None,
            state: PlaybackState::Idle,
            commands,
            command_sender,
            torn_down: false,
        }
    }

    /// Returns a handle for stopping the session from another context.
    pub fn control(&self) -> PlaybackControl {
        PlaybackControl {
            commands: self.command_sender.clone(),
        }
    }

    /// Returns the current session state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Returns the sample queue once the session has an audio path.
    pub fn sample_queue(&self) -> Option<&Arc<SampleQueue>> {
        self.queue.as_ref()
    }

    /// Returns the presentation stage, for observability.
    pub fn stage(&self) -> &PresentationStage {
        &self.stage
    }

    /// Plays the source to completion.
    ///
    /// Blocks the calling context until the source is exhausted, a stop
    /// command arrives, or a fatal error ends the session. `target_fps`
    /// overrides the container's frame-rate hint when given; a source with
    /// neither is [`PlaybackError::TrackNotFound`].
    pub fn start(
        &mut self,
        source: &Path,
        target_fps: Option<f64>,
    ) -> Result<(), PlaybackError> {
        if self.state != PlaybackState::Idle {
            return Err(PlaybackError::SourceOpen(
                "coordinator has already run a session".into(),
            ));
        }

        self.transition(PlaybackState::Opening);
        match self.open_and_play(source, target_fps) {
            Ok(()) => {
                self.transition(PlaybackState::Draining);
                self.teardown();
                self.transition(PlaybackState::Closed);
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "playback failed");
                self.transition(PlaybackState::Failed);
                self.teardown();
                Err(e)
            }
        }
    }

    fn transition(&mut self, next: PlaybackState) {
        tracing::debug!(from = ?self.state, to = ?next, "playback state");
        self.state = next;
    }

    fn open_and_play(
        &mut self,
        source: &Path,
        target_fps: Option<f64>,
    ) -> Result<(), PlaybackError> {
        let info = self.demuxer.open(source)?;
        let fps = target_fps.or(info.frame_rate).ok_or_else(|| {
            PlaybackError::TrackNotFound(
                "no frame-rate hint in container and no target rate given".into(),
            )
        })?;
        if !fps.is_finite() || fps <= 0.0 {
            return Err(PlaybackError::TrackNotFound(format!(
                "unusable frame rate {fps}"
            )));
        }

        tracing::info!(
            source = %source.display(),
            width = info.width,
            height = info.height,
            frame_rate = fps,
            has_audio = info.audio.is_some(),
            "opened source"
        );

        // The audio path exists only when the source carries an audio track;
        // a video-only session never touches the device or the decoder.
        let mut pcm_scratch = Vec::new();
        if let Some(audio) = info.audio {
            let queue = Arc::new(SampleQueue::for_format(audio.sample_rate, audio.channels));
            let pull_queue = Arc::clone(&queue);
            self.sink.open(
                audio.sample_rate,
                audio.channels,
                Box::new(move |out| {
                    pull_queue.pull(out);
                }),
            )?;
            self.queue = Some(queue);
            pcm_scratch = vec![
                0i16;
                self.audio_decoder.buffer_sample_capacity()
                    * audio.channels as usize
            ];
            tracing::info!(
                sample_rate = audio.sample_rate,
                channels = audio.channels,
                "audio output started"
            );
        }

        self.transition(PlaybackState::Playing);
        self.play_loop(fps, &mut pcm_scratch)
    }

    fn play_loop(&mut self, fps: f64, pcm: &mut [i16]) -> Result<(), PlaybackError> {
        let mut clock = PlaybackClock::new();
        let mut regulator = FrameRegulator::new(fps);
        let mut position = Duration::ZERO;

        // Warm-up tick so the first in-loop delta is one iteration, not the
        // time spent opening the source.
        let _ = clock.tick();

        loop {
            regulator.begin();

            if matches!(self.commands.try_recv(), Ok(PlaybackCommand::Stop)) {
                tracing::info!("stop requested");
                break;
            }

            let delta = clock.tick();
            position += delta;

            if let Some(count) = clock.note_frame(delta) {
                tracing::info!(frames_per_second = count, "playback rate");
            }

            let read = self.demuxer.read_frame()?;

            // One video packet may yield zero or more displayable images
            let video_pts = read.video.as_ref().map(|f| f.pts);
            if let Some(ref frame) = read.video {
                self.video_decoder.decode(frame)?;
                while let Some(image) = self.video_decoder.next_image() {
                    self.stage.present(&image)?;
                }
            }

            if let Some(ref frame) = read.audio {
                if let Some(ref queue) = self.queue {
                    let written = self.audio_decoder.decode_to_pcm(frame, pcm)?;
                    queue.push(&pcm[..written]);
                }
            }

            // Keep the display refreshed even on audio-only iterations
            self.stage.refresh()?;

            regulator.end();

            if !read.has_more {
                tracing::info!("source exhausted");
                break;
            }

            match video_pts {
                Some(pts) if !PresentationStage::should_present(pts, position) => {
                    // frame is behind the playhead: skip the delay to catch up
                }
                _ => {
                    regulator.wait();
                }
            }
        }

        Ok(())
    }

    /// Releases session resources: stops the audio device and the surface.
    ///
    /// Safe to invoke from the failure path as well as normal completion;
    /// runs at most once.
    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.sink.close();
        self.stage.close();
        tracing::debug!("playback resources released");
    }
}

impl Drop for PlaybackCoordinator {
    fn drop(&mut self) {
        self.teardown();
    }
}
