//! playhead: headless audio/video synchronization and pacing engine.
//!
//! Coordinates a container demuxer, independent video and audio decoders, a
//! pull-driven audio output device, and a frame-presentation surface so that
//! decoded video and audio stay perceptually in sync across the two clocks
//! involved: the wall-clock-paced playback loop and the audio device's
//! callback cadence.
//!
//! - Core types: [`media`], [`error`]
//! - Timing: [`clock`], [`regulator`]
//! - Audio bridge: [`sample_queue`], [`sink`]
//! - Presentation: [`present`]
//! - Driver: [`coordinator`]
//!
//! Container parsing, codec internals, GPU upload and audio format
//! negotiation stay behind the capability traits in [`media`], [`present`]
//! and [`sink`]; this crate owns only the synchronization core.

pub mod clock;
pub mod coordinator;
pub mod error;
pub mod media;
pub mod present;
pub mod regulator;
pub mod sample_queue;
pub mod sink;

pub use coordinator::{PlaybackControl, PlaybackCoordinator, PlaybackState};
pub use error::PlaybackError;
