//! Playback error taxonomy.
//!
//! Every variant here is unrecoverable at this layer: a codec that rejected a
//! packet cannot safely resume mid-stream, so the session tears down instead
//! of retrying. Sample-queue underrun is deliberately not represented: it is
//! the expected steady state at stream start and end, handled by silence
//! substitution.

/// Errors that can occur during a playback session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// The source could not be opened or is not a supported container
    SourceOpen(String),
    /// No decodable track, or no usable frame-rate hint
    TrackNotFound(String),
    /// A codec rejected a packet
    Decode(String),
    /// The surface rejected a plane layout or texture update
    Presentation(String),
    /// The audio output device is unavailable or misconfigured
    Device(String),
}

impl std::fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackError::SourceOpen(msg) => write!(f, "failed to open source: {msg}"),
            PlaybackError::TrackNotFound(msg) => write!(f, "no usable track: {msg}"),
            PlaybackError::Decode(msg) => write!(f, "decode failed: {msg}"),
            PlaybackError::Presentation(msg) => write!(f, "presentation failed: {msg}"),
            PlaybackError::Device(msg) => write!(f, "audio device error: {msg}"),
        }
    }
}

impl std::error::Error for PlaybackError {}
