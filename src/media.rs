//! Core data model and capability traits.
//!
//! The traits in this module are the seams to the external collaborators:
//! the container demultiplexer, the video codec, and the audio codec. They
//! are object-safe and consumed as `Box<dyn … + Send>` so the coordinator can
//! drive real WebM/VPX/Opus implementations and test doubles through the same
//! interfaces.

use std::path::Path;
use std::time::Duration;

use crate::error::PlaybackError;

/// One demultiplexed packet for a single elementary stream.
///
/// The payload is opaque to this crate; it is handed to the matching decoder
/// exactly once and never retained past the iteration that processed it.
#[derive(Debug, Clone)]
pub struct MediaFrame {
    /// Encoded payload
    pub data: Vec<u8>,
    /// Presentation timestamp
    pub pts: Duration,
}

/// Result of a single demuxer read.
///
/// Either packet slot may be empty for any given read, since containers interleave
/// streams at their own cadence. `has_more` goes false once the container is
/// exhausted.
#[derive(Debug, Clone, Default)]
pub struct FrameRead {
    pub video: Option<MediaFrame>,
    pub audio: Option<MediaFrame>,
    pub has_more: bool,
}

/// Parameters of the audio track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioParams {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u16,
}

/// Metadata about an opened source.
#[derive(Debug, Clone)]
pub struct StreamInfo {
    /// Video width in pixels
    pub width: u32,
    /// Video height in pixels
    pub height: u32,
    /// Container frame-rate hint, when the track carries one
    pub frame_rate: Option<f64>,
    /// Audio track parameters; `None` for video-only sources
    pub audio: Option<AudioParams>,
}

/// A single plane of pixel data.
///
/// Planes of one image may differ in dimension: for planar YUV the chroma
/// planes are subsampled relative to luma, so each plane carries its own
/// width, height and stride.
#[derive(Debug, Clone)]
pub struct Plane {
    /// Raw pixel data
    pub data: Vec<u8>,
    /// Stride (bytes per row, may include padding)
    pub stride: usize,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// A decoded planar image (Y, U, V) with presentation timestamp.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Pixel data planes
    pub planes: Vec<Plane>,
    /// Presentation timestamp (when this image should be displayed)
    pub pts: Duration,
}

impl DecodedImage {
    /// Returns the plane at `index`, if present.
    pub fn plane(&self, index: usize) -> Option<&Plane> {
        self.planes.get(index)
    }

    /// Returns the number of planes.
    pub fn num_planes(&self) -> usize {
        self.planes.len()
    }
}

/// Container demultiplexer seam.
pub trait Demuxer: Send {
    /// Opens the source and returns its stream metadata.
    fn open(&mut self, source: &Path) -> Result<StreamInfo, PlaybackError>;

    /// Reads the next video/audio packet pair.
    fn read_frame(&mut self) -> Result<FrameRead, PlaybackError>;
}

/// Video codec seam.
pub trait VideoDecoder: Send {
    /// Feeds one packet to the decoder.
    fn decode(&mut self, frame: &MediaFrame) -> Result<(), PlaybackError>;

    /// Drains the next displayable image produced by the last decode call.
    ///
    /// One input packet may yield zero or more images; callers drain until
    /// `None` before feeding the next packet.
    fn next_image(&mut self) -> Option<DecodedImage>;
}

/// Audio codec seam.
pub trait AudioDecoder: Send {
    /// Decodes one packet into interleaved signed 16-bit PCM, filling `pcm`
    /// from the front. Returns the number of samples written.
    fn decode_to_pcm(
        &mut self,
        frame: &MediaFrame,
        pcm: &mut [i16],
    ) -> Result<usize, PlaybackError>;

    /// Upper bound on samples produced per packet, per channel.
    ///
    /// Used to size the decode scratch buffer once at session open.
    fn buffer_sample_capacity(&self) -> usize;
}
