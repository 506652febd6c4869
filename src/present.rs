//! Frame presentation staging.
//!
//! [`PresentationStage`] sits between the video decoder and the output
//! surface: it validates the planar layout of each decoded image, hands the
//! planes (with their individual strides and dimensions) to the
//! [`Presenter`], and decides whether the loop should keep its pacing delay
//! for the frame. Decoded frames are always presented; only the pacing
//! varies.

use std::time::Duration;

use crate::error::PlaybackError;
use crate::media::{DecodedImage, Plane};

/// Number of planes in the planar YUV layout this stage accepts.
const PLANE_COUNT: usize = 3;

/// Presentation surface seam.
pub trait Presenter: Send {
    /// Uploads the given planes, honoring each plane's own stride and
    /// dimensions (chroma planes may be subsampled relative to luma).
    fn update_surface(&mut self, planes: &[Plane]) -> Result<(), PlaybackError>;

    /// Requests a redraw of the current surface contents.
    fn render(&mut self) -> Result<(), PlaybackError>;

    /// Releases the surface. Idempotent.
    fn close(&mut self);
}

/// Copies decoded images to the surface and owns the pacing predicate.
pub struct PresentationStage {
    presenter: Box<dyn Presenter>,
    presented: u64,
}

impl PresentationStage {
    /// Creates a stage around the given surface.
    pub fn new(presenter: Box<dyn Presenter>) -> Self {
        Self {
            presenter,
            presented: 0,
        }
    }

    /// Returns true when the frame's intended display time has arrived or is
    /// still ahead of the playback position, meaning the loop should keep its
    /// delay. Returns false when the frame is already behind the playhead, in
    /// which case the delay is skipped so the session catches back up.
    pub fn should_present(frame_pts: Duration, position: Duration) -> bool {
        frame_pts >= position
    }

    /// Copies each plane into the surface and requests a redraw.
    ///
    /// Fails with [`PlaybackError::Presentation`] when the image does not
    /// match the expected plane layout; the failure is reported upward, never
    /// retried.
    pub fn present(&mut self, image: &DecodedImage) -> Result<(), PlaybackError> {
        if image.num_planes() != PLANE_COUNT {
            return Err(PlaybackError::Presentation(format!(
                "expected {PLANE_COUNT} planes, got {}",
                image.num_planes()
            )));
        }
        for (index, plane) in image.planes.iter().enumerate() {
            validate_plane(index, plane)?;
        }

        self.presenter.update_surface(&image.planes)?;
        self.presenter.render()?;
        self.presented += 1;
        tracing::trace!(pts = ?image.pts, "presented image");
        Ok(())
    }

    /// Re-renders the current surface without new pixel data, keeping the
    /// display refreshed during audio-only iterations.
    pub fn refresh(&mut self) -> Result<(), PlaybackError> {
        self.presenter.render()
    }

    /// Returns the number of images presented so far.
    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// Releases the surface.
    pub(crate) fn close(&mut self) {
        self.presenter.close();
    }
}

fn validate_plane(index: usize, plane: &Plane) -> Result<(), PlaybackError> {
    if plane.width == 0 || plane.height == 0 {
        return Err(PlaybackError::Presentation(format!(
            "plane {index} has zero dimension ({}x{})",
            plane.width, plane.height
        )));
    }
    if plane.stride < plane.width as usize {
        return Err(PlaybackError::Presentation(format!(
            "plane {index} stride {} shorter than row width {}",
            plane.stride, plane.width
        )));
    }
    // The last row need not be padded out to the full stride
    let required = plane.stride * (plane.height as usize - 1) + plane.width as usize;
    if plane.data.len() < required {
        return Err(PlaybackError::Presentation(format!(
            "plane {index} holds {} bytes, layout requires {required}",
            plane.data.len()
        )));
    }
    Ok(())
}
