//! Landmark source trait and error types.

use core::fmt;
use core::future::Future;

use crate::types::Frame;

/// Error type for landmark sources.
///
/// Any of these ends the bridge loop; there is no frame to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// The frame stream ended.
    Closed,
    /// Reading from the camera or detector failed.
    Io,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "frame stream closed"),
            Self::Io => write!(f, "frame read failed"),
        }
    }
}

/// Async trait for per-frame hand landmark producers.
///
/// This trait abstracts the camera and pose-estimation model, allowing a
/// detector process, a recorded session or a test script to drive the
/// bridge interchangeably.
pub trait LandmarkSource {
    /// Wait for and return the next frame's landmarks.
    ///
    /// A frame without a visible hand is `Ok` with no hands.
    fn next_frame(&mut self) -> impl Future<Output = Result<Frame, FrameError>>;

    /// Check if the source can still produce frames.
    fn is_open(&self) -> bool;
}
