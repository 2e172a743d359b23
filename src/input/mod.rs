mod detector;
mod json;

pub use detector::{Detector, DetectorSource};
pub use json::{FrameFilter, JsonLandmarkSource, DEFAULT_MIN_HAND_SCORE};
