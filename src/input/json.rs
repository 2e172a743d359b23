use std::io::BufRead;

use gesture_core::{Frame, FrameError, HandPose, Handedness, Landmark, LandmarkSource, MAX_HANDS};
use log::{debug, warn};
use serde::Deserialize;

/// Minimum detection score a hand needs to be used.
pub const DEFAULT_MIN_HAND_SCORE: f32 = 0.5;

/// Which detected hands make it into a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameFilter {
    /// Hands scored below this are dropped.
    pub min_score: f32,
    /// At most this many hands are kept, in detector order.
    pub max_hands: usize,
}

impl Default for FrameFilter {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_HAND_SCORE,
            max_hands: 1,
        }
    }
}

/// JSON structures for parsing detector output
#[derive(Deserialize, Debug)]
struct LandmarkJson {
    x: f32,
    y: f32,
    #[serde(default)]
    z: f32,
}

#[derive(Deserialize, Debug)]
struct HandJson {
    #[serde(default)]
    handedness: Option<String>,
    #[serde(default)]
    score: Option<f32>,
    landmarks: Vec<LandmarkJson>,
}

#[derive(Deserialize, Debug)]
struct FrameJson {
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    quit: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Landmark source reading one JSON object per line.
///
/// # Format
///
/// ```text
/// {"hands":[{"handedness":"Right","score":0.93,"landmarks":[{"x":0.51,"y":0.72,"z":0.0}, ...]}],"quit":false}
/// ```
///
/// Landmarks are in model order (wrist first). Lines that are not UTF-8 or
/// fail to parse are skipped; a line with an `error` field is reported as a
/// frame without hands.
pub struct JsonLandmarkSource<R> {
    reader: R,
    filter: FrameFilter,
    line: Vec<u8>,
    line_number: usize,
    open: bool,
}

impl<R: BufRead> JsonLandmarkSource<R> {
    pub fn new(reader: R) -> Self {
        Self::with_filter(reader, FrameFilter::default())
    }

    pub fn with_filter(reader: R, filter: FrameFilter) -> Self {
        Self {
            reader,
            filter,
            line: Vec::new(),
            line_number: 0,
            open: true,
        }
    }

    fn read_frame(&mut self) -> Result<Frame, FrameError> {
        if !self.open {
            return Err(FrameError::Closed);
        }

        loop {
            self.line.clear();
            match self.reader.read_until(b'\n', &mut self.line) {
                Ok(0) => {
                    self.open = false;
                    return Err(FrameError::Closed);
                }
                Ok(_) => self.line_number += 1,
                Err(e) => {
                    warn!("Landmark stream read failed: {}", e);
                    self.open = false;
                    return Err(FrameError::Io);
                }
            }

            let text = match core::str::from_utf8(&self.line) {
                Ok(text) => text.trim(),
                Err(e) => {
                    warn!("Skipping non UTF-8 landmark line {}: {}", self.line_number, e);
                    continue;
                }
            };
            if text.is_empty() {
                continue;
            }

            match serde_json::from_str::<FrameJson>(text) {
                Ok(json) => return Ok(self.convert(json)),
                Err(e) => warn!("Skipping malformed landmark line {}: {}", self.line_number, e),
            }
        }
    }

    fn convert(&self, json: FrameJson) -> Frame {
        let mut frame = Frame::empty();
        frame.quit = json.quit;

        if let Some(error) = json.error {
            warn!("Detector error: {}", error);
            return frame;
        }

        let limit = self.filter.max_hands.min(MAX_HANDS);
        for hand in json.hands {
            if frame.hands.len() >= limit {
                break;
            }

            let score = hand.score.unwrap_or(1.0);
            if score < self.filter.min_score {
                debug!("Dropping hand with score {:.2}", score);
                continue;
            }

            let points: Vec<Landmark> = hand
                .landmarks
                .iter()
                .map(|lm| Landmark::with_depth(lm.x, lm.y, lm.z))
                .collect();
            let mut pose = HandPose::from_points(&points);
            if let Some(handedness) = hand.handedness.as_deref().and_then(parse_handedness) {
                pose = pose.with_handedness(handedness);
            }

            // Bounded by `limit`, which never exceeds the capacity.
            let _ = frame.hands.push(pose);
        }

        frame
    }
}

fn parse_handedness(label: &str) -> Option<Handedness> {
    if label.eq_ignore_ascii_case("left") {
        Some(Handedness::Left)
    } else if label.eq_ignore_ascii_case("right") {
        Some(Handedness::Right)
    } else {
        None
    }
}

impl<R: BufRead> LandmarkSource for JsonLandmarkSource<R> {
    async fn next_frame(&mut self) -> Result<Frame, FrameError> {
        self.read_frame()
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
