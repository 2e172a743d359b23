//! Finger-state classifier: hand landmarks to a count of extended fingers.
//!
//! Each non-thumb finger is extended when its tip sits above its middle
//! joint (PIP), i.e. has a smaller `y`. The thumb folds sideways, so it is
//! judged on the `x` axis against its inner joint (IP) instead. The result
//! is the number of extended fingers, with no smoothing across frames.

use core::fmt;
use core::ops::BitOr;

use gesture_proto::Command;

use crate::types::{Frame, HandPose, Handedness, LandmarkRole};

/// A finger of the hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Self; 5] = [
        Self::Thumb,
        Self::Index,
        Self::Middle,
        Self::Ring,
        Self::Pinky,
    ];

    /// Fingertip landmark.
    #[must_use]
    pub const fn tip(self) -> LandmarkRole {
        match self {
            Self::Thumb => LandmarkRole::ThumbTip,
            Self::Index => LandmarkRole::IndexTip,
            Self::Middle => LandmarkRole::MiddleTip,
            Self::Ring => LandmarkRole::RingTip,
            Self::Pinky => LandmarkRole::PinkyTip,
        }
    }

    /// Joint the tip is compared against (IP for the thumb, PIP otherwise).
    #[must_use]
    pub const fn reference(self) -> LandmarkRole {
        match self {
            Self::Thumb => LandmarkRole::ThumbIp,
            Self::Index => LandmarkRole::IndexPip,
            Self::Middle => LandmarkRole::MiddlePip,
            Self::Ring => LandmarkRole::RingPip,
            Self::Pinky => LandmarkRole::PinkyPip,
        }
    }

    #[inline]
    const fn bit(self) -> ExtendedFingers {
        ExtendedFingers(1 << self as u8)
    }
}

/// Set of extended fingers, as a bitfield.
///
/// # Example
///
/// ```
/// use gesture_core::{ExtendedFingers, Finger};
///
/// let fingers = ExtendedFingers::INDEX | ExtendedFingers::MIDDLE;
/// assert!(fingers.contains(Finger::Index));
/// assert!(!fingers.contains(Finger::Thumb));
/// assert_eq!(fingers.count().get(), 2);
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExtendedFingers(pub u8);

impl ExtendedFingers {
    pub const THUMB: Self = Finger::Thumb.bit();
    pub const INDEX: Self = Finger::Index.bit();
    pub const MIDDLE: Self = Finger::Middle.bit();
    pub const RING: Self = Finger::Ring.bit();
    pub const PINKY: Self = Finger::Pinky.bit();

    /// No finger extended (a fist).
    pub const NONE: Self = Self(0);

    /// Every finger extended (an open hand).
    pub const ALL: Self = Self(0b1_1111);

    /// Check if a finger is extended.
    #[inline]
    #[must_use]
    pub const fn contains(self, finger: Finger) -> bool {
        self.0 & finger.bit().0 != 0
    }

    /// Mark a finger as extended or folded.
    #[inline]
    pub fn set(&mut self, finger: Finger, extended: bool) {
        if extended {
            self.0 |= finger.bit().0;
        } else {
            self.0 &= !finger.bit().0;
        }
    }

    /// Number of extended fingers.
    #[inline]
    #[must_use]
    pub const fn count(self) -> FingerCount {
        FingerCount((self.0 & Self::ALL.0).count_ones() as u8)
    }
}

impl BitOr for ExtendedFingers {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Number of extended fingers, always in `0..=5`.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FingerCount(u8);

impl FingerCount {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(5);

    #[must_use]
    pub const fn new(count: u8) -> Option<Self> {
        if count <= Self::MAX.0 {
            Some(Self(count))
        } else {
            None
        }
    }

    #[inline]
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Command transmitted for this count.
    #[inline]
    #[must_use]
    pub fn command(self) -> Command {
        Command::from(self)
    }
}

impl From<FingerCount> for Command {
    fn from(count: FingerCount) -> Self {
        // FingerCount never exceeds Command::MAX.
        Command::new(count.0).unwrap_or(Command::OFF)
    }
}

impl fmt::Display for FingerCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the thumb's sideways extension is judged.
///
/// The thumb test depends on which hand faces the camera and whether the
/// image is mirrored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ThumbRule {
    /// Extended when the tip is right of the IP joint (`tip.x > ip.x`).
    #[default]
    TipRightOfJoint,
    /// Extended when the tip is left of the IP joint (`tip.x < ip.x`).
    TipLeftOfJoint,
    /// Right hands use [`ThumbRule::TipRightOfJoint`], left hands
    /// [`ThumbRule::TipLeftOfJoint`]. Poses without handedness use the
    /// default rule.
    ByHandedness,
}

impl ThumbRule {
    /// Resolve to a fixed direction for a given pose.
    #[must_use]
    pub fn for_pose(self, pose: &HandPose) -> Self {
        match (self, pose.handedness) {
            (Self::ByHandedness, Some(Handedness::Left)) => Self::TipLeftOfJoint,
            (Self::ByHandedness, _) => Self::TipRightOfJoint,
            (rule, _) => rule,
        }
    }
}

/// Error type for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClassifyError {
    /// The pose lacks a landmark the classifier needs.
    IncompleteLandmarks(LandmarkRole),
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncompleteLandmarks(role) => write!(f, "missing landmark {:?}", role),
        }
    }
}

impl From<LandmarkRole> for ClassifyError {
    fn from(role: LandmarkRole) -> Self {
        Self::IncompleteLandmarks(role)
    }
}

/// Determine which fingers of a pose are extended.
pub fn extended_fingers(pose: &HandPose, rule: ThumbRule) -> Result<ExtendedFingers, ClassifyError> {
    let mut fingers = ExtendedFingers::NONE;
    for finger in Finger::ALL {
        fingers.set(finger, is_extended(pose, finger, rule)?);
    }
    Ok(fingers)
}

/// Count the extended fingers of a pose.
#[inline]
pub fn count_fingers(pose: &HandPose, rule: ThumbRule) -> Result<FingerCount, ClassifyError> {
    extended_fingers(pose, rule).map(ExtendedFingers::count)
}

/// Count the extended fingers of a frame's primary hand.
///
/// A frame without hands counts as zero.
pub fn classify(frame: &Frame, rule: ThumbRule) -> Result<FingerCount, ClassifyError> {
    match frame.primary_hand() {
        Some(pose) => count_fingers(pose, rule),
        None => Ok(FingerCount::ZERO),
    }
}

fn is_extended(pose: &HandPose, finger: Finger, rule: ThumbRule) -> Result<bool, ClassifyError> {
    let tip = pose.require(finger.tip())?;
    let reference = pose.require(finger.reference())?;

    Ok(match finger {
        Finger::Thumb => match rule.for_pose(pose) {
            ThumbRule::TipLeftOfJoint => tip.x < reference.x,
            _ => tip.x > reference.x,
        },
        _ => tip.y < reference.y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Landmark, LANDMARK_COUNT};

    /// Every landmark at the image centre: nothing extended.
    fn fist() -> HandPose {
        HandPose::from_points(&[Landmark::new(0.5, 0.5); LANDMARK_COUNT])
    }

    fn raise(pose: &mut HandPose, finger: Finger) {
        match finger {
            Finger::Thumb => pose.set(finger.tip(), Landmark::new(0.7, 0.5)),
            _ => pose.set(finger.tip(), Landmark::new(0.5, 0.2)),
        }
    }

    #[test]
    fn test_open_hand_counts_five() {
        let mut pose = fist();
        for finger in Finger::ALL {
            raise(&mut pose, finger);
        }
        assert_eq!(count_fingers(&pose, ThumbRule::default()), Ok(FingerCount::MAX));
        assert_eq!(
            extended_fingers(&pose, ThumbRule::default()),
            Ok(ExtendedFingers::ALL)
        );
    }

    #[test]
    fn test_fist_counts_zero() {
        assert_eq!(count_fingers(&fist(), ThumbRule::default()), Ok(FingerCount::ZERO));
    }

    #[test]
    fn test_equal_coordinates_are_folded() {
        // Strict comparisons: a tip level with its joint is not extended.
        let pose = fist();
        let fingers = extended_fingers(&pose, ThumbRule::TipLeftOfJoint).unwrap();
        assert_eq!(fingers, ExtendedFingers::NONE);
    }

    #[test]
    fn test_each_finger_counts_one() {
        for finger in Finger::ALL {
            let mut pose = fist();
            raise(&mut pose, finger);
            let fingers = extended_fingers(&pose, ThumbRule::default()).unwrap();
            assert!(fingers.contains(finger));
            assert_eq!(fingers.count().get(), 1);
        }
    }

    #[test]
    fn test_classification_is_idempotent() {
        let mut pose = fist();
        raise(&mut pose, Finger::Index);
        raise(&mut pose, Finger::Pinky);
        let first = count_fingers(&pose, ThumbRule::default());
        let second = count_fingers(&pose, ThumbRule::default());
        assert_eq!(first, second);
        assert_eq!(first.map(FingerCount::get), Ok(2));
    }

    #[test]
    fn test_thumb_rules() {
        let mut pose = fist();
        pose.set(LandmarkRole::ThumbTip, Landmark::new(0.3, 0.5));

        assert_eq!(count_fingers(&pose, ThumbRule::TipRightOfJoint), Ok(FingerCount::ZERO));
        assert_eq!(count_fingers(&pose, ThumbRule::TipLeftOfJoint).map(FingerCount::get), Ok(1));

        let left = pose.with_handedness(Handedness::Left);
        let right = pose.with_handedness(Handedness::Right);
        assert_eq!(count_fingers(&left, ThumbRule::ByHandedness).map(FingerCount::get), Ok(1));
        assert_eq!(count_fingers(&right, ThumbRule::ByHandedness), Ok(FingerCount::ZERO));
        assert_eq!(count_fingers(&pose, ThumbRule::ByHandedness), Ok(FingerCount::ZERO));
    }

    #[test]
    fn test_incomplete_pose() {
        let mut pose = HandPose::new();
        pose.set(LandmarkRole::ThumbTip, Landmark::new(0.7, 0.5));
        pose.set(LandmarkRole::ThumbIp, Landmark::new(0.5, 0.5));
        pose.set(LandmarkRole::IndexTip, Landmark::new(0.5, 0.2));

        assert_eq!(
            count_fingers(&pose, ThumbRule::default()),
            Err(ClassifyError::IncompleteLandmarks(LandmarkRole::IndexPip))
        );
    }

    #[test]
    fn test_only_required_roles_needed() {
        let mut pose = HandPose::new();
        for finger in Finger::ALL {
            pose.set(finger.reference(), Landmark::new(0.5, 0.5));
            pose.set(finger.tip(), Landmark::new(0.5, 0.5));
        }
        raise(&mut pose, Finger::Middle);
        assert_eq!(count_fingers(&pose, ThumbRule::default()).map(FingerCount::get), Ok(1));
    }

    #[test]
    fn test_classify_empty_frame() {
        assert_eq!(classify(&Frame::empty(), ThumbRule::default()), Ok(FingerCount::ZERO));
    }

    #[test]
    fn test_count_to_command() {
        let count = FingerCount::new(3).unwrap();
        assert_eq!(count.command().as_byte(), b'3');
        assert_eq!(FingerCount::new(6), None);
    }
}
