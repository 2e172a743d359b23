//! Core landmark types: Landmark, LandmarkRole, HandPose, Frame.

/// Number of landmarks in a full hand model.
pub const LANDMARK_COUNT: usize = 21;

/// Maximum number of hands carried by one frame.
pub const MAX_HANDS: usize = 2;

/// A single hand keypoint in normalized image coordinates.
///
/// `x` and `y` are in `[0, 1]` relative to image width and height, with
/// `y` growing downwards. `z` is relative depth and unused by the
/// classifier.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    #[must_use]
    pub const fn with_depth(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Anatomical role of a landmark, numbered as in the MediaPipe hand model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LandmarkRole {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexMcp = 5,
    IndexPip = 6,
    IndexDip = 7,
    IndexTip = 8,
    MiddleMcp = 9,
    MiddlePip = 10,
    MiddleDip = 11,
    MiddleTip = 12,
    RingMcp = 13,
    RingPip = 14,
    RingDip = 15,
    RingTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

impl LandmarkRole {
    /// Every role, in model order.
    pub const ALL: [Self; LANDMARK_COUNT] = [
        Self::Wrist,
        Self::ThumbCmc,
        Self::ThumbMcp,
        Self::ThumbIp,
        Self::ThumbTip,
        Self::IndexMcp,
        Self::IndexPip,
        Self::IndexDip,
        Self::IndexTip,
        Self::MiddleMcp,
        Self::MiddlePip,
        Self::MiddleDip,
        Self::MiddleTip,
        Self::RingMcp,
        Self::RingPip,
        Self::RingDip,
        Self::RingTip,
        Self::PinkyMcp,
        Self::PinkyPip,
        Self::PinkyDip,
        Self::PinkyTip,
    ];

    /// Position of this role in the model's landmark list.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Role at a model index.
    #[inline]
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Which hand the detector believes it saw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Handedness {
    Left,
    Right,
}

/// All landmarks detected for one hand in one frame.
///
/// Landmarks are stored by role. A pose built from a short landmark list
/// is incomplete; [`HandPose::require`] reports the first missing role.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HandPose {
    landmarks: [Option<Landmark>; LANDMARK_COUNT],
    pub handedness: Option<Handedness>,
}

impl HandPose {
    /// Create an empty pose.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            landmarks: [None; LANDMARK_COUNT],
            handedness: None,
        }
    }

    /// Build a pose from landmarks listed in model order.
    ///
    /// Extra points beyond [`LANDMARK_COUNT`] are ignored; missing trailing
    /// points leave their roles empty.
    #[must_use]
    pub fn from_points(points: &[Landmark]) -> Self {
        let mut pose = Self::new();
        for (slot, point) in pose.landmarks.iter_mut().zip(points) {
            *slot = Some(*point);
        }
        pose
    }

    /// Set the handedness reported by the detector.
    #[must_use]
    pub const fn with_handedness(mut self, handedness: Handedness) -> Self {
        self.handedness = Some(handedness);
        self
    }

    /// Store a landmark for a role.
    #[inline]
    pub fn set(&mut self, role: LandmarkRole, landmark: Landmark) {
        self.landmarks[role.index()] = Some(landmark);
    }

    /// Landmark for a role, if present.
    #[inline]
    #[must_use]
    pub fn get(&self, role: LandmarkRole) -> Option<Landmark> {
        self.landmarks[role.index()]
    }

    /// Landmark for a role, or the role itself as the error.
    #[inline]
    pub fn require(&self, role: LandmarkRole) -> Result<Landmark, LandmarkRole> {
        self.get(role).ok_or(role)
    }

    /// Whether every role has a landmark.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.landmarks.iter().all(Option::is_some)
    }
}

/// Everything the landmark source reports for one camera frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    /// Detected hands, in detector order. Empty when no hand is visible.
    pub hands: heapless::Vec<HandPose, MAX_HANDS>,
    /// The user asked to stop after this frame.
    pub quit: bool,
}

impl Frame {
    /// A frame with no hands.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            hands: heapless::Vec::new(),
            quit: false,
        }
    }

    /// A frame with a single hand.
    #[must_use]
    pub fn with_hand(pose: HandPose) -> Self {
        let mut frame = Self::empty();
        // Capacity is at least one.
        let _ = frame.hands.push(pose);
        frame
    }

    /// Mark this frame as the last one.
    #[must_use]
    pub fn quitting(mut self) -> Self {
        self.quit = true;
        self
    }

    /// Hand whose finger count drives the command.
    ///
    /// When several hands are reported the last one wins.
    #[inline]
    #[must_use]
    pub fn primary_hand(&self) -> Option<&HandPose> {
        self.hands.last()
    }
}
