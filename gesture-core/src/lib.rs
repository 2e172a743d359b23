//! Platform-agnostic hand gesture classification and command bridge.
//!
//! This crate turns hand landmarks into microcontroller commands without any
//! platform-specific dependencies. It can be used both in embedded `no_std`
//! environments and on a host.
//!
//! # Overview
//!
//! - [`types`]: Landmark data ([`Landmark`], [`LandmarkRole`], [`HandPose`], [`Frame`])
//! - [`classifier`]: Finger counting ([`classify`], [`count_fingers`], [`ThumbRule`])
//! - [`debounce`]: Send-on-change gate ([`CommandDebouncer`])
//! - [`input`]: Landmark source trait ([`LandmarkSource`])
//! - [`output`]: Serial command link trait ([`CommandLink`])
//! - [`bridge`]: Orchestrates frame-to-command flow ([`GestureBridge`])
//!
//! # Pipeline
//!
//! ```text
//! LandmarkSource -> classify -> CommandDebouncer -> CommandLink::send
//!                                                      |
//!                       SensorSnapshot <- read_line <--+ (only after a send)
//! ```
//!
//! # Example
//!
//! ```rust
//! use gesture_core::{count_fingers, HandPose, Landmark, LandmarkRole, ThumbRule};
//!
//! let mut pose = HandPose::new();
//! for role in LandmarkRole::ALL {
//!     pose.set(role, Landmark::new(0.5, 0.5));
//! }
//! // Raise the index finger above its middle joint.
//! pose.set(LandmarkRole::IndexTip, Landmark::new(0.5, 0.2));
//!
//! let count = count_fingers(&pose, ThumbRule::default()).unwrap();
//! assert_eq!(count.get(), 1);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support
//! - **`defmt`**: Enable defmt formatting (for embedded logging)

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod bridge;
pub mod classifier;
pub mod debounce;
pub mod input;
pub mod output;
pub mod types;

// Re-export main types at crate root
pub use bridge::{
    BridgeConfig, BridgeError, FrameOutcome, GestureBridge, Reply, StopReason,
    DEFAULT_RESPONSE_WAIT_MS,
};
pub use classifier::{
    classify, count_fingers, extended_fingers, ClassifyError, ExtendedFingers, Finger, FingerCount,
    ThumbRule,
};
pub use debounce::CommandDebouncer;
pub use input::{FrameError, LandmarkSource};
pub use output::{CommandLink, LineBuffer, LinkError};
pub use types::{Frame, HandPose, Handedness, Landmark, LandmarkRole, LANDMARK_COUNT, MAX_HANDS};

pub use gesture_proto::{Command, ControlMode, SensorKey, SensorSnapshot, TelemetryParseError};
