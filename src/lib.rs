//! Host side of the gesture-controlled sensor station.
//!
//! Reads hand landmarks from a detector, counts raised fingers with
//! [`gesture_core`], and drives the microcontroller over a serial port.
//!
//! - [`config`]: defaults, TOML file and CLI flags ([`HostConfig`])
//! - [`input`]: JSON landmark frames, optionally from a detector subprocess
//! - [`output`]: serial command link ([`SerialLink`])
//! - [`delay`]: blocking response-window delay ([`StdDelay`])

pub mod config;
pub mod delay;
pub mod error;
pub mod input;
pub mod output;

pub use config::{Args, HostConfig, ThumbRuleArg};
pub use delay::StdDelay;
pub use error::{HostError, HostResult};
pub use input::{Detector, FrameFilter, JsonLandmarkSource};
pub use output::{open_serial, SerialLink};
