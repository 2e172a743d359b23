//! Serial wire formats spoken between the gesture host and the microcontroller.
//!
//! - **Commands**: the host sends one ASCII digit per gesture change
//!   - [`Command`] - a validated command value (`'0'..='5'`)
//!   - [`ControlMode`] - what the microcontroller does for each command
//!
//! - **Telemetry**: the microcontroller answers with one status line
//!   - [`parse_line()`] - gate a line and iterate its fields
//!   - [`TelemetryField`] - a single decoded `KEY:VALUE` token
//!
//! - **Snapshot**: last known value of every sensor
//!   - [`SensorSnapshot`] - sticky, formatted sensor values
//!   - [`SensorKey`] - sensor identifiers in decoding priority order
//!
//! # Protocol Format
//!
//! ## Command
//!
//! ```text
//! <digit>
//! ```
//!
//! A single byte `'0'`-`'5'` with no framing or terminator.
//!
//! ## Telemetry Line
//!
//! ```text
//! D:<num>,T:<num>,H:<num>,P:<0|1>,S:<num>\n
//! ```
//!
//! Fields are optional and may appear in any order.
//!
//! # Example
//!
//! ```
//! use gesture_proto::{SensorKey, SensorSnapshot};
//!
//! let mut snapshot = SensorSnapshot::new();
//! snapshot.apply_line(b"D:25.4,P:1\n").unwrap();
//! assert_eq!(snapshot.get(SensorKey::Distance), "25.4 cm");
//! assert_eq!(snapshot.get(SensorKey::Motion), "ACTIVO");
//! assert_eq!(snapshot.get(SensorKey::Servo), "--");
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod command;
pub mod snapshot;
pub mod telemetry;

pub use command::{Command, ControlMode};
pub use snapshot::{DisplayValue, ModeReadings, SensorSnapshot, MAX_DISPLAY_LENGTH, PLACEHOLDER};
pub use telemetry::{
    parse_line, RawValue, SensorKey, TelemetryField, TelemetryFields, TelemetryParseError,
    MAX_LINE_LENGTH, MAX_VALUE_LENGTH,
};
