//! Command link trait and error types.

use core::fmt;
use core::future::Future;

use gesture_proto::{Command, MAX_LINE_LENGTH};

/// One telemetry line as read from the link, without its newline.
pub type LineBuffer = heapless::Vec<u8, MAX_LINE_LENGTH>;

/// Error type for link operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Serial I/O error.
    Io,
    /// No data arrived within the read timeout.
    Timeout,
    /// The device went away.
    Disconnected,
    /// Buffer overflow (line too long).
    BufferOverflow,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "serial i/o error"),
            Self::Timeout => write!(f, "serial read timed out"),
            Self::Disconnected => write!(f, "serial device disconnected"),
            Self::BufferOverflow => write!(f, "telemetry line too long"),
        }
    }
}

/// Async trait for the half-duplex serial link to the microcontroller.
///
/// The host writes single command bytes and, right after a write, may read
/// one reply line. There is no background reading.
pub trait CommandLink {
    /// Transmit a command byte.
    fn send(&mut self, command: Command) -> impl Future<Output = Result<(), LinkError>>;

    /// Number of received bytes waiting to be read. Never blocks.
    fn bytes_available(&mut self) -> Result<usize, LinkError>;

    /// Read one newline-terminated line.
    ///
    /// Lines longer than [`MAX_LINE_LENGTH`] are discarded up to their
    /// newline and reported as [`LinkError::BufferOverflow`].
    fn read_line(&mut self) -> impl Future<Output = Result<LineBuffer, LinkError>>;

    /// Check if the link is open.
    fn is_ready(&self) -> bool;
}
