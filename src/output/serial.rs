use std::io::{self, Read, Write};
use std::time::Duration;

use gesture_core::{Command, CommandLink, LineBuffer, LinkError};
use log::{debug, trace};
use serialport::SerialPort;

use crate::error::{HostError, HostResult};

/// Ports that can report how many received bytes are waiting.
pub trait PendingBytes {
    fn pending_bytes(&mut self) -> io::Result<usize>;
}

impl PendingBytes for Box<dyn SerialPort> {
    fn pending_bytes(&mut self) -> io::Result<usize> {
        self.bytes_to_read()
            .map(|n| n as usize)
            .map_err(io::Error::from)
    }
}

/// Open the microcontroller's serial port.
pub fn open_serial(
    port: &str,
    baud: u32,
    timeout: Duration,
) -> HostResult<SerialLink<Box<dyn SerialPort>>> {
    let handle = serialport::new(port, baud)
        .timeout(timeout)
        .open()
        .map_err(|source| HostError::TransportOpen {
            port: port.to_string(),
            source,
        })?;
    debug!("Opened {} at {} baud", port, baud);
    Ok(SerialLink::new(handle))
}

/// Serial link to the microcontroller.
///
/// Commands go out as single ASCII digits with no terminator. Replies are
/// newline-terminated telemetry lines read one at a time, only when asked.
///
/// # Timeouts
///
/// Reads block for at most the port's timeout per byte. A timeout after
/// part of a line has arrived returns that partial line.
pub struct SerialLink<P> {
    port: P,
    connected: bool,
}

impl<P: Read + Write + PendingBytes> SerialLink<P> {
    pub fn new(port: P) -> Self {
        Self {
            port,
            connected: true,
        }
    }

    /// Get a reference to the underlying port.
    pub fn port(&self) -> &P {
        &self.port
    }

    fn fail(&mut self, e: &io::Error) -> LinkError {
        let error = link_error(e);
        if error == LinkError::Disconnected {
            self.connected = false;
        }
        error
    }

    fn read_byte(&mut self) -> Result<u8, LinkError> {
        let mut byte = [0u8; 1];
        loop {
            match self.port.read(&mut byte) {
                Ok(0) => return Err(LinkError::Timeout),
                Ok(_) => return Ok(byte[0]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.fail(&e)),
            }
        }
    }

    /// Read bytes until a newline is found or the buffer is full.
    ///
    /// If a line exceeds the buffer capacity, the rest of the line is
    /// discarded so the next read starts on a fresh line.
    fn read_line_blocking(&mut self) -> Result<LineBuffer, LinkError> {
        let mut line = LineBuffer::new();

        loop {
            let byte = match self.read_byte() {
                Ok(byte) => byte,
                Err(LinkError::Timeout) if !line.is_empty() => return Ok(line),
                Err(e) => return Err(e),
            };

            if byte == b'\n' {
                return Ok(line);
            }

            if line.push(byte).is_err() {
                // Buffer overflow - discard rest of line until newline
                loop {
                    match self.read_byte() {
                        Ok(b'\n') | Err(LinkError::Timeout) => break,
                        Ok(_) => {}
                        Err(e) => return Err(e),
                    }
                }
                return Err(LinkError::BufferOverflow);
            }
        }
    }
}

impl<P: Read + Write + PendingBytes> CommandLink for SerialLink<P> {
    async fn send(&mut self, command: Command) -> Result<(), LinkError> {
        trace!("Writing command byte {:?}", command.as_byte() as char);
        let written = self
            .port
            .write_all(&[command.as_byte()])
            .and_then(|()| self.port.flush());
        written.map_err(|e| self.fail(&e))
    }

    fn bytes_available(&mut self) -> Result<usize, LinkError> {
        self.port.pending_bytes().map_err(|e| self.fail(&e))
    }

    async fn read_line(&mut self) -> Result<LineBuffer, LinkError> {
        self.read_line_blocking()
    }

    fn is_ready(&self) -> bool {
        self.connected
    }
}

/// Map I/O errors onto link errors.
fn link_error(e: &io::Error) -> LinkError {
    match e.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => LinkError::Timeout,
        io::ErrorKind::BrokenPipe
        | io::ErrorKind::NotConnected
        | io::ErrorKind::NotFound
        | io::ErrorKind::UnexpectedEof => LinkError::Disconnected,
        _ => LinkError::Io,
    }
}
