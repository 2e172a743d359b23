use std::io::BufReader;
use std::process::{Child, ChildStdout, Command, Stdio};

use log::{debug, info, warn};

use crate::error::{HostError, HostResult};
use crate::input::json::{FrameFilter, JsonLandmarkSource};

/// Landmark source fed by a detector subprocess.
pub type DetectorSource = JsonLandmarkSource<BufReader<ChildStdout>>;

/// A running landmark detector (camera plus pose model) subprocess.
///
/// The detector writes one JSON frame per line to stdout. The process is
/// killed and reaped on [`Detector::shutdown`] or when dropped.
pub struct Detector {
    child: Option<Child>,
    command: String,
}

impl Detector {
    /// Start the detector and return it with a source over its output.
    ///
    /// `command_line` is split on whitespace; no shell quoting is applied.
    pub fn spawn(command_line: &str, filter: FrameFilter) -> HostResult<(Self, DetectorSource)> {
        let mut parts = command_line.split_whitespace();
        let program = parts.next().ok_or_else(|| {
            HostError::InvalidConfig("detector command is empty".into())
        })?;

        info!("Starting landmark detector: {}", command_line);

        let spawn_error = |source| HostError::DetectorSpawn {
            command: command_line.to_string(),
            source,
        };

        let mut child = Command::new(program)
            .args(parts)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(spawn_error)?;

        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(spawn_error(std::io::Error::other("detector stdout unavailable")));
        };

        let detector = Self {
            child: Some(child),
            command: command_line.to_string(),
        };
        let source = JsonLandmarkSource::with_filter(BufReader::new(stdout), filter);
        Ok((detector, source))
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Stop the detector and wait for it to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };

        match child.try_wait() {
            Ok(Some(status)) => debug!("Detector already exited: {}", status),
            _ => {
                if let Err(e) = child.kill() {
                    warn!("Failed to stop detector: {}", e);
                }
                match child.wait() {
                    Ok(status) => debug!("Detector exited: {}", status),
                    Err(e) => warn!("Failed to reap detector: {}", e),
                }
            }
        }
    }
}

impl Drop for Detector {
    fn drop(&mut self) {
        self.stop();
    }
}
