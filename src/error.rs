use std::path::PathBuf;

use gesture_core::BridgeError;
use thiserror::Error;

/// Errors that stop the host application.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("failed to open serial port {port}: {source}")]
    TransportOpen {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to start detector `{command}`: {source}")]
    DetectorSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("gesture bridge stopped: {0}")]
    Bridge(BridgeError),
}

impl From<BridgeError> for HostError {
    fn from(e: BridgeError) -> Self {
        Self::Bridge(e)
    }
}

pub type HostResult<T> = Result<T, HostError>;
