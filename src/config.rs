//! Host configuration: built-in defaults, an optional TOML file, then CLI flags.
//!
//! ```toml
//! [serial]
//! port = "/dev/ttyACM0"
//! baud = 9600
//! read_timeout_ms = 1000
//! settle_ms = 2000
//! response_wait_ms = 100
//!
//! [gestures]
//! thumb_rule = "by-handedness"
//!
//! [detector]
//! command = "python3 hand_landmarks.py"
//! min_hand_score = 0.5
//! max_hands = 1
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use gesture_core::{BridgeConfig, ThumbRule, DEFAULT_RESPONSE_WAIT_MS, MAX_HANDS};
use serde::Deserialize;

use crate::error::{HostError, HostResult};
use crate::input::FrameFilter;

pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";
pub const DEFAULT_BAUD: u32 = 9600;
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 1000;
/// Most boards reset when the port opens; give the sketch time to boot.
pub const DEFAULT_SETTLE_MS: u64 = 2000;

/// Gesture-controlled sensor station: finger count in, command byte out
#[derive(Parser, Debug, Default)]
#[command(name = "gesture-to-uart", version, long_about = None)]
pub struct Args {
    /// TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Serial port of the microcontroller [default: /dev/ttyUSB0]
    #[arg(short, long)]
    pub port: Option<String>,

    /// Baud rate [default: 9600]
    #[arg(short, long)]
    pub baud: Option<u32>,

    /// Serial read timeout in milliseconds [default: 1000]
    #[arg(long)]
    pub read_timeout_ms: Option<u64>,

    /// Wait after opening the port, in milliseconds [default: 2000]
    #[arg(long)]
    pub settle_ms: Option<u64>,

    /// Wait for a reply after each command, in milliseconds [default: 100]
    #[arg(long)]
    pub response_wait_ms: Option<u32>,

    /// How the thumb is judged [default: right-of-joint]
    #[arg(long, value_enum)]
    pub thumb_rule: Option<ThumbRuleArg>,

    /// Drop hands detected below this score (0.0 - 1.0) [default: 0.5]
    #[arg(long)]
    pub min_hand_score: Option<f32>,

    /// Hands kept per frame (1 - 2) [default: 1]
    #[arg(long)]
    pub max_hands: Option<usize>,

    /// Landmark detector command line; landmarks are read from stdin if absent
    #[arg(short, long)]
    pub detector: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// Thumb rule as spelled on the command line and in config files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThumbRuleArg {
    /// Extended when the tip is right of the IP joint
    #[default]
    RightOfJoint,
    /// Extended when the tip is left of the IP joint
    LeftOfJoint,
    /// Pick the direction from the reported handedness
    ByHandedness,
}

impl From<ThumbRuleArg> for ThumbRule {
    fn from(arg: ThumbRuleArg) -> Self {
        match arg {
            ThumbRuleArg::RightOfJoint => ThumbRule::TipRightOfJoint,
            ThumbRuleArg::LeftOfJoint => ThumbRule::TipLeftOfJoint,
            ThumbRuleArg::ByHandedness => ThumbRule::ByHandedness,
        }
    }
}

/// Contents of the TOML config file. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub serial: SerialSection,
    pub gestures: GestureSection,
    pub detector: DetectorSection,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SerialSection {
    pub port: Option<String>,
    pub baud: Option<u32>,
    pub read_timeout_ms: Option<u64>,
    pub settle_ms: Option<u64>,
    pub response_wait_ms: Option<u32>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GestureSection {
    pub thumb_rule: Option<ThumbRuleArg>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DetectorSection {
    pub command: Option<String>,
    pub min_hand_score: Option<f32>,
    pub max_hands: Option<usize>,
}

impl FileConfig {
    /// Load and parse a config file.
    pub fn load(path: &Path) -> HostResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| HostError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| HostError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    pub port: String,
    pub baud: u32,
    pub read_timeout: Duration,
    pub settle: Duration,
    pub bridge: BridgeConfig,
    pub filter: FrameFilter,
    /// Detector command line; `None` reads landmarks from stdin.
    pub detector: Option<String>,
    pub verbose: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud: DEFAULT_BAUD,
            read_timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
            settle: Duration::from_millis(DEFAULT_SETTLE_MS),
            bridge: BridgeConfig::default(),
            filter: FrameFilter::default(),
            detector: None,
            verbose: false,
        }
    }
}

impl HostConfig {
    /// Load the config file named by `args` (if any) and apply CLI overrides.
    pub fn load(args: &Args) -> HostResult<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(file, args)
    }

    /// Merge defaults, file values and CLI flags, in increasing precedence.
    pub fn resolve(file: FileConfig, args: &Args) -> HostResult<Self> {
        let defaults = Self::default();
        let FileConfig {
            serial,
            gestures,
            detector,
        } = file;

        let thumb_rule = args
            .thumb_rule
            .or(gestures.thumb_rule)
            .map_or(defaults.bridge.thumb_rule, ThumbRule::from);
        let read_timeout_ms = args
            .read_timeout_ms
            .or(serial.read_timeout_ms)
            .unwrap_or(DEFAULT_READ_TIMEOUT_MS);
        let settle_ms = args.settle_ms.or(serial.settle_ms).unwrap_or(DEFAULT_SETTLE_MS);

        let config = Self {
            port: args.port.clone().or(serial.port).unwrap_or(defaults.port),
            baud: args.baud.or(serial.baud).unwrap_or(defaults.baud),
            read_timeout: Duration::from_millis(read_timeout_ms),
            settle: Duration::from_millis(settle_ms),
            bridge: BridgeConfig {
                thumb_rule,
                response_wait_ms: args
                    .response_wait_ms
                    .or(serial.response_wait_ms)
                    .unwrap_or(DEFAULT_RESPONSE_WAIT_MS),
            },
            filter: FrameFilter {
                min_score: args
                    .min_hand_score
                    .or(detector.min_hand_score)
                    .unwrap_or(defaults.filter.min_score),
                max_hands: args
                    .max_hands
                    .or(detector.max_hands)
                    .unwrap_or(defaults.filter.max_hands),
            },
            detector: args.detector.clone().or(detector.command),
            verbose: args.verbose,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> HostResult<()> {
        if self.port.trim().is_empty() {
            return Err(HostError::InvalidConfig("serial port name is empty".into()));
        }
        if self.baud == 0 {
            return Err(HostError::InvalidConfig("baud rate must be positive".into()));
        }
        if self.read_timeout.is_zero() {
            return Err(HostError::InvalidConfig("read timeout must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.filter.min_score) {
            return Err(HostError::InvalidConfig(format!(
                "min_hand_score must be within 0.0..=1.0, got {}",
                self.filter.min_score
            )));
        }
        if !(1..=MAX_HANDS).contains(&self.filter.max_hands) {
            return Err(HostError::InvalidConfig(format!(
                "max_hands must be within 1..={}, got {}",
                MAX_HANDS, self.filter.max_hands
            )));
        }
        if let Some(command) = &self.detector {
            if command.trim().is_empty() {
                return Err(HostError::InvalidConfig("detector command is empty".into()));
            }
        }
        Ok(())
    }
}
