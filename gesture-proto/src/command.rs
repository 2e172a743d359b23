//! Command byte sent from the host to the microcontroller.

use core::fmt;

use crate::telemetry::SensorKey;

/// A control command: the number of extended fingers, `0..=5`.
///
/// On the wire a command is exactly one ASCII digit with no terminator;
/// the microcontroller treats every received byte as a complete command.
///
/// # Example
///
/// ```
/// use gesture_proto::{Command, ControlMode};
///
/// let cmd = Command::new(2).unwrap();
/// assert_eq!(cmd.as_byte(), b'2');
/// assert_eq!(cmd.mode(), ControlMode::Climate);
/// assert!(Command::new(6).is_none());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command(u8);

impl Command {
    /// Largest command value (all five fingers extended).
    pub const MAX: u8 = 5;

    /// All motors and sensors off.
    pub const OFF: Self = Self(0);

    /// Create a command from its numeric value.
    #[inline]
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value <= Self::MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Numeric value of the command.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// The ASCII digit transmitted for this command.
    #[inline]
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        b'0' + self.0
    }

    /// Mode the microcontroller switches to on receiving this command.
    #[must_use]
    pub const fn mode(self) -> ControlMode {
        match self.0 {
            1 => ControlMode::Ultrasonic,
            2 => ControlMode::Climate,
            3 => ControlMode::Motion,
            4 => ControlMode::Servo,
            5 => ControlMode::Buzzer,
            _ => ControlMode::AllOff,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Microcontroller behaviour selected by each command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlMode {
    /// 0 fingers: everything off.
    AllOff,
    /// 1 finger: ultrasonic distance sensor.
    Ultrasonic,
    /// 2 fingers: DHT11 temperature and humidity sensor.
    Climate,
    /// 3 fingers: PIR motion sensor.
    Motion,
    /// 4 fingers: servo actuator.
    Servo,
    /// 5 fingers: buzzer actuator.
    Buzzer,
}

impl ControlMode {
    /// Every mode, ordered by command value.
    pub const ALL: [Self; 6] = [
        Self::AllOff,
        Self::Ultrasonic,
        Self::Climate,
        Self::Motion,
        Self::Servo,
        Self::Buzzer,
    ];

    /// Command that selects this mode.
    #[must_use]
    pub const fn command(self) -> Command {
        match self {
            Self::AllOff => Command(0),
            Self::Ultrasonic => Command(1),
            Self::Climate => Command(2),
            Self::Motion => Command(3),
            Self::Servo => Command(4),
            Self::Buzzer => Command(5),
        }
    }

    /// Short device label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AllOff => "ALL OFF",
            Self::Ultrasonic => "SENSOR: ULTRASONIC",
            Self::Climate => "SENSOR: DHT11",
            Self::Motion => "SENSOR: PIR",
            Self::Servo => "ACTUATOR: SERVO",
            Self::Buzzer => "ACTUATOR: BUZZER",
        }
    }

    /// Snapshot fields reported while this mode is active.
    #[must_use]
    pub const fn sensor_keys(self) -> &'static [SensorKey] {
        match self {
            Self::AllOff | Self::Buzzer => &[],
            Self::Ultrasonic => &[SensorKey::Distance],
            Self::Climate => &[SensorKey::Temperature, SensorKey::Humidity],
            Self::Motion => &[SensorKey::Motion],
            Self::Servo => &[SensorKey::Servo],
        }
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
