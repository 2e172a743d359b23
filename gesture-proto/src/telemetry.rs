//! Telemetry line parser.
//!
//! The microcontroller answers a command with one line of comma-separated
//! `KEY:VALUE` tokens:
//!
//! ```text
//! D:25.4,T:23.5,H:45.2,P:1,S:90\n
//! ```
//!
//! Parsing is lenient: tokens with unknown keys are skipped, and a bad token
//! only stops the rest of its own line. Values are kept as the raw text the
//! microcontroller sent.

use core::fmt;
use core::str::Split;

/// Maximum telemetry line length in bytes (excluding the newline).
pub const MAX_LINE_LENGTH: usize = 64;

/// Maximum length of a single raw value.
///
/// A value can take up a whole line, so any value read off the serial link
/// fits.
pub const MAX_VALUE_LENGTH: usize = MAX_LINE_LENGTH;

/// Raw value text of a telemetry token.
pub type RawValue = heapless::String<MAX_VALUE_LENGTH>;

/// Sensors reported in telemetry lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorKey {
    /// `D`: ultrasonic distance.
    Distance,
    /// `T`: temperature.
    Temperature,
    /// `H`: relative humidity.
    Humidity,
    /// `P`: PIR motion flag.
    Motion,
    /// `S`: servo angle.
    Servo,
}

impl SensorKey {
    /// Keys in the order tokens are matched against them.
    pub const PRIORITY: [Self; 5] = [
        Self::Distance,
        Self::Temperature,
        Self::Humidity,
        Self::Motion,
        Self::Servo,
    ];

    /// Single-letter tag used on the wire.
    #[inline]
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Distance => b'D',
            Self::Temperature => b'T',
            Self::Humidity => b'H',
            Self::Motion => b'P',
            Self::Servo => b'S',
        }
    }

    /// Unit suffix appended to the raw value in the snapshot.
    #[inline]
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Distance => " cm",
            Self::Temperature => " °C",
            Self::Humidity => " %",
            Self::Motion => "",
            Self::Servo => " °",
        }
    }

    /// Human-readable sensor name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Motion => "motion",
            Self::Servo => "servo",
        }
    }
}

/// A single decoded telemetry token.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TelemetryField {
    /// Distance reading (`D` token)
    Distance(RawValue),
    /// Temperature reading (`T` token)
    Temperature(RawValue),
    /// Humidity reading (`H` token)
    Humidity(RawValue),
    /// Motion detected (`P` token, `1` means active)
    Motion(bool),
    /// Servo angle (`S` token)
    Servo(RawValue),
}

impl TelemetryField {
    /// Sensor this field updates.
    #[must_use]
    pub const fn key(&self) -> SensorKey {
        match self {
            Self::Distance(_) => SensorKey::Distance,
            Self::Temperature(_) => SensorKey::Temperature,
            Self::Humidity(_) => SensorKey::Humidity,
            Self::Motion(_) => SensorKey::Motion,
            Self::Servo(_) => SensorKey::Servo,
        }
    }
}

/// Reasons a telemetry line (or the rest of it) is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TelemetryParseError {
    /// The line has no `:` at all.
    NoSeparator,
    /// The line is not valid UTF-8.
    Encoding,
    /// A recognised token has nothing after its colon.
    MissingValue,
    /// A value does not fit in [`MAX_VALUE_LENGTH`] bytes.
    ValueTooLong,
}

impl fmt::Display for TelemetryParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSeparator => write!(f, "no key/value separator"),
            Self::Encoding => write!(f, "invalid utf-8"),
            Self::MissingValue => write!(f, "token without value"),
            Self::ValueTooLong => write!(f, "value too long"),
        }
    }
}

/// Gate a raw line and return an iterator over its fields.
///
/// Trailing CR/LF and surrounding whitespace are ignored. A line without any
/// colon is rejected as a whole.
///
/// # Example
///
/// ```
/// use gesture_proto::{parse_line, TelemetryField};
///
/// let mut fields = parse_line(b"P:1,X:7\r\n").unwrap();
/// assert_eq!(fields.next(), Some(Ok(TelemetryField::Motion(true))));
/// assert_eq!(fields.next(), None);
/// ```
pub fn parse_line(line: &[u8]) -> Result<TelemetryFields<'_>, TelemetryParseError> {
    let line = core::str::from_utf8(line)
        .map_err(|_| TelemetryParseError::Encoding)?
        .trim();

    if !line.contains(':') {
        return Err(TelemetryParseError::NoSeparator);
    }

    Ok(TelemetryFields {
        tokens: line.split(','),
        failed: false,
    })
}

/// Iterator over the recognised fields of one telemetry line.
///
/// Unknown tokens are skipped. After the first error the iterator is
/// exhausted.
#[derive(Debug, Clone)]
pub struct TelemetryFields<'a> {
    tokens: Split<'a, char>,
    failed: bool,
}

impl Iterator for TelemetryFields<'_> {
    type Item = Result<TelemetryField, TelemetryParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        for token in self.tokens.by_ref() {
            match parse_token(token) {
                Ok(Some(field)) => return Some(Ok(field)),
                Ok(None) => {}
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }

        None
    }
}

/// Decode one token, or `Ok(None)` if it names no known sensor.
fn parse_token(token: &str) -> Result<Option<TelemetryField>, TelemetryParseError> {
    let Some(key) = match_key(token) else {
        return Ok(None);
    };

    // A matched token always contains a colon, so the second part exists.
    let value = token.split(':').nth(1).unwrap_or_default();
    if value.is_empty() {
        return Err(TelemetryParseError::MissingValue);
    }

    Ok(Some(match key {
        SensorKey::Distance => TelemetryField::Distance(raw_value(value)?),
        SensorKey::Temperature => TelemetryField::Temperature(raw_value(value)?),
        SensorKey::Humidity => TelemetryField::Humidity(raw_value(value)?),
        SensorKey::Motion => TelemetryField::Motion(value == "1"),
        SensorKey::Servo => TelemetryField::Servo(raw_value(value)?),
    }))
}

/// First key, in priority order, whose `<tag>:` appears in the token.
#[inline]
fn match_key(token: &str) -> Option<SensorKey> {
    SensorKey::PRIORITY
        .into_iter()
        .find(|key| contains_tag(token.as_bytes(), key.tag()))
}

#[inline]
fn contains_tag(token: &[u8], tag: u8) -> bool {
    token.windows(2).any(|pair| pair[0] == tag && pair[1] == b':')
}

#[inline]
fn raw_value(value: &str) -> Result<RawValue, TelemetryParseError> {
    let mut raw = RawValue::new();
    raw.push_str(value)
        .map_err(|_| TelemetryParseError::ValueTooLong)?;
    Ok(raw)
}
