//! Last known value of every sensor.

use core::fmt;

use crate::command::ControlMode;
use crate::telemetry::{parse_line, SensorKey, TelemetryField, TelemetryParseError, MAX_VALUE_LENGTH};

/// Shown for a sensor that has not reported yet.
pub const PLACEHOLDER: &str = "--";

/// Capacity of a formatted snapshot value (raw value plus unit suffix).
pub const MAX_DISPLAY_LENGTH: usize = MAX_VALUE_LENGTH + 8;

/// Formatted sensor value, e.g. `"25.4 cm"`.
pub type DisplayValue = heapless::String<MAX_DISPLAY_LENGTH>;

const MOTION_ACTIVE: &str = "ACTIVO";
const MOTION_INACTIVE: &str = "INACTIVO";

/// Formatted sensor values, updated field by field from telemetry.
///
/// Fields start as [`PLACEHOLDER`] and are sticky: a telemetry line only
/// overwrites the fields it carries, and nothing resets a field once set.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorSnapshot {
    distance: DisplayValue,
    temperature: DisplayValue,
    humidity: DisplayValue,
    motion: DisplayValue,
    servo: DisplayValue,
}

impl SensorSnapshot {
    /// Create a snapshot with every field unknown.
    #[must_use]
    pub fn new() -> Self {
        Self {
            distance: display(PLACEHOLDER, ""),
            temperature: display(PLACEHOLDER, ""),
            humidity: display(PLACEHOLDER, ""),
            motion: display(PLACEHOLDER, ""),
            servo: display(PLACEHOLDER, ""),
        }
    }

    /// Formatted value of a sensor.
    #[inline]
    #[must_use]
    pub fn get(&self, key: SensorKey) -> &str {
        self.slot(key).as_str()
    }

    /// Whether the sensor has reported at least once.
    #[inline]
    #[must_use]
    pub fn is_known(&self, key: SensorKey) -> bool {
        self.get(key) != PLACEHOLDER
    }

    /// Apply a single decoded field.
    pub fn apply(&mut self, field: &TelemetryField) {
        let key = field.key();
        let value = match field {
            TelemetryField::Distance(v)
            | TelemetryField::Temperature(v)
            | TelemetryField::Humidity(v)
            | TelemetryField::Servo(v) => display(v, key.unit()),
            TelemetryField::Motion(active) => {
                display(if *active { MOTION_ACTIVE } else { MOTION_INACTIVE }, "")
            }
        };
        *self.slot_mut(key) = value;
    }

    /// Decode a raw telemetry line into this snapshot.
    ///
    /// Fields are applied in line order. On error the fields decoded before
    /// the bad token stay applied and the rest of the line is dropped.
    /// Returns the number of fields applied.
    pub fn apply_line(&mut self, line: &[u8]) -> Result<usize, TelemetryParseError> {
        let mut applied = 0;
        for field in parse_line(line)? {
            self.apply(&field?);
            applied += 1;
        }
        Ok(applied)
    }

    /// Values relevant to a control mode, for status display.
    #[must_use]
    pub fn readings(&self, mode: ControlMode) -> ModeReadings<'_> {
        ModeReadings {
            snapshot: self,
            mode,
        }
    }

    fn slot(&self, key: SensorKey) -> &DisplayValue {
        match key {
            SensorKey::Distance => &self.distance,
            SensorKey::Temperature => &self.temperature,
            SensorKey::Humidity => &self.humidity,
            SensorKey::Motion => &self.motion,
            SensorKey::Servo => &self.servo,
        }
    }

    fn slot_mut(&mut self, key: SensorKey) -> &mut DisplayValue {
        match key {
            SensorKey::Distance => &mut self.distance,
            SensorKey::Temperature => &mut self.temperature,
            SensorKey::Humidity => &mut self.humidity,
            SensorKey::Motion => &mut self.motion,
            SensorKey::Servo => &mut self.servo,
        }
    }
}

impl Default for SensorSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// One-line summary of the sensors a mode cares about.
///
/// Renders as `SENSOR: DHT11 temperature=23.5 °C humidity=45.2 %`.
#[derive(Clone, Copy, Debug)]
pub struct ModeReadings<'a> {
    snapshot: &'a SensorSnapshot,
    mode: ControlMode,
}

impl fmt::Display for ModeReadings<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mode.label())?;
        for &key in self.mode.sensor_keys() {
            write!(f, " {}={}", key.name(), self.snapshot.get(key))?;
        }
        Ok(())
    }
}

/// Join a value and unit suffix.
///
/// Raw values are capped at [`MAX_VALUE_LENGTH`] and the longest unit is a
/// few bytes, so this always fits.
fn display(value: &str, unit: &str) -> DisplayValue {
    let mut out = DisplayValue::new();
    let fits = out.push_str(value).is_ok() && out.push_str(unit).is_ok();
    debug_assert!(fits, "snapshot value exceeds display capacity");
    out
}
