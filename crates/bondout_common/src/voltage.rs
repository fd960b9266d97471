//! Supply voltages with unit parsing and display.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A supply voltage stored in volts.
///
/// Parses from strings like "3.3V", "1.8 v", "1800mV" and bare numbers
/// (interpreted as volts). Serializes as a string with a `V` suffix so that
/// lock files and config files read the same way.
#[derive(Clone, Copy, PartialEq, PartialOrd)]
pub struct Voltage(f64);

impl Voltage {
    /// Creates a new voltage from a value in volts.
    pub fn new(volts: f64) -> Self {
        Self(volts)
    }

    /// Returns the voltage in volts.
    pub fn volts(&self) -> f64 {
        self.0
    }

    /// Returns the voltage in millivolts.
    pub fn millivolts(&self) -> f64 {
        self.0 * 1_000.0
    }
}

impl fmt::Debug for Voltage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Voltage({self})")
    }
}

impl fmt::Display for Voltage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}V", self.0)
    }
}

/// Error type for parsing voltage strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid voltage: '{input}'")]
pub struct ParseVoltageError {
    /// The input string that failed to parse.
    pub input: String,
}

impl FromStr for Voltage {
    type Err = ParseVoltageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseVoltageError {
            input: s.to_string(),
        };

        let lower = s.to_ascii_lowercase();
        if let Some(num) = lower.strip_suffix("mv") {
            let val: f64 = num.trim().parse().map_err(|_| err())?;
            return Ok(Voltage(val / 1_000.0));
        }
        if let Some(num) = lower.strip_suffix('v') {
            let val: f64 = num.trim().parse().map_err(|_| err())?;
            return Ok(Voltage(val));
        }

        let val: f64 = s.parse().map_err(|_| err())?;
        Ok(Voltage(val))
    }
}

impl Serialize for Voltage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Voltage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VoltageVisitor;

        impl Visitor<'_> for VoltageVisitor {
            type Value = Voltage;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a voltage such as \"3.3V\" or a number of volts")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(Voltage(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(Voltage(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(Voltage(v as f64))
            }
        }

        deserializer.deserialize_any(VoltageVisitor)
    }
}

/// A voltage range for a power domain or pad.
///
/// All bounds are optional; absent bounds are omitted when serialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VoltageRange {
    /// Lowest permitted voltage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Voltage>,
    /// Highest permitted voltage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Voltage>,
    /// Nominal operating voltage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typical: Option<Voltage>,
}

impl VoltageRange {
    /// A range pinned to a single nominal voltage.
    pub fn fixed(voltage: Voltage) -> Self {
        Self {
            min: None,
            max: None,
            typical: Some(voltage),
        }
    }

    /// Returns `true` if `voltage` lies within the populated bounds.
    pub fn contains(&self, voltage: Voltage) -> bool {
        let above_min = self.min.map_or(true, |min| voltage >= min);
        let below_max = self.max.map_or(true, |max| voltage <= max);
        above_min && below_max
    }
}
