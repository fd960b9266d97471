//! Package-family pin identifiers.
//!
//! Each package family addresses its pins differently. [`Pin`] is the common
//! currency that flows through allocation and into lock files; every family
//! serializes to a distinct JSON shape so a lock file stays readable:
//!
//! | Family     | Variant          | JSON             |
//! |------------|------------------|------------------|
//! | Quad       | `Numbered`       | `12`             |
//! | Grid-array | `Grid`           | `"B7"`           |
//! | Bare-die   | `Die`            | `["N", 3]`       |
//! | Carrier    | `Carrier`        | `{"pin": 22, "kind": "gpio", "index": 38}` |

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A physical pin or pad of a package.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Pin {
    /// A pin numbered around a perimeter, starting at 1.
    Numbered(u32),
    /// A (row, column) position in a grid array.
    Grid(GridPin),
    /// A pad on one side of a bare die, offset from that side's first pad.
    Die(Side, u32),
    /// A pin of a fixed carrier described by a literal table.
    Carrier(CarrierPin),
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pin::Numbered(n) => write!(f, "{n}"),
            Pin::Grid(g) => write!(f, "{g}"),
            Pin::Die(side, offset) => write!(f, "{side}{offset}"),
            Pin::Carrier(c) => write!(f, "{c}"),
        }
    }
}

/// One side of a bare die, ordered N, E, S, W.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    /// North (top edge).
    N,
    /// East (right edge).
    E,
    /// South (bottom edge).
    S,
    /// West (left edge).
    W,
}

impl Side {
    /// All sides in canonical order.
    pub const ALL: [Side; 4] = [Side::N, Side::E, Side::S, Side::W];

    fn from_char(c: char) -> Option<Side> {
        match c.to_ascii_uppercase() {
            'N' => Some(Side::N),
            'E' => Some(Side::E),
            'S' => Some(Side::S),
            'W' => Some(Side::W),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Side::N => "N",
            Side::E => "E",
            Side::S => "S",
            Side::W => "W",
        };
        f.write_str(c)
    }
}

/// Row letters used by grid arrays. I, N, O, Q and Z are skipped because they
/// are easily confused with digits or each other.
const ROW_LETTERS: &[u8] = b"ABCDEFGHJKLMPRSTUVWXY";

/// A grid-array position: a 1-based row (written as letters) and 1-based column.
///
/// Rows past `Y` continue as `AA`, `AB`, ... using the same reduced alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridPin {
    /// 1-based row index.
    pub row: u32,
    /// 1-based column index.
    pub col: u32,
}

impl GridPin {
    /// Creates a grid pin from 1-based row and column indices.
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Returns the row letters for this pin (e.g. `"A"`, `"AB"`).
    pub fn row_letters(&self) -> String {
        row_to_letters(self.row)
    }
}

/// Converts a 1-based row index to its letter form.
pub fn row_to_letters(row: u32) -> String {
    let base = ROW_LETTERS.len() as u32;
    let mut n = row;
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(ROW_LETTERS[(n % base) as usize]);
        n /= base;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

fn letters_to_row(letters: &str) -> Option<u32> {
    let base = ROW_LETTERS.len() as u32;
    let mut row: u32 = 0;
    for c in letters.bytes() {
        let idx = ROW_LETTERS
            .iter()
            .position(|&l| l == c.to_ascii_uppercase())?;
        row = row.checked_mul(base)?.checked_add(idx as u32 + 1)?;
    }
    (row > 0).then_some(row)
}

impl fmt::Display for GridPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row_letters(), self.col)
    }
}

/// Error type for parsing pin location strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid pin location: '{input}'")]
pub struct ParsePinError {
    /// The input string that failed to parse.
    pub input: String,
}

impl FromStr for GridPin {
    type Err = ParsePinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParsePinError {
            input: s.to_string(),
        };
        let split = s.find(|c: char| c.is_ascii_digit()).ok_or_else(err)?;
        let (letters, digits) = s.split_at(split);
        let row = letters_to_row(letters).ok_or_else(err)?;
        let col: u32 = digits.parse().map_err(|_| err())?;
        if col == 0 {
            return Err(err());
        }
        Ok(GridPin { row, col })
    }
}

impl Serialize for GridPin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GridPin {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GridPinVisitor;

        impl Visitor<'_> for GridPinVisitor {
            type Value = GridPin;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a grid pin such as \"A12\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(GridPinVisitor)
    }
}

/// Parses a bare-die pad location such as `"N3"` or `"e12"`.
pub fn parse_die_pin(s: &str) -> Result<Pin, ParsePinError> {
    let s = s.trim();
    let err = || ParsePinError {
        input: s.to_string(),
    };
    let mut chars = s.chars();
    let side = chars.next().and_then(Side::from_char).ok_or_else(err)?;
    let offset: u32 = chars.as_str().trim().parse().map_err(|_| err())?;
    Ok(Pin::Die(side, offset))
}

/// What a carrier pin is wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarrierKind {
    /// General-purpose I/O.
    Gpio,
    /// Core supply.
    Vcc,
    /// Ground.
    Vss,
}

impl fmt::Display for CarrierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CarrierKind::Gpio => "gpio",
            CarrierKind::Vcc => "vcc",
            CarrierKind::Vss => "vss",
        };
        f.write_str(s)
    }
}

/// A pin of a fixed carrier board: the physical pin number plus the signal it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CarrierPin {
    /// Physical pin number on the carrier.
    pub pin: u32,
    /// What the pin is wired to.
    pub kind: CarrierKind,
    /// Index within its kind (e.g. `gpio[38]`).
    pub index: u32,
}

impl CarrierPin {
    /// Creates a carrier pin.
    pub const fn new(pin: u32, kind: CarrierKind, index: u32) -> Self {
        Self { pin, kind, index }
    }
}

impl fmt::Display for CarrierPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}[{}])", self.pin, self.kind, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_letters_skip_confusable() {
        assert_eq!(row_to_letters(1), "A");
        assert_eq!(row_to_letters(8), "H");
        assert_eq!(row_to_letters(9), "J");
        assert_eq!(row_to_letters(21), "Y");
        assert_eq!(row_to_letters(22), "AA");
        assert_eq!(row_to_letters(36), "AS");
    }

    #[test]
    fn row_letters_roundtrip() {
        for row in 1..=500 {
            assert_eq!(letters_to_row(&row_to_letters(row)), Some(row));
        }
    }

    #[test]
    fn parse_grid_pin() {
        let pin: GridPin = "B12".parse().unwrap();
        assert_eq!(pin, GridPin::new(2, 12));
        let pin: GridPin = "aa3".parse().unwrap();
        assert_eq!(pin, GridPin::new(22, 3));
        assert!("I3".parse::<GridPin>().is_err());
        assert!("12".parse::<GridPin>().is_err());
        assert!("A0".parse::<GridPin>().is_err());
    }

    #[test]
    fn grid_rows_order_numerically() {
        // Row 22 ("AA") sorts after row 21 ("Y"), unlike a string comparison.
        assert!(GridPin::new(21, 1) < GridPin::new(22, 1));
        assert!(GridPin::new(1, 9) < GridPin::new(1, 10));
    }

    #[test]
    fn parse_die_pins() {
        assert_eq!(parse_die_pin("N3").unwrap(), Pin::Die(Side::N, 3));
        assert_eq!(parse_die_pin("w 0").unwrap(), Pin::Die(Side::W, 0));
        assert!(parse_die_pin("X1").is_err());
        assert!(parse_die_pin("N").is_err());
    }

    #[test]
    fn json_shapes_per_family() {
        let pins = vec![
            Pin::Numbered(12),
            Pin::Grid(GridPin::new(2, 7)),
            Pin::Die(Side::N, 3),
            Pin::Carrier(CarrierPin::new(22, CarrierKind::Gpio, 38)),
        ];
        let json = serde_json::to_string(&pins).unwrap();
        assert_eq!(
            json,
            r#"[12,"B7",["N",3],{"pin":22,"kind":"gpio","index":38}]"#
        );
        let back: Vec<Pin> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pins);
    }

    #[test]
    fn display() {
        assert_eq!(Pin::Numbered(5).to_string(), "5");
        assert_eq!(Pin::Grid(GridPin::new(1, 8)).to_string(), "A8");
        assert_eq!(Pin::Die(Side::E, 2).to_string(), "E2");
        assert_eq!(
            Pin::Carrier(CarrierPin::new(22, CarrierKind::Gpio, 38)).to_string(),
            "22 (gpio[38])"
        );
    }

    #[test]
    fn carrier_kinds_are_gpio_or_supply() {
        for (kind, json) in [
            (CarrierKind::Gpio, "\"gpio\""),
            (CarrierKind::Vcc, "\"vcc\""),
            (CarrierKind::Vss, "\"vss\""),
        ] {
            assert_eq!(serde_json::to_string(&kind).unwrap(), json);
            assert_eq!(kind.to_string(), json.trim_matches('"'));
        }
        assert!(serde_json::from_str::<CarrierKind>("\"nc\"").is_err());
    }
}
