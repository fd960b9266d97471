//! Port directions as seen from the design.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a port, serialized as `"i"`, `"o"` or `"io"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Signal flows into the design.
    #[serde(rename = "i")]
    Input,
    /// Signal flows out of the design.
    #[serde(rename = "o")]
    Output,
    /// Bidirectional signal with an output enable.
    #[serde(rename = "io")]
    Bidir,
}

impl Direction {
    /// Returns the short form used in interface metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Input => "i",
            Direction::Output => "o",
            Direction::Bidir => "io",
        }
    }

    /// Returns `true` if the design can drive this port.
    pub fn is_output(&self) -> bool {
        matches!(self, Direction::Output | Direction::Bidir)
    }

    /// Returns `true` if the design can sample this port.
    pub fn is_input(&self) -> bool {
        matches!(self, Direction::Input | Direction::Bidir)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_short_form() {
        assert_eq!(serde_json::to_string(&Direction::Input).unwrap(), "\"i\"");
        assert_eq!(serde_json::to_string(&Direction::Output).unwrap(), "\"o\"");
        assert_eq!(serde_json::to_string(&Direction::Bidir).unwrap(), "\"io\"");
        let d: Direction = serde_json::from_str("\"io\"").unwrap();
        assert_eq!(d, Direction::Bidir);
    }

    #[test]
    fn input_output_predicates() {
        assert!(Direction::Input.is_input());
        assert!(!Direction::Input.is_output());
        assert!(Direction::Bidir.is_input() && Direction::Bidir.is_output());
    }

    #[test]
    fn rejects_unknown() {
        assert!(serde_json::from_str::<Direction>("\"x\"").is_err());
    }
}
