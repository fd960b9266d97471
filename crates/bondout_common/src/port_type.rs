//! The role a port plays on the package.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a port carries, as recorded in lock files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortType {
    /// General-purpose signal I/O.
    #[default]
    Io,
    /// Clock input.
    Clock,
    /// Reset input.
    Reset,
    /// Supply or ground.
    Power,
    /// Liveness output toggled by the core.
    Heartbeat,
}

impl PortType {
    /// Returns the lowercase name used in configuration and lock files.
    pub fn as_str(&self) -> &'static str {
        match self {
            PortType::Io => "io",
            PortType::Clock => "clock",
            PortType::Reset => "reset",
            PortType::Power => "power",
            PortType::Heartbeat => "heartbeat",
        }
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_lowercase() {
        assert_eq!(serde_json::to_string(&PortType::Heartbeat).unwrap(), "\"heartbeat\"");
        let t: PortType = serde_json::from_str("\"power\"").unwrap();
        assert_eq!(t, PortType::Power);
        assert_eq!(t.to_string(), "power");
    }
}
