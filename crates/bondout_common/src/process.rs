//! Fabrication processes a design can be locked against.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An IC manufacturing process.
///
/// Serialized in lowercase snake case (`"sky130"`, `"ihp_sg13g2"`) in both
/// `bondout.toml` and lock files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Process {
    /// SkyWater open-source 130nm process.
    Sky130,
    /// GlobalFoundries open-source 180nm process.
    Gf180,
    /// Pragmatic Semiconductor FlexIC process.
    Helvellyn2,
    /// GlobalFoundries 130nm BCD process.
    Gf130bcd,
    /// IHP open-source 130nm SiGe BiCMOS process.
    IhpSg13g2,
}

impl Process {
    /// All supported processes, in declaration order.
    pub const ALL: [Process; 5] = [
        Process::Sky130,
        Process::Gf180,
        Process::Helvellyn2,
        Process::Gf130bcd,
        Process::IhpSg13g2,
    ];

    /// Returns the canonical identifier used in configuration and lock files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Process::Sky130 => "sky130",
            Process::Gf180 => "gf180",
            Process::Helvellyn2 => "helvellyn2",
            Process::Gf130bcd => "gf130bcd",
            Process::IhpSg13g2 => "ihp_sg13g2",
        }
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for parsing process names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown process '{input}' (supported: sky130, gf180, helvellyn2, gf130bcd, ihp_sg13g2)")]
pub struct ParseProcessError {
    /// The input string that failed to parse.
    pub input: String,
}

impl FromStr for Process {
    type Err = ParseProcessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Process::ALL
            .into_iter()
            .find(|p| p.as_str() == lower)
            .ok_or_else(|| ParseProcessError {
                input: s.to_string(),
            })
    }
}
