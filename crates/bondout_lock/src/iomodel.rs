//! Per-port I/O attributes carried through the lock file.

use bondout_common::Direction;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the interface-side power domain a port supports when it declares none.
pub const DEFAULT_POWER_DOMAIN: &str = "default";

/// Polarity inversion for a whole port or for each of its wires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Invert {
    /// One flag for the whole port.
    All(bool),
    /// One flag per wire.
    PerWire(Vec<bool>),
}

/// Attributes of an I/O port.
///
/// Only `width` and `direction` are interpreted by the allocator. Everything
/// else is carried verbatim, including keys this type does not know about,
/// so a reused port serializes byte-for-byte as it was read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IOModel {
    /// Number of wires.
    pub width: usize,
    /// Direction as seen from the design.
    pub direction: Direction,
    /// Polarity inversion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invert: Option<Invert>,
    /// Whether each output wire has its own output enable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub individual_oe: Option<bool>,
    /// Clock domain the port is synchronous to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock_domain: Option<String>,
    /// Input buffer trip point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_point: Option<String>,
    /// Initial output value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<Value>,
    /// Initial output-enable value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_oe: Option<Value>,
    /// Interface-side power domains the port can be supplied from.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub power_domains: Vec<String>,
    /// Options not modelled above.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl IOModel {
    /// A model with only width and direction set.
    pub fn new(width: usize, direction: Direction) -> Self {
        Self {
            width,
            direction,
            invert: None,
            individual_oe: None,
            clock_domain: None,
            trip_point: None,
            init: None,
            init_oe: None,
            power_domains: Vec::new(),
            extra: IndexMap::new(),
        }
    }

    /// The interface-side power domains of this port; `["default"]` when none are declared.
    pub fn domains(&self) -> Vec<&str> {
        if self.power_domains.is_empty() {
            vec![DEFAULT_POWER_DOMAIN]
        } else {
            self.power_domains.iter().map(String::as_str).collect()
        }
    }

    /// Per-wire inversion flags, expanded from a whole-port flag if needed.
    pub fn inverted_wires(&self) -> Vec<bool> {
        match &self.invert {
            None => vec![false; self.width],
            Some(Invert::All(flag)) => vec![*flag; self.width],
            Some(Invert::PerWire(flags)) => flags.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimal_model_serializes_compactly() {
        let model = IOModel::new(2, Direction::Output);
        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(json, r#"{"width":2,"direction":"o"}"#);
    }

    #[test]
    fn unknown_options_survive_roundtrip() {
        let value = json!({
            "width": 1,
            "direction": "io",
            "invert": [true],
            "clock_domain": "sync",
            "sky130_drive_mode": "strong_up_weak_down",
            "buffer_in": true
        });
        let model: IOModel = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(model.extra.len(), 2);
        assert_eq!(model.invert, Some(Invert::PerWire(vec![true])));
        assert_eq!(serde_json::to_value(&model).unwrap(), value);
    }

    #[test]
    fn whole_port_invert_expands() {
        let mut model = IOModel::new(3, Direction::Input);
        assert_eq!(model.inverted_wires(), vec![false; 3]);
        model.invert = Some(Invert::All(true));
        assert_eq!(model.inverted_wires(), vec![true; 3]);
    }

    #[test]
    fn default_power_domain() {
        let mut model = IOModel::new(1, Direction::Bidir);
        assert_eq!(model.domains(), vec!["default"]);
        model.power_domains = vec!["a".to_string(), "b".to_string()];
        assert_eq!(model.domains(), vec!["a", "b"]);
    }
}
