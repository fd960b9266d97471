//! Fixed pin groupings needed to power on and debug a die.

use crate::pin::Pin;
use bondout_common::Voltage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A matched supply/ground pin pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerPins {
    /// The supply (VDD) pin.
    pub power: Pin,
    /// The ground (VSS) pin.
    pub ground: Pin,
    /// Nominal supply voltage, if the package fixes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<Voltage>,
    /// Power group name; unnamed pairs belong to the main core supply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl PowerPins {
    /// An unnamed core supply pair.
    pub fn new(power: Pin, ground: Pin) -> Self {
        Self {
            power,
            ground,
            voltage: None,
            name: None,
        }
    }

    /// A supply pair belonging to the named power group.
    pub fn named(power: Pin, ground: Pin, name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::new(power, ground)
        }
    }

    /// Returns the port names for this pair's supply and ground, e.g.
    /// `("vdd", "vss")` or `("dvdd", "dvss")` for a group named `d`.
    pub fn port_names(&self) -> (String, String) {
        let prefix = self.name.as_deref().unwrap_or("");
        (format!("{prefix}vdd"), format!("{prefix}vss"))
    }

    /// Both pins as a set.
    pub fn to_set(&self) -> BTreeSet<Pin> {
        [self.power.clone(), self.ground.clone()].into_iter().collect()
    }
}

/// The five wires of a JTAG test port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JtagPins {
    /// Test reset.
    pub trst: Pin,
    /// Test clock.
    pub tck: Pin,
    /// Test mode select.
    pub tms: Pin,
    /// Test data in.
    pub tdi: Pin,
    /// Test data out.
    pub tdo: Pin,
}

impl JtagPins {
    /// Builds a JTAG block from five consecutive pins in TRST, TCK, TMS, TDI, TDO order.
    pub fn from_consecutive(pins: [Pin; 5]) -> Self {
        let [trst, tck, tms, tdi, tdo] = pins;
        Self {
            trst,
            tck,
            tms,
            tdi,
            tdo,
        }
    }

    /// Wires in TRST, TCK, TMS, TDI, TDO order paired with their port suffix.
    pub fn wires(&self) -> [(&'static str, &Pin); 5] {
        [
            ("trst", &self.trst),
            ("tck", &self.tck),
            ("tms", &self.tms),
            ("tdi", &self.tdi),
            ("tdo", &self.tdo),
        ]
    }

    /// All five pins as a set.
    pub fn to_set(&self) -> BTreeSet<Pin> {
        self.wires().into_iter().map(|(_, p)| p.clone()).collect()
    }
}

/// The pins every die needs at a fixed location for bringup: core supplies,
/// clock, reset, a heartbeat output and optionally JTAG.
///
/// Bringup pins are a pure function of the package parameters and are never
/// drawn from the allocation pool.
#[derive(Debug, Clone, PartialEq)]
pub struct BringupPins {
    /// Core supply pairs.
    pub core_power: Vec<PowerPins>,
    /// Core clock input.
    pub core_clock: Pin,
    /// Core reset input.
    pub core_reset: Pin,
    /// Heartbeat output for liveness checks.
    pub core_heartbeat: Pin,
    /// JTAG port, if the package has room for one.
    pub core_jtag: Option<JtagPins>,
}

impl BringupPins {
    /// Every bringup pin, including JTAG when present.
    pub fn to_set(&self) -> BTreeSet<Pin> {
        let mut set: BTreeSet<Pin> = self.core_power.iter().flat_map(PowerPins::to_set).collect();
        set.insert(self.core_clock.clone());
        set.insert(self.core_reset.clone());
        set.insert(self.core_heartbeat.clone());
        if let Some(jtag) = &self.core_jtag {
            set.extend(jtag.to_set());
        }
        set
    }

    /// Total number of pin slots occupied, counting duplicates.
    ///
    /// Equal to `to_set().len()` exactly when no two bringup roles share a pin.
    pub fn slot_count(&self) -> usize {
        self.core_power.len() * 2 + 3 + if self.core_jtag.is_some() { 5 } else { 0 }
    }
}
