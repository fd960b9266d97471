//! Port descriptors and the component/interface/port map.

use crate::iomodel::IOModel;
use bondout_common::PortType;
use bondout_package::Pin;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A port and the package pins bonded to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortDescriptor {
    /// What the port carries.
    #[serde(rename = "type")]
    pub kind: PortType,
    /// Bonded pins, one per wire, or `None` if not yet allocated.
    pub pins: Option<Vec<Pin>>,
    /// Flattened name of the port in the generated top level.
    pub port_name: String,
    /// I/O attributes.
    pub iomodel: IOModel,
    /// Interface-side power domain to pad-side power domain bindings.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub power_allocation: BTreeMap<String, String>,
}

impl PortDescriptor {
    /// An allocated port with no power bindings.
    pub fn new(kind: PortType, pins: Vec<Pin>, port_name: impl Into<String>, iomodel: IOModel) -> Self {
        Self {
            kind,
            pins: Some(pins),
            port_name: port_name.into(),
            iomodel,
            power_allocation: BTreeMap::new(),
        }
    }

    /// Width from the I/O model.
    pub fn width(&self) -> usize {
        self.iomodel.width
    }

    /// Number of pins actually bonded.
    pub fn pin_count(&self) -> usize {
        self.pins.as_ref().map_or(0, Vec::len)
    }

    /// Returns `true` for supply and ground ports.
    pub fn is_power(&self) -> bool {
        self.kind == PortType::Power
    }
}

/// Ports of one interface, keyed by port name. Order is significant.
pub type Interface = IndexMap<String, PortDescriptor>;

/// Interfaces of one component, keyed by interface name.
pub type Component = IndexMap<String, Interface>;

/// Every component's ports, including the reserved `_core` component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortMap {
    /// Component name to its interfaces.
    #[serde(default)]
    pub ports: IndexMap<String, Component>,
}

impl PortMap {
    /// Returns the ports of `component.interface`, if present.
    pub fn get_ports(&self, component: &str, interface: &str) -> Option<&Interface> {
        self.ports.get(component)?.get(interface)
    }

    /// Sets the ports of `component.interface`, keeping its position if it already exists.
    pub fn add_ports(&mut self, component: &str, interface: &str, ports: Interface) {
        self.ports
            .entry(component.to_string())
            .or_default()
            .insert(interface.to_string(), ports);
    }

    /// Iterates over every port as `(component, interface, port name, descriptor)`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str, &PortDescriptor)> {
        self.ports.iter().flat_map(|(component, interfaces)| {
            interfaces.iter().flat_map(move |(interface, ports)| {
                ports
                    .iter()
                    .map(move |(name, port)| (component.as_str(), interface.as_str(), name.as_str(), port))
            })
        })
    }

    /// All clock ports.
    pub fn clocks(&self) -> Vec<&PortDescriptor> {
        self.of_kind(PortType::Clock)
    }

    /// All reset ports.
    pub fn resets(&self) -> Vec<&PortDescriptor> {
        self.of_kind(PortType::Reset)
    }

    fn of_kind(&self, kind: PortType) -> Vec<&PortDescriptor> {
        self.iter()
            .filter(|(_, _, _, port)| port.kind == kind)
            .map(|(_, _, _, port)| port)
            .collect()
    }

    /// Every bonded pin.
    pub fn all_pins(&self) -> BTreeSet<Pin> {
        self.iter()
            .filter_map(|(_, _, _, port)| port.pins.as_ref())
            .flatten()
            .cloned()
            .collect()
    }
}
