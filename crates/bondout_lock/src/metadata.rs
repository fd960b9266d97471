//! The interface metadata tree and the pin walker over it.
//!
//! Interface metadata arrives as generic JSON from the design's elaboration
//! step. Each node is one of:
//!
//! - `{"type": "interface", "members": {name: node, ...}}`
//! - `{"type": "interface", "annotations": {IO_ANNOTATION_SCHEMA: iomodel}}`,
//!   an opaque I/O port that is not recursed into
//! - `{"type": "port", "width": n, "dir": "i" | "o" | "io"}`, a plain leaf
//!
//! [`MetadataNode::from_value`] parses that into a closed tree once, so the
//! walkers below are plain structural recursion.

use crate::error::LockError;
use crate::iomodel::IOModel;
use crate::port::{Interface, PortDescriptor};
use bondout_common::{Direction, PortType};
use bondout_package::Pin;
use indexmap::IndexMap;
use serde_json::Value;

/// Annotation key marking an interface node as a single I/O port.
pub const IO_ANNOTATION_SCHEMA: &str = "https://api.chipflow.com/schemas/0/pin-annotation";

/// A node of the interface metadata tree.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataNode {
    /// A named group of sub-interfaces and ports, in declaration order.
    Interface {
        /// Child nodes.
        members: IndexMap<String, MetadataNode>,
    },
    /// An annotated interface standing for one I/O port.
    Io(IOModel),
    /// A plain port without an I/O annotation.
    Port {
        /// Number of wires.
        width: usize,
        /// Direction.
        dir: Direction,
    },
}

impl MetadataNode {
    /// Parses a JSON metadata node. `path` names the node in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::Metadata`] if the node does not follow the grammar above.
    pub fn from_value(path: &str, value: &Value) -> Result<Self, LockError> {
        let invalid = |reason: String| LockError::Metadata {
            path: path.to_string(),
            reason,
        };

        let node = value
            .as_object()
            .ok_or_else(|| invalid("expected an object".to_string()))?;
        let kind = node
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("missing 'type'".to_string()))?;

        match kind {
            "interface" => {
                if let Some(model) = node
                    .get("annotations")
                    .and_then(|a| a.get(IO_ANNOTATION_SCHEMA))
                {
                    let model: IOModel = serde_json::from_value(model.clone())
                        .map_err(|e| invalid(format!("bad I/O annotation: {e}")))?;
                    return Ok(MetadataNode::Io(model));
                }
                let members = node
                    .get("members")
                    .and_then(Value::as_object)
                    .ok_or_else(|| invalid("interface has neither members nor an I/O annotation".to_string()))?;
                let members = members
                    .iter()
                    .map(|(name, child)| {
                        MetadataNode::from_value(&format!("{path}.{name}"), child)
                            .map(|child| (name.clone(), child))
                    })
                    .collect::<Result<IndexMap<_, _>, LockError>>()?;
                Ok(MetadataNode::Interface { members })
            }
            "port" => {
                let width = node
                    .get("width")
                    .and_then(Value::as_u64)
                    .ok_or_else(|| invalid("port without an integer 'width'".to_string()))?;
                let dir = node
                    .get("dir")
                    .cloned()
                    .ok_or_else(|| invalid("port without 'dir'".to_string()))?;
                let dir: Direction = serde_json::from_value(dir)
                    .map_err(|e| invalid(format!("bad port direction: {e}")))?;
                Ok(MetadataNode::Port {
                    width: width as usize,
                    dir,
                })
            }
            other => Err(invalid(format!("unknown node type '{other}'"))),
        }
    }

    /// Counts the pins this subtree needs. `path` is only used for logging.
    pub fn count_pins(&self, path: &str) -> usize {
        match self {
            MetadataNode::Interface { members } => members
                .iter()
                .map(|(name, child)| child.count_pins(&format!("{path}.{name}")))
                .sum(),
            MetadataNode::Io(model) => model.width,
            MetadataNode::Port { width, .. } => {
                log::warn!("port '{path}' has no I/O annotation, pin allocation may be unreliable");
                *width
            }
        }
    }

    /// Binds a prefix of `pins` to the ports of this subtree, in declaration order.
    ///
    /// Ports are keyed by their path below this node joined with `_`, or by
    /// `port_name` if this node is itself a port. Port names are `port_name`
    /// extended the same way. Returns the ports and the unconsumed pins.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::UnableToAllocate`] if `pins` is too short, and
    /// [`LockError::Metadata`] if two ports flatten to the same key.
    pub fn assign_pins<'p>(
        &self,
        port_name: &str,
        pins: &'p [Pin],
    ) -> Result<(Interface, &'p [Pin]), LockError> {
        let mut ports = Interface::new();
        let rest = self.assign_into(None, port_name, pins, &mut ports)?;
        Ok((ports, rest))
    }

    fn assign_into<'p>(
        &self,
        key: Option<&str>,
        port_name: &str,
        pins: &'p [Pin],
        out: &mut Interface,
    ) -> Result<&'p [Pin], LockError> {
        let model = match self {
            MetadataNode::Interface { members } => {
                let mut rest = pins;
                for (name, child) in members {
                    let child_key = match key {
                        Some(k) => format!("{k}_{name}"),
                        None => name.clone(),
                    };
                    rest = child.assign_into(Some(&child_key), &format!("{port_name}_{name}"), rest, out)?;
                }
                return Ok(rest);
            }
            MetadataNode::Io(model) => model.clone(),
            MetadataNode::Port { width, dir } => IOModel::new(*width, *dir),
        };

        let width = model.width;
        if pins.len() < width {
            return Err(LockError::UnableToAllocate {
                path: port_name.to_string(),
                width,
                available: pins.len(),
            });
        }
        let key = key.unwrap_or(port_name).to_string();
        if out.contains_key(&key) {
            return Err(LockError::Metadata {
                path: port_name.to_string(),
                reason: format!("more than one port flattens to the name '{key}'"),
            });
        }
        let (mine, rest) = pins.split_at(width);
        out.insert(
            key,
            PortDescriptor::new(PortType::Io, mine.to_vec(), port_name, model),
        );
        Ok(rest)
    }
}

/// Parses the interfaces of one top-level component.
///
/// The component value is an interface node whose members are the
/// component's interfaces, either bare or wrapped as `{"interface": node}`.
///
/// # Errors
///
/// Returns [`LockError::Metadata`] if the value is not an interface node.
pub fn component_interfaces(
    component: &str,
    value: &Value,
) -> Result<IndexMap<String, MetadataNode>, LockError> {
    let node = value.get("interface").unwrap_or(value);
    match MetadataNode::from_value(component, node)? {
        MetadataNode::Interface { members } => Ok(members),
        _ => Err(LockError::Metadata {
            path: component.to_string(),
            reason: "a top-level component must be an interface with members".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn io(width: usize, dir: &str) -> Value {
        json!({
            "type": "interface",
            "members": {},
            "annotations": { (IO_ANNOTATION_SCHEMA): { "width": width, "direction": dir } }
        })
    }

    fn uart() -> Value {
        json!({
            "type": "interface",
            "members": { "tx": io(1, "o"), "rx": io(1, "i") }
        })
    }

    fn pins(range: std::ops::RangeInclusive<u32>) -> Vec<Pin> {
        range.map(Pin::Numbered).collect()
    }

    #[test]
    fn parse_and_count() {
        let node = MetadataNode::from_value("soc.uart", &uart()).unwrap();
        assert_eq!(node.count_pins("soc.uart"), 2);
        match &node {
            MetadataNode::Interface { members } => {
                assert_eq!(members.keys().collect::<Vec<_>>(), ["tx", "rx"]);
            }
            other => panic!("expected interface, got {other:?}"),
        }
    }

    #[test]
    fn annotated_interface_is_not_recursed() {
        let value = json!({
            "type": "interface",
            "members": { "o": { "type": "port", "width": 8, "dir": "o" } },
            "annotations": { (IO_ANNOTATION_SCHEMA): { "width": 4, "direction": "io" } }
        });
        let node = MetadataNode::from_value("soc.gpio", &value).unwrap();
        assert_eq!(node.count_pins("soc.gpio"), 4);
    }

    #[test]
    fn plain_port_counts_its_width() {
        let value = json!({ "type": "port", "width": 3, "dir": "io" });
        let node = MetadataNode::from_value("x", &value).unwrap();
        assert_eq!(node, MetadataNode::Port { width: 3, dir: Direction::Bidir });
        assert_eq!(node.count_pins("x"), 3);
    }

    #[test]
    fn assign_in_declaration_order() {
        let node = MetadataNode::from_value("soc.uart", &uart()).unwrap();
        let all = pins(10..=12);
        let (ports, rest) = node.assign_pins("soc_uart", &all).unwrap();
        assert_eq!(rest, &[Pin::Numbered(12)]);
        assert_eq!(ports["tx"].pins, Some(vec![Pin::Numbered(10)]));
        assert_eq!(ports["tx"].port_name, "soc_uart_tx");
        assert_eq!(ports["tx"].iomodel.direction, Direction::Output);
        assert_eq!(ports["rx"].pins, Some(vec![Pin::Numbered(11)]));
    }

    #[test]
    fn nested_keys_join_path() {
        let value = json!({
            "type": "interface",
            "members": {
                "spi": {
                    "type": "interface",
                    "members": { "sck": io(1, "o"), "data": io(2, "io") }
                },
                "cs": io(1, "o")
            }
        });
        let node = MetadataNode::from_value("soc.flash", &value).unwrap();
        assert_eq!(node.count_pins("soc.flash"), 4);
        let all = pins(1..=4);
        let (ports, rest) = node.assign_pins("soc_flash", &all).unwrap();
        assert!(rest.is_empty());
        assert_eq!(ports.keys().collect::<Vec<_>>(), ["spi_sck", "spi_data", "cs"]);
        assert_eq!(ports["spi_data"].port_name, "soc_flash_spi_data");
        assert_eq!(ports["spi_data"].pins, Some(pins(2..=3)));
    }

    #[test]
    fn leaf_interface_keyed_by_port_name() {
        let node = MetadataNode::from_value("soc.led", &io(2, "o")).unwrap();
        let all = pins(1..=2);
        let (ports, _) = node.assign_pins("soc_led", &all).unwrap();
        assert_eq!(ports.keys().collect::<Vec<_>>(), ["soc_led"]);
    }

    #[test]
    fn assign_consumes_exactly_count() {
        let node = MetadataNode::from_value("soc.uart", &uart()).unwrap();
        let all = pins(1..=8);
        let (ports, rest) = node.assign_pins("soc_uart", &all).unwrap();
        let used: usize = ports.values().map(PortDescriptor::pin_count).sum();
        assert_eq!(used, node.count_pins("soc.uart"));
        assert_eq!(rest.len(), all.len() - used);
    }

    #[test]
    fn short_pin_slice_is_an_error() {
        let node = MetadataNode::from_value("soc.uart", &uart()).unwrap();
        let all = pins(1..=1);
        let err = node.assign_pins("soc_uart", &all).unwrap_err();
        assert!(matches!(err, LockError::UnableToAllocate { width: 1, available: 0, .. }));
    }

    #[test]
    fn flattened_name_collision() {
        let value = json!({
            "type": "interface",
            "members": {
                "a": { "type": "interface", "members": { "b": io(1, "o") } },
                "a_b": io(1, "o")
            }
        });
        let node = MetadataNode::from_value("soc.x", &value).unwrap();
        let all = pins(1..=2);
        assert!(matches!(
            node.assign_pins("soc_x", &all),
            Err(LockError::Metadata { .. })
        ));
    }

    #[test]
    fn malformed_nodes() {
        for value in [
            json!(3),
            json!({ "members": {} }),
            json!({ "type": "wire" }),
            json!({ "type": "port", "dir": "o" }),
            json!({ "type": "port", "width": 1, "dir": "sideways" }),
            json!({ "type": "interface" }),
        ] {
            let err = MetadataNode::from_value("soc.bad", &value).unwrap_err();
            assert!(matches!(err, LockError::Metadata { ref path, .. } if path == "soc.bad"));
        }
    }

    #[test]
    fn component_wrapped_or_bare() {
        let bare = json!({ "type": "interface", "members": { "uart": uart() } });
        let wrapped = json!({ "interface": bare.clone() });
        let a = component_interfaces("soc", &bare).unwrap();
        let b = component_interfaces("soc", &wrapped).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.keys().collect::<Vec<_>>(), ["uart"]);
    }

    #[test]
    fn component_must_have_members() {
        let err = component_interfaces("soc", &io(1, "o")).unwrap_err();
        assert!(matches!(err, LockError::Metadata { .. }));
    }
}
