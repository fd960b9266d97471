//! The lock orchestrator: reuse, allocation, bringup and power binding in one run.

use crate::error::LockError;
use crate::iomodel::{IOModel, Invert};
use crate::lockfile::LockFile;
use crate::metadata::{component_interfaces, MetadataNode};
use crate::port::{Interface, PortDescriptor, PortMap};
use crate::power::bind_power_domains;
use bondout_common::{Direction, PortType, Process};
use bondout_config::{
    builtin_power_domains, resolve_power_domains, DebugConfig, PadConfig, PadDomain,
    PowerAllocation, SiliconConfig,
};
use bondout_package::{PackageDef, PackageDefinition, PackageError, Pin};
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Reserved component holding the bringup interface and fixed pads.
pub const CORE_COMPONENT: &str = "_core";

/// Interface of [`CORE_COMPONENT`] holding clock, reset, core power and debug ports.
pub const BRINGUP_INTERFACE: &str = "bringup_pins";

/// Interface of [`CORE_COMPONENT`] holding user-declared fixed pads.
pub const PADS_INTERFACE: &str = "pads";

const SYNC_DOMAIN: &str = "sync";

/// Everything besides the package and the design that shapes a lock run.
#[derive(Debug, Clone)]
pub struct LockOptions {
    /// Optional bringup ports.
    pub debug: DebugConfig,
    /// Pad-side power domains, built-ins included.
    pub power_domains: BTreeMap<String, PadDomain>,
    /// Interface-side to pad-side power domain bindings.
    pub power_allocation: PowerAllocation,
    /// Fixed pads.
    pub pads: BTreeMap<String, PadConfig>,
}

impl LockOptions {
    /// Options taken from the `[silicon]` section of the project configuration.
    pub fn from_silicon(silicon: &SiliconConfig) -> Self {
        Self {
            debug: silicon.debug,
            power_domains: resolve_power_domains(silicon),
            power_allocation: silicon.power_allocation.clone(),
            pads: silicon.pads.clone(),
        }
    }
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            debug: DebugConfig::default(),
            power_domains: builtin_power_domains(),
            power_allocation: PowerAllocation::new(),
            pads: BTreeMap::new(),
        }
    }
}

/// Allocates package pins to every interface of the design.
///
/// `interfaces` maps each top-level component to its interface metadata tree.
/// Interfaces recorded in `previous` keep their pins verbatim, provided their
/// width is unchanged. New interfaces are allocated in metadata order from the
/// pins left over. The bringup interface is always rebuilt from the package.
///
/// Nothing is written: the caller persists the returned lock file.
///
/// # Errors
///
/// Fails on the first problem found. See [`LockError`] for the kinds.
pub fn lock(
    package: &PackageDef,
    process: Process,
    interfaces: &IndexMap<String, Value>,
    previous: Option<&LockFile>,
    options: &LockOptions,
) -> Result<LockFile, LockError> {
    if let Some(prev) = previous {
        if &prev.package != package {
            return Err(LockError::PinConflict {
                path: "package".to_string(),
                reason: format!(
                    "the previous lock file was made for package '{}' ({}); remove it to lock against '{}'",
                    prev.package.name(),
                    prev.package.package_type(),
                    package.name()
                ),
            });
        }
        info!("reusing pin allocation from the previous lock file");
    }

    let mut pool: BTreeSet<Pin> = package.ordered_pins().iter().cloned().collect();
    let pads = place_pads(package, &mut pool, previous, &options.pads)?;

    let mut port_map = PortMap::default();
    let mut pending: Vec<(&str, String, MetadataNode, usize)> = Vec::new();
    let components = interfaces
        .iter()
        .map(|(name, value)| component_interfaces(name, value).map(|members| (name.as_str(), members)))
        .collect::<Result<Vec<_>, LockError>>()?;

    // Reused pins leave the pool before anything new is allocated.
    for (component, members) in components {
        for (interface, node) in members {
            let path = format!("{component}.{interface}");
            let width = node.count_pins(&path);
            debug!("{path}: {width} pins");

            let old = previous.and_then(|p| p.port_map.get_ports(component, &interface));
            let Some(old) = old else {
                port_map.add_ports(component, &interface, Interface::new());
                pending.push((component, interface, node, width));
                continue;
            };

            let old_width: usize = old
                .values()
                .filter(|p| !p.is_power())
                .map(PortDescriptor::pin_count)
                .sum();
            if old_width != width {
                return Err(LockError::InterfaceSizeChanged {
                    path,
                    old: old_width,
                    new: width,
                });
            }
            for (name, port) in old {
                for pin in port.pins.iter().flatten() {
                    if !pool.remove(pin) {
                        return Err(LockError::PinConflict {
                            path: format!("{path}.{name}"),
                            reason: format!("pin {pin} from the previous lock file is not free"),
                        });
                    }
                }
            }
            debug!("{path}: reusing {old_width} pins");
            port_map.add_ports(component, &interface, old.clone());
        }
    }

    allocate_pending(package, &mut pool, &mut port_map, pending)?;

    port_map.add_ports(
        CORE_COMPONENT,
        BRINGUP_INTERFACE,
        bringup_interface(package, options.debug),
    );
    if !pads.is_empty() {
        port_map.add_ports(CORE_COMPONENT, PADS_INTERFACE, pads);
    }

    bind_power_domains(package, &mut port_map, &mut pool, options)?;

    let lock = LockFile {
        process,
        package: package.clone(),
        port_map,
        metadata: interfaces.clone(),
    };
    lock.validate()?;
    Ok(lock)
}

fn allocate_pending(
    package: &PackageDef,
    pool: &mut BTreeSet<Pin>,
    port_map: &mut PortMap,
    pending: Vec<(&str, String, MetadataNode, usize)>,
) -> Result<(), LockError> {
    for (component, interface, node, width) in pending {
        let path = format!("{component}.{interface}");
        let pins = allocate_from_pool(package, pool, &path, width)?;
        debug!("{path}: allocated {pins:?}");
        let (ports, rest) = node.assign_pins(&format!("{component}_{interface}"), &pins)?;
        if !rest.is_empty() {
            return Err(LockError::Metadata {
                path,
                reason: format!("{} allocated pins were left unassigned", rest.len()),
            });
        }
        port_map.add_ports(component, &interface, ports);
    }
    Ok(())
}

/// Takes `width` pins out of `pool`, reporting exhaustion against `path`.
pub(crate) fn allocate_from_pool(
    package: &PackageDef,
    pool: &mut BTreeSet<Pin>,
    path: &str,
    width: usize,
) -> Result<Vec<Pin>, LockError> {
    let pins = package.allocate(pool, width).map_err(|e| match e {
        PackageError::UnableToAllocate {
            requested,
            available,
        } => LockError::UnableToAllocate {
            path: path.to_string(),
            width: requested,
            available,
        },
        other => other.into(),
    })?;
    for pin in &pins {
        pool.remove(pin);
    }
    Ok(pins)
}

/// Places `[silicon.pads]` entries at their fixed locations.
fn place_pads(
    package: &PackageDef,
    pool: &mut BTreeSet<Pin>,
    previous: Option<&LockFile>,
    pads: &BTreeMap<String, PadConfig>,
) -> Result<Interface, LockError> {
    let old = previous.and_then(|p| p.port_map.get_ports(CORE_COMPONENT, PADS_INTERFACE));
    let mut placed = Interface::new();

    for (name, pad) in pads {
        let path = format!("{CORE_COMPONENT}.{PADS_INTERFACE}.{name}");
        let pin = package.parse_pin(&pad.loc)?;

        if let Some(old_pins) = old.and_then(|o| o.get(name)).and_then(|p| p.pins.as_ref()) {
            if old_pins.as_slice() != std::slice::from_ref(&pin) {
                let was: Vec<String> = old_pins.iter().map(Pin::to_string).collect();
                return Err(LockError::PinConflict {
                    path,
                    reason: format!(
                        "declared at {pin} but the previous lock file places it at {}",
                        was.join(", ")
                    ),
                });
            }
        }
        if !pool.remove(&pin) {
            return Err(LockError::PinConflict {
                path,
                reason: format!("pin {pin} is a bringup pin or is taken by another pad"),
            });
        }
        debug!("{path}: fixed at {pin}");
        placed.insert(
            name.clone(),
            PortDescriptor::new(pad.kind, vec![pin], name.clone(), IOModel::new(1, pad.direction())),
        );
    }
    Ok(placed)
}

fn bringup_interface(package: &PackageDef, debug: DebugConfig) -> Interface {
    let bringup = package.bringup_pins();
    let mut ports = Interface::new();
    let mut add = |name: String, kind: PortType, pin: Pin, model: IOModel| {
        ports.insert(name.clone(), PortDescriptor::new(kind, vec![pin], name, model));
    };

    let mut clk = IOModel::new(1, Direction::Input);
    clk.clock_domain = Some(SYNC_DOMAIN.to_string());
    add("clk".to_string(), PortType::Clock, bringup.core_clock.clone(), clk);

    let mut rst = IOModel::new(1, Direction::Input);
    rst.clock_domain = Some(SYNC_DOMAIN.to_string());
    rst.invert = Some(Invert::All(true));
    add("rst_n".to_string(), PortType::Reset, bringup.core_reset.clone(), rst);

    for pair in &bringup.core_power {
        let (vdd, vss) = pair.port_names();
        let supply = IOModel::new(1, Direction::Input);
        add(vdd, PortType::Power, pair.power.clone(), supply.clone());
        add(vss, PortType::Power, pair.ground.clone(), supply);
    }

    if debug.heartbeat {
        let mut heartbeat = IOModel::new(1, Direction::Output);
        heartbeat.clock_domain = Some(SYNC_DOMAIN.to_string());
        add(
            "heartbeat".to_string(),
            PortType::Heartbeat,
            bringup.core_heartbeat.clone(),
            heartbeat,
        );
    }

    if debug.jtag {
        match &bringup.core_jtag {
            Some(jtag) => {
                for (wire, pin) in jtag.wires() {
                    let dir = if wire == "tdo" {
                        Direction::Output
                    } else {
                        Direction::Input
                    };
                    add(format!("jtag_{wire}"), PortType::Io, pin.clone(), IOModel::new(1, dir));
                }
            }
            None => warn!(
                "package '{}' has no JTAG block, ignoring debug.jtag",
                package.name()
            ),
        }
    }
    ports
}
