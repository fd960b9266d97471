//! Binding ports to pad-side power domains and adding their supply ports.
//!
//! Each signal port exposes one or more interface-side power domains
//! (`"default"` unless its I/O model names others). A binding from
//! `[silicon.power_allocation]` maps one of them to a pad-side domain:
//!
//! - `comp.iface.<domain> = pad` binds that domain on every port exposing it;
//! - `comp.iface.<port> = pad` binds every domain of that port and takes
//!   precedence over domain bindings.
//!
//! Anything left unbound goes to `_io`. Every interface then carries a
//! VDD/VSS power port pair for each distinct `(domain, pad)` in use.

use crate::allocate::{allocate_from_pool, LockOptions, CORE_COMPONENT};
use crate::error::LockError;
use crate::iomodel::{IOModel, DEFAULT_POWER_DOMAIN};
use crate::port::{Interface, PortDescriptor, PortMap};
use bondout_common::{Direction, PortType};
use bondout_config::{PadDomain, IO_DOMAIN, RESERVED_PREFIX};
use bondout_package::{PackageDef, Pin};
use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet};

/// Port names of the supply pair for `domain` bound to `pad`.
///
/// ```
/// use bondout_lock::power_port_names;
///
/// assert_eq!(power_port_names("default", "_io"), ("vdd_io".to_string(), "vss_io".to_string()));
/// assert_eq!(power_port_names("a", "vdd_3v3"), ("a_vdd_vdd_3v3".to_string(), "a_vss_vdd_3v3".to_string()));
/// ```
pub fn power_port_names(domain: &str, pad: &str) -> (String, String) {
    let pad = pad.strip_prefix(RESERVED_PREFIX).unwrap_or(pad);
    if domain == DEFAULT_POWER_DOMAIN {
        (format!("vdd_{pad}"), format!("vss_{pad}"))
    } else {
        (format!("{domain}_vdd_{pad}"), format!("{domain}_vss_{pad}"))
    }
}

fn config_error(path: &str, reason: impl Into<String>) -> LockError {
    LockError::PowerDomainConfig {
        path: path.to_string(),
        reason: reason.into(),
    }
}

pub(crate) fn bind_power_domains(
    package: &PackageDef,
    port_map: &mut PortMap,
    pool: &mut BTreeSet<Pin>,
    options: &LockOptions,
) -> Result<(), LockError> {
    // Bindings on signal ports are recomputed from the configuration every run.
    for port in design_interfaces(port_map)
        .flat_map(|(_, _, ports)| ports.values_mut())
        .filter(|p| !p.is_power())
    {
        port.power_allocation.clear();
    }

    for (component, interfaces) in &options.power_allocation {
        let mapped = port_map
            .ports
            .get_mut(component)
            .filter(|_| !component.starts_with(RESERVED_PREFIX))
            .ok_or_else(|| config_error(component, "no such component in the design"))?;
        for (interface, bindings) in interfaces {
            let path = format!("{component}.{interface}");
            let ports = mapped
                .get_mut(interface)
                .ok_or_else(|| config_error(&path, "no such interface"))?;
            apply_bindings(&path, ports, bindings, &options.power_domains)?;
        }
    }

    for (component, interface, ports) in design_interfaces(port_map) {
        for port in ports.values_mut().filter(|p| !p.is_power()) {
            for domain in port.iomodel.domains() {
                port.power_allocation
                    .entry(domain.to_string())
                    .or_insert_with(|| IO_DOMAIN.to_string());
            }
        }
        sync_power_ports(package, pool, component, interface, ports)?;
    }
    Ok(())
}

/// Every interface outside the reserved `_core` component.
fn design_interfaces(
    port_map: &mut PortMap,
) -> impl Iterator<Item = (&str, &str, &mut Interface)> {
    port_map
        .ports
        .iter_mut()
        .filter(|(component, _)| component.as_str() != CORE_COMPONENT)
        .flat_map(|(component, interfaces)| {
            interfaces
                .iter_mut()
                .map(move |(interface, ports)| (component.as_str(), interface.as_str(), ports))
        })
}

fn apply_bindings(
    path: &str,
    ports: &mut Interface,
    bindings: &BTreeMap<String, String>,
    domains: &BTreeMap<String, PadDomain>,
) -> Result<(), LockError> {
    if let Some((key, pad)) = bindings.iter().find(|(_, pad)| !domains.contains_key(*pad)) {
        return Err(config_error(
            &format!("{path}.{key}"),
            format!("unknown pad power domain '{pad}'"),
        ));
    }

    let (by_port, by_domain): (Vec<_>, Vec<_>) = bindings
        .iter()
        .partition(|(key, _)| ports.get(*key).is_some_and(|p| !p.is_power()));

    for (domain, pad) in by_domain {
        let mut bound = false;
        for port in ports.values_mut().filter(|p| !p.is_power()) {
            if port.iomodel.domains().contains(&domain.as_str()) {
                port.power_allocation.insert(domain.clone(), pad.clone());
                bound = true;
            }
        }
        if !bound {
            return Err(config_error(
                &format!("{path}.{domain}"),
                "no port or interface power domain of that name",
            ));
        }
    }

    for (name, pad) in by_port {
        if let Some(port) = ports.get_mut(name) {
            for domain in port.iomodel.domains() {
                port.power_allocation.insert(domain.to_string(), pad.clone());
            }
        }
    }
    Ok(())
}

/// Brings an interface's power ports in line with its bindings: stale pairs
/// give their pins back to the pool, missing ones are allocated.
fn sync_power_ports(
    package: &PackageDef,
    pool: &mut BTreeSet<Pin>,
    component: &str,
    interface: &str,
    ports: &mut Interface,
) -> Result<(), LockError> {
    let in_use: BTreeSet<(&String, &String)> = ports
        .values()
        .filter(|p| !p.is_power())
        .flat_map(|p| p.power_allocation.iter())
        .collect();

    let mut wanted: IndexMap<String, (String, String)> = IndexMap::new();
    for (domain, pad) in in_use {
        let (vdd, vss) = power_port_names(domain, pad);
        for name in [vdd, vss] {
            if let Some((other_domain, other_pad)) =
                wanted.insert(name.clone(), (domain.clone(), pad.clone()))
            {
                return Err(config_error(
                    &format!("{component}.{interface}.{name}"),
                    format!(
                        "supplies for '{domain}' on '{pad}' and '{other_domain}' on '{other_pad}' \
                         would share this port name; rename one of the pad domains"
                    ),
                ));
            }
        }
    }

    if let Some(name) = wanted
        .keys()
        .find(|name| ports.get(*name).is_some_and(|p| !p.is_power()))
    {
        return Err(config_error(
            &format!("{component}.{interface}.{name}"),
            "a signal port already uses the name of this supply port",
        ));
    }

    let stale: Vec<String> = ports
        .iter()
        .filter(|(name, port)| port.is_power() && !wanted.contains_key(*name))
        .map(|(name, _)| name.clone())
        .collect();
    for name in stale {
        if let Some(port) = ports.shift_remove(&name) {
            log::debug!("{component}.{interface}.{name}: no longer needed, freeing its pins");
            pool.extend(port.pins.into_iter().flatten());
        }
    }

    let missing: Vec<_> = wanted
        .into_iter()
        .filter(|(name, _)| !ports.contains_key(name))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }

    let path = format!("{component}.{interface}");
    let pins = allocate_from_pool(package, pool, &path, missing.len())?;
    for ((name, (domain, pad)), pin) in missing.into_iter().zip(pins) {
        log::debug!("{path}.{name}: {domain} supplied from {pad} on pin {pin}");
        let mut port = PortDescriptor::new(
            PortType::Power,
            vec![pin],
            format!("{component}_{interface}_{name}"),
            IOModel::new(1, Direction::Input),
        );
        port.power_allocation.insert(domain, pad);
        ports.insert(name, port);
    }
    Ok(())
}
