//! Resolution of the package selection and the pad-side power domains.

use crate::error::ConfigError;
use crate::types::{DomainType, PackageSelection, SiliconConfig};
use bondout_common::{Voltage, VoltageRange};
use bondout_package::{load_package, PackageDef};
use serde::Serialize;
use std::collections::BTreeMap;

/// Names starting with this prefix are reserved for built-in entries.
pub const RESERVED_PREFIX: &str = "_";

/// The built-in core supply domain.
pub const CORE_DOMAIN: &str = "_core";

/// The built-in I/O ring supply domain, and the default binding for every port.
pub const IO_DOMAIN: &str = "_io";

const CORE_VOLTS: f64 = 1.8;
const IO_VOLTS: f64 = 3.3;

/// A pad-side power domain with its voltage and type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PadDomain {
    /// Domain name.
    pub name: String,
    /// Core or I/O domain.
    #[serde(rename = "type")]
    pub kind: DomainType,
    /// Supply voltage or range.
    pub voltage: VoltageRange,
}

/// Resolves the configured package, either from the registry or inline.
///
/// # Errors
///
/// Returns [`ConfigError::Package`] if a named package is not registered.
pub fn resolve_package(silicon: &SiliconConfig) -> Result<PackageDef, ConfigError> {
    match &silicon.package {
        PackageSelection::Named(name) => Ok(load_package(name)?),
        PackageSelection::Inline(def) => Ok(def.clone()),
    }
}

/// The built-in pad domains: `_core` at 1.8V and `_io` at 3.3V.
pub fn builtin_power_domains() -> BTreeMap<String, PadDomain> {
    [
        (CORE_DOMAIN, DomainType::Core, CORE_VOLTS),
        (IO_DOMAIN, DomainType::Io, IO_VOLTS),
    ]
    .into_iter()
    .map(|(name, kind, volts)| {
        let domain = PadDomain {
            name: name.to_string(),
            kind,
            voltage: VoltageRange::fixed(Voltage::new(volts)),
        };
        (name.to_string(), domain)
    })
    .collect()
}

/// Returns every pad domain available for power allocation: the built-in
/// `_core` and `_io` domains plus those declared under `[silicon.power]`.
pub fn resolve_power_domains(silicon: &SiliconConfig) -> BTreeMap<String, PadDomain> {
    let mut domains = builtin_power_domains();
    for (name, domain) in &silicon.power {
        domains.insert(
            name.clone(),
            PadDomain {
                name: name.clone(),
                kind: domain.kind,
                voltage: domain.range(),
            },
        );
    }
    domains
}
