//! Configuration types deserialized from `bondout.toml`.

use bondout_common::{Direction, PortType, Process, Voltage, VoltageRange};
use bondout_package::PackageDef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The top-level project configuration parsed from `bondout.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    /// Core project metadata.
    pub project: ProjectMeta,
    /// Silicon target: process, package, power and pads.
    pub silicon: SiliconConfig,
}

/// Core project metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// A brief description of the project.
    #[serde(default)]
    pub description: String,
}

/// The `[silicon]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SiliconConfig {
    /// Fabrication process.
    pub process: Process,
    /// Package to lock pins against.
    pub package: PackageSelection,
    /// Optional bringup features.
    #[serde(default)]
    pub debug: DebugConfig,
    /// Pad-side power domains in addition to the built-in `_core` and `_io`.
    #[serde(default)]
    pub power: BTreeMap<String, PowerDomainConfig>,
    /// Power-domain bindings: component, then interface, then port or
    /// interface-side domain name, to pad-side domain name.
    #[serde(default)]
    pub power_allocation: PowerAllocation,
    /// User-declared pads at fixed locations.
    #[serde(default)]
    pub pads: BTreeMap<String, PadConfig>,
}

/// Component -> interface -> (port or interface domain) -> pad domain.
pub type PowerAllocation = BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>;

/// How the package is chosen: by registry name or as an inline definition.
///
/// ```toml
/// package = "pga144"
/// # or
/// package = { package_type = "QuadPackageDef", name = "qfn32", width = 8, height = 8 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PackageSelection {
    /// A predefined package from the registry.
    Named(String),
    /// A fully specified package definition.
    Inline(PackageDef),
}

/// The `[silicon.debug]` section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DebugConfig {
    /// Bring the heartbeat output out in the bringup interface.
    #[serde(default)]
    pub heartbeat: bool,
    /// Bring JTAG out in the bringup interface, if the package has a JTAG block.
    #[serde(default)]
    pub jtag: bool,
}

/// Whether a pad domain supplies the core or the I/O ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainType {
    /// Core logic supply.
    Core,
    /// I/O ring supply.
    Io,
}

/// A pad-side power domain declared under `[silicon.power]`.
///
/// Either a fixed `voltage` or a range given by `min`/`max`/`typical`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PowerDomainConfig {
    /// Fixed supply voltage.
    #[serde(default)]
    pub voltage: Option<Voltage>,
    /// Lowest permitted voltage.
    #[serde(default)]
    pub min: Option<Voltage>,
    /// Highest permitted voltage.
    #[serde(default)]
    pub max: Option<Voltage>,
    /// Nominal voltage.
    #[serde(default)]
    pub typical: Option<Voltage>,
    /// Core or I/O domain.
    #[serde(rename = "type")]
    pub kind: DomainType,
}

impl PowerDomainConfig {
    /// Returns the domain's voltage as a range; a fixed voltage becomes the
    /// typical value.
    pub fn range(&self) -> VoltageRange {
        VoltageRange {
            min: self.min,
            max: self.max,
            typical: self.voltage.or(self.typical),
        }
    }

    /// Returns `true` if no voltage information was given.
    pub fn is_unspecified(&self) -> bool {
        self.voltage.is_none() && self.min.is_none() && self.max.is_none() && self.typical.is_none()
    }
}

/// A pad declared under `[silicon.pads]`, placed at a fixed location.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PadConfig {
    /// What the pad carries.
    #[serde(rename = "type")]
    pub kind: PortType,
    /// Pin location in the package's notation (`"12"`, `"B7"`, `"N3"`).
    pub loc: String,
    /// Port direction; defaults from the pad type when absent.
    #[serde(default)]
    pub dir: Option<Direction>,
}

impl PadConfig {
    /// Returns the declared direction, or the natural one for the pad type.
    pub fn direction(&self) -> Direction {
        self.dir.unwrap_or(match self.kind {
            PortType::Io => Direction::Bidir,
            PortType::Heartbeat => Direction::Output,
            PortType::Clock | PortType::Reset | PortType::Power => Direction::Input,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    const HEADER: &str = r#"
[project]
name = "soc"

[silicon]
process = "sky130"
package = "pga144"
"#;

    #[test]
    fn process_all_variants() {
        for (input, expected) in [
            ("sky130", Process::Sky130),
            ("gf180", Process::Gf180),
            ("helvellyn2", Process::Helvellyn2),
            ("gf130bcd", Process::Gf130bcd),
            ("ihp_sg13g2", Process::IhpSg13g2),
        ] {
            let toml = format!(
                r#"
[project]
name = "soc"

[silicon]
process = "{input}"
package = "cf20"
"#
            );
            let config = load_config_from_str(&toml).unwrap();
            assert_eq!(config.silicon.process, expected);
        }
    }

    #[test]
    fn debug_defaults_off() {
        let config = load_config_from_str(HEADER).unwrap();
        assert_eq!(config.silicon.debug, DebugConfig::default());
        assert_eq!(
            config.silicon.package,
            PackageSelection::Named("pga144".to_string())
        );
    }

    #[test]
    fn power_domain_forms() {
        let toml = format!(
            r#"{HEADER}
[silicon.power]
vdd_3v3 = {{ voltage = "3.3V", type = "io" }}
vdd_a = {{ min = "1.6V", max = "2.0V", type = "core" }}
"#
        );
        let config = load_config_from_str(&toml).unwrap();
        let io = &config.silicon.power["vdd_3v3"];
        assert_eq!(io.kind, DomainType::Io);
        assert_eq!(io.range().typical, Some(Voltage::new(3.3)));
        let core = &config.silicon.power["vdd_a"];
        assert_eq!(core.kind, DomainType::Core);
        assert_eq!(core.range().min, Some(Voltage::new(1.6)));
        assert!(core.range().contains(Voltage::new(1.8)));
    }

    #[test]
    fn pads_default_direction() {
        let toml = format!(
            r#"{HEADER}
[silicon.pads]
ext_clk = {{ type = "clock", loc = "12" }}
led = {{ type = "io", loc = "40", dir = "o" }}
"#
        );
        let config = load_config_from_str(&toml).unwrap();
        let clk = &config.silicon.pads["ext_clk"];
        assert_eq!(clk.kind, PortType::Clock);
        assert_eq!(clk.direction(), Direction::Input);
        assert_eq!(config.silicon.pads["led"].direction(), Direction::Output);
    }

    #[test]
    fn power_allocation_nesting() {
        let toml = format!(
            r#"{HEADER}
[silicon.power_allocation.soc.uart]
default = "_io"
tx = "_core"
"#
        );
        let config = load_config_from_str(&toml).unwrap();
        let uart = &config.silicon.power_allocation["soc"]["uart"];
        assert_eq!(uart["default"], "_io");
        assert_eq!(uart["tx"], "_core");
    }
}
