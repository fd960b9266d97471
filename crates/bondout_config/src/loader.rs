//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::resolve::{CORE_DOMAIN, IO_DOMAIN, RESERVED_PREFIX};
use crate::types::ProjectConfig;
use std::path::Path;

/// Name of the configuration file at the project root.
pub const CONFIG_FILE: &str = "bondout.toml";

/// Loads and validates a `bondout.toml` configuration from a project directory.
///
/// Reads `<project_dir>/bondout.toml`, parses it, and validates it.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
        path: config_path.clone(),
        source,
    })?;
    load_config_from_str(&content)
}

/// Parses and validates a `bondout.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks names and values that the type system cannot.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField {
            field: "project.name".to_string(),
        });
    }

    for (name, domain) in &config.silicon.power {
        if name.starts_with(RESERVED_PREFIX) {
            return Err(ConfigError::ReservedName {
                kind: "power domain",
                name: name.clone(),
            });
        }
        // Supply ports drop the reserved prefix, so `io` would share `_io`'s port names.
        if let Some(builtin) = [CORE_DOMAIN, IO_DOMAIN]
            .into_iter()
            .find(|b| b.strip_prefix(RESERVED_PREFIX) == Some(name.as_str()))
        {
            return Err(ConfigError::Invalid {
                field: format!("silicon.power.{name}"),
                reason: format!("clashes with the built-in '{builtin}' domain"),
            });
        }
        if domain.is_unspecified() {
            return Err(ConfigError::Invalid {
                field: format!("silicon.power.{name}"),
                reason: "needs a voltage or a min/max/typical range".to_string(),
            });
        }
    }

    for (name, pad) in &config.silicon.pads {
        if name.starts_with(RESERVED_PREFIX) {
            return Err(ConfigError::ReservedName {
                kind: "pad",
                name: name.clone(),
            });
        }
        if pad.loc.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: format!("silicon.pads.{name}.loc"),
            });
        }
    }

    for component in config.silicon.power_allocation.keys() {
        if component.starts_with(RESERVED_PREFIX) {
            return Err(ConfigError::ReservedName {
                kind: "power allocation component",
                name: component.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PackageSelection;

    const MINIMAL: &str = r#"
[project]
name = "soc"

[silicon]
process = "sky130"
package = "cf20"
"#;

    #[test]
    fn parse_minimal_config() {
        let config = load_config_from_str(MINIMAL).unwrap();
        assert_eq!(config.project.name, "soc");
        assert_eq!(
            config.silicon.package,
            PackageSelection::Named("cf20".to_string())
        );
        assert!(config.silicon.power.is_empty());
        assert!(config.silicon.pads.is_empty());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[project]
name = "soc"
description = "test chip"

[silicon]
process = "gf180"
package = { package_type = "QuadPackageDef", name = "qfn32", width = 8, height = 8 }

[silicon.debug]
heartbeat = true
jtag = true

[silicon.power]
vdd_3v3 = { voltage = "3.3V", type = "io" }

[silicon.power_allocation.soc.uart]
default = "vdd_3v3"

[silicon.pads]
ext_clk = { type = "clock", loc = "12" }
"#;
        let config = load_config_from_str(toml).unwrap();
        assert!(config.silicon.debug.heartbeat);
        assert!(config.silicon.debug.jtag);
        assert!(matches!(config.silicon.package, PackageSelection::Inline(_)));
        assert!(config.silicon.power.contains_key("vdd_3v3"));
        assert!(config.silicon.pads.contains_key("ext_clk"));
    }

    #[test]
    fn missing_name_errors() {
        let toml = MINIMAL.replace("name = \"soc\"", "name = \"\"");
        let err = load_config_from_str(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { ref field } if field == "project.name"));
    }

    #[test]
    fn missing_silicon_errors() {
        let err = load_config_from_str("[project]\nname = \"soc\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn domain_shadowing_builtin_errors() {
        for (name, builtin) in [("io", "_io"), ("core", "_core")] {
            let toml = format!("{MINIMAL}\n[silicon.power]\n{name} = {{ voltage = \"3.3V\", type = \"io\" }}\n");
            let err = load_config_from_str(&toml).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { ref field, ref reason }
                    if field == &format!("silicon.power.{name}") && reason.contains(builtin)),
                "{name}: {err}"
            );
        }
    }

    #[test]
    fn reserved_domain_name_errors() {
        let toml = format!("{MINIMAL}\n[silicon.power]\n_mine = {{ voltage = \"1.8V\", type = \"core\" }}\n");
        let err = load_config_from_str(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::ReservedName { ref name, .. } if name == "_mine"));
    }

    #[test]
    fn domain_without_voltage_errors() {
        let toml = format!("{MINIMAL}\n[silicon.power]\nvdd_x = {{ type = \"io\" }}\n");
        let err = load_config_from_str(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn bad_voltage_errors() {
        let toml = format!("{MINIMAL}\n[silicon.power]\nvdd_x = {{ voltage = \"lots\", type = \"io\" }}\n");
        let err = load_config_from_str(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn unknown_process_errors() {
        let toml = MINIMAL.replace("sky130", "tsmc5");
        assert!(load_config_from_str(&toml).is_err());
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), MINIMAL).unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.project.name, "soc");
    }

    #[test]
    fn load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
