//! The lock file: a reproducible record of a pin allocation.

use crate::error::LockError;
use crate::port::PortMap;
use bondout_common::Process;
use bondout_package::{PackageDef, PackageDefinition, Pin};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// Default lock file name, relative to the project root.
pub const LOCK_FILE: &str = "pins.lock";

/// A complete pin allocation for one design on one package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockFile {
    /// Fabrication process.
    pub process: Process,
    /// The package the pins belong to.
    pub package: PackageDef,
    /// Every allocated port.
    pub port_map: PortMap,
    /// Interface metadata the allocation was made from, kept for width diffing.
    #[serde(default)]
    pub metadata: IndexMap<String, Value>,
}

impl LockFile {
    /// Checks internal consistency: every allocated port has exactly one pin
    /// per wire, every pin belongs to the package, and no pin is used twice.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::Inconsistent`] naming the first offending port.
    pub fn validate(&self) -> Result<(), LockError> {
        let universe = self.package.pins();
        let mut owners: BTreeMap<&Pin, String> = BTreeMap::new();

        for (component, interface, name, port) in self.port_map.iter() {
            let path = format!("{component}.{interface}.{name}");
            let Some(pins) = &port.pins else { continue };
            if pins.len() != port.width() {
                return Err(LockError::Inconsistent {
                    path,
                    reason: format!("{} pins bonded but width is {}", pins.len(), port.width()),
                });
            }
            for pin in pins {
                if !universe.contains(pin) {
                    return Err(LockError::Inconsistent {
                        path,
                        reason: format!("pin {pin} is not on package '{}'", self.package.name()),
                    });
                }
                if let Some(owner) = owners.insert(pin, path.clone()) {
                    return Err(LockError::Inconsistent {
                        path,
                        reason: format!("pin {pin} is also bonded to '{owner}'"),
                    });
                }
            }
        }
        Ok(())
    }

    /// Serializes to indented JSON.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::Serialization`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, LockError> {
        serde_json::to_string_pretty(self).map_err(|e| LockError::Serialization {
            reason: e.to_string(),
        })
    }

    /// Writes the lock file to `path`, replacing any existing file atomically.
    ///
    /// The JSON is written to a temporary file next to `path` and renamed into
    /// place, so an interrupted write leaves the previous lock file intact.
    pub fn save(&self, path: &Path) -> Result<(), LockError> {
        let mut json = self.to_json_pretty()?;
        json.push('\n');

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let io_err = |source| LockError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        tmp.persist(path).map_err(|e| io_err(e.error))?;
        log::info!("wrote {}", path.display());
        Ok(())
    }
}

/// Reads and validates a lock file.
///
/// # Errors
///
/// Returns [`LockError::Io`] if the file cannot be read and
/// [`LockError::MalformedLockFile`] if it does not parse or is inconsistent.
pub fn load_lock_file(path: &Path) -> Result<LockFile, LockError> {
    let content = std::fs::read_to_string(path).map_err(|e| LockError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let malformed = |reason: String| LockError::MalformedLockFile {
        path: path.to_path_buf(),
        reason,
    };
    let lock: LockFile = serde_json::from_str(&content).map_err(|e| malformed(e.to_string()))?;
    lock.validate().map_err(|e| malformed(e.to_string()))?;
    Ok(lock)
}
