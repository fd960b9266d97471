//! `bondout lock`: allocate pins and write the lock file.
//!
//! 1. Find the project root and load `bondout.toml`
//! 2. Resolve the package and read the design's interface metadata
//! 3. Load the existing lock file, if any, for reuse
//! 4. Allocate and write the new lock file atomically

use std::error::Error;
use std::path::Path;

use bondout_config::{load_config, resolve_package};
use bondout_lock::{load_lock_file, lock, LockOptions};
use bondout_package::PackageDefinition;
use indexmap::IndexMap;
use serde_json::Value;

use crate::project::{lock_file_path, resolve_project_root};
use crate::{GlobalArgs, LockArgs};

const DESIGN_FILE: &str = "design.json";

/// Runs the `bondout lock` command.
pub fn run(args: &LockArgs, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let root = resolve_project_root(global)?;
    let config = load_config(&root)?;
    let package = resolve_package(&config.silicon)?;
    tracing::debug!("project root {}, package {}", root.display(), package.name());

    let design_path = args.design.clone().unwrap_or_else(|| root.join(DESIGN_FILE));
    let interfaces = read_design(&design_path)?;

    let lock_path = lock_file_path(args.lockfile.as_deref(), global)?;
    let previous = if lock_path.exists() {
        if !global.quiet {
            eprintln!("   Reusing pin allocation from {}", lock_path.display());
        }
        Some(load_lock_file(&lock_path)?)
    } else {
        None
    };

    let options = LockOptions::from_silicon(&config.silicon);
    let locked = lock(
        &package,
        config.silicon.process,
        &interfaces,
        previous.as_ref(),
        &options,
    )?;
    locked.save(&lock_path)?;

    if !global.quiet {
        eprintln!(
            "      Locked {} pins of {} on {} ({})",
            locked.port_map.all_pins().len(),
            config.project.name,
            package.name(),
            lock_path.display()
        );
    }
    Ok(0)
}

/// Reads the design's interface metadata: component name to interface tree.
fn read_design(path: &Path) -> Result<IndexMap<String, Value>, Box<dyn Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read design metadata {}: {e}", path.display()))?;
    let interfaces = serde_json::from_str(&content)
        .map_err(|e| format!("invalid design metadata {}: {e}", path.display()))?;
    Ok(interfaces)
}
