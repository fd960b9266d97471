//! `bondout check`: verify that a lock file parses and is consistent.

use std::error::Error;

use bondout_lock::load_lock_file;
use bondout_package::PackageDefinition;

use crate::project::lock_file_path;
use crate::{CheckArgs, GlobalArgs};

/// Runs the `bondout check` command.
///
/// Loading already validates widths, pin membership and disjointness, so any
/// problem surfaces as an error and a non-zero exit.
pub fn run(args: &CheckArgs, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let path = lock_file_path(args.lockfile.as_deref(), global)?;
    let lock = load_lock_file(&path)?;
    if !global.quiet {
        eprintln!(
            "   {}: ok, {} ports on {} pins of {}",
            path.display(),
            lock.port_map.iter().count(),
            lock.port_map.all_pins().len(),
            lock.package.name()
        );
    }
    Ok(0)
}
