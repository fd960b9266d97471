//! Project root and lock file discovery shared by the commands.

use std::error::Error;
use std::path::{Path, PathBuf};

use bondout_config::CONFIG_FILE;
use bondout_lock::LOCK_FILE;

use crate::GlobalArgs;

/// The nearest of `start` and its ancestors holding a `bondout.toml` file.
///
/// A directory that merely happens to be called `bondout.toml` does not count.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn Error>> {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILE).is_file())
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            format!(
                "no {CONFIG_FILE} in {} or its parents; run inside a bondout project or pass --config",
                start.display()
            )
            .into()
        })
}

/// Resolves the project root directory from global CLI args.
///
/// A `--config` file selects its parent directory and a `--config` directory
/// is used as given.
/// Otherwise walks up from the current directory looking for `bondout.toml`.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn Error>> {
    match &global.config {
        Some(path) if path.is_file() => Ok(path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))),
        Some(path) => Ok(path.clone()),
        None => find_project_root(&std::env::current_dir()?),
    }
}

/// The lock file to operate on: `explicit` if given, else `pins.lock` in the project root.
pub fn lock_file_path(explicit: Option<&Path>, global: &GlobalArgs) -> Result<PathBuf, Box<dyn Error>> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(resolve_project_root(global)?.join(LOCK_FILE)),
    }
}
