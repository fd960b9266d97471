//! Error types for pin locking.

use bondout_package::PackageError;
use std::path::PathBuf;

/// Errors raised while locking pins or reading and writing lock files.
///
/// Every variant carries the dotted `component.interface.port` path or file
/// path needed to act on it. A run aborts on the first error and writes nothing.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    /// The pin pool cannot satisfy an interface.
    #[error("unable to allocate {width} pins for '{path}': only {available} pins left")]
    UnableToAllocate {
        /// Dotted path of the interface or port.
        path: String,
        /// Pins requested.
        width: usize,
        /// Pins left in the pool.
        available: usize,
    },

    /// An interface recorded in the previous lock file now needs a different number of pins.
    #[error(
        "interface '{path}' has changed size: old size = {old}, new size = {new}; \
         remove its entry from the lock file to reallocate it"
    )]
    InterfaceSizeChanged {
        /// Dotted path of the interface.
        path: String,
        /// Width recorded in the previous lock file.
        old: usize,
        /// Width required now.
        new: usize,
    },

    /// A fixed or reused pin location collides with another assignment.
    #[error("pin conflict at '{path}': {reason}")]
    PinConflict {
        /// Dotted path of the offending pad or interface.
        path: String,
        /// What it collides with.
        reason: String,
    },

    /// A lock file failed to parse or validate.
    #[error(
        "lock file {} is malformed: {reason}. Remove it and run `bondout lock` to regenerate it",
        path.display()
    )]
    MalformedLockFile {
        /// The lock file path.
        path: PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// A power-domain mapping references something that does not exist.
    #[error("power domain configuration error at '{path}': {reason}")]
    PowerDomainConfig {
        /// Dotted path of the mapping entry.
        path: String,
        /// Description of the problem.
        reason: String,
    },

    /// The interface metadata tree does not follow the node grammar.
    #[error("invalid interface metadata at '{path}': {reason}")]
    Metadata {
        /// Dotted path of the offending node.
        path: String,
        /// Description of the problem.
        reason: String,
    },

    /// A lock file is internally inconsistent.
    #[error("inconsistent port '{path}': {reason}")]
    Inconsistent {
        /// Dotted path of the port.
        path: String,
        /// Description of the inconsistency.
        reason: String,
    },

    /// An I/O error occurred while reading or writing a file.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A serialization error occurred.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },

    /// A package operation failed.
    #[error(transparent)]
    Package(#[from] PackageError),
}
