//! Error types for package construction and pin allocation.

/// Errors raised while constructing a package definition or allocating its pins.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PackageError {
    /// The pool does not hold enough pins for the requested width.
    #[error("unable to allocate {requested} pins: only {available} available")]
    UnableToAllocate {
        /// Number of pins requested.
        requested: usize,
        /// Number of pins left in the pool.
        available: usize,
    },

    /// The package dimensions cannot accommodate the fixed bringup pins.
    #[error("invalid dimensions for package '{package}': {reason}")]
    InvalidDimensions {
        /// The package name.
        package: String,
        /// What is wrong with the dimensions.
        reason: String,
    },

    /// No package is registered under the given name.
    #[error("unknown package '{name}'. Known packages: {}", known.join(", "))]
    UnknownPackage {
        /// The requested name.
        name: String,
        /// Names of the registered packages.
        known: Vec<String>,
    },

    /// A pin location string does not name a pin of this package.
    #[error("'{location}' is not a pin of package '{package}'")]
    UnknownPin {
        /// The package name.
        package: String,
        /// The offending location string.
        location: String,
    },
}
