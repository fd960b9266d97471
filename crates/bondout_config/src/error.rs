//! Error types for configuration loading and validation.

use bondout_package::PackageError;
use std::path::PathBuf;

/// Errors raised while reading or validating `bondout.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The TOML did not match the configuration schema.
    #[error("failed to parse configuration: {reason}")]
    Parse {
        /// The parser's message, including the offending line.
        reason: String,
    },

    /// A field that must be non-empty was empty.
    #[error("missing required field '{field}'")]
    MissingField {
        /// Dotted path of the field.
        field: String,
    },

    /// A user-chosen name uses the prefix kept for built-in entries.
    #[error("{kind} '{name}' may not start with '_': that prefix is reserved")]
    ReservedName {
        /// What the name denotes, e.g. `power domain`.
        kind: &'static str,
        /// The offending name.
        name: String,
    },

    /// A value was present but unusable.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Dotted path of the field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The package selection could not be resolved.
    #[error(transparent)]
    Package(#[from] PackageError),
}
