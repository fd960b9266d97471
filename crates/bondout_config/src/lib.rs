//! Parsing and validation of `bondout.toml` project configuration files.
//!
//! This crate reads the project configuration and produces a strongly-typed
//! [`ProjectConfig`]: the fabrication process, the package selection, debug
//! options, pad-side power domains, power-domain allocations and fixed pads.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use resolve::{
    builtin_power_domains, resolve_package, resolve_power_domains, PadDomain, CORE_DOMAIN,
    IO_DOMAIN, RESERVED_PREFIX,
};
pub use types::*;
